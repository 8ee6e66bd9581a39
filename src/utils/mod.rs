//! Shared helpers for binaries and connection setup.

pub mod bootstrap;
