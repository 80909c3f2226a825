//! Chorus CLI library.
//!
//! Command implementations, input discovery, logging setup, Ctrl-C handling
//! and batch reporting for the `chorus` binary.

pub mod commands;
pub mod discover;
pub mod interrupt;
pub mod logging;
pub mod session;
pub mod summary;
