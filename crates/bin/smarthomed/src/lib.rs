//! Library side of the daemon: configuration and runtime wiring, shared by
//! `main` and the end-to-end tests.

pub mod config;
pub mod runtime;
