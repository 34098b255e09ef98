//! raffle-runner — discovers open raffles and enters them oldest first.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod engine;
pub mod markup;
pub mod session;
pub mod types;
