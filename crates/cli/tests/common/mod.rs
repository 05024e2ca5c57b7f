//! Common utilities for integration tests

pub mod cli;

pub use cli::{CommandResult, SeismoCommand, TestEnv};
