//! CLI command implementations

pub mod config;
pub mod pair;
pub mod report;
pub mod run;
pub mod start;
pub mod status;
pub mod stop;
