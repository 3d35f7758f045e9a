//! CLI command implementations.

pub mod common;
pub mod config;
pub mod replay;
pub mod run;
