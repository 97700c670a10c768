//! CLI command implementations.

pub mod blocks;
pub mod common;
pub mod compile;
pub mod run;
