//! Command implementations for the ffbench CLI

pub mod effects;
pub mod probe;
pub mod run;
