//! CLI command implementation for the harmap binary.

pub mod map_cmd;
pub mod output;
pub mod progress;
