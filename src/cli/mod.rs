pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{ClustersArgs, CliArgs, Commands, ConvertArgs, ViewArgs};
pub use output::{OutputFormat, OutputFormatter};
