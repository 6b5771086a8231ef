//! Command line front end: argument parsing, the TOML configuration file
//! and the `check`, `run` and `tokens` commands.

mod app;
mod args;
pub mod config;
mod errors;

pub use app::{App, Program};
pub use args::{Args, Command, RunArgs, SourceArgs};
pub use config::{Config, FileConfig};
pub use errors::CliError;
