use serde::Deserialize;
use std::{fs, path::Path};

use crate::interpreter::interpreter::InterpreterConfig;

use super::{
    args::{Args, Command},
    errors::CliError,
};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Contents of the TOML configuration file. Every key is optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub log_level: Option<String>,
    #[serde(default)]
    pub interpreter: InterpreterSection,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InterpreterSection {
    pub max_loop_iterations: Option<u64>,
    pub max_call_depth: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Settings after merging the command line over the file over defaults.
#[derive(Debug, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub interpreter: InterpreterConfig,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, CliError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        Ok(Self::merge(args, file))
    }

    pub fn merge(args: &Args, file: FileConfig) -> Self {
        let defaults = InterpreterConfig::default();
        let (max_iterations, max_call_depth) = match &args.command {
            Command::Run(run) => (run.max_iterations, run.max_call_depth),
            Command::Check(_) | Command::Tokens(_) => (None, None),
        };

        Config {
            log_level: args
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            interpreter: InterpreterConfig {
                max_loop_iterations: max_iterations
                    .or(file.interpreter.max_loop_iterations)
                    .or(defaults.max_loop_iterations),
                max_call_depth: max_call_depth
                    .or(file.interpreter.max_call_depth)
                    .unwrap_or(defaults.max_call_depth),
            },
        }
    }
}
