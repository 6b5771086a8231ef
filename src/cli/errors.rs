use std::{io, path::PathBuf};

use thiserror::Error;

use crate::errors::errors::Error as PipelineError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not write program output: {0}")]
    Output(#[source] io::Error),
    /// Lexing, parsing, type checking or runtime failure. Rendered as a
    /// source diagnostic by the binary.
    #[error(transparent)]
    Program(#[from] PipelineError),
}
