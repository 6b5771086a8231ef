use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tslite")]
#[command(version = "0.1.0")]
#[command(about = "Type checker and interpreter for a small TypeScript subset")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(
        short = 'c',
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        help = "Log level: error, warn, info, debug or trace (RUST_LOG takes precedence)"
    )]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Parse and type check a program without executing it")]
    Check(SourceArgs),

    #[command(about = "Type check a program, then run it")]
    Run(RunArgs),

    #[command(about = "Print the token stream of a program")]
    Tokens(SourceArgs),
}

#[derive(ClapArgs, Debug)]
pub struct SourceArgs {
    #[arg(value_name = "FILE", conflicts_with = "inline", required_unless_present = "inline")]
    pub file: Option<PathBuf>,

    #[arg(short = 'i', long, value_name = "CODE")]
    pub inline: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(
        long,
        value_name = "N",
        help = "Stop the program when a single loop runs more than N iterations"
    )]
    pub max_iterations: Option<u64>,

    #[arg(long, value_name = "N", help = "Maximum nesting depth of function calls")]
    pub max_call_depth: Option<usize>,
}
