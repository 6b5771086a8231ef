use std::{process, thread};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tslite::cli::{App, Args, CliError, Config};

// User recursion becomes interpreter recursion, so the default call depth
// needs more stack than the main thread gets.
const INTERPRETER_STACK_SIZE: usize = 256 * 1024 * 1024;

fn main() {
    let args = Args::parse();

    let code = thread::Builder::new()
        .name(String::from("tslite"))
        .stack_size(INTERPRETER_STACK_SIZE)
        .spawn(move || run(args))
        .map_err(|error| eprintln!("Error: could not start interpreter thread: {}", error))
        .and_then(|handle| handle.join().map_err(|_| ()))
        .unwrap_or(1);

    process::exit(code);
}

fn run(args: Args) -> i32 {
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {}", error);
            return 2;
        }
    };

    init_tracing(&config.log_level);

    match App::run(&args, &config) {
        Ok(()) => 0,
        // Already rendered as a diagnostic
        Err(CliError::Program(_)) => 1,
        Err(error) => {
            eprintln!("Error: {}", error);
            1
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
