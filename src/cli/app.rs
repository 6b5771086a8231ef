use std::{
    fs,
    io::{self, Write},
};

use tracing::{debug, info};

use crate::{
    check_source,
    diagnostics::DiagnosticReporter,
    errors::errors::Error,
    lexer::lexer::tokenize,
    run_source,
};

use super::{
    args::{Args, Command, SourceArgs},
    config::Config,
    errors::CliError,
};

/// A program loaded from a file or given inline.
#[derive(Debug, PartialEq)]
pub struct Program {
    pub name: String,
    pub source: String,
}

impl Program {
    pub fn load(args: &SourceArgs) -> Result<Self, CliError> {
        match (&args.inline, &args.file) {
            (Some(code), _) => Ok(Program {
                name: String::from("<inline>"),
                source: code.clone(),
            }),
            (None, Some(path)) => {
                let source = fs::read_to_string(path).map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;

                Ok(Program {
                    name: path.display().to_string(),
                    source,
                })
            }
            (None, None) => Ok(Program {
                name: String::from("<inline>"),
                source: String::new(),
            }),
        }
    }

    pub fn report(&self, error: &Error) {
        let reporter = DiagnosticReporter::new(&self.name, &self.source);
        if let Err(render_error) = reporter.emit(error) {
            eprintln!("error[{}]: {} ({})", error.get_error_name(), error, render_error);
        }
    }
}

pub struct App;

impl App {
    pub fn run(args: &Args, config: &Config) -> Result<(), CliError> {
        let source_args = match &args.command {
            Command::Check(source) | Command::Tokens(source) => source,
            Command::Run(run) => &run.source,
        };
        let program = Program::load(source_args)?;
        info!(program = %program.name, bytes = program.source.len(), "loaded program");

        let result = match &args.command {
            Command::Check(_) => Self::check(&program),
            Command::Run(_) => Self::execute(&program, config),
            Command::Tokens(_) => Self::tokens(&program),
        };

        if let Err(CliError::Program(error)) = &result {
            program.report(error);
        }

        result
    }

    fn check(program: &Program) -> Result<(), CliError> {
        check_source(&program.source, &program.name)?;
        println!("{}: no errors found", program.name);
        Ok(())
    }

    fn execute(program: &Program, config: &Config) -> Result<(), CliError> {
        debug!(config = ?config.interpreter, "running program");

        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut out = stdout.lock();
        let mut err = stderr.lock();

        Self::execute_to(program, config, &mut out, &mut err)
    }

    /// Runs `program` against the given output streams. A program error
    /// takes precedence over a failure to flush `out`.
    pub(super) fn execute_to(
        program: &Program,
        config: &Config,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), CliError> {
        let result = run_source(
            &program.source,
            &program.name,
            config.interpreter.clone(),
            out,
            err,
        );
        let flushed = out.flush();

        result?;
        flushed.map_err(CliError::Output)
    }

    fn tokens(program: &Program) -> Result<(), CliError> {
        let tokens = tokenize(program.source.clone(), Some(program.name.clone()))?;
        for token in &tokens {
            token.debug();
        }
        Ok(())
    }
}
