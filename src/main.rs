use clap::Parser as _;
use jlox::cli::Cli;
use jlox::{repl, Interpreter};
use std::io::stdout;

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(script) = cli.script else {
        return match repl() {
            Ok(()) => std::process::ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "REPL terminated abnormally");
                std::process::ExitCode::from(70)
            }
        };
    };

    let source = match std::fs::read_to_string(&script) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read {}: {e}", script.display());
            return std::process::ExitCode::from(64);
        }
    };

    let mut interpreter = Interpreter::new(stdout());
    match interpreter.execute_raw(&source) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(jlox::ExecuteRawError::ParserError(errors)) => {
            for e in errors {
                eprintln!("{e}");
            }
            std::process::ExitCode::from(65)
        }
        Err(jlox::ExecuteRawError::ResolveError(errors)) => {
            for e in errors {
                eprintln!("{e}");
            }
            std::process::ExitCode::from(65)
        }
        Err(e @ jlox::ExecuteRawError::RuntimeError(_)) => {
            eprintln!("{e}");
            std::process::ExitCode::from(70)
        }
    }
}
