use clap::Parser;
use std::path::PathBuf;

/// A tree-walking interpreter for Lox.
#[derive(Debug, Parser)]
#[command(name = "jlox", version, about)]
pub struct Cli {
    /// Script to run. Omit to start an interactive REPL.
    pub script: Option<PathBuf>,
}
