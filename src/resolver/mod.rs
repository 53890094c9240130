mod environment;
mod resolver;

pub mod resolved_ast;

use std::fmt::Formatter;
use thiserror::Error;

/// Globals (and anything declared outside any function scope) get
/// `Predetermined` ids and live in the interpreter's process-wide frame.
/// Anything declared inside a function/method/lambda body gets
/// `FunctionLocal` ids and is allocated fresh in every call frame.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BindingId {
    Predetermined(u64),
    FunctionLocal(u64),
}

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingId::Predetermined(n) => write!(f, "Predetermined({n})"),
            BindingId::FunctionLocal(n) => write!(f, "FunctionLocal({n})"),
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("[line {line}] Error: {message}")]
pub struct ResolveError {
    pub line: u64,
    message: String,
}

impl ResolveError {
    fn new(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

pub use resolver::Resolver;
