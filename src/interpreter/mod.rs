mod lox_callable;
mod lox_value;
mod natives;
mod tree_walker;

pub use tree_walker::{ExecuteRawError, Interpreter, RuntimeError};
