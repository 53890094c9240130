mod helpers;

mod classes;
mod closures;
mod control_flow;
mod functions;
mod operators;
mod runtime_errors;
mod scopes;
mod traits;
