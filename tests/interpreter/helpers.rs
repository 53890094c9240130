use jlox::{ExecuteRawError, Interpreter};

/// Execute the provided lox source code.
/// It returns the program's output stream.
pub fn execute(source: &str) -> String {
    let mut buffer = Vec::new();
    let _ = Interpreter::new(&mut buffer).execute_raw(source);
    String::from_utf8(buffer).unwrap()
}

/// Execute the provided lox source code, keeping whatever error it failed
/// with alongside whatever it printed before failing.
pub fn try_execute(source: &str) -> (String, Result<(), ExecuteRawError>) {
    let mut buffer = Vec::new();
    let result = Interpreter::new(&mut buffer).execute_raw(source);
    (String::from_utf8(buffer).unwrap(), result)
}
