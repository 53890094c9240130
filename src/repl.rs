use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::stdout;

/// Read-eval-print loop. A single [`Resolver`] lives across the whole
/// session so binding ids keep incrementing and a `var` declared on one line
/// stays resolvable (and keeps its value) on the next -- recreating the
/// resolver per line would hand out colliding ids for every line's globals.
pub fn repl() -> Result<(), std::io::Error> {
    let mut interpreter = Interpreter::new(stdout());
    let mut resolver = Resolver::new();
    let mut editor = DefaultEditor::new().map_err(to_io_error)?;

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                if let Err(report) = run_line(&mut interpreter, &mut resolver, &line) {
                    eprintln!("{report}");
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(to_io_error(e)),
        }
    }
    Ok(())
}

fn run_line(interpreter: &mut Interpreter, resolver: &mut Resolver, line: &str) -> Result<(), String> {
    let statements = Parser::parse(Scanner::new(line)).map_err(|errors| {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    let resolved = resolver.resolve(statements);
    resolver.finish().map_err(|errors| {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    interpreter
        .batch_execute(resolved)
        .map_err(|e| e.to_string())
}

fn to_io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
