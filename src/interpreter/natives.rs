use super::lox_value::{LoxValue, NativeFunction};
use super::RuntimeError;
use std::cell::Cell;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

pub(super) fn clock() -> NativeFunction {
    NativeFunction {
        name: "clock",
        arity: 0,
        func: |_args| {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| RuntimeError::native_call_failed("clock", e.to_string()))?;
            Ok(LoxValue::Number(now.as_secs_f64()))
        },
    }
}

pub(super) fn input() -> NativeFunction {
    NativeFunction {
        name: "input",
        arity: 1,
        func: |args| {
            print!("{}", args[0]);
            std::io::stdout()
                .flush()
                .map_err(|e| RuntimeError::native_call_failed("input", e.to_string()))?;
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .map_err(|e| RuntimeError::native_call_failed("input", e.to_string()))?;
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            Ok(LoxValue::String(line))
        },
    }
}

pub(super) fn randint() -> NativeFunction {
    NativeFunction {
        name: "randint",
        arity: 2,
        func: |args| {
            let (lo, hi) = match (&args[0], &args[1]) {
                (LoxValue::Number(lo), LoxValue::Number(hi)) => (*lo, *hi),
                _ => {
                    return Err(RuntimeError::native_call_failed(
                        "randint",
                        "both arguments must be numbers",
                    ))
                }
            };
            if hi < lo {
                return Err(RuntimeError::native_call_failed(
                    "randint",
                    "the upper bound must not be less than the lower bound",
                ));
            }
            let span = (hi - lo).floor() as u64 + 1;
            let n = next_random() % span.max(1);
            Ok(LoxValue::Number(lo.floor() + n as f64))
        },
    }
}

thread_local! {
    static RNG_STATE: Cell<u64> = Cell::new(seed());
}

fn seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E3779B97F4A7C15)
        | 1
}

/// splitmix64, used only to turn a seed into a stream of pseudo-random
/// integers for `randint` -- not cryptographically meaningful.
fn next_random() -> u64 {
    RNG_STATE.with(|state| {
        let mut x = state.get().wrapping_add(0x9E3779B97F4A7C15);
        state.set(x);
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
        x ^ (x >> 31)
    })
}
