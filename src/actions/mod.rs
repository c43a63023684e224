//! Host functions callable from rule scripts.
//!
//! Every function absorbs its own failures: they are logged and the script
//! sees `false` (or none) instead of an evaluation error.

pub mod espeak;
pub mod openhab;

use tracing::{error, info, warn};
use crate::config::Config;
use crate::script::environment::FunctionEnvironment;
use crate::script::value::Value;
use self::espeak::Espeak;
use self::openhab::OpenHab;

/// Builds the function environment exposed to rule scripts:
/// `printf(fmt, args...)`, `say(text)` and `openhab(item, state)`.
pub fn functions(config: &Config) -> std::io::Result<FunctionEnvironment> {
    let mut fenv = FunctionEnvironment::new();

    fenv.register("printf", printf);

    let espeak = Espeak::new(config.speech.clone());
    fenv.register("say", move |args: &[Value]| {
        let text = match args {
            [text] => text.to_string(),
            _ => {
                warn!("say expects 1 argument, got {}", args.len());
                return Value::Bool(false);
            },
        };

        match espeak.say(&text) {
            Ok(()) => Value::Bool(true),
            Err(err) => {
                error!("Error running espeak: {}", err);
                Value::Bool(false)
            },
        }
    });

    match &config.openhab {
        Some(url) => {
            let openhab = OpenHab::new(url.as_str())?;
            fenv.register("openhab", move |args: &[Value]| openhab_call(&openhab, args));
        },
        None => fenv.register("openhab", |_: &[Value]| {
            warn!("openhab called but no openhab URL is configured");
            Value::Bool(false)
        }),
    }

    Ok(fenv)
}

fn openhab_call(openhab: &OpenHab, args: &[Value]) -> Value {
    let (item, state) = match args {
        [item, state] => (item.to_string(), state.to_string()),
        _ => {
            warn!("openhab expects 2 arguments, got {}", args.len());
            return Value::Bool(false);
        },
    };

    match openhab.post_state(&item, &state) {
        Ok(()) => Value::Bool(true),
        Err(err) => {
            error!("Error setting openhab value {} for {}: {}", state, item, err);
            Value::Bool(false)
        },
    }
}

pub fn printf(args: &[Value]) -> Value {
    match args.split_first() {
        Some((format, rest)) => info!(target: "script", "{}", format_message(&format.to_string(), rest)),
        None => warn!("printf called without a format string"),
    }

    Value::None
}

/// `%s` and `%d` take the next argument, `%%` is a literal percent sign.
/// Directives without a matching argument are kept as written.
pub fn format_message(format: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            },
            Some(directive @ ('s' | 'd')) => {
                chars.next();

                match args.next() {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => {
                        out.push('%');
                        out.push(directive);
                    },
                }
            },
            _ => out.push('%'),
        }
    }

    out
}
