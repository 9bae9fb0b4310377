use std::ffi::{OsStr, OsString};

use crate::{
    registry::{Kind, Scope, Value},
    Error, Registry, Result,
};

/// Remaining arguments, reversed so that `pop` yields the next one.
struct Tokens {
    rargs: Vec<OsString>,
}

impl Tokens {
    fn new(mut args: Vec<OsString>) -> Tokens {
        args.reverse();
        Tokens { rargs: args }
    }

    fn peek(&self) -> Option<&OsStr> {
        self.rargs.last().map(OsString::as_os_str)
    }

    fn next(&mut self) -> Option<OsString> {
        self.rargs.pop()
    }

    fn next_value(&mut self, flag: &str) -> Result<OsString> {
        self.next().ok_or_else(|| Error::MissingValue(flag.to_string()))
    }
}

impl Registry {
    pub fn parse_env(&mut self) -> Result<()> {
        self.parse(std::env::args_os())
    }

    /// Parses `argv`, whose first element is the program name.
    ///
    /// Stops at the first error. Flags assigned before that point keep their
    /// new values.
    pub fn parse<I>(&mut self, argv: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
    {
        self.deactivate();
        self.last_error = None;

        let mut p = Tokens::new(argv.into_iter().map(Into::into).collect());
        let _progn = p.next();
        self.parse_(&mut p).map_err(|err| self.fail(err))
    }

    fn parse_(&mut self, p: &mut Tokens) -> Result<()> {
        let first_is_flag = match p.peek() {
            None => return Ok(()),
            Some(arg) => is_flag(arg),
        };
        let scope = if first_is_flag {
            Scope::Global
        } else {
            let arg = p.next().unwrap_or_default();
            let name = arg.into_string().map_err(|it| Error::SubcommandNotFound(lossy(it)))?;
            match self.lookup_subcommand(&name) {
                Some(sub) => self.activate(sub),
                None => return Err(Error::SubcommandNotFound(name)),
            }
        };

        while let Some(arg) = p.next() {
            if arg == "--" {
                continue;
            }
            let flag = match arg.into_string() {
                Ok(it) if it.starts_with('-') => it,
                Ok(it) => return Err(Error::FlagNotFound(it)),
                Err(it) => return Err(Error::FlagNotFound(lossy(it))),
            };
            let name = &flag[1..];

            let flags = self.flag_set_mut(scope);
            let idx = match flags.find(name) {
                Some(it) => it,
                None => return Err(Error::FlagNotFound(flag.clone())),
            };
            let value = match flags.kind(idx) {
                Kind::Bool => Value::Bool(true),
                Kind::U64 => {
                    let raw = p.next_value(name)?;
                    match raw.to_str().and_then(parse_u64) {
                        Some(num) => Value::U64(num),
                        None => {
                            return Err(Error::InvalidNumber {
                                flag: name.to_string(),
                                value: lossy(raw),
                            })
                        }
                    }
                }
                Kind::Str => {
                    let raw = p.next_value(name)?;
                    let text = raw.into_string().map_err(|_| Error::InvalidUtf8(name.to_string()))?;
                    Value::Str(text)
                }
            };
            tracing::trace!(flag = name, %value, "set flag");
            flags.set(idx, value);
        }
        Ok(())
    }
}

fn is_flag(arg: &OsStr) -> bool {
    arg.as_encoded_bytes().first() == Some(&b'-')
}

fn lossy(arg: OsString) -> String {
    // Debug escapes invalid sequences instead of replacing them with `FFFD`.
    let dbg = format!("{arg:?}");
    dbg.trim_matches('"').to_string()
}

/// Unsigned integer with C-style base detection: `0x`/`0X` is hex, a leading
/// `0` is octal, anything else decimal. The whole token must be digits.
fn parse_u64(text: &str) -> Option<u64> {
    let text = text.strip_prefix('+').unwrap_or(text);
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or(text.strip_prefix("0X")) {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
