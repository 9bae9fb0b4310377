use std::{fmt::Write, io};

use crate::{ErrorKind, Registry};

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

impl Registry {
    /// Usage text for the active subcommand, or for the whole program when
    /// no subcommand is active.
    pub fn help(&self) -> String {
        let mut buf = String::new();

        if !self.description().is_empty() {
            w!(buf, "{}\n\n", self.description());
        }

        let active = self.active_subcommand();
        let flags = match active {
            Some(sub) => {
                w!(buf, "Usage: {} {} [FLAGS]\n\n", self.name(), sub.name());
                sub.flags()
            }
            None => {
                w!(buf, "Usage: {} [SUBCOMMANDS] [FLAGS]\n\n", self.name());
                self.global_flags()
            }
        };

        w!(buf, "Options:\n");
        let mut width = flags.iter().map(|it| it.name().chars().count()).max().unwrap_or(0);
        for flag in flags {
            w!(buf, "    -{:<pad$}{}\n", flag.name(), flag.description(), pad = width + 4);
        }

        if active.is_none() && !self.subcommands().is_empty() {
            w!(buf, "\nSubcommands:\n");
            width = self
                .subcommands()
                .iter()
                .map(|it| it.name().chars().count())
                .fold(width, usize::max);
            for sub in self.subcommands() {
                w!(buf, "    {:<pad$}{}\n", sub.name(), sub.description(), pad = width + 4);
            }
        }

        buf
    }

    pub fn write_help(&self, mut out: impl io::Write) -> io::Result<()> {
        out.write_all(self.help().as_bytes())
    }

    /// Sentence describing the last error, `None` if there was none.
    pub fn error_message(&self) -> Option<&'static str> {
        self.last_error().map(ErrorKind::message)
    }
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::SubcommandNotFound => "cannot find an appropriate subcommand",
            ErrorKind::FlagNotFound => "cannot find an appropriate flag",
            ErrorKind::InvalidNumber => "invalid number or overflowed number is given",
            ErrorKind::MissingValue => "expected a value after the flag",
            ErrorKind::InvalidUtf8 => "flag value is not valid utf-8",
            ErrorKind::DuplicateSubcommand => "subcommand is declared more than once",
            ErrorKind::DuplicateFlag => "flag is declared more than once in the same scope",
            ErrorKind::TooManySubcommands => "too many subcommands are declared",
            ErrorKind::TooManyFlags => "too many flags are declared in one scope",
        }
    }
}
