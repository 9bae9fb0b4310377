//! A small command line flag parser.
//!
//! Flags are typed (`bool`, `u64` or `String`) and are written with a single
//! dash: `-verbose`, `-jobs 4`, `-out path`. The first argument, when it does
//! not start with `-`, selects a subcommand; every flag after it is resolved
//! against that subcommand's own flags.
//!
//! ```
//! let mut reg = pennant::Registry::new("prog", "Does things.");
//! let build = reg.declare_subcommand("build", "Build the thing").unwrap();
//! let verbose = reg.flag_bool("verbose", false, "Talk more", Some("build")).unwrap();
//! let jobs = reg.flag_u64("jobs", 1, "Parallelism", None).unwrap();
//!
//! reg.parse(["prog", "build", "-verbose"]).unwrap();
//!
//! assert!(reg.is_active(build));
//! assert!(*reg.value(verbose));
//! assert_eq!(*reg.value(jobs), 1);
//! ```
//!
//! Parsing is fail-fast: the first bad token stops the scan, flags matched
//! before it keep their new values, and the error is both returned and kept
//! in [`Registry::last_error`].

mod help;
mod parser;
mod registry;

pub use crate::registry::{
    Flag, FlagHandle, FlagId, FlagType, Kind, Limits, Registry, Subcommand, SubcommandHandle,
    Value,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Unknown subcommand: `{0}`")]
    SubcommandNotFound(String),
    #[error("Unknown flag: `{0}`")]
    FlagNotFound(String),
    #[error("Can't parse `-{flag}`, invalid number: `{value}`")]
    InvalidNumber { flag: String, value: String },
    #[error("expected a value for `-{0}`")]
    MissingValue(String),
    #[error("Can't parse `-{0}`, invalid utf8")]
    InvalidUtf8(String),
    #[error("Subcommand declared more than once: `{0}`")]
    DuplicateSubcommand(String),
    #[error("Flag declared more than once: `-{0}`")]
    DuplicateFlag(String),
    #[error("Too many subcommands, the limit is {0}")]
    TooManySubcommands(usize),
    #[error("Too many flags in one scope, the limit is {0}")]
    TooManyFlags(usize),
}

/// The shape of an [`Error`], without the offending token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SubcommandNotFound,
    FlagNotFound,
    InvalidNumber,
    MissingValue,
    InvalidUtf8,
    DuplicateSubcommand,
    DuplicateFlag,
    TooManySubcommands,
    TooManyFlags,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SubcommandNotFound(_) => ErrorKind::SubcommandNotFound,
            Error::FlagNotFound(_) => ErrorKind::FlagNotFound,
            Error::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            Error::MissingValue(_) => ErrorKind::MissingValue,
            Error::InvalidUtf8(_) => ErrorKind::InvalidUtf8,
            Error::DuplicateSubcommand(_) => ErrorKind::DuplicateSubcommand,
            Error::DuplicateFlag(_) => ErrorKind::DuplicateFlag,
            Error::TooManySubcommands(_) => ErrorKind::TooManySubcommands,
            Error::TooManyFlags(_) => ErrorKind::TooManyFlags,
        }
    }
}
