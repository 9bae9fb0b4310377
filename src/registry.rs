use std::{
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    U64,
    Str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U64(u64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::U64(_) => Kind::U64,
            Value::Str(_) => Kind::Str,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(it) => fmt::Display::fmt(it, f),
            Value::U64(it) => fmt::Display::fmt(it, f),
            Value::Str(it) => fmt::Debug::fmt(it, f),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for u64 {}
    impl Sealed for String {}
}

/// Rust types a flag can hold: `bool`, `u64` and `String`.
pub trait FlagType: sealed::Sealed + Sized {
    const KIND: Kind;

    #[doc(hidden)]
    fn into_value(self) -> Value;
    #[doc(hidden)]
    fn from_value(value: &Value) -> Option<&Self>;
}

impl FlagType for bool {
    const KIND: Kind = Kind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Bool(it) => Some(it),
            _ => None,
        }
    }
}

impl FlagType for u64 {
    const KIND: Kind = Kind::U64;

    fn into_value(self) -> Value {
        Value::U64(self)
    }
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::U64(it) => Some(it),
            _ => None,
        }
    }
}

impl FlagType for String {
    const KIND: Kind = Kind::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Str(it) => Some(it),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    description: String,
    value: Value,
    default: Value,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn kind(&self) -> Kind {
        self.default.kind()
    }
    /// The current value: the default until a parse assigns something else.
    pub fn value(&self) -> &Value {
        &self.value
    }
    pub fn default(&self) -> &Value {
        &self.default
    }
}

/// The flags of one scope, in declaration order, plus a name index.
#[derive(Debug, Default)]
pub(crate) struct FlagSet {
    flags: Vec<Flag>,
    index: HashMap<String, usize>,
}

impl FlagSet {
    pub(crate) fn find(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn kind(&self, idx: usize) -> Kind {
        self.flags[idx].kind()
    }

    pub(crate) fn set(&mut self, idx: usize, value: Value) {
        debug_assert_eq!(self.flags[idx].kind(), value.kind());
        self.flags[idx].value = value;
    }

    fn insert(&mut self, flag: Flag, limits: &Limits) -> Result<usize> {
        if self.index.contains_key(&flag.name) {
            return Err(Error::DuplicateFlag(flag.name));
        }
        if let Some(max) = limits.max_flags {
            if self.flags.len() >= max {
                return Err(Error::TooManyFlags(max));
            }
        }
        let idx = self.flags.len();
        self.index.insert(flag.name.clone(), idx);
        self.flags.push(flag);
        Ok(idx)
    }
}

#[derive(Debug)]
pub struct Subcommand {
    name: String,
    description: String,
    is_active: bool,
    flags: FlagSet,
}

impl Subcommand {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn is_active(&self) -> bool {
        self.is_active
    }
    pub fn flags(&self) -> &[Flag] {
        &self.flags.flags
    }
}

/// Upper bounds on declarations. Unbounded by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    /// Per scope: the global flags and each subcommand count separately.
    pub max_flags: Option<usize>,
    pub max_subcommands: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Scope {
    Global,
    Subcommand(usize),
}

/// Untyped address of a declared flag: its scope and position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagId {
    stamp: u64,
    scope: Scope,
    index: usize,
}

impl FlagId {
    /// Position of the flag within its scope, in declaration order.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Typed handle to a flag's value, exchanged for the value through
/// [`Registry::value`].
pub struct FlagHandle<T> {
    id: FlagId,
    ty: PhantomData<fn() -> T>,
}

impl<T> FlagHandle<T> {
    pub fn id(self) -> FlagId {
        self.id
    }
}

impl<T> Clone for FlagHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlagHandle<T> {}

impl<T> PartialEq for FlagHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for FlagHandle<T> {}

impl<T> fmt::Debug for FlagHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FlagHandle").field(&self.id).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubcommandHandle {
    stamp: u64,
    index: usize,
}

impl SubcommandHandle {
    /// Position of the subcommand in declaration order.
    pub fn index(self) -> usize {
        self.index
    }
}

/// Identifies one registry between two `close` calls, unique within the process.
fn next_stamp() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// Owner of every declared flag and subcommand.
///
/// Handles returned by the `declare_*` methods are only accepted by the
/// registry that produced them, and are invalidated by [`Registry::close`].
#[derive(Debug)]
pub struct Registry {
    name: String,
    description: String,
    limits: Limits,
    stamp: u64,
    globals: FlagSet,
    subcommands: Vec<Subcommand>,
    index: HashMap<String, usize>,
    pub(crate) active: Option<usize>,
    pub(crate) last_error: Option<ErrorKind>,
}

impl Registry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Registry {
        Registry::with_limits(name, description, Limits::default())
    }

    pub fn with_limits(
        name: impl Into<String>,
        description: impl Into<String>,
        limits: Limits,
    ) -> Registry {
        Registry {
            name: name.into(),
            description: description.into(),
            limits,
            stamp: next_stamp(),
            globals: FlagSet::default(),
            subcommands: Vec::new(),
            index: HashMap::new(),
            active: None,
            last_error: None,
        }
    }

    /// Forgets every declaration, leaving only the program name and
    /// description. Outstanding handles become stale.
    pub fn close(&mut self) {
        self.globals = FlagSet::default();
        self.subcommands.clear();
        self.index.clear();
        self.active = None;
        self.last_error = None;
        self.stamp = next_stamp();
    }

    pub fn declare_subcommand(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<SubcommandHandle> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(self.fail(Error::DuplicateSubcommand(name)));
        }
        if let Some(max) = self.limits.max_subcommands {
            if self.subcommands.len() >= max {
                return Err(self.fail(Error::TooManySubcommands(max)));
            }
        }

        let index = self.subcommands.len();
        tracing::trace!(subcommand = %name, index, "declared subcommand");
        self.index.insert(name.clone(), index);
        self.subcommands.push(Subcommand {
            name,
            description: description.into(),
            is_active: false,
            flags: FlagSet::default(),
        });
        Ok(SubcommandHandle { stamp: self.stamp, index })
    }

    /// Declares a flag in the global scope (`subcommand == None`) or in the
    /// named subcommand's scope.
    pub fn declare_flag<T: FlagType>(
        &mut self,
        name: impl Into<String>,
        default: T,
        description: impl Into<String>,
        subcommand: Option<&str>,
    ) -> Result<FlagHandle<T>> {
        let scope = match subcommand {
            None => Scope::Global,
            Some(sub) => match self.index.get(sub) {
                Some(&idx) => Scope::Subcommand(idx),
                None => return Err(self.fail(Error::SubcommandNotFound(sub.to_string()))),
            },
        };

        let default = default.into_value();
        let flag = Flag {
            name: name.into(),
            description: description.into(),
            value: default.clone(),
            default,
        };
        tracing::trace!(flag = %flag.name, ?scope, kind = ?T::KIND, "declared flag");

        let limits = self.limits;
        let res = self.flag_set_mut(scope).insert(flag, &limits);
        match res {
            Ok(index) => {
                Ok(FlagHandle { id: FlagId { stamp: self.stamp, scope, index }, ty: PhantomData })
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn flag_bool(
        &mut self,
        name: impl Into<String>,
        default: bool,
        description: impl Into<String>,
        subcommand: Option<&str>,
    ) -> Result<FlagHandle<bool>> {
        self.declare_flag(name, default, description, subcommand)
    }

    pub fn flag_u64(
        &mut self,
        name: impl Into<String>,
        default: u64,
        description: impl Into<String>,
        subcommand: Option<&str>,
    ) -> Result<FlagHandle<u64>> {
        self.declare_flag(name, default, description, subcommand)
    }

    pub fn flag_str(
        &mut self,
        name: impl Into<String>,
        default: impl Into<String>,
        description: impl Into<String>,
        subcommand: Option<&str>,
    ) -> Result<FlagHandle<String>> {
        self.declare_flag(name, default.into(), description, subcommand)
    }

    pub fn lookup_subcommand(&self, name: &str) -> Option<SubcommandHandle> {
        let index = *self.index.get(name)?;
        Some(SubcommandHandle { stamp: self.stamp, index })
    }

    pub fn lookup_flag(&self, subcommand: Option<&str>, name: &str) -> Option<FlagId> {
        let scope = match subcommand {
            None => Scope::Global,
            Some(sub) => Scope::Subcommand(*self.index.get(sub)?),
        };
        let index = self.flag_set(scope).find(name)?;
        Some(FlagId { stamp: self.stamp, scope, index })
    }

    /// # Panics
    ///
    /// If [`Registry::try_value`] would return `None`.
    pub fn value<T: FlagType>(&self, flag: FlagHandle<T>) -> &T {
        match self.try_value(flag) {
            Some(it) => it,
            None => panic!("stale flag handle, closed or from another registry: {:?}", flag.id),
        }
    }

    /// Returns `None` for handles made by another registry or before the last
    /// [`Registry::close`].
    pub fn try_value<T: FlagType>(&self, flag: FlagHandle<T>) -> Option<&T> {
        let FlagId { stamp, scope, index } = flag.id;
        if stamp != self.stamp {
            return None;
        }
        let flags = match scope {
            Scope::Global => &self.globals,
            Scope::Subcommand(idx) => &self.subcommands.get(idx)?.flags,
        };
        T::from_value(&flags.flags.get(index)?.value)
    }

    pub fn is_active(&self, subcommand: SubcommandHandle) -> bool {
        subcommand.stamp == self.stamp
            && self.subcommands.get(subcommand.index).map_or(false, |it| it.is_active)
    }

    pub fn active_subcommand(&self) -> Option<&Subcommand> {
        self.active.map(|idx| &self.subcommands[idx])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn global_flags(&self) -> &[Flag] {
        &self.globals.flags
    }

    pub fn subcommands(&self) -> &[Subcommand] {
        &self.subcommands
    }

    /// Kind of the most recent error, cleared at the start of every parse.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub(crate) fn flag_set(&self, scope: Scope) -> &FlagSet {
        match scope {
            Scope::Global => &self.globals,
            Scope::Subcommand(idx) => &self.subcommands[idx].flags,
        }
    }

    pub(crate) fn flag_set_mut(&mut self, scope: Scope) -> &mut FlagSet {
        match scope {
            Scope::Global => &mut self.globals,
            Scope::Subcommand(idx) => &mut self.subcommands[idx].flags,
        }
    }

    pub(crate) fn activate(&mut self, subcommand: SubcommandHandle) -> Scope {
        let sub = &mut self.subcommands[subcommand.index];
        sub.is_active = true;
        tracing::debug!(subcommand = %sub.name, "activated subcommand");
        self.active = Some(subcommand.index);
        Scope::Subcommand(subcommand.index)
    }

    pub(crate) fn deactivate(&mut self) {
        if let Some(idx) = self.active.take() {
            self.subcommands[idx].is_active = false;
        }
    }

    pub(crate) fn fail(&mut self, err: Error) -> Error {
        tracing::debug!(error = %err, "pennant error");
        self.last_error = Some(err.kind());
        err
    }
}
