//! Syscall Registry
//!
//! The dense table mapping syscall numbers to handlers, and the enumerated
//! identifier type that keeps numbers, names, and recording behavior in
//! lock-step.
//!
//! # Design
//! Identifiers are a fieldless enum rather than bare integers, so the name
//! table cannot drift out of sync with the id space: `name()` is an
//! exhaustive match, and a populated handler without a name is
//! unrepresentable. The table itself is built once at boot, checked with
//! [`SyscallTable::validate`], and read-only afterwards - it needs no
//! synchronization.

use super::{SyscallCtx, SyscallError};

/// Size of the dispatch table. Ids `1..NSYSCALL` are valid; slot 0 is
/// reserved and never populated.
pub const NSYSCALL: usize = 32;

/// A syscall handler.
///
/// Handlers marshal their own arguments through the [`SyscallCtx`] and
/// propagate marshaling failures with `?`; the dispatch loop flattens
/// `Err` into the `-1` sentinel.
pub type Handler = fn(&mut SyscallCtx<'_>) -> Result<i32, SyscallError>;

/// When the dispatch loop records an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordWhen {
    /// Record before the handler runs, with a placeholder return value of
    /// `0`. Used for calls after which the caller's state may not be
    /// inspectable: `exit` never returns, `sbrk` resizes the address space
    /// out from under the recorded bound. The real result still reaches
    /// the caller; only the logged value is approximate.
    Before,
    /// Record after the handler returns, with the real return value.
    After,
}

/// The enumerated syscall identifiers.
///
/// Numbering follows the xv6 table, with the trace-control calls appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SyscallId {
    Fork = 1,
    Exit = 2,
    Wait = 3,
    Pipe = 4,
    Read = 5,
    Kill = 6,
    Exec = 7,
    Fstat = 8,
    Chdir = 9,
    Dup = 10,
    Getpid = 11,
    Sbrk = 12,
    Sleep = 13,
    Uptime = 14,
    Open = 15,
    Write = 16,
    Mknod = 17,
    Unlink = 18,
    Link = 19,
    Mkdir = 20,
    Close = 21,
    Nice = 22,
    SetPriority = 23,
    Lock = 24,
    Release = 25,
    Trace = 26,
    GetTrace = 27,
    TraceFilter = 28,
    TraceOnlySuccess = 29,
    TraceOnlyFail = 30,
}

impl SyscallId {
    /// Every identifier, for table validation and name interning.
    pub const ALL: [SyscallId; 30] = [
        Self::Fork,
        Self::Exit,
        Self::Wait,
        Self::Pipe,
        Self::Read,
        Self::Kill,
        Self::Exec,
        Self::Fstat,
        Self::Chdir,
        Self::Dup,
        Self::Getpid,
        Self::Sbrk,
        Self::Sleep,
        Self::Uptime,
        Self::Open,
        Self::Write,
        Self::Mknod,
        Self::Unlink,
        Self::Link,
        Self::Mkdir,
        Self::Close,
        Self::Nice,
        Self::SetPriority,
        Self::Lock,
        Self::Release,
        Self::Trace,
        Self::GetTrace,
        Self::TraceFilter,
        Self::TraceOnlySuccess,
        Self::TraceOnlyFail,
    ];

    /// Decode a raw syscall number. `0` and out-of-range numbers are `None`.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Fork),
            2 => Some(Self::Exit),
            3 => Some(Self::Wait),
            4 => Some(Self::Pipe),
            5 => Some(Self::Read),
            6 => Some(Self::Kill),
            7 => Some(Self::Exec),
            8 => Some(Self::Fstat),
            9 => Some(Self::Chdir),
            10 => Some(Self::Dup),
            11 => Some(Self::Getpid),
            12 => Some(Self::Sbrk),
            13 => Some(Self::Sleep),
            14 => Some(Self::Uptime),
            15 => Some(Self::Open),
            16 => Some(Self::Write),
            17 => Some(Self::Mknod),
            18 => Some(Self::Unlink),
            19 => Some(Self::Link),
            20 => Some(Self::Mkdir),
            21 => Some(Self::Close),
            22 => Some(Self::Nice),
            23 => Some(Self::SetPriority),
            24 => Some(Self::Lock),
            25 => Some(Self::Release),
            26 => Some(Self::Trace),
            27 => Some(Self::GetTrace),
            28 => Some(Self::TraceFilter),
            29 => Some(Self::TraceOnlySuccess),
            30 => Some(Self::TraceOnlyFail),
            _ => None,
        }
    }

    /// Look up an identifier by its display name (exact match).
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name().as_bytes() == name)
    }

    /// The raw table index.
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Display name, in lock-step with the id by construction.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fork => "fork",
            Self::Exit => "exit",
            Self::Wait => "wait",
            Self::Pipe => "pipe",
            Self::Read => "read",
            Self::Kill => "kill",
            Self::Exec => "exec",
            Self::Fstat => "fstat",
            Self::Chdir => "chdir",
            Self::Dup => "dup",
            Self::Getpid => "getpid",
            Self::Sbrk => "sbrk",
            Self::Sleep => "sleep",
            Self::Uptime => "uptime",
            Self::Open => "open",
            Self::Write => "write",
            Self::Mknod => "mknod",
            Self::Unlink => "unlink",
            Self::Link => "link",
            Self::Mkdir => "mkdir",
            Self::Close => "close",
            Self::Nice => "nice",
            Self::SetPriority => "set_priority",
            Self::Lock => "lock",
            Self::Release => "release",
            Self::Trace => "trace",
            Self::GetTrace => "get_trace",
            Self::TraceFilter => "tracefilter",
            Self::TraceOnlySuccess => "traceonlysuccess",
            Self::TraceOnlyFail => "traceonlyfail",
        }
    }

    /// Whether this call is recorded before or after it executes.
    pub const fn record_when(self) -> RecordWhen {
        match self {
            Self::Exit | Self::Sbrk => RecordWhen::Before,
            _ => RecordWhen::After,
        }
    }
}

/// The dispatch table.
///
/// Built at boot: [`handler::install`](super::handler::install) registers
/// the trace-control handlers, the kernel registers the rest, and
/// [`validate`](Self::validate) confirms nothing was forgotten before the
/// first process runs.
pub struct SyscallTable {
    handlers: [Option<Handler>; NSYSCALL],
}

impl SyscallTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            handlers: [None; NSYSCALL],
        }
    }

    /// Register (or replace) the handler for `id`.
    pub fn register(&mut self, id: SyscallId, handler: Handler) {
        self.handlers[id.as_raw() as usize] = Some(handler);
    }

    /// Resolve a raw syscall number to its identifier and handler.
    ///
    /// `None` for id 0, out-of-range ids, and unpopulated slots alike.
    pub fn lookup(&self, raw: u32) -> Option<(SyscallId, Handler)> {
        let id = SyscallId::from_raw(raw)?;
        self.handlers[id.as_raw() as usize].map(|h| (id, h))
    }

    /// Startup completeness check: every enumerated id must have a
    /// handler. Returns the first id without one.
    pub fn validate(&self) -> Result<(), SyscallId> {
        for id in SyscallId::ALL {
            if self.handlers[id.as_raw() as usize].is_none() {
                return Err(id);
            }
        }
        Ok(())
    }
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self::new()
    }
}
