//! System Call Interface
//!
//! Marshals untrusted arguments, dispatches to the registered handler, and
//! optionally records the invocation in the shared trace log.
//!
//! # Security Model
//! - Whitelist approach: only registered syscall numbers are dispatched
//! - All parameters are validated against the caller's address space
//! - Invalid inputs return the error sentinel, never panic
//!
//! # Built-in Syscalls
//! The trace-control calls are implemented here and registered by
//! [`handler::install`]:
//! - `trace(enable)` - turn tracing on or off for the calling process
//! - `tracefilter(name)` - record only calls with this name
//! - `traceonlysuccess()` / `traceonlyfail()` - record only by outcome
//! - `get_trace(buf, max)` - copy the shared log out to user space
//!
//! Everything else in the table (file I/O, process control, memory) is a
//! collaborator the embedding kernel registers at boot.

pub mod arg;
pub mod dispatch;
pub mod handler;
pub mod registry;

pub use arg::SyscallCtx;
pub use dispatch::dispatch;
pub use registry::{Handler, RecordWhen, SyscallId, SyscallTable, NSYSCALL};

use core::fmt;

use crate::mm::uaccess::UaccessError;

/// The error sentinel every failing syscall returns to user space.
pub const SYSCALL_ERR: i32 = -1;

/// Error type handlers propagate internally.
///
/// Nothing here crosses the syscall boundary as anything other than the
/// [`SYSCALL_ERR`] sentinel; the variants exist so the dispatch loop can
/// log what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallError {
    /// An address failed validation against the caller's address space.
    BadAddress,
    /// An argument was semantically invalid for the call.
    InvalidArgument,
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadAddress => write!(f, "bad address"),
            Self::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

impl From<UaccessError> for SyscallError {
    /// Unterminated strings are treated exactly like out-of-bounds
    /// addresses: the handler fails closed.
    fn from(_: UaccessError) -> Self {
        Self::BadAddress
    }
}
