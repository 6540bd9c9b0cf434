//! Process-Side State for the Syscall Path
//!
//! The kernel proper owns the full process control structure; this module
//! defines the slice of it the syscall path reads and writes: the saved
//! trap frame, the process's address-space bound, and the per-process
//! trace configuration.
//!
//! # Ownership
//! A `Process` is owned by exactly one execution context at a time (the
//! trap model is single-threaded per process), so none of this state needs
//! cross-process synchronization. The shared trace log lives elsewhere
//! (`trace::TraceLog`).

use core::fmt;

use crate::mm::uaccess::AddrSpace;
use crate::trace::filter::TraceState;

/// Fixed storage for process and syscall names, NUL-padded.
pub const NAME_LEN: usize = 16;

/// A fixed-length, zero-padded name.
///
/// Used for process names, syscall names in trace events, and the trace
/// filter pattern. Constructors truncate to `NAME_LEN - 1` bytes so a NUL
/// terminator always fits; over-long names are truncated silently, never
/// rejected.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct FixedName([u8; NAME_LEN]);

impl FixedName {
    /// The empty name.
    pub const fn empty() -> Self {
        Self([0; NAME_LEN])
    }

    /// Build a name from a string slice, truncating if necessary.
    pub fn new(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Build a name from raw bytes, truncating to `NAME_LEN - 1` bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = [0u8; NAME_LEN];
        let n = bytes.len().min(NAME_LEN - 1);
        buf[..n].copy_from_slice(&bytes[..n]);
        Self(buf)
    }

    /// The name's bytes, up to the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.0[..end]
    }

    /// The name as a string slice, or `"?"` if it is not valid UTF-8.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("?")
    }

    /// Whether the name is empty.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl fmt::Display for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl Default for FixedName {
    fn default() -> Self {
        Self::empty()
    }
}

/// The saved user register state the syscall path touches.
///
/// Arguments follow the 32-bit stack convention: the n-th argument lives at
/// `sp + 4 + 4*n` in user memory (the first word above `sp` is the return
/// address pushed by the call).
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapFrame {
    /// Syscall number register.
    pub num: u32,
    /// User stack pointer at trap time.
    pub sp: u32,
    /// Return value register, written back by the dispatch loop.
    pub ret: i32,
}

impl TrapFrame {
    /// A zeroed trap frame.
    pub const fn new() -> Self {
        Self { num: 0, sp: 0, ret: 0 }
    }
}

/// The per-process state consumed by the syscall path.
///
/// Trace configuration starts disabled and is only ever mutated by the
/// process's own trace-control syscalls; it dies with the process.
pub struct Process {
    pid: u32,
    name: FixedName,
    space: AddrSpace,
    /// Saved user registers for the in-flight trap.
    pub tf: TrapFrame,
    /// Trace configuration, mutated by the trace-control syscalls.
    pub trace: TraceState,
}

impl Process {
    /// Create process-side syscall state with tracing disabled.
    pub fn new(pid: u32, name: &str, space: AddrSpace) -> Self {
        Self {
            pid,
            name: FixedName::new(name),
            space,
            tf: TrapFrame::new(),
            trace: TraceState::new(),
        }
    }

    /// Process identifier.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Process name (the command name, xv6-style).
    pub fn name(&self) -> &FixedName {
        &self.name
    }

    /// The process's address space, for argument marshaling.
    pub fn space(&self) -> &AddrSpace {
        &self.space
    }
}
