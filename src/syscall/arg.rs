//! Syscall Argument Marshaling
//!
//! The context handed to every handler: the calling process plus the shared
//! trace log, with accessors that fetch the n-th argument from the caller's
//! user stack and validate it against the caller's address space.
//!
//! Arguments are revalidated on every call - nothing is cached across
//! syscalls, since the address space can change between them.

use crate::mm::uaccess::{UaccessError, UserPtr};
use crate::proc::Process;
use crate::trace::TraceLog;

/// Per-invocation handler context.
pub struct SyscallCtx<'a> {
    /// The calling process.
    pub proc: &'a mut Process,
    /// The shared trace log, for the trace-control syscalls.
    pub log: &'a TraceLog,
}

impl SyscallCtx<'_> {
    /// Fetch the n-th 32-bit syscall argument.
    ///
    /// The n-th argument lives at `sp + 4 + 4*n` on the caller's stack.
    pub fn arg_int(&self, n: usize) -> Result<i32, UaccessError> {
        let addr = (n as u32)
            .checked_mul(4)
            .and_then(|off| off.checked_add(4))
            .and_then(|off| self.proc.tf.sp.checked_add(off))
            .ok_or(UaccessError::OutOfBounds)?;
        self.proc.space().fetch_int(addr)
    }

    /// Fetch the n-th argument as a pointer valid for `size` bytes.
    ///
    /// Fails if `size` is negative or the range escapes the caller's
    /// address space.
    pub fn arg_ptr(&self, n: usize, size: i32) -> Result<UserPtr, UaccessError> {
        let addr = self.arg_int(n)?;
        self.proc.space().user_ptr(addr, size)
    }

    /// Fetch the n-th argument as a NUL-terminated string.
    ///
    /// Returns the bytes before the terminator, borrowing the caller's own
    /// memory.
    pub fn arg_str(&self, n: usize) -> Result<&[u8], UaccessError> {
        let addr = self.arg_int(n)?;
        let addr = u32::try_from(addr).map_err(|_| UaccessError::OutOfBounds)?;
        self.proc.space().fetch_str(addr)
    }
}
