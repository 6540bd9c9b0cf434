//! ktrace - Syscall Dispatch and Tracing Subsystem
//!
//! The syscall path of a small Unix-like kernel: argument marshaling from
//! untrusted user memory, handler dispatch through a dense registry, and an
//! optional audit trail of invocations in a shared ring buffer, filterable
//! per process by call name and outcome.
//!
//! # Architecture
//! - `mm::uaccess` - bounds-checked access to a process's address space
//! - `proc` - the slice of the process control structure this path touches
//! - `syscall` - registry, argument marshaling, dispatch loop, and the
//!   trace-control syscalls
//! - `trace` - per-process filter policy and the shared trace log
//!
//! # Security Model
//! - All user-supplied addresses are validated against the process's
//!   address-space bound before any dereference
//! - Unknown syscall numbers are rejected with the error sentinel, never a
//!   panic; nothing in this path is fatal to the kernel
//! - Marshaling failures surface as the ordinary `-1` return value of the
//!   offending call; handlers check and propagate
//!
//! # Integration
//! The embedding kernel builds a [`syscall::SyscallTable`] at boot,
//! registers its file/process/memory handlers alongside the built-in
//! trace-control handlers, checks it with
//! [`validate`](syscall::SyscallTable::validate), constructs one
//! [`trace::TraceLog`], and calls [`syscall::dispatch()`] from its trap
//! handler. Console diagnostics go through the `log` facade; the kernel
//! installs its console-backed logger.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod mm;
pub mod proc;
pub mod syscall;
pub mod trace;
