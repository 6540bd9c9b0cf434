//! Syscall Tracing
//!
//! An audit trail of syscall invocations, inspired by strace but living in
//! the kernel:
//! - `log` - the shared, fixed-capacity trace event ring
//! - `filter` - the per-process policy deciding what gets recorded
//!
//! # Design
//! - One `TraceLog` per kernel, constructed at boot and injected into the
//!   dispatch loop; the ring overwrites its oldest entry when full, so a
//!   noisy process can only evict history, never leak resources
//! - Filter state is per process and dies with the process
//!
//! # Concurrency
//! The log is the only shared mutable state on the syscall path. Appends
//! and snapshots hold one spinlock for O(1), allocation-free critical
//! sections.

pub mod filter;
pub mod log;

pub use filter::{TraceFlags, TraceState};
pub use log::{TraceEvent, TraceLog, TRACE_BUF_SIZE};
