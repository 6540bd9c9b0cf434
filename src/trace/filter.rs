//! Per-Process Trace Filter Policy
//!
//! Decides, per completed invocation, whether the dispatch loop records a
//! trace event. Conditions apply in a fixed order and short-circuit at the
//! first suppressing one:
//!
//! 1. tracing disabled -> suppress
//! 2. name filter active and the call's name differs -> suppress
//! 3. fail-only active and the call succeeded -> suppress
//! 4. success-only active and the call failed -> suppress
//! 5. otherwise -> record
//!
//! The policy never alters the call's own result; suppression only skips
//! the recording step.
//!
//! # Interning
//! The user-visible contract is a name string, but the filter resolves the
//! name to a `SyscallId` when it is set, so the per-call check is a tag
//! compare. The byte compare only remains for filter names that match no
//! known syscall; those suppress every call.

use bitflags::bitflags;

use crate::proc::FixedName;
use crate::syscall::registry::SyscallId;
use crate::syscall::SYSCALL_ERR;

bitflags! {
    /// Per-process trace configuration word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TraceFlags: u8 {
        /// Tracing is on for this process.
        const ENABLED = 1 << 0;
        /// A name filter is active.
        const FILTER = 1 << 1;
        /// Record only calls that succeeded.
        const SUCCESS_ONLY = 1 << 2;
        /// Record only calls that failed.
        const FAIL_ONLY = 1 << 3;
    }
}

/// Trace configuration owned by one process.
///
/// Initialized disabled at process creation; mutated only by the process's
/// own trace-control syscalls; destroyed with the process. `SUCCESS_ONLY`
/// and `FAIL_ONLY` are not mutually exclusive by construction - with both
/// set, steps 3 and 4 together suppress everything.
#[derive(Debug, Clone, Copy)]
pub struct TraceState {
    flags: TraceFlags,
    filter_name: FixedName,
    filter_id: Option<SyscallId>,
}

impl TraceState {
    /// Fresh state: tracing off, no filters.
    pub const fn new() -> Self {
        Self {
            flags: TraceFlags::empty(),
            filter_name: FixedName::empty(),
            filter_id: None,
        }
    }

    /// Current flag word.
    pub fn flags(&self) -> TraceFlags {
        self.flags
    }

    /// Whether tracing is on.
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(TraceFlags::ENABLED)
    }

    /// Turn tracing on or off. Filters are left in place.
    pub fn set_enabled(&mut self, on: bool) {
        self.flags.set(TraceFlags::ENABLED, on);
    }

    /// Restrict recording to calls named `name`.
    ///
    /// The name is interned to a syscall tag here; a name that is no known
    /// syscall still installs the filter and then matches nothing.
    pub fn set_filter(&mut self, name: FixedName) {
        self.flags.insert(TraceFlags::FILTER);
        self.filter_id = SyscallId::from_name(name.as_bytes());
        self.filter_name = name;
    }

    /// The active name filter, if any.
    pub fn filter_name(&self) -> Option<&FixedName> {
        self.flags
            .contains(TraceFlags::FILTER)
            .then_some(&self.filter_name)
    }

    /// Record only successful calls from now on.
    pub fn set_success_only(&mut self) {
        self.flags.insert(TraceFlags::SUCCESS_ONLY);
    }

    /// Record only failed calls from now on.
    pub fn set_fail_only(&mut self) {
        self.flags.insert(TraceFlags::FAIL_ONLY);
    }

    /// Apply the filter chain to one invocation.
    ///
    /// `retval` is the value that will be recorded: the real result for
    /// calls recorded after execution, the placeholder for calls recorded
    /// before it. Failure means the error sentinel `-1`; anything else
    /// counts as success.
    pub fn should_record(&self, call: SyscallId, retval: i32) -> bool {
        if !self.flags.contains(TraceFlags::ENABLED) {
            return false;
        }
        if self.flags.contains(TraceFlags::FILTER) {
            let matched = match self.filter_id {
                Some(id) => id == call,
                None => self.filter_name.as_bytes() == call.name().as_bytes(),
            };
            if !matched {
                return false;
            }
        }
        if self.flags.contains(TraceFlags::FAIL_ONLY) && retval != SYSCALL_ERR {
            return false;
        }
        if self.flags.contains(TraceFlags::SUCCESS_ONLY) && retval == SYSCALL_ERR {
            return false;
        }
        true
    }
}

impl Default for TraceState {
    fn default() -> Self {
        Self::new()
    }
}
