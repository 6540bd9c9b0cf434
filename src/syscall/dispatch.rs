//! Syscall Dispatch Loop
//!
//! One pass per trap: identify the call, run the handler, and record the
//! invocation in the shared log when the caller's filter policy says so.
//!
//! # Flow
//! ```text
//! trap frame ──> lookup ──┬─ unknown ──> warn line, sentinel, log untouched
//!                         │
//!                         └─ known ─┬─ record-after: handler, policy(real
//!                                   │   result), append
//!                                   └─ record-before: policy(placeholder),
//!                                       append, handler
//! ```
//! In every case the handler's real return value lands in the caller's
//! trap frame; recording never changes call semantics.

use log::{debug, info, warn};

use crate::proc::{FixedName, Process};
use crate::trace::{TraceEvent, TraceLog};

use super::registry::{Handler, RecordWhen, SyscallId, SyscallTable};
use super::{SyscallCtx, SYSCALL_ERR};

/// Return value recorded for calls traced before they execute.
///
/// A stand-in, not the real result: `exit` has none and `sbrk` invalidates
/// the address-space bound the recorder would need. The filter policy is
/// evaluated against this same value, so `fail_only` suppresses
/// record-before calls unconditionally.
pub const PLACEHOLDER_RET: i32 = 0;

/// Dispatch the syscall identified by the process's trap frame.
///
/// Writes the result into `proc.tf.ret` and returns it. Unknown numbers
/// (0, out of range, or unregistered) get a console diagnostic and the
/// error sentinel; the trace log is never touched for them.
pub fn dispatch(proc: &mut Process, table: &SyscallTable, log: &TraceLog) -> i32 {
    let num = proc.tf.num;
    let Some((id, handler)) = table.lookup(num) else {
        warn!("{} {}: unknown sys call {}", proc.pid(), proc.name(), num);
        proc.tf.ret = SYSCALL_ERR;
        return SYSCALL_ERR;
    };

    let ret = match id.record_when() {
        RecordWhen::Before => {
            if proc.trace.should_record(id, PLACEHOLDER_RET) {
                record(log, proc, id, PLACEHOLDER_RET, RecordWhen::Before);
            }
            run(proc, log, id, handler)
        }
        RecordWhen::After => {
            let ret = run(proc, log, id, handler);
            if proc.trace.should_record(id, ret) {
                record(log, proc, id, ret, RecordWhen::After);
            }
            ret
        }
    };

    proc.tf.ret = ret;
    ret
}

/// Run one handler, flattening internal errors into the sentinel.
fn run(proc: &mut Process, log: &TraceLog, id: SyscallId, handler: Handler) -> i32 {
    let mut ctx = SyscallCtx { proc, log };
    match handler(&mut ctx) {
        Ok(ret) => ret,
        Err(e) => {
            debug!("pid {}: {} failed: {}", ctx.proc.pid(), id.name(), e);
            SYSCALL_ERR
        }
    }
}

/// Append one event and emit its console line.
fn record(log: &TraceLog, proc: &Process, id: SyscallId, retval: i32, when: RecordWhen) {
    match when {
        RecordWhen::After => info!(
            "TRACE: pid = {} | command_name = {} | syscall = {} | return value = {}",
            proc.pid(),
            proc.name(),
            id.name(),
            retval
        ),
        // The call has not executed yet; there is no return value to show.
        RecordWhen::Before => info!(
            "TRACE: pid = {} | command_name = {} | syscall = {}",
            proc.pid(),
            proc.name(),
            id.name()
        ),
    }
    log.append(TraceEvent {
        pid: proc.pid(),
        pname: *proc.name(),
        syscall: FixedName::new(id.name()),
        retval,
    });
}
