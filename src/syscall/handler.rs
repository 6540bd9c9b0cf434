//! Trace-Control Syscall Handlers
//!
//! The five syscalls that configure tracing for the calling process and
//! read the shared log back out. They are ordinary registry entries,
//! dispatched (and themselves traceable) like any other call.

use core::mem::size_of;

use crate::proc::FixedName;
use crate::trace::TraceEvent;

use super::registry::{SyscallId, SyscallTable};
use super::{SyscallCtx, SyscallError};

/// Register the built-in trace-control handlers.
///
/// The embedding kernel calls this while building its table at boot, then
/// registers everything else and runs
/// [`validate`](SyscallTable::validate).
pub fn install(table: &mut SyscallTable) {
    table.register(SyscallId::Trace, sys_trace);
    table.register(SyscallId::TraceFilter, sys_tracefilter);
    table.register(SyscallId::TraceOnlySuccess, sys_traceonlysuccess);
    table.register(SyscallId::TraceOnlyFail, sys_traceonlyfail);
    table.register(SyscallId::GetTrace, sys_get_trace);
}

/// `trace(enable)` - turn tracing on or off for the calling process.
pub fn sys_trace(ctx: &mut SyscallCtx<'_>) -> Result<i32, SyscallError> {
    let enable = ctx.arg_int(0)?;
    ctx.proc.trace.set_enabled(enable != 0);
    Ok(0)
}

/// `tracefilter(name)` - record only calls whose name matches exactly.
///
/// Names longer than the fixed storage are truncated silently, after which
/// they can no longer match any real syscall.
pub fn sys_tracefilter(ctx: &mut SyscallCtx<'_>) -> Result<i32, SyscallError> {
    let name = FixedName::from_bytes(ctx.arg_str(0)?);
    ctx.proc.trace.set_filter(name);
    Ok(0)
}

/// `traceonlysuccess()` - record only calls that succeed.
pub fn sys_traceonlysuccess(ctx: &mut SyscallCtx<'_>) -> Result<i32, SyscallError> {
    ctx.proc.trace.set_success_only();
    Ok(0)
}

/// `traceonlyfail()` - record only calls that fail.
pub fn sys_traceonlyfail(ctx: &mut SyscallCtx<'_>) -> Result<i32, SyscallError> {
    ctx.proc.trace.set_fail_only();
    Ok(0)
}

/// `get_trace(buf, max)` - copy the shared log into user memory.
///
/// Copies up to `max` events, oldest first, into `buf` and returns the
/// count copied. The whole `max * sizeof(TraceEvent)` range is validated
/// up front; a short buffer fails closed with the sentinel. The history is
/// global - no per-process filtering is applied to what comes back.
pub fn sys_get_trace(ctx: &mut SyscallCtx<'_>) -> Result<i32, SyscallError> {
    let max = ctx.arg_int(1)?;
    let size = i32::try_from(i64::from(max) * size_of::<TraceEvent>() as i64)
        .map_err(|_| SyscallError::BadAddress)?;
    let mut dst = ctx.arg_ptr(0, size)?;

    // arg_ptr rejected negative sizes, so max >= 0 here.
    let events = ctx.log.snapshot();
    let n = events.len().min(max as usize);
    let base = dst.as_mut_ptr().cast::<TraceEvent>();
    for (i, ev) in events.iter().take(n).enumerate() {
        // SAFETY: dst was validated for max * sizeof(TraceEvent) bytes and
        // i < n <= max; write_unaligned has no alignment requirement.
        unsafe { base.add(i).write_unaligned(*ev) };
    }
    Ok(n as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::uaccess::AddrSpace;
    use crate::proc::Process;
    use crate::trace::filter::TraceFlags;
    use crate::trace::TraceLog;

    fn put_int(mem: &mut [u8], addr: usize, v: i32) {
        mem[addr..addr + 4].copy_from_slice(&v.to_ne_bytes());
    }

    fn proc_over(mem: &mut [u8]) -> Process {
        // SAFETY: the Vec backing `mem` outlives the Process in every test.
        let space = unsafe { AddrSpace::from_raw(mem.as_mut_ptr(), mem.len() as u32) };
        Process::new(1, "test", space)
    }

    #[test]
    fn trace_toggles_the_flag() {
        let mut mem = vec![0u8; 64];
        put_int(&mut mem, 4, 1);
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(4);
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_trace(&mut ctx), Ok(0));
        assert!(ctx.proc.trace.is_enabled());

        // Point the stack at a zeroed word: trace(0) turns it back off.
        ctx.proc.tf.sp = 16;
        assert_eq!(sys_trace(&mut ctx), Ok(0));
        assert!(!ctx.proc.trace.is_enabled());
    }

    #[test]
    fn tracefilter_interns_the_name() {
        let mut mem = vec![0u8; 64];
        put_int(&mut mem, 4, 32);
        mem[32..37].copy_from_slice(b"open\0");
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(4);
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_tracefilter(&mut ctx), Ok(0));
        assert_eq!(ctx.proc.trace.filter_name().unwrap().as_str(), "open");
        assert!(ctx.proc.trace.flags().contains(TraceFlags::FILTER));
    }

    #[test]
    fn tracefilter_propagates_bad_pointers() {
        let mut mem = vec![0u8; 64];
        put_int(&mut mem, 4, 1000);
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(4);
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_tracefilter(&mut ctx), Err(SyscallError::BadAddress));
        assert!(ctx.proc.trace.filter_name().is_none());
    }

    #[test]
    fn outcome_filters_set_their_flags() {
        let mut mem = vec![0u8; 64];
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(4);
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_traceonlysuccess(&mut ctx), Ok(0));
        assert_eq!(sys_traceonlyfail(&mut ctx), Ok(0));
        let flags = ctx.proc.trace.flags();
        assert!(flags.contains(TraceFlags::SUCCESS_ONLY));
        assert!(flags.contains(TraceFlags::FAIL_ONLY));
    }

    #[test]
    fn get_trace_copies_oldest_first() {
        let mut mem = vec![0u8; 1024];
        put_int(&mut mem, 4, 256); // buf
        put_int(&mut mem, 8, 8); // max
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(2);
        for pid in 1..=3u32 {
            log.append(TraceEvent {
                pid,
                pname: FixedName::new("proc"),
                syscall: FixedName::new("open"),
                retval: pid as i32,
            });
        }
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_get_trace(&mut ctx), Ok(2));
        drop(ctx);
        drop(p);
        for (i, want_pid) in [2u32, 3u32].iter().enumerate() {
            let at = 256 + i * size_of::<TraceEvent>();
            // SAFETY: within the test buffer, written just above.
            let got = unsafe {
                mem.as_ptr()
                    .add(at)
                    .cast::<TraceEvent>()
                    .read_unaligned()
            };
            assert_eq!(got.pid, *want_pid);
            assert_eq!(got.syscall.as_str(), "open");
        }
    }

    #[test]
    fn get_trace_fails_closed_on_short_buffer() {
        let mut mem = vec![0u8; 128];
        put_int(&mut mem, 4, 64); // buf: only 64 bytes remain
        put_int(&mut mem, 8, 4); // max: needs 4 * 40 bytes
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(4);
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_get_trace(&mut ctx), Err(SyscallError::BadAddress));
    }

    #[test]
    fn get_trace_rejects_negative_max() {
        let mut mem = vec![0u8; 128];
        put_int(&mut mem, 4, 64);
        put_int(&mut mem, 8, -1);
        let mut p = proc_over(&mut mem);
        let log = TraceLog::with_capacity(4);
        let mut ctx = SyscallCtx {
            proc: &mut p,
            log: &log,
        };
        assert_eq!(sys_get_trace(&mut ctx), Err(SyscallError::BadAddress));
    }

    #[test]
    fn install_registers_all_five() {
        let mut table = SyscallTable::new();
        install(&mut table);
        for id in [
            SyscallId::Trace,
            SyscallId::TraceFilter,
            SyscallId::TraceOnlySuccess,
            SyscallId::TraceOnlyFail,
            SyscallId::GetTrace,
        ] {
            assert!(table.lookup(id.as_raw()).is_some(), "{:?}", id);
        }
    }
}
