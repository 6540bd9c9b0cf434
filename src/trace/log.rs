//! Shared Trace Event Ring
//!
//! A fixed-capacity, overwrite-on-full log of syscall invocations, shared
//! by every process in the system.
//!
//! # Invariants
//! - `0 <= count <= capacity`
//! - `head` is the slot written next; the oldest valid entry sits at
//!   `(head + capacity - count) % capacity`
//! - appends never fail and never block except on the guard
//!
//! # Concurrency
//! One `spin::Mutex` guards the slots. Critical sections are O(1) and do
//! no allocation; `snapshot` preallocates its output buffer before taking
//! the guard. Events appear in the order their critical sections were
//! granted.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::proc::FixedName;

/// Default trace log capacity, in events.
pub const TRACE_BUF_SIZE: usize = 4096;

/// One recorded syscall invocation.
///
/// `#[repr(C)]` because `get_trace` copies these verbatim into user memory.
/// Immutable once written; a wraparound overwrites the slot in place.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Process identifier of the caller.
    pub pid: u32,
    /// Caller's command name.
    pub pname: FixedName,
    /// Name of the invoked syscall.
    pub syscall: FixedName,
    /// Return value, or the placeholder `0` for calls recorded before they
    /// execute (see `RecordWhen::Before`).
    pub retval: i32,
}

impl TraceEvent {
    /// A zeroed event, used to prefill empty slots.
    pub const fn empty() -> Self {
        Self {
            pid: 0,
            pname: FixedName::empty(),
            syscall: FixedName::empty(),
            retval: 0,
        }
    }
}

struct Slots {
    buf: Box<[TraceEvent]>,
    /// Next slot to write; wraps modulo capacity.
    head: usize,
    /// Valid entries; saturates at capacity.
    count: usize,
}

/// The shared trace log.
///
/// Construct one at boot and hand the dispatch loop a reference.
///
/// ```
/// use ktrace::trace::{TraceEvent, TraceLog};
///
/// let log = TraceLog::with_capacity(2);
/// let mut ev = TraceEvent::empty();
/// for pid in 1..=3 {
///     ev.pid = pid;
///     log.append(ev);
/// }
/// let seen: Vec<u32> = log.snapshot().iter().map(|e| e.pid).collect();
/// assert_eq!(seen, [2, 3]); // oldest entry was overwritten
/// ```
pub struct TraceLog {
    slots: Mutex<Slots>,
    capacity: usize,
}

impl TraceLog {
    /// Create a log with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(TRACE_BUF_SIZE)
    }

    /// Create a log holding up to `capacity` events.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; a ring with no slots cannot satisfy
    /// the append contract.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "trace log capacity must be non-zero");
        Self {
            slots: Mutex::new(Slots {
                buf: vec![TraceEvent::empty(); capacity].into_boxed_slice(),
                head: 0,
                count: 0,
            }),
            capacity,
        }
    }

    /// Capacity in events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.slots.lock().count
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record one event, overwriting the oldest entry if the ring is full.
    ///
    /// Never fails; the ring has no error notion of "full".
    pub fn append(&self, event: TraceEvent) {
        let mut slots = self.slots.lock();
        let head = slots.head;
        slots.buf[head] = event;
        slots.head = (head + 1) % self.capacity;
        if slots.count < self.capacity {
            slots.count += 1;
        }
    }

    /// Copy out the valid entries, oldest to newest.
    pub fn snapshot(&self) -> Vec<TraceEvent> {
        // Allocate before taking the guard; the critical section stays
        // allocation-free.
        let mut out = Vec::with_capacity(self.capacity);
        let slots = self.slots.lock();
        let oldest = (slots.head + self.capacity - slots.count) % self.capacity;
        for i in 0..slots.count {
            out.push(slots.buf[(oldest + i) % self.capacity]);
        }
        out
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(pid: u32, retval: i32) -> TraceEvent {
        TraceEvent {
            pid,
            pname: FixedName::new("proc"),
            syscall: FixedName::new("write"),
            retval,
        }
    }

    fn pids(log: &TraceLog) -> Vec<u32> {
        log.snapshot().iter().map(|e| e.pid).collect()
    }

    #[test]
    fn fills_in_order_below_capacity() {
        let log = TraceLog::with_capacity(4);
        assert!(log.is_empty());
        for pid in 1..=3 {
            log.append(ev(pid, 0));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(pids(&log), [1, 2, 3]);
    }

    #[test]
    fn wraparound_keeps_last_capacity_events() {
        let log = TraceLog::with_capacity(4);
        for pid in 1..=9 {
            log.append(ev(pid, 0));
        }
        assert_eq!(log.len(), 4);
        assert_eq!(pids(&log), [6, 7, 8, 9]);
    }

    #[test]
    fn exactly_full_is_oldest_first() {
        let log = TraceLog::with_capacity(3);
        for pid in 1..=3 {
            log.append(ev(pid, -1));
        }
        assert_eq!(pids(&log), [1, 2, 3]);
        // One more evicts exactly the oldest.
        log.append(ev(4, 0));
        assert_eq!(pids(&log), [2, 3, 4]);
    }

    #[test]
    fn default_capacity() {
        let log = TraceLog::new();
        assert_eq!(log.capacity(), TRACE_BUF_SIZE);
        assert!(log.is_empty());
    }

    #[test]
    fn events_survive_copy_out() {
        let log = TraceLog::with_capacity(2);
        log.append(ev(7, -1));
        let snap = log.snapshot();
        assert_eq!(snap[0].pid, 7);
        assert_eq!(snap[0].retval, -1);
        assert_eq!(snap[0].syscall.as_str(), "write");
    }

    #[test]
    fn concurrent_appends_lose_nothing_below_capacity() {
        use std::sync::Arc;
        use std::thread;

        const THREADS: u32 = 4;
        const PER_THREAD: u32 = 100;

        let log = Arc::new(TraceLog::with_capacity((THREADS * PER_THREAD) as usize));
        let mut handles = Vec::new();
        for t in 0..THREADS {
            let log = Arc::clone(&log);
            handles.push(thread::spawn(move || {
                for i in 0..PER_THREAD {
                    log.append(ev(t * PER_THREAD + i, 0));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let snap = log.snapshot();
        assert_eq!(snap.len(), (THREADS * PER_THREAD) as usize);
        // Every append landed exactly once.
        let mut seen: Vec<u32> = snap.iter().map(|e| e.pid).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..THREADS * PER_THREAD).collect::<Vec<_>>());
    }

    #[test]
    fn concurrent_appends_saturate_at_capacity() {
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(TraceLog::with_capacity(16));
        let mut handles = Vec::new();
        for t in 0..4u32 {
            let log = Arc::clone(&log);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    log.append(ev(t * 50 + i, 0));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 16);
        assert_eq!(log.snapshot().len(), 16);
    }
}
