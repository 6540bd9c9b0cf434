//! User Memory Access Validation
//!
//! Every address a process hands the kernel is untrusted. This module
//! checks addresses against the process's address-space bound (`sz`) before
//! any dereference and hands back either typed values or bounds-carrying
//! pointers.
//!
//! # Security Principles
//! - Validate ALL inputs before use
//! - Fail-secure: deny by default
//! - Prevent common vulnerabilities:
//!   - Out-of-bounds reads (every access checked against `sz`)
//!   - Integer overflow in address arithmetic (checked math)
//!   - Unterminated strings (scan stops at `sz`)
//!
//! # Model
//! User memory is the contiguous region `[0, sz)` of the process's address
//! space, reachable from the kernel at `base + addr` (the identity-map
//! premise of a small kernel). Validation is per call; nothing is cached
//! across syscalls, since `sz` can change between them.

use core::fmt;

/// Error type for user memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UaccessError {
    /// The address, or the address plus the requested size, falls outside
    /// the process's address space.
    OutOfBounds,
    /// A string had no NUL terminator before the address-space bound.
    /// Callers treat this exactly like `OutOfBounds`.
    Unterminated,
}

impl fmt::Display for UaccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "address out of bounds"),
            Self::Unterminated => write!(f, "string not terminated"),
        }
    }
}

/// A process's user address space: a kernel-reachable base pointer plus the
/// process's size bound.
///
/// All fetches go through this type so the bound check can never be
/// forgotten. Reads and writes are plain loads/stores after validation.
pub struct AddrSpace {
    base: *mut u8,
    size: u32,
}

impl AddrSpace {
    /// Wrap a process's mapped user memory.
    ///
    /// # Safety
    /// The caller must guarantee that `base..base + size` is mapped,
    /// readable and writable, and stays owned by this process for the
    /// lifetime of the `AddrSpace`.
    pub const unsafe fn from_raw(base: *mut u8, size: u32) -> Self {
        Self { base, size }
    }

    /// The address-space bound `sz`.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Fetch a 32-bit integer at `addr` in user memory.
    ///
    /// Fails with `OutOfBounds` if `addr` or `addr + 4` exceeds the
    /// address-space bound.
    pub fn fetch_int(&self, addr: u32) -> Result<i32, UaccessError> {
        let end = addr.checked_add(4).ok_or(UaccessError::OutOfBounds)?;
        if addr >= self.size || end > self.size {
            return Err(UaccessError::OutOfBounds);
        }
        // SAFETY:
        // - addr + 4 <= size, so the whole read is inside the region the
        //   from_raw contract guarantees mapped
        // - read_unaligned imposes no alignment requirement
        Ok(unsafe { self.base.add(addr as usize).cast::<i32>().read_unaligned() })
    }

    /// Fetch a NUL-terminated string starting at `addr`.
    ///
    /// Returns the string's bytes (terminator excluded) as a slice
    /// borrowing the process's own memory; nothing is copied. Fails with
    /// `OutOfBounds` if `addr` is outside the address space and
    /// `Unterminated` if no NUL appears before the bound.
    pub fn fetch_str(&self, addr: u32) -> Result<&[u8], UaccessError> {
        if addr >= self.size {
            return Err(UaccessError::OutOfBounds);
        }
        let tail_len = (self.size - addr) as usize;
        // SAFETY:
        // - addr < size, so base + addr is inside the mapped region and
        //   tail_len bytes remain before the bound
        // - the returned slice borrows self, which pins the region per the
        //   from_raw contract
        let tail = unsafe { core::slice::from_raw_parts(self.base.add(addr as usize), tail_len) };
        match tail.iter().position(|&b| b == 0) {
            Some(nul) => Ok(&tail[..nul]),
            None => Err(UaccessError::Unterminated),
        }
    }

    /// Validate a user pointer for `size` bytes starting at `addr`.
    ///
    /// `addr` arrives as the signed register value the process supplied.
    /// Fails with `OutOfBounds` if `size` is negative, if `addr` is
    /// negative or at/past the bound (even for `size == 0`), or if
    /// `addr + size` exceeds the bound.
    pub fn user_ptr(&self, addr: i32, size: i32) -> Result<UserPtr, UaccessError> {
        if size < 0 {
            return Err(UaccessError::OutOfBounds);
        }
        let addr = u32::try_from(addr).map_err(|_| UaccessError::OutOfBounds)?;
        if addr >= self.size {
            return Err(UaccessError::OutOfBounds);
        }
        let end = addr
            .checked_add(size as u32)
            .ok_or(UaccessError::OutOfBounds)?;
        if end > self.size {
            return Err(UaccessError::OutOfBounds);
        }
        // SAFETY: addr < size keeps the pointer inside the mapped region.
        let ptr = unsafe { self.base.add(addr as usize) };
        Ok(UserPtr {
            ptr,
            len: size as usize,
        })
    }
}

/// A validated pointer into user memory, good for exactly `len` bytes.
///
/// Only constructed after `AddrSpace::user_ptr` validation passes. The
/// contents may still change under a multi-threaded user process; callers
/// that must not see torn data copy first.
#[derive(Debug)]
pub struct UserPtr {
    ptr: *mut u8,
    len: usize,
}

impl UserPtr {
    /// Number of validated bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the validated range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View the validated range as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: pointer and length were validated in user_ptr against a
        // region the AddrSpace contract guarantees mapped.
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// View the validated range as a mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: same as as_bytes, and the from_raw contract includes
        // writability.
        unsafe { core::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    /// The raw pointer, for typed unaligned writes within `len` bytes.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }
}
