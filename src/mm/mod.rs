//! Memory access module for the syscall path
//!
//! Provides:
//! - Bounds-checked access to user memory (`uaccess`)
//!
//! Page tables, frame allocation, and the kernel heap belong to the
//! embedding kernel; this subsystem only needs a process's address-space
//! bound and a way to read and write within it.
//!
//! # Security Principles
//! - All user addresses are validated before dereference
//! - Unsafe code is minimal and audited

pub mod uaccess;

pub use uaccess::{AddrSpace, UaccessError, UserPtr};
