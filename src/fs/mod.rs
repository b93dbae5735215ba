//! Filesystem utilities for sprintctl.
//!
//! Store documents and configuration scaffolding are written through
//! [`atomic_write`] so readers never observe a half-written file.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
