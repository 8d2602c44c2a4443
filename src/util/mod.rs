//! Filesystem helpers shared by the engines and tools.

pub mod atomic;
pub mod fs;
