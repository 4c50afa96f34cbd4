/// Filesystem helpers: corpus discovery and atomic artifact writes.
pub mod fs;
