//! Native Win32 directory enumeration (spec.md section 4.1).

mod dir_iter;

pub use dir_iter::{NativeDirIter, RawChild};
