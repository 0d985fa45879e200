//! Parallel recursive directory walker for Windows that extracts owner
//! principals and DACLs alongside each entry (spec.md section 1).

#[cfg(not(windows))]
compile_error!("ntacl_walk only builds for Windows targets (NTFS/Win32 security semantics)");

#[cfg(all(windows, feature = "mimalloc"))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod cancellation;
mod entry;
mod error;
mod native;
mod options;
mod security;
mod stream;
mod walker;

pub use cancellation::CancellationToken;
pub use entry::{EntryKind, FileSystemEntry, SearchFor};
pub use error::{EntryError, Result, WalkError};
pub use native::{NativeDirIter, RawChild};
pub use options::{Options, OptionsBuilder};
pub use security::{SecurityResolver, SidCache};
pub use stream::{EntryStream, PathStream};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walker::Walker;

/// Walks `root_path` and returns a stream of fully-resolved
/// [`FileSystemEntry`] records — owner principal and DACL included
/// (spec.md section 6).
///
/// # Errors
/// Returns [`WalkError`] if `root_path` is empty or is not an existing
/// directory. Per-entry failures never surface here; they're carried inline
/// as [`FileSystemEntry::error`].
pub fn enumerate(root_path: impl AsRef<Path>, options: Options) -> Result<EntryStream> {
    let root = validate_root(root_path.as_ref())?;
    let options = Arc::new(options);
    let resolver = Arc::new(SecurityResolver::new());
    let cancellation = options.cancellation().clone();
    let receiver = Walker::new(Arc::clone(&options), resolver).spawn(root, true);
    Ok(EntryStream::new(receiver, cancellation))
}

/// Lightweight variant of [`enumerate`] that skips security resolution
/// entirely and yields just the visited paths (spec.md section 6).
///
/// # Errors
/// Same as [`enumerate`].
pub fn enumerate_paths(root_path: impl AsRef<Path>, options: Options) -> Result<PathStream> {
    let root = validate_root(root_path.as_ref())?;
    let options = Arc::new(options);
    let resolver = Arc::new(SecurityResolver::new());
    let cancellation = options.cancellation().clone();
    let receiver = Walker::new(Arc::clone(&options), resolver).spawn(root, false);
    Ok(PathStream::new(EntryStream::new(receiver, cancellation)))
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    let text = root.to_string_lossy();
    if text.trim().is_empty() {
        return Err(WalkError::EmptyRoot);
    }
    let metadata = std::fs::symlink_metadata(root).map_err(|_| WalkError::RootNotFound(text.into_owned()))?;
    if !metadata.is_dir() {
        return Err(WalkError::RootNotADirectory(root.to_string_lossy().into_owned()));
    }
    Ok(root.to_path_buf())
}
