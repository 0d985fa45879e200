//! Win32 find-handle state machine, wrapped as a scoped, single-use iterator
//! (spec.md section 4.1).
//!
//! Grounded on the pack's Windows traversal reference
//! (`examples/other_examples/277f012d_fukasawah-disk-usage-analyzer-cli__src-services-traverse-windows.rs.rs`'s
//! `SearchHandle` / `traverse_directory`): the same `FindFirstFileExW`
//! large-fetch call and `Drop`-closed handle, reshaped into an `Iterator`
//! instead of a recursive callback so the caller never sees the handle.

use std::ffi::OsString;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

use tracing::debug;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::Storage::FileSystem::{
    FindClose, FindExInfoBasic, FindExSearchNameMatch, FindFirstFileExW, FindNextFileW,
    FIND_FIRST_EX_LARGE_FETCH, WIN32_FIND_DATAW,
};

/// One raw child record, exactly as the find-handle reports it: no path
/// joining, no security resolution (spec.md section 4.1 contract).
#[derive(Clone, Debug)]
pub struct RawChild {
    pub name: OsString,
    pub attributes: u32,
}

struct SearchHandle(HANDLE);

impl Drop for SearchHandle {
    fn drop(&mut self) {
        if self.0 != INVALID_HANDLE_VALUE {
            // SAFETY: `self.0` was returned by a successful `FindFirstFileExW`
            // and has not been closed yet.
            let _ = unsafe { FindClose(self.0) };
        }
    }
}

/// Owns exactly one find-handle and closes it on every exit path (normal
/// exhaustion, early `break`, or `Drop` from cancellation). Never recurses.
pub struct NativeDirIter {
    handle: Option<SearchHandle>,
    pending: Option<WIN32_FIND_DATAW>,
}

impl NativeDirIter {
    /// Opens a find-handle on `dir` joined with `pattern`. Per spec.md
    /// section 4.1, an invalid handle at open time (unreadable or
    /// nonexistent directory) yields an empty sequence, not an error.
    #[must_use]
    pub fn open(dir: &Path, pattern: &str) -> Self {
        let search_spec = dir.join(pattern);
        let wide = to_wide_null(&search_spec);
        let mut find_data = WIN32_FIND_DATAW::default();

        // SAFETY: `wide` is a null-terminated UTF-16 buffer valid for the
        // duration of this call; `find_data` is a plain-old-data struct the
        // call fully populates on success.
        let result = unsafe {
            FindFirstFileExW(
                PCWSTR(wide.as_ptr()),
                FindExInfoBasic,
                std::ptr::addr_of_mut!(find_data).cast(),
                FindExSearchNameMatch,
                None,
                FIND_FIRST_EX_LARGE_FETCH,
            )
        };

        match result {
            Ok(handle) => Self {
                handle: Some(SearchHandle(handle)),
                pending: Some(find_data),
            },
            Err(err) => {
                debug!(path = %dir.display(), error = %err, "directory enumeration unavailable");
                Self { handle: None, pending: None }
            }
        }
    }

    fn advance(&mut self) -> Option<WIN32_FIND_DATAW> {
        let handle = self.handle.as_ref()?;
        let mut next = WIN32_FIND_DATAW::default();
        // SAFETY: `handle.0` is a live find-handle owned by this struct.
        match unsafe { FindNextFileW(handle.0, &mut next) } {
            Ok(()) => Some(next),
            Err(err) => {
                debug!(error = %err, "find-next terminated the directory sequence");
                self.handle = None;
                None
            }
        }
    }
}

const SKIP_EXACT: [&str; 2] = [".", ".."];

fn is_filtered(name: &OsString) -> bool {
    let name = name.to_string_lossy();
    SKIP_EXACT.contains(&name.as_ref()) || name.eq_ignore_ascii_case("Thumbs.db")
}

impl Iterator for NativeDirIter {
    type Item = RawChild;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let data = match self.pending.take() {
                Some(data) => data,
                None => self.advance()?,
            };

            let name = filename_from_data(&data);
            if is_filtered(&name) {
                continue;
            }

            return Some(RawChild {
                name,
                attributes: data.dwFileAttributes,
            });
        }
    }
}

fn to_wide_null(path: &Path) -> Vec<u16> {
    let mut wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    wide.push(0);
    wide
}

fn filename_from_data(data: &WIN32_FIND_DATAW) -> OsString {
    let buffer = &data.cFileName;
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    OsString::from_wide(&buffer[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_dot_dotdot_and_thumbs() {
        assert!(is_filtered(&OsString::from(".")));
        assert!(is_filtered(&OsString::from("..")));
        assert!(is_filtered(&OsString::from("Thumbs.db")));
        assert!(is_filtered(&OsString::from("THUMBS.DB")));
        assert!(!is_filtered(&OsString::from("real.txt")));
    }

    #[test]
    fn opening_a_missing_directory_yields_no_children() {
        let missing = Path::new(r"Z:\this-should-not-exist-ntacl-walk\child");
        let entries: Vec<_> = NativeDirIter::open(missing, "*").collect();
        assert!(entries.is_empty());
    }
}
