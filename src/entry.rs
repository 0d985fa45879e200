//! The record model (spec.md section 3).

use std::collections::HashMap;
use std::fmt;

use crate::error::EntryError;

/// Which entry kinds a walk emits (spec.md section 3, `Options::search_for`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchFor {
    #[default]
    Files,
    Directories,
    Both,
}

impl SearchFor {
    #[must_use]
    #[inline]
    pub const fn wants_files(self) -> bool {
        matches!(self, Self::Files | Self::Both)
    }

    #[must_use]
    #[inline]
    pub const fn wants_directories(self) -> bool {
        matches!(self, Self::Directories | Self::Both)
    }
}

/// Whether a raw directory child is itself a directory or a regular file,
/// as reported by `dwFileAttributes` on the find-data record. Spec.md
/// section 9 calls for replacing runtime type tests with a tagged variant
/// derived from the attribute bit; this is that variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    #[must_use]
    #[inline]
    pub const fn from_attributes(attributes: u32) -> Self {
        // FILE_ATTRIBUTE_DIRECTORY = 0x10
        if attributes & 0x10 != 0 {
            Self::Directory
        } else {
            Self::File
        }
    }

    #[must_use]
    #[inline]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// One visited filesystem entry, fully resolved. Immutable once constructed
/// (spec.md section 3: "FileSystemEntry is created once per visited entry
/// and never mutated").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSystemEntry {
    pub path: String,
    pub owner: String,
    pub attributes: u32,
    pub acl: HashMap<String, String>,
    pub modified: bool,
    pub error: String,
}

impl FileSystemEntry {
    /// Builds a successfully-resolved entry. `acl` maps identity strings to
    /// a rendered rights-name set (spec.md section 6, "ACL entries render as
    /// `identity=rights_name_set`" — the value half of that rendering).
    #[must_use]
    pub fn resolved(path: String, attributes: u32, owner: String, acl: HashMap<String, String>) -> Self {
        debug_assert!(!path.is_empty());
        debug_assert_eq!(path.trim(), path, "path must not carry leading/trailing whitespace");
        Self {
            path,
            owner,
            attributes,
            acl,
            modified: true,
            error: String::new(),
        }
    }

    /// Builds an entry that failed security resolution. Per spec.md section
    /// 3's invariants: `modified` is false, `owner` and `acl` are empty.
    #[must_use]
    pub fn failed(path: String, attributes: u32, error: &EntryError) -> Self {
        debug_assert!(!path.is_empty());
        Self {
            path,
            owner: String::new(),
            attributes,
            acl: HashMap::new(),
            modified: false,
            error: error.to_string(),
        }
    }

    #[must_use]
    #[inline]
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_attributes(self.attributes)
    }
}

impl fmt::Display for FileSystemEntry {
    /// Canonical external rendering (spec.md section 6):
    /// `Path | Owner | ACL-count | Modified | Error`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {}",
            self.path,
            self.owner,
            self.acl.len(),
            self.modified,
            self.error
        )
    }
}
