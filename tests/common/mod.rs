//! Synthetic tree builders shared by the integration and property suites.

use std::fs;
use std::path::{Path, PathBuf};

/// Builds `root/a.txt`, `root/b.txt`, `root/sub/c.txt` — the tree scenario 2
/// of spec.md section 8 is built around.
pub fn flat_tree_with_subdir(root: &Path) -> Vec<PathBuf> {
    let a = root.join("a.txt");
    let b = root.join("b.txt");
    let sub = root.join("sub");
    let c = sub.join("c.txt");

    fs::write(&a, b"a").unwrap();
    fs::write(&b, b"b").unwrap();
    fs::create_dir(&sub).unwrap();
    fs::write(&c, b"c").unwrap();

    vec![a, b, c]
}

/// A file named `Thumbs.db` alongside an ordinary file (scenario 6).
pub fn tree_with_thumbs_db(root: &Path) -> PathBuf {
    fs::write(root.join("Thumbs.db"), b"cache").unwrap();
    let real = root.join("real.txt");
    fs::write(&real, b"real").unwrap();
    real
}

/// Creates an empty directory under `root` and returns its path.
pub fn empty_dir(root: &Path) -> PathBuf {
    let dir = root.join("empty");
    fs::create_dir(&dir).unwrap();
    dir
}

/// A tiny shape description used by the property suite to generate arbitrary
/// directory trees without needing a full recursive AST.
#[derive(Clone, Debug)]
pub struct TreeShape {
    /// Number of plain files directly under the root.
    pub root_files: u8,
    /// Number of subdirectories directly under the root, each holding
    /// `files_per_subdir` plain files.
    pub subdirs: u8,
    pub files_per_subdir: u8,
}

/// Materializes a [`TreeShape`] under `root` and returns every file path it
/// created, for completeness checks.
pub fn materialize(root: &Path, shape: &TreeShape) -> Vec<PathBuf> {
    let mut created = Vec::new();

    for index in 0..shape.root_files {
        let path = root.join(format!("root_file_{index}.dat"));
        fs::write(&path, b"x").unwrap();
        created.push(path);
    }

    for dir_index in 0..shape.subdirs {
        let dir = root.join(format!("dir_{dir_index}"));
        fs::create_dir(&dir).unwrap();
        for file_index in 0..shape.files_per_subdir {
            let path = dir.join(format!("file_{file_index}.dat"));
            fs::write(&path, b"x").unwrap();
            created.push(path);
        }
    }

    created
}
