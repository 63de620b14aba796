//! Output path resolution
//!
//! Whether an output target names a directory is decided from its spelling
//! alone: a target is a directory iff its last segment is empty, i.e. it is
//! empty or ends with a path separator. `out/` is a directory target, `out`
//! is a file target even when a directory called `out` exists on disk.
//!
//! On Windows a bare drive such as `C:` has no last segment either and is a
//! directory target; output for `input.txt` then goes to the drive-relative
//! `C:input.txt`. Elsewhere `C:` is an ordinary file name.

use std::path::{Component, Path, PathBuf, is_separator};

/// How a caller-supplied output path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget<'a> {
    /// Place the output inside this directory, named after the source file.
    Directory(&'a str),
    /// Write the output to exactly this path.
    File(&'a str),
}

impl<'a> OutputTarget<'a> {
    pub fn classify(target: &'a str) -> Self {
        if is_directory_target(target) {
            OutputTarget::Directory(target)
        } else {
            OutputTarget::File(target)
        }
    }

    /// The effective output path for `source`.
    pub fn resolve(self, source: &Path) -> PathBuf {
        match self {
            OutputTarget::File(target) => PathBuf::from(target),
            OutputTarget::Directory(dir) => {
                let mut joined = PathBuf::from(dir);
                if let Some(name) = source.file_name() {
                    joined.push(name);
                }
                joined
            }
        }
    }
}

/// True iff `target` has an empty last segment.
pub fn is_directory_target(target: &str) -> bool {
    target.chars().next_back().is_none_or(is_separator) || is_bare_prefix(target)
}

// Only Windows paths have prefix components.
fn is_bare_prefix(target: &str) -> bool {
    let mut components = Path::new(target).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Prefix(_)), None)
    )
}

/// Compute the effective output path for `source` given `target`.
///
/// Pure path arithmetic; nothing is checked against the file system.
pub fn resolve(source: &Path, target: &str) -> PathBuf {
    OutputTarget::classify(target).resolve(source)
}
