//! File-list predicates

use super::Predicate;
use crate::rule::FileConstraints;
use crate::value::FileInfo;

/// Predicate that checks at least `min` files are selected.
#[derive(Clone, Copy, Debug)]
pub struct FileCountAtLeast(pub f64);

impl Predicate<[FileInfo]> for FileCountAtLeast {
    #[inline]
    fn check(&self, files: &[FileInfo]) -> bool {
        files.len() as f64 >= self.0
    }
}

/// Create a predicate that checks at least `min` files are selected.
pub fn file_count_at_least(min: f64) -> FileCountAtLeast {
    FileCountAtLeast(min)
}

/// Predicate that checks at most `max` files are selected.
#[derive(Clone, Copy, Debug)]
pub struct FileCountAtMost(pub f64);

impl Predicate<[FileInfo]> for FileCountAtMost {
    #[inline]
    fn check(&self, files: &[FileInfo]) -> bool {
        files.len() as f64 <= self.0
    }
}

/// Create a predicate that checks at most `max` files are selected.
pub fn file_count_at_most(max: f64) -> FileCountAtMost {
    FileCountAtMost(max)
}

/// Predicate that checks files against a set of constraints.
#[derive(Clone, Copy, Debug)]
pub struct Satisfies<'a>(pub &'a FileConstraints);

impl Predicate<FileInfo> for Satisfies<'_> {
    fn check(&self, file: &FileInfo) -> bool {
        let c = self.0;

        let size_ok = c.min_size.map_or(true, |min| file.size >= min)
            && c.max_size.map_or(true, |max| file.size <= max);
        let name_ok = c.names.as_ref().map_or(true, |names| names.contains(&file.name));
        let ext_ok = c
            .extensions
            .as_ref()
            .map_or(true, |exts| exts.iter().any(|e| e == file.extension()));
        let type_ok = c
            .types
            .as_ref()
            .map_or(true, |types| types.contains(&file.mime_type));

        size_ok && name_ok && ext_ok && type_ok
    }
}

impl Predicate<[FileInfo]> for Satisfies<'_> {
    #[inline]
    fn check(&self, files: &[FileInfo]) -> bool {
        files.iter().all(|file| Predicate::<FileInfo>::check(self, file))
    }
}

/// Create a predicate that checks files against `constraints`.
///
/// A list passes only if every file passes every set constraint.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
/// use formguard::rule::FileConstraints;
/// use formguard::value::FileInfo;
///
/// let images = FileConstraints::new().extensions(["png", "jpg"]).max_size(1024);
/// let files = vec![
///     FileInfo::new("a.png", 100, "image/png"),
///     FileInfo::new("b.gif", 100, "image/gif"),
/// ];
///
/// assert!(satisfies(&images).check(&files[..1]));
/// assert!(!satisfies(&images).check(&files[..]));
/// ```
pub fn satisfies(constraints: &FileConstraints) -> Satisfies<'_> {
    Satisfies(constraints)
}
