use crate::common::{normalize_library_name, LookupError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Ordered list of directory roots to be searched (recursively) when looking for a DLL
///
/// The first root containing a matching file wins; later roots are not searched.
/// An empty root names no directory and is skipped, as are roots that do not exist.
pub struct LookupPath {
    entries: Vec<PathBuf>,
    fs_cache: RefCell<RootScanCache>,
}

impl LookupPath {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: roots.into_iter().map(Into::into).collect(),
            fs_cache: RefCell::new(RootScanCache::new()),
        }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Full path of the first file named `library` (case-insensitively) under the search roots
    pub fn resolve(&self, library: &str) -> Result<PathBuf, LookupError> {
        self.try_resolve(library)
            .ok_or_else(|| LookupError::UnresolvedDependency {
                name: library.to_owned(),
            })
    }

    /// Best-effort variant of `resolve`: `None` if no root contains the library
    pub fn try_resolve(&self, library: &str) -> Option<PathBuf> {
        let mut cache = self.fs_cache.borrow_mut();
        self.entries
            .iter()
            .filter(|root| !root.as_os_str().is_empty())
            .find_map(|root| cache.find_in_root(library, root))
    }
}

/// Caches the content of already walked roots, to avoid walking a whole toolchain tree per DLL
struct RootScanCache {
    files_in_roots: HashMap<PathBuf, HashMap<String, PathBuf>>,
}

impl RootScanCache {
    fn new() -> Self {
        Self {
            files_in_roots: HashMap::new(),
        }
    }

    fn find_in_root(&mut self, library: &str, root: &Path) -> Option<PathBuf> {
        self.files_in_roots
            .entry(root.to_owned())
            .or_insert_with(|| scan_root(root))
            .get(&normalize_library_name(library))
            .cloned()
    }
}

// files of a directory come before its subdirectories, so shallower matches win
fn walk_order(a: &DirEntry, b: &DirEntry) -> std::cmp::Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

// symlinks count only when they point to a regular file
fn is_file_entry(e: &DirEntry) -> bool {
    e.file_type().is_file() || (e.file_type().is_symlink() && e.path().is_file())
}

/// Maps every lower-cased file name under `root` to the first path it was seen at
fn scan_root(root: &Path) -> HashMap<String, PathBuf> {
    let mut files: HashMap<String, PathBuf> = HashMap::new();
    for entry in WalkDir::new(root)
        .sort_by(walk_order)
        .into_iter()
        .filter_map(Result::ok)
        .filter(is_file_entry)
    {
        if let Some(name) = entry.file_name().to_str() {
            files
                .entry(normalize_library_name(name))
                .or_insert_with(|| entry.path().to_owned());
        }
    }
    files
}
