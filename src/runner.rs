use crate::blacklist::Blacklist;
use crate::common::{normalize_library_name, LookupError};
use crate::imports::ImportReader;
use crate::lookup_path::LookupPath;
use slog::{debug, warn, Logger};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Finds the dependencies of an executable, recursively, in a depth-first fashion.
///
/// DLLs are identified by their (case-folded) name: once a name has been resolved it is not
/// looked up again, even if another file imports it. This also breaks import cycles.
pub struct DependencyWalker<'a, R: ImportReader + ?Sized> {
    reader: &'a R,
    lookup_path: &'a LookupPath,
    blacklist: &'a Blacklist,
    /// skip unresolved DLLs instead of failing
    force: bool,
    log: Logger,
    seen: HashSet<String>,
    skipped: Vec<String>,
}

impl<'a, R: ImportReader + ?Sized> DependencyWalker<'a, R> {
    pub fn new(
        reader: &'a R,
        lookup_path: &'a LookupPath,
        blacklist: &'a Blacklist,
        force: bool,
        log: Logger,
    ) -> Self {
        Self {
            reader,
            lookup_path,
            blacklist,
            force,
            log,
            seen: HashSet::new(),
            skipped: Vec::new(),
        }
    }

    /// Names of the DLLs that could not be found and were left out (only with `force`)
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// `path` followed by the full closure of each of its imports, in import table order
    ///
    /// The returned sequence may contain `path` more than once if some DLL imports it back.
    pub fn walk(&mut self, path: &Path) -> Result<Vec<PathBuf>, LookupError> {
        let mut closure = vec![path.to_owned()];

        for dllname in self.reader.read_imports(path)? {
            if self.blacklist.contains(&dllname) {
                debug!(self.log, "skipping blacklisted library"; "name" => %dllname);
                continue;
            }
            let key = normalize_library_name(&dllname);
            if self.seen.contains(&key) {
                continue;
            }

            let full_path = match self.lookup_path.try_resolve(&dllname) {
                Some(p) => p,
                None if self.force => {
                    warn!(self.log, "library not found, skipping";
                        "name" => %dllname, "importer" => %path.display());
                    if !self.skipped.iter().any(|s| normalize_library_name(s) == key) {
                        self.skipped.push(dllname);
                    }
                    continue;
                }
                None => return Err(LookupError::UnresolvedDependency { name: dllname }),
            };
            debug!(self.log, "resolved library"; "name" => %dllname, "path" => %full_path.display());

            self.seen.insert(key);
            closure.extend(self.walk(&full_path)?);
        }

        Ok(closure)
    }
}
