use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Result of a lookup: the DLLs the target executable needs, without the executable itself
#[derive(Debug, Clone, Serialize)]
pub struct Dependencies {
    /// The executable whose dependencies were searched
    pub binary: PathBuf,
    /// Full paths of the DLLs found, each listed once, in order of discovery
    pub paths: Vec<PathBuf>,
    /// Names of the DLLs that could not be found (only when running with force)
    pub unresolved: Vec<String>,
}

impl Dependencies {
    /// Build the result from the raw depth-first walk, which starts with `binary` itself
    pub fn from_walk(binary: &Path, walk: Vec<PathBuf>, unresolved: Vec<String>) -> Self {
        let binary_canonical = binary.canonicalize().ok();
        let mut listed: HashSet<PathBuf> = HashSet::new();
        let paths = walk
            .into_iter()
            .filter(|p| !is_same_file(p, binary, binary_canonical.as_deref()))
            .filter(|p| listed.insert(p.clone()))
            .collect();
        Self {
            binary: binary.to_owned(),
            paths,
            unresolved,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }
}

fn is_same_file(p: &Path, binary: &Path, binary_canonical: Option<&Path>) -> bool {
    if p == binary {
        return true;
    }
    match (binary_canonical, p.canonicalize()) {
        (Some(b), Ok(c)) => b == c,
        _ => false,
    }
}
