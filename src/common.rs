use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Unable to find library {name} in any search root")]
    UnresolvedDependency { name: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to read imports of {binary} with {tool}: {reason}")]
    ExternalToolFailure {
        tool: String,
        binary: String,
        reason: String,
    },

    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    RegexError(#[from] regex::Error),
}

/// Canonical form of a library name for set membership (Windows DLL names are case-insensitive)
pub fn normalize_library_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Path as a displayable string, lossy for non-UTF-8 components
pub fn path_to_string<P: AsRef<Path>>(p: P) -> String {
    p.as_ref().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_names_fold_case() {
        assert_eq!(normalize_library_name("KERNEL32.dll"), "kernel32.dll");
        assert_eq!(normalize_library_name(" libgcc_s_seh-1.DLL "), "libgcc_s_seh-1.dll");
    }

    #[test]
    fn unresolved_dependency_names_the_library() {
        let e = LookupError::UnresolvedDependency {
            name: "libfoo.dll".to_owned(),
        };
        assert!(e.to_string().contains("libfoo.dll"));
    }
}
