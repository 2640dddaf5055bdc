//! Data structures that must be filled with the input and the parameters for the DLL scan

use crate::blacklist::Blacklist;
use crate::common::LookupError;
use std::path::{Path, PathBuf};

/// Environment variable holding a `|`-separated list of search roots
pub const SEARCH_PATH_ENV_VAR: &str = "MINGW_BUNDLEDLLS_SEARCH_PATH";

/// Known install locations of MinGW-w64 runtime DLLs
#[cfg(not(windows))]
pub const DEFAULT_SEARCH_PATH: &[&str] = &[
    "/usr/x86_64-w64-mingw32/bin",
    "/usr/x86_64-w64-mingw32/lib",
    "/usr/x86_64-w64-mingw32/sys-root/mingw/bin",
    "/usr/lib/gcc/x86_64-w64-mingw32",
    "/mingw64/bin",
    "/ucrt64/bin",
];

/// Known install locations of MinGW-w64 runtime DLLs
#[cfg(windows)]
pub const DEFAULT_SEARCH_PATH: &[&str] = &[
    "C:\\msys64\\mingw64\\bin",
    "C:\\msys64\\ucrt64\\bin",
    "C:\\mingw64\\bin",
];

/// Split a `|`-separated list of directories, dropping empty segments
pub fn parse_search_path(value: &str) -> Vec<PathBuf> {
    value
        .split('|')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Search roots from `MINGW_BUNDLEDLLS_SEARCH_PATH`, or the built-in list if it is not set
pub fn search_path_from_env() -> Vec<PathBuf> {
    match std::env::var(SEARCH_PATH_ENV_VAR) {
        Ok(value) => parse_search_path(&value),
        Err(_) => DEFAULT_SEARCH_PATH.iter().map(PathBuf::from).collect(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleParameters {
    /// Skip dependencies that can't be found instead of failing
    pub force: bool,
    /// Copy the dependencies next to the target executable
    pub copy: bool,
    /// Compress every copied file with UPX
    pub upx: bool,
}

impl BundleParameters {
    /// Reject flag combinations that make no sense; must pass before any lookup starts
    pub fn validate(&self) -> Result<(), LookupError> {
        if self.upx && !self.copy {
            return Err(LookupError::InvalidConfiguration(
                "--upx only makes sense together with --copy".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Complete specification of a lookup task
#[derive(Clone, Debug)]
pub struct LookupQuery {
    /// Path to the target executable
    pub target_exe: PathBuf,
    /// Parent directory of target_exe, where dependencies are bundled
    pub target_dir: PathBuf,
    /// Roots searched recursively for DLLs, in order
    pub search_path: Vec<PathBuf>,
    /// Libraries provided by the target system
    pub blacklist: Blacklist,
    pub parameters: BundleParameters,
}

impl LookupQuery {
    /// Default settings for the given executable: search path from the environment, built-in blacklist
    pub fn deduce_from_executable_location<P: AsRef<Path>>(target_exe: P) -> Self {
        let target_exe = target_exe.as_ref().to_owned();
        let target_dir = match target_exe.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_owned(),
            _ => PathBuf::from("."),
        };
        Self {
            target_exe,
            target_dir,
            search_path: search_path_from_env(),
            blacklist: Blacklist::default(),
            parameters: BundleParameters::default(),
        }
    }
}
