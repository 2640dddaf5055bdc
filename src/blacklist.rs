//! Libraries that are assumed to be provided by the target Windows installation
//!
//! A blacklisted DLL is neither reported nor copied, and its own imports are not followed.

use crate::common::{normalize_library_name, LookupError};
use fs_err as fs;
use std::collections::HashSet;
use std::path::Path;

/// Windows system DLLs and driver-provided runtimes that must never be bundled
const DEFAULT_BLACKLIST: &[&str] = &[
    "advapi32.dll",
    "kernel32.dll",
    "msvcrt.dll",
    "ole32.dll",
    "user32.dll",
    "ws2_32.dll",
    "comdlg32.dll",
    "gdi32.dll",
    "imm32.dll",
    "oleaut32.dll",
    "shell32.dll",
    "winmm.dll",
    "winspool.drv",
    "wldap32.dll",
    "ntdll.dll",
    "d3d9.dll",
    "mpr.dll",
    "crypt32.dll",
    "dnsapi.dll",
    "shlwapi.dll",
    "version.dll",
    "iphlpapi.dll",
    "msimg32.dll",
    "setupapi.dll",
    "opengl32.dll",
    "dwmapi.dll",
    "uxtheme.dll",
    "secur32.dll",
    "gdiplus.dll",
    "usp10.dll",
    "comctl32.dll",
    "wsock32.dll",
    "netapi32.dll",
    "userenv.dll",
    "avicap32.dll",
    "avrt.dll",
    "psapi.dll",
    "mswsock.dll",
    "glu32.dll",
    "bcrypt.dll",
    "rpcrt4.dll",
    "hid.dll",
    "dbghelp.dll",
    "d3d11.dll",
    "d3d12.dll",
    "dxgi.dll",
    "dwrite.dll",
    "d2d1.dll",
    "dsound.dll",
    "xinput1_4.dll",
    "vulkan-1.dll",
    "nvcuda.dll",
    "opencl.dll",
    "ucrtbase.dll",
];

/// Set of lower-cased library names excluded from the lookup
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Blacklist {
    entries: HashSet<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::from_names(DEFAULT_BLACKLIST.iter().copied())
    }
}

impl Blacklist {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: names
                .into_iter()
                .map(|n| normalize_library_name(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Parse a line-oriented list: one name per line, blank lines and `#` comments ignored
    pub fn parse(text: &str) -> Self {
        Self::from_names(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    /// Read a replacement blacklist from a file; the built-in entries are not kept
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LookupError> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn contains(&self, library: &str) -> bool {
        self.entries.contains(&normalize_library_name(library))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in alphabetical order
    pub fn sorted(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.entries.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
}
