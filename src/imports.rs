//! Reading the import table of a PE file through an external object inspection tool

use crate::common::{path_to_string, LookupError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable overriding the objdump program
pub const OBJDUMP_ENV_VAR: &str = "MINGW_BUNDLEDLLS_OBJDUMP";

const DEFAULT_OBJDUMP: &str = "objdump";

/// Source of the names of the DLLs an executable file imports directly
pub trait ImportReader {
    /// Names as they appear in the import table, in table order
    fn read_imports(&self, binary: &Path) -> Result<Vec<String>, LookupError>;
}

/// Runs `objdump -p` and picks the `DLL Name:` lines of the private headers dump
#[derive(Debug, Clone)]
pub struct ObjdumpReader {
    program: PathBuf,
    dll_name_re: Regex,
}

impl ObjdumpReader {
    pub fn new<P: Into<PathBuf>>(program: P) -> Result<Self, LookupError> {
        Ok(Self {
            program: program.into(),
            dll_name_re: Regex::new(r"DLL Name:(.*)")?,
        })
    }

    /// Honors `MINGW_BUNDLEDLLS_OBJDUMP`, falling back to `objdump` from the PATH
    pub fn from_env() -> Result<Self, LookupError> {
        match std::env::var_os(OBJDUMP_ENV_VAR) {
            Some(p) if !p.is_empty() => Self::new(p),
            _ => Self::new(DEFAULT_OBJDUMP),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn failure(&self, binary: &Path, reason: String) -> LookupError {
        LookupError::ExternalToolFailure {
            tool: path_to_string(&self.program),
            binary: path_to_string(binary),
            reason,
        }
    }

    /// Extract the imported DLL names from the `objdump -p` output for `binary`
    ///
    /// The name is the rest of the line after the marker, so names containing spaces survive.
    ///
    /// Example:
    /// ```text
    /// The Import Tables (interpreted .idata section contents)
    ///  vma:            Hint    Time      Forward  DLL       First
    ///                  Table   Stamp     Chain    Name      Thunk
    ///  00012000        0001203c 00000000 00000000 00012a1c 0001218c
    ///
    ///         DLL Name: KERNEL32.dll
    ///         vma:  Hint/Ord Member-Name Bound-To
    /// ```
    pub fn parse_output(&self, binary: &Path, output: &str) -> Result<Vec<String>, LookupError> {
        let mut names = Vec::new();
        for line in output.lines() {
            if let Some(caps) = self.dll_name_re.captures(line) {
                let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                if name.is_empty() {
                    return Err(self.failure(
                        binary,
                        format!("no library name on line {:?}", line.trim()),
                    ));
                }
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }
}

impl ImportReader for ObjdumpReader {
    fn read_imports(&self, binary: &Path) -> Result<Vec<String>, LookupError> {
        // objdump's own message for a missing file is not very telling
        if !binary.is_file() {
            return Err(self.failure(binary, "file does not exist".to_owned()));
        }

        let output = Command::new(&self.program)
            .arg("-p")
            .arg(binary)
            .output()
            .map_err(|e| self.failure(binary, format!("could not run the program: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(
                binary,
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| self.failure(binary, "output is not valid UTF-8".to_owned()))?;
        self.parse_output(binary, &stdout)
    }
}
