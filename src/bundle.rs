//! Copying the found DLLs next to the executable, optionally compressing them

use crate::common::path_to_string;
use fs_err as fs;
use slog::{info, warn, Logger};
use std::path::{Path, PathBuf};
use std::process::Command;

const DEFAULT_COMPRESSOR: &str = "upx";

/// External executable packer run on every copied file (UPX by default)
///
/// Its exit status is ignored: a file it refuses to pack is still a valid copy.
#[derive(Debug, Clone)]
pub struct Compressor {
    program: PathBuf,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSOR)
    }
}

impl Compressor {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn compress(&self, file: &Path, log: &Logger) {
        match Command::new(&self.program).arg(file).status() {
            Ok(status) => {
                info!(log, "compressed"; "file" => %file.display(), "status" => %status)
            }
            Err(e) => warn!(log, "could not run compressor";
                "program" => %self.program.display(), "file" => %file.display(), "error" => %e),
        }
    }
}

/// Outcome of a bundling run; a failed copy does not stop the others
#[derive(Debug, Default)]
pub struct BundleReport {
    /// Destination paths of the files that were copied
    pub copied: Vec<PathBuf>,
    /// Sources that already are the file in the target directory
    pub skipped: Vec<PathBuf>,
    /// Sources that could not be copied, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Bundler {
    target_dir: PathBuf,
    compressor: Option<Compressor>,
    log: Logger,
}

impl Bundler {
    pub fn new<P: Into<PathBuf>>(target_dir: P, compressor: Option<Compressor>, log: Logger) -> Self {
        Self {
            target_dir: target_dir.into(),
            compressor,
            log,
        }
    }

    /// Copy every file into the target directory, one line of output per file
    pub fn bundle<'a, I>(&self, files: I) -> BundleReport
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let mut report = BundleReport::default();
        for src in files {
            let Some(filename) = src.file_name() else {
                report
                    .failed
                    .push((src.clone(), "path has no file name".to_owned()));
                continue;
            };
            let dest = self.target_dir.join(filename);

            if is_same_file(src, &dest) {
                println!(
                    "{} already in target directory, skipping",
                    path_to_string(src)
                );
                report.skipped.push(src.clone());
                continue;
            }

            println!("copying {} to {}", path_to_string(src), path_to_string(&dest));
            match fs::copy(src, &dest) {
                Ok(_) => {
                    if let Some(compressor) = &self.compressor {
                        compressor.compress(&dest, &self.log);
                    }
                    report.copied.push(dest);
                }
                Err(e) => {
                    warn!(self.log, "copy failed"; "file" => %src.display(), "error" => %e);
                    report.failed.push((src.clone(), e.to_string()));
                }
            }
        }
        report
    }
}

fn is_same_file(src: &Path, dest: &Path) -> bool {
    if !dest.exists() {
        return false;
    }
    match (fs::canonicalize(src), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{Bundler, Compressor};
    use crate::common::LookupError;
    use crate::runner::tests::{create_files, discard_log};
    use fs_err as fs;

    #[test]
    fn copies_next_to_the_executable() -> Result<(), LookupError> {
        let toolchain = tempfile::tempdir()?;
        let target = tempfile::tempdir()?;
        create_files(toolchain.path(), &["bin/libfoo.dll", "lib/libbar.dll"])?;
        let deps = vec![
            toolchain.path().join("bin/libfoo.dll"),
            toolchain.path().join("lib/libbar.dll"),
        ];

        let report = Bundler::new(target.path(), None, discard_log()).bundle(&deps);
        assert_eq!(
            report.copied,
            vec![
                target.path().join("libfoo.dll"),
                target.path().join("libbar.dll")
            ]
        );
        assert!(report.skipped.is_empty());
        assert!(report.failed.is_empty());
        assert!(target.path().join("libbar.dll").is_file());
        Ok(())
    }

    #[test]
    fn file_already_in_target_directory_is_skipped() -> Result<(), LookupError> {
        let target = tempfile::tempdir()?;
        let toolchain = tempfile::tempdir()?;
        create_files(target.path(), &["libfoo.dll"])?;
        create_files(toolchain.path(), &["libbar.dll"])?;
        let deps = vec![
            target.path().join("libfoo.dll"),
            toolchain.path().join("libbar.dll"),
        ];

        let report = Bundler::new(target.path(), None, discard_log()).bundle(&deps);
        assert_eq!(report.skipped, vec![target.path().join("libfoo.dll")]);
        assert_eq!(report.copied, vec![target.path().join("libbar.dll")]);
        assert!(report.failed.is_empty());
        Ok(())
    }

    #[test]
    fn failed_copy_does_not_stop_the_batch() -> Result<(), LookupError> {
        let toolchain = tempfile::tempdir()?;
        let target = tempfile::tempdir()?;
        create_files(toolchain.path(), &["libbar.dll"])?;
        let deps = vec![
            toolchain.path().join("libgone.dll"),
            toolchain.path().join("libbar.dll"),
        ];

        let report = Bundler::new(target.path(), None, discard_log()).bundle(&deps);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, toolchain.path().join("libgone.dll"));
        assert_eq!(report.copied, vec![target.path().join("libbar.dll")]);
        Ok(())
    }

    #[test]
    fn missing_compressor_is_not_fatal() -> Result<(), LookupError> {
        let toolchain = tempfile::tempdir()?;
        let target = tempfile::tempdir()?;
        create_files(toolchain.path(), &["libfoo.dll"])?;
        let deps = vec![toolchain.path().join("libfoo.dll")];

        let compressor = Compressor::new(toolchain.path().join("no-such-upx"));
        let report = Bundler::new(target.path(), Some(compressor), discard_log()).bundle(&deps);
        assert_eq!(report.copied, vec![target.path().join("libfoo.dll")]);
        assert_eq!(fs::read(target.path().join("libfoo.dll"))?, b"MZ");
        Ok(())
    }
}
