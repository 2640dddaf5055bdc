extern crate thiserror;

mod runner;

pub mod blacklist;
pub mod bundle;
pub mod common;
pub mod dependencies;
pub mod imports;
pub mod lookup_path;
pub mod query;
pub use blacklist::Blacklist;
pub use common::{path_to_string, LookupError};
pub use dependencies::Dependencies;
pub use imports::{ImportReader, ObjdumpReader};
pub use lookup_path::LookupPath;
pub use query::{BundleParameters, LookupQuery};
pub use runner::DependencyWalker;

/// Find every non-blacklisted DLL the target executable of `query` needs, transitively
pub fn gather_dependencies<R: ImportReader + ?Sized>(
    query: &LookupQuery,
    reader: &R,
    log: slog::Logger,
) -> Result<Dependencies, LookupError> {
    let lookup_path = LookupPath::new(query.search_path.iter().cloned());
    let mut walker = DependencyWalker::new(
        reader,
        &lookup_path,
        &query.blacklist,
        query.parameters.force,
        log,
    );
    let walk = walker.walk(&query.target_exe)?;
    let unresolved = walker.skipped().to_vec();
    Ok(Dependencies::from_walk(&query.target_exe, walk, unresolved))
}

#[cfg(test)]
mod tests {
    use crate::runner::tests::{create_files, discard_log, FakeReader};
    use crate::{gather_dependencies, Blacklist, LookupError, LookupQuery};
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn query_for(root: &std::path::Path, exe: &str) -> LookupQuery {
        let mut query = LookupQuery::deduce_from_executable_location(root.join(exe));
        query.search_path = vec![root.to_owned()];
        query
    }

    #[test]
    fn kernel32_is_excluded_and_subdependencies_are_found() -> Result<(), LookupError> {
        let d = tempfile::tempdir()?;
        create_files(d.path(), &["app/app.exe", "mingw/libfoo.dll", "mingw/sub/libbar.dll"])?;
        let reader = FakeReader::default()
            .with("app.exe", &["libfoo.dll", "KERNEL32.dll"])
            .with("libfoo.dll", &["libbar.dll", "kernel32.dll"])
            .with("libbar.dll", &[]);
        let mut query = query_for(d.path(), "app/app.exe");
        query.blacklist = Blacklist::from_names(["kernel32.dll"]);

        let deps = gather_dependencies(&query, &reader, discard_log())?;
        let found: HashSet<PathBuf> = deps.iter().cloned().collect();
        let expected: HashSet<PathBuf> = [
            d.path().join("mingw/libfoo.dll"),
            d.path().join("mingw/sub/libbar.dll"),
        ]
        .into_iter()
        .collect();
        assert_eq!(found, expected);
        assert!(!reader.visited.borrow().contains(&"kernel32.dll".to_owned()));
        Ok(())
    }

    #[test]
    fn executable_is_never_its_own_dependency() -> Result<(), LookupError> {
        let d = tempfile::tempdir()?;
        create_files(d.path(), &["app.dll", "libfoo.dll"])?;
        let reader = FakeReader::default()
            .with("app.dll", &["libfoo.dll"])
            .with("libfoo.dll", &["APP.dll"]);
        let query = query_for(d.path(), "app.dll");

        let deps = gather_dependencies(&query, &reader, discard_log())?;
        assert_eq!(deps.paths, vec![d.path().join("libfoo.dll")]);
        Ok(())
    }

    #[test]
    fn result_has_no_duplicate_names() -> Result<(), LookupError> {
        let d = tempfile::tempdir()?;
        create_files(d.path(), &["app.exe", "liba.dll", "libb.dll", "libz.dll"])?;
        let reader = FakeReader::default()
            .with("app.exe", &["liba.dll", "LIBB.DLL", "libz.dll"])
            .with("liba.dll", &["libz.dll", "libb.dll"])
            .with("libb.dll", &["LibZ.dll", "liba.dll"])
            .with("libz.dll", &[]);
        let query = query_for(d.path(), "app.exe");

        let deps = gather_dependencies(&query, &reader, discard_log())?;
        let names: HashSet<String> = deps
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_lowercase())
            .collect();
        assert_eq!(names.len(), deps.len());
        assert_eq!(deps.len(), 3);
        Ok(())
    }

    #[test]
    fn force_skips_unresolved_and_reports_it() -> Result<(), LookupError> {
        let d = tempfile::tempdir()?;
        create_files(d.path(), &["app.exe", "libfoo.dll"])?;
        let reader = FakeReader::default()
            .with("app.exe", &["libfoo.dll", "libmissing.dll"])
            .with("libfoo.dll", &[]);
        let mut query = query_for(d.path(), "app.exe");

        assert!(matches!(
            gather_dependencies(&query, &reader, discard_log()),
            Err(LookupError::UnresolvedDependency { .. })
        ));

        query.parameters.force = true;
        let deps = gather_dependencies(&query, &reader, discard_log())?;
        assert_eq!(deps.paths, vec![d.path().join("libfoo.dll")]);
        assert_eq!(deps.unresolved, vec!["libmissing.dll".to_owned()]);
        Ok(())
    }
}
