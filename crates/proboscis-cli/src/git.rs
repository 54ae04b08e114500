//! Changed-file selection for `check --changed-only`.

use anyhow::{Context, Result};
use git2::{Repository, Status, StatusOptions};
use proboscis_core::LintError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Python files that are staged, modified or untracked in the repository
/// containing `path`. Deleted files are left out since there is nothing to
/// lint.
///
/// # Errors
///
/// Returns [`LintError::NotAGitRepository`] if `path` is not inside a
/// non-bare git work tree.
pub fn changed_python_files(path: &Path) -> Result<BTreeSet<PathBuf>> {
    let not_a_repo = || LintError::NotAGitRepository {
        path: path.to_path_buf(),
    };
    let repo = Repository::discover(path).map_err(|_| not_a_repo())?;
    let workdir = repo.workdir().ok_or_else(not_a_repo)?.to_path_buf();

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut options))
        .context("Failed to read git status")?;

    let mut changed = BTreeSet::new();
    for entry in statuses.iter() {
        let status = entry.status();
        if status.intersects(Status::WT_DELETED | Status::INDEX_DELETED | Status::IGNORED) {
            continue;
        }
        let Some(relative) = entry.path() else {
            continue;
        };
        if !relative.ends_with(".py") {
            continue;
        }
        let absolute = workdir.join(relative);
        changed.insert(absolute.canonicalize().unwrap_or(absolute));
    }

    tracing::debug!("{} changed Python files in {}", changed.len(), workdir.display());
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn commit_all(repo: &Repository, files: &[&str]) {
        let mut index = repo.index().unwrap();
        for file in files {
            index.add_path(Path::new(file)).unwrap();
        }
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("dev", "dev@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
    }

    fn names(paths: &BTreeSet<PathBuf>) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn reports_modified_staged_and_untracked_python_files() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        for name in ["clean.py", "edited.py", "gone.py"] {
            fs::write(tmp.path().join(name), "x = 1\n").unwrap();
        }
        commit_all(&repo, &["clean.py", "edited.py", "gone.py"]);

        fs::write(tmp.path().join("edited.py"), "x = 2\n").unwrap();
        fs::remove_file(tmp.path().join("gone.py")).unwrap();
        fs::create_dir(tmp.path().join("pkg")).unwrap();
        fs::write(tmp.path().join("pkg/new.py"), "").unwrap();
        fs::write(tmp.path().join("staged.py"), "").unwrap();
        fs::write(tmp.path().join("README.md"), "").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("staged.py")).unwrap();
        index.write().unwrap();

        let changed = changed_python_files(tmp.path()).unwrap();
        assert_eq!(names(&changed), vec!["edited.py", "new.py", "staged.py"]);
    }

    #[test]
    fn clean_tree_has_no_changes() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        fs::write(tmp.path().join("a.py"), "").unwrap();
        commit_all(&repo, &["a.py"]);

        assert!(changed_python_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn outside_a_repository_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = changed_python_files(tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LintError>(),
            Some(LintError::NotAGitRepository { .. })
        ));
    }
}
