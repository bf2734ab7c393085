//! Changed files of the current changeset

use anyhow::{Context, Result};
use git2::{Delta, DiffOptions, Oid, Repository, Status, StatusOptions};
use std::collections::HashSet;
use std::path::Path;

/// Git diff operations
pub struct GitDiff {
    repo: Repository,
}

impl GitDiff {
    /// Open a repository at the given path
    pub fn new(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to find git repository at {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Modified and added files: commits since the merge base with `base`
    /// first, then uncommitted changes. Deleted files are left out.
    pub fn touched_files(&self, base: Option<&str>) -> Result<Vec<String>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut files = Vec::new();

        let mut committed = Vec::new();
        if let Some(ref_name) = base {
            committed = self.committed_changes_since(ref_name)?;
        }

        for path in committed.into_iter().chain(self.uncommitted_changes()?) {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }

        tracing::debug!(count = files.len(), ?base, "collected touched files");
        Ok(files)
    }

    /// Staged, unstaged and untracked files that were added or modified
    pub fn uncommitted_changes(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.recurse_untracked_dirs(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let touched = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_RENAMED
            | Status::WT_NEW
            | Status::WT_MODIFIED
            | Status::WT_RENAMED;
        let deleted = Status::INDEX_DELETED | Status::WT_DELETED;

        for entry in statuses.iter() {
            let status = entry.status();
            if !status.intersects(touched) || status.intersects(deleted) {
                continue;
            }
            if let Some(path) = entry.path() {
                files.push(path.to_string());
            }
        }

        Ok(files)
    }

    /// Files added or modified between the merge base of `ref_name` and HEAD
    fn committed_changes_since(&self, ref_name: &str) -> Result<Vec<String>> {
        let base = self
            .repo
            .revparse_single(ref_name)
            .with_context(|| format!("Failed to resolve reference: {}", ref_name))?
            .peel_to_commit()?
            .id();

        let head = self.repo.head()?.peel_to_commit()?;
        let merge_base: Oid = self
            .repo
            .merge_base(base, head.id())
            .with_context(|| format!("No common ancestor between {} and HEAD", ref_name))?;

        let old_tree = self.repo.find_commit(merge_base)?.tree()?;
        let new_tree = head.tree()?;

        let mut diff_opts = DiffOptions::new();
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

        let mut files = Vec::new();
        diff.foreach(
            &mut |delta, _| {
                if matches!(
                    delta.status(),
                    Delta::Added | Delta::Modified | Delta::Renamed | Delta::Copied
                ) {
                    if let Some(path) = delta.new_file().path() {
                        files.push(path.to_string_lossy().to_string());
                    }
                }
                true
            },
            None,
            None,
            None,
        )?;

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{IndexAddOption, Signature};
    use std::fs;
    use tempfile::tempdir;

    fn commit_all(repo: &Repository, message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();

        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_touched_files() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        fs::write(dir.path().join("A.kt"), "class A").unwrap();
        fs::write(dir.path().join("B.kt"), "class B").unwrap();
        let base = commit_all(&repo, "base");

        fs::write(dir.path().join("A.kt"), "class A { }").unwrap();
        fs::remove_file(dir.path().join("B.kt")).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/C.kt"), "class C").unwrap();
        commit_all(&repo, "change");

        fs::write(dir.path().join("D.kt"), "class D").unwrap();

        let git = GitDiff::new(dir.path()).unwrap();
        let files = git.touched_files(Some(&base.to_string())).unwrap();

        assert_eq!(files, vec!["A.kt", "src/C.kt", "D.kt"]);
    }

    #[test]
    fn test_uncommitted_only_without_base() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        fs::write(dir.path().join("A.kt"), "class A").unwrap();
        commit_all(&repo, "base");
        fs::write(dir.path().join("A.kt"), "class A { }").unwrap();

        let git = GitDiff::new(dir.path()).unwrap();
        assert_eq!(git.touched_files(None).unwrap(), vec!["A.kt"]);
    }
}
