// SPDX-License-Identifier: MIT

//! Version-control capability
//!
//! Both tools consume git through the [`VersionControl`] trait so tests can
//! substitute an in-memory fake. The production implementation shells out
//! to the `git` binary rather than linking a libgit2 binding; every
//! operation here maps to a single porcelain command.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::{RepowardenError, Result};

/// Repository operations the tools depend on
pub trait VersionControl: Send + Sync {
    /// Name of the currently checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// All local branch names
    fn branch_names(&self) -> Result<Vec<String>>;

    /// Create a branch at the current HEAD without switching to it
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Switch the working tree to `name`
    fn checkout(&self, name: &str) -> Result<()>;

    /// Stage every change in the working tree
    fn stage_all(&self) -> Result<()>;

    /// Stage a single path
    fn stage(&self, path: &Path) -> Result<()>;

    /// Commit staged changes
    fn commit(&self, message: &str) -> Result<()>;

    /// Push a branch to a remote
    fn push(&self, remote: &str, branch: &str) -> Result<()>;

    /// URL of a configured remote
    fn remote_url(&self, remote: &str) -> Result<String>;
}

/// `git` CLI-backed implementation
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    /// Open the repository at `root`, verifying it actually is one
    pub fn open(root: &Path) -> Result<Self> {
        let git = Self {
            repo_root: root.to_path_buf(),
        };
        git.run(&["rev-parse", "--is-inside-work-tree"])
            .map_err(|_| {
                RepowardenError::Git(format!("Not a git repository: {:?}", root))
            })?;
        Ok(git)
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(args)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RepowardenError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VersionControl for GitCli {
    fn current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn branch_names(&self) -> Result<Vec<String>> {
        let out = self.run(&["branch", "--format=%(refname:short)"])?;
        Ok(out
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.run(&["branch", name]).map(|_| ())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name]).map(|_| ())
    }

    fn stage_all(&self) -> Result<()> {
        self.run(&["add", "-A"]).map(|_| ())
    }

    fn stage(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["add", "--", path.as_ref()]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch]).map(|_| ())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.run(&["remote", "get-url", remote])
    }
}
