//! Thin wrapper over the git binary.
//!
//! Every operation shells out to `git` and consumes only the exit status;
//! stderr is folded into the error message when a call fails.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, SnaprError};

/// A git working copy addressed by its working directory.
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: PathBuf,
}

impl GitRepo {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| SnaprError::Git(format!("failed to execute git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnaprError::Git(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&"?"),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Name of the currently checked-out branch.
    pub fn current_branch(&self) -> Result<String> {
        let stdout = self.run(&["branch", "--show-current"])?;
        Ok(stdout.trim().to_string())
    }

    /// Create `name` and switch to it. Fails if the branch already exists.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        self.run(&["checkout", "-b", name])?;
        Ok(())
    }

    /// Switch to an existing branch.
    pub fn checkout(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name])?;
        Ok(())
    }

    /// Stage one path.
    pub fn stage(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["add", &*path])?;
        Ok(())
    }

    /// Commit staged changes.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message])?;
        Ok(())
    }

    /// Push `branch` to `remote`.
    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch])?;
        Ok(())
    }

    /// Clone this working copy, as currently checked out, into `dest`.
    pub fn clone_to(&self, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run(&["clone", ".", &*dest])?;
        Ok(())
    }

    /// Set the commit identity in the repository-local config.
    ///
    /// Worktrees of this repository share the same config, so one call
    /// covers them all.
    pub fn set_identity(&self, name: &str, email: &str) -> Result<()> {
        self.run(&["config", "user.name", name])?;
        self.run(&["config", "user.email", email])?;
        Ok(())
    }

    /// Create a worktree at `path` with a new branch `branch`.
    pub fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.run(&["worktree", "add", &*path_str, "-b", branch])
            .map_err(as_worktree_error)?;
        Ok(())
    }

    /// Remove the worktree at `path`, discarding its checkout.
    pub fn remove_worktree(&self, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.run(&["worktree", "remove", &*path_str, "--force"])
            .map_err(as_worktree_error)?;
        Ok(())
    }
}

fn as_worktree_error(e: SnaprError) -> SnaprError {
    match e {
        SnaprError::Git(msg) => SnaprError::Worktree(msg),
        other => other,
    }
}

/// Clone a single branch of `remote` into `dest`.
pub fn clone_branch(remote: &str, branch: &str, dest: &Path) -> Result<()> {
    let dest_str = dest.to_string_lossy();
    let output = Command::new("git")
        .args(["clone", "--branch", branch, "--single-branch", remote, &*dest_str])
        .output()
        .map_err(|e| SnaprError::Git(format!("failed to execute git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SnaprError::Git(format!(
            "git clone of {branch} failed: {}",
            stderr.trim()
        )));
    }

    Ok(())
}
