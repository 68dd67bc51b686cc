//! Concurrent branch publishing over isolated worktrees.
//!
//! Each year gets its own `git worktree` with the branch already checked
//! out, so no two tasks ever share an index or a params file. Tasks run
//! under a bounded worker pool; per-year outcomes are logged in completion
//! order. A panicked task is reported for its own year only.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{Semaphore, mpsc};

use crate::error::{Result, SnaprError};
use crate::git::GitRepo;
use crate::params::{self, ParamsFile};
use crate::publish::{BranchReport, BranchTemplate, PublishMode};
use crate::window::{self, DateWindow};

/// Publishes year branches in parallel, one worktree per year.
#[derive(Debug, Clone)]
pub struct ConcurrentPublisher {
    repo: GitRepo,
    /// Params file path relative to the working copy root
    params_file: PathBuf,
    template: BranchTemplate,
    mode: PublishMode,
    /// Scratch directory receiving one worktree per branch
    worktree_dir: PathBuf,
    max_workers: usize,
}

impl ConcurrentPublisher {
    pub fn new(
        repo: GitRepo,
        params_file: impl Into<PathBuf>,
        template: BranchTemplate,
        mode: PublishMode,
        worktree_dir: impl Into<PathBuf>,
        max_workers: usize,
    ) -> Self {
        Self {
            repo,
            params_file: params_file.into(),
            template,
            mode,
            worktree_dir: worktree_dir.into(),
            max_workers,
        }
    }

    /// Derive `count` descending windows from the params file and publish
    /// each from its own worktree.
    ///
    /// Reports arrive in completion order, one per window; a failed or
    /// panicked task is recorded as a failed report for its year.
    pub async fn publish_years(&self, count: u32) -> Result<Vec<BranchReport>> {
        let params = ParamsFile::open(self.repo.workdir().join(&self.params_file))?;
        let base = params.window()?;
        let windows: Vec<DateWindow> = window::descending(base, count).collect::<Result<_>>()?;

        info!("Generating {count} branches from {} down", base.year());
        fs::create_dir_all(&self.worktree_dir)?;

        let semaphore = Arc::new(Semaphore::new(self.max_workers.max(1)));
        let (tx, mut rx) = mpsc::channel(windows.len().max(1));

        for window in windows {
            let task = WorktreeTask {
                repo: self.repo.clone(),
                params_file: self.params_file.clone(),
                template: self.template,
                mode: self.mode.clone(),
                worktree_dir: self.worktree_dir.clone(),
            };
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();

            tokio::spawn(async move {
                let year = window.year();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let joined = tokio::task::spawn_blocking(move || task.run(window)).await;
                let outcome = match joined {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("task panicked: {e}")),
                };
                let _ = tx.send((year, outcome)).await;
            });
        }
        drop(tx);

        let mut reports = Vec::new();
        while let Some((year, outcome)) = rx.recv().await {
            let report = match outcome {
                Ok(report) => report,
                Err(e) => {
                    error!("Publishing year {year} failed: {e}");
                    BranchReport::new(year, &self.template.branch_name(year))
                }
            };
            if report.success() {
                info!("Branch {} created", report.branch);
            } else {
                warn!("Branch {} finished with failed steps", report.branch);
            }
            reports.push(report);
        }

        Ok(reports)
    }
}

/// One year's publish cycle, confined to its own worktree.
#[derive(Debug, Clone)]
struct WorktreeTask {
    repo: GitRepo,
    params_file: PathBuf,
    template: BranchTemplate,
    mode: PublishMode,
    worktree_dir: PathBuf,
}

impl WorktreeTask {
    fn run(self, window: DateWindow) -> Result<BranchReport> {
        let branch = self.template.branch_name(window.year());
        let path = self.worktree_dir.join(&branch);
        let mut report = BranchReport::new(window.year(), &branch);

        info!("Creating branch {branch} in worktree {}", path.display());
        self.repo.add_worktree(&path, &branch)?;
        report.created = true;

        let worktree = GitRepo::new(&path);
        let params_path = path.join(&self.params_file);
        report.updated = match params::update_window(&params_path, &window) {
            Ok(()) => true,
            Err(e @ SnaprError::ConfigNotFound(_)) => {
                // nothing to commit without the params file; drop the worktree
                let _ = self.repo.remove_worktree(&path);
                return Err(e);
            }
            Err(e) => {
                error!("{branch}: update failed: {e}");
                false
            }
        };

        info!("Committing {} to branch {branch}", self.params_file.display());
        let staged = worktree.stage(&self.params_file);
        report.committed = step(
            &branch,
            "commit",
            staged.and_then(|()| worktree.commit(&format!("Add {branch} version of params.yml"))),
        );

        report.published = match &self.mode {
            PublishMode::Push { remote } => {
                info!("Pushing {branch} to {remote}");
                step(&branch, "push", worktree.push(remote, &branch))
            }
            PublishMode::CloneTo { dest } => {
                let target = dest.join(&branch);
                info!("Cloning {branch} to {}", target.display());
                step(&branch, "clone", worktree.clone_to(&target))
            }
        };

        // the worktree was this task's checkout; removing it is the
        // counterpart of returning to the original branch
        report.returned = step(&branch, "remove worktree", self.repo.remove_worktree(&path));

        Ok(report)
    }
}

fn step(branch: &str, what: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("{branch}: {what} failed: {e}");
            false
        }
    }
}
