//! Branch publishing: one year-named branch per training window.
//!
//! Each window gets a branch whose name is derived from its year, the params
//! file is rewritten to bracket that year, and the result is committed and
//! published by push or by cloning the working tree. Step failures are
//! recorded, not raised: every step is attempted so the log shows the full
//! picture, and the overall result is the conjunction of all steps.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnaprError};
use crate::git::GitRepo;
use crate::params;
use crate::window::DateWindow;

pub mod concurrent;

pub use concurrent::ConcurrentPublisher;

/// Naming template for year branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchTemplate {
    /// `params_{year}`
    #[default]
    Params,
    /// `multirrotulo-train-{year}`
    MultirrotuloTrain,
}

impl BranchTemplate {
    /// Branch name for `year`. Pure: same year, same name.
    pub fn branch_name(&self, year: i32) -> String {
        match self {
            BranchTemplate::Params => format!("params_{year}"),
            BranchTemplate::MultirrotuloTrain => format!("multirrotulo-train-{year}"),
        }
    }
}

impl fmt::Display for BranchTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchTemplate::Params => write!(f, "params"),
            BranchTemplate::MultirrotuloTrain => write!(f, "multirrotulo-train"),
        }
    }
}

impl FromStr for BranchTemplate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "params" => Ok(BranchTemplate::Params),
            "multirrotulo-train" => Ok(BranchTemplate::MultirrotuloTrain),
            other => Err(format!(
                "unknown branch template '{other}' (expected 'params' or 'multirrotulo-train')"
            )),
        }
    }
}

/// Where a finished branch goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishMode {
    /// `git push <remote> <branch>`
    Push { remote: String },
    /// `git clone . <dest>/<branch>`
    CloneTo { dest: PathBuf },
}

/// Per-branch step outcomes. Overall success is the conjunction of all five.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReport {
    pub year: i32,
    pub branch: String,
    /// Branch created and checked out
    pub created: bool,
    /// Window rewritten into the params file
    pub updated: bool,
    /// Params file staged and committed
    pub committed: bool,
    /// Branch pushed or cloned out
    pub published: bool,
    /// Original checkout restored
    pub returned: bool,
}

impl BranchReport {
    fn new(year: i32, branch: &str) -> Self {
        Self {
            year,
            branch: branch.to_string(),
            created: false,
            updated: false,
            committed: false,
            published: false,
            returned: false,
        }
    }

    pub fn success(&self) -> bool {
        self.created && self.updated && self.committed && self.published && self.returned
    }
}

/// Publishes year branches from a single working copy, one window at a time.
#[derive(Debug, Clone)]
pub struct Publisher {
    repo: GitRepo,
    /// Params file path relative to the working copy root
    params_file: PathBuf,
    template: BranchTemplate,
    mode: PublishMode,
}

impl Publisher {
    pub fn new(
        repo: GitRepo,
        params_file: impl Into<PathBuf>,
        template: BranchTemplate,
        mode: PublishMode,
    ) -> Self {
        Self {
            repo,
            params_file: params_file.into(),
            template,
            mode,
        }
    }

    /// Publish one branch per window, in order.
    ///
    /// A failed year never stops the run; the report list always has one
    /// entry per window.
    pub fn publish_all(
        &self,
        windows: impl IntoIterator<Item = DateWindow>,
    ) -> Result<Vec<BranchReport>> {
        let original = self.repo.current_branch()?;
        let mut reports = Vec::new();

        for window in windows {
            let report = match self.publish_window(&window, &original) {
                Ok(report) => report,
                Err(e) => {
                    let branch = self.template.branch_name(window.year());
                    error!("Publishing {branch} aborted: {e}");
                    BranchReport::new(window.year(), &branch)
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

    /// Publish one branch for `window`, then return to `original`.
    ///
    /// Every step runs regardless of earlier step failures; only a missing
    /// params file aborts this branch.
    pub fn publish_window(&self, window: &DateWindow, original: &str) -> Result<BranchReport> {
        let branch = self.template.branch_name(window.year());
        let mut report = BranchReport::new(window.year(), &branch);

        info!("Creating branch {branch}");
        report.created = self.step(&branch, "create", self.repo.create_branch(&branch));

        let params_path = self.repo.workdir().join(&self.params_file);
        report.updated = match params::update_window(&params_path, window) {
            Ok(()) => true,
            Err(e @ SnaprError::ConfigNotFound(_)) => return Err(e),
            Err(e) => {
                error!("{branch}: update failed: {e}");
                false
            }
        };

        info!("Committing {} to branch {branch}", self.params_file.display());
        let staged = self.repo.stage(&self.params_file);
        report.committed = self.step(
            &branch,
            "commit",
            staged.and_then(|()| {
                self.repo
                    .commit(&format!("Add {branch} version of params.yml"))
            }),
        );

        report.published = match &self.mode {
            PublishMode::Push { remote } => {
                info!("Pushing {branch} to {remote}");
                self.step(&branch, "push", self.repo.push(remote, &branch))
            }
            PublishMode::CloneTo { dest } => {
                let target = dest.join(&branch);
                info!("Cloning {branch} to {}", target.display());
                self.step(&branch, "clone", self.repo.clone_to(&target))
            }
        };

        report.returned = self.step(&branch, "checkout back", self.repo.checkout(original));

        Ok(report)
    }

    fn step(&self, branch: &str, what: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                error!("{branch}: {what} failed: {e}");
                false
            }
        }
    }
}
