use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;
use std::path::Path;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Settings;

use snapr::fetch::{self, FetchOutcome, Fetcher};
use snapr::git::GitRepo;
use snapr::params::ParamsFile;
use snapr::publish::{BranchReport, ConcurrentPublisher, PublishMode, Publisher};
use snapr::window::{self, DateWindow};

fn setup_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_ref()).context("Failed to load configuration")?;
    settings.validate().context("Invalid configuration")?;

    run(&cli, &settings).await
}

async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    match &cli.command {
        Commands::Publish {
            repo,
            years,
            start_date,
            concurrent,
            dest,
            remote,
            template,
        } => {
            settings.validate_identity()?;

            let repo = GitRepo::new(repo);
            info!("Workdir: {}", repo.workdir().display());
            repo.set_identity(&settings.identity.name, &settings.identity.email)
                .context("Failed to configure commit identity")?;

            let years = years.unwrap_or(settings.publish.years);
            let template = template.unwrap_or(settings.git.template);
            let mode = match (dest, remote) {
                (Some(dest), _) => PublishMode::CloneTo { dest: dest.clone() },
                (None, Some(remote)) => PublishMode::Push {
                    remote: remote.clone(),
                },
                (None, None) => match &settings.publish.dest_dir {
                    Some(dest) => PublishMode::CloneTo { dest: dest.clone() },
                    None => PublishMode::Push {
                        remote: settings.git.remote.clone(),
                    },
                },
            };

            let reports = if *concurrent {
                let publisher = ConcurrentPublisher::new(
                    repo,
                    settings.git.params_file.clone(),
                    template,
                    mode,
                    settings.git.worktree_dir.clone(),
                    settings.concurrency.max_workers,
                );
                publisher.publish_years(years).await?
            } else {
                let windows = derive_windows(&repo, &settings.git.params_file, *start_date, years)?;
                let publisher =
                    Publisher::new(repo, settings.git.params_file.clone(), template, mode);
                publisher.publish_all(windows)?
            };

            summarize_publish(&reports);
        }

        Commands::Fetch {
            remote,
            output,
            from_year,
            to_year,
            template,
        } => {
            let remote = remote
                .clone()
                .or_else(|| (!settings.fetch.remote.is_empty()).then(|| settings.fetch.remote.clone()));
            let Some(remote) = remote else {
                bail!("fetch remote is not configured; pass --remote or set fetch.remote");
            };

            let output = output.clone().unwrap_or_else(|| settings.fetch.output_dir.clone());
            let from = from_year.unwrap_or(settings.fetch.start_year);
            let to = to_year.unwrap_or(settings.fetch.end_year);
            if from < to {
                bail!("--from-year must not be older than --to-year");
            }

            let template = template.unwrap_or(settings.git.template);
            let fetcher = Fetcher::new(
                remote,
                output,
                template,
                settings.concurrency.max_workers,
            );
            let outcomes = fetcher.fetch_years(fetch::year_range_desc(from, to)).await;
            summarize_fetch(&outcomes);
        }
    }

    Ok(())
}

/// Windows for the sequential publisher: descending from the params file's
/// current window, or ascending from a literal start date when one is given.
fn derive_windows(
    repo: &GitRepo,
    params_file: &Path,
    start_date: Option<chrono::NaiveDate>,
    years: u32,
) -> Result<Vec<DateWindow>> {
    if let Some(start) = start_date {
        return Ok(window::ascending_years(start, years)?);
    }
    let params = ParamsFile::open(repo.workdir().join(params_file))?;
    let base = params.window()?;
    let windows = window::descending(base, years).collect::<snapr::Result<Vec<_>>>()?;
    Ok(windows)
}

fn summarize_publish(reports: &[BranchReport]) {
    let failed = reports.iter().filter(|r| !r.success()).count();
    for report in reports {
        if report.success() {
            println!("{} {}", "published:".green(), report.branch);
        } else {
            println!("{} {}", "failed:".red(), report.branch);
        }
    }
    println!(
        "{} {} branches, {} failed",
        "done:".cyan(),
        reports.len(),
        failed
    );
}

fn summarize_fetch(outcomes: &[FetchOutcome]) {
    let failed = outcomes.iter().filter(|o| !o.success).count();
    for outcome in outcomes {
        if outcome.success {
            println!("{} {}", "cloned:".green(), outcome.year);
        } else {
            println!("{} {}", "failed:".red(), outcome.year);
        }
    }
    println!(
        "{} {} clones, {} failed",
        "done:".cyan(),
        outcomes.len(),
        failed
    );
}
