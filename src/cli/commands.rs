//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - publish: create one year-named branch per training window
//! - fetch: clone published year branches, one directory per year

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use snapr::publish::BranchTemplate;

/// snapr - yearly snapshot branch automation
#[derive(Parser, Debug)]
#[command(name = "snapr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create one year-named branch per training window
    Publish {
        /// Path to the git working copy
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Number of yearly branches to create
        #[arg(short = 'n', long)]
        years: Option<u32>,

        /// Walk forward from this literal start date instead of reading the
        /// window from the params file
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Publish each branch from its own git worktree, in parallel
        #[arg(long)]
        concurrent: bool,

        /// Clone finished branches into this directory instead of pushing
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Remote to push finished branches to
        #[arg(long)]
        remote: Option<String>,

        /// Branch naming template (params | multirrotulo-train)
        #[arg(short, long)]
        template: Option<BranchTemplate>,
    },

    /// Clone published year branches, one directory per year
    Fetch {
        /// Remote repository to clone from
        #[arg(long)]
        remote: Option<String>,

        /// Directory receiving one clone per year
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Most recent year to fetch
        #[arg(long)]
        from_year: Option<i32>,

        /// Oldest year to fetch
        #[arg(long)]
        to_year: Option<i32>,

        /// Branch naming template (params | multirrotulo-train)
        #[arg(short, long)]
        template: Option<BranchTemplate>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["snapr"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["snapr", "-v", "fetch"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["snapr", "-c", "/path/to/snapr.yml", "fetch"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/snapr.yml")));
    }

    #[test]
    fn test_publish_defaults() {
        let cli = Cli::try_parse_from(["snapr", "publish"]).unwrap();
        match cli.command {
            Commands::Publish {
                repo,
                years,
                start_date,
                concurrent,
                dest,
                remote,
                template,
            } => {
                assert_eq!(repo, PathBuf::from("."));
                assert!(years.is_none());
                assert!(start_date.is_none());
                assert!(!concurrent);
                assert!(dest.is_none());
                assert!(remote.is_none());
                assert!(template.is_none());
            }
            _ => panic!("Expected publish command"),
        }
    }

    #[test]
    fn test_publish_with_options() {
        let cli = Cli::try_parse_from([
            "snapr",
            "publish",
            "--repo",
            "/work/repo",
            "-n",
            "3",
            "--concurrent",
            "--dest",
            "/data/snapshots",
            "-t",
            "multirrotulo-train",
        ])
        .unwrap();
        match cli.command {
            Commands::Publish {
                repo,
                years,
                concurrent,
                dest,
                template,
                ..
            } => {
                assert_eq!(repo, PathBuf::from("/work/repo"));
                assert_eq!(years, Some(3));
                assert!(concurrent);
                assert_eq!(dest, Some(PathBuf::from("/data/snapshots")));
                assert_eq!(template, Some(BranchTemplate::MultirrotuloTrain));
            }
            _ => panic!("Expected publish command"),
        }
    }

    #[test]
    fn test_publish_start_date() {
        let cli =
            Cli::try_parse_from(["snapr", "publish", "--start-date", "2019-01-01"]).unwrap();
        match cli.command {
            Commands::Publish { start_date, .. } => {
                assert_eq!(
                    start_date,
                    Some(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap())
                );
            }
            _ => panic!("Expected publish command"),
        }
    }

    #[test]
    fn test_publish_bad_start_date_rejected() {
        assert!(Cli::try_parse_from(["snapr", "publish", "--start-date", "01/01/2019"]).is_err());
    }

    #[test]
    fn test_publish_bad_template_rejected() {
        assert!(Cli::try_parse_from(["snapr", "publish", "-t", "weekly"]).is_err());
    }

    #[test]
    fn test_fetch_defaults() {
        let cli = Cli::try_parse_from(["snapr", "fetch"]).unwrap();
        match cli.command {
            Commands::Fetch {
                remote,
                output,
                from_year,
                to_year,
                template,
            } => {
                assert!(remote.is_none());
                assert!(output.is_none());
                assert!(from_year.is_none());
                assert!(to_year.is_none());
                assert!(template.is_none());
            }
            _ => panic!("Expected fetch command"),
        }
    }

    #[test]
    fn test_fetch_with_options() {
        let cli = Cli::try_parse_from([
            "snapr",
            "fetch",
            "--remote",
            "https://example.com/repo.git",
            "-o",
            "snapshots",
            "--from-year",
            "2019",
            "--to-year",
            "2008",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch {
                remote,
                output,
                from_year,
                to_year,
                ..
            } => {
                assert_eq!(remote, Some("https://example.com/repo.git".to_string()));
                assert_eq!(output, Some(PathBuf::from("snapshots")));
                assert_eq!(from_year, Some(2019));
                assert_eq!(to_year, Some(2008));
            }
            _ => panic!("Expected fetch command"),
        }
    }

    #[test]
    fn test_help_works() {
        // Verify help doesn't panic
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["snapr", "--version"]);
        // Version flag causes early exit with error (expected)
        assert!(result.is_err());
    }
}
