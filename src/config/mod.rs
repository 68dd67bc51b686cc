//! Configuration for snapr.
//!
//! Loaded from snapr.yml with a fallback chain:
//! 1. Explicit --config path
//! 2. .snapr.yml in the current directory (project config)
//! 3. ~/.config/snapr/snapr.yml (user config)
//! 4. Default values

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use snapr::publish::BranchTemplate;

/// Top-level configuration for snapr.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Commit identity.
    pub identity: IdentityConfig,

    /// Git settings shared by both workflows.
    pub git: GitConfig,

    /// Branch publishing settings.
    pub publish: PublishConfig,

    /// Branch fetching settings.
    pub fetch: FetchConfig,

    /// Worker pool limits.
    pub concurrency: ConcurrencyConfig,
}

impl Settings {
    /// Load configuration with the fallback chain.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project config
        let project_config = PathBuf::from(".snapr.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(settings) => {
                    log::info!("Loaded config from .snapr.yml");
                    return Ok(settings);
                }
                Err(e) => {
                    log::warn!("Failed to load .snapr.yml: {}", e);
                }
            }
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("snapr").join("snapr.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(settings) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(settings);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let settings: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(settings)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency.max_workers == 0 {
            eyre::bail!("concurrency.max-workers must be > 0");
        }
        if self.publish.years == 0 {
            eyre::bail!("publish.years must be > 0");
        }
        if self.fetch.start_year < self.fetch.end_year {
            eyre::bail!("fetch.start-year must not be older than fetch.end-year");
        }
        Ok(())
    }

    /// Ensure the commit identity is usable before any commit is attempted.
    pub fn validate_identity(&self) -> Result<()> {
        if self.identity.name.trim().is_empty() || self.identity.email.trim().is_empty() {
            eyre::bail!(
                "commit identity is not configured; set identity.name and identity.email in snapr.yml"
            );
        }
        Ok(())
    }
}

/// Commit identity. Must be filled in before publishing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
}

/// Git settings shared by both workflows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Params file path, relative to the working copy root.
    #[serde(rename = "params-file")]
    pub params_file: PathBuf,

    /// Remote that receives pushed branches.
    pub remote: String,

    /// Branch naming template.
    pub template: BranchTemplate,

    /// Scratch directory for the concurrent publisher's worktrees.
    #[serde(rename = "worktree-dir")]
    pub worktree_dir: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            params_file: PathBuf::from("params.yaml"),
            remote: "origin".to_string(),
            template: BranchTemplate::default(),
            worktree_dir: PathBuf::from("/tmp/snapr/worktrees"),
        }
    }
}

/// Branch publishing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Number of yearly branches to create.
    pub years: u32,

    /// When set, finished branches are cloned here instead of pushed.
    #[serde(rename = "dest-dir")]
    pub dest_dir: Option<PathBuf>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            years: 12,
            dest_dir: None,
        }
    }
}

/// Branch fetching settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Remote repository to clone year branches from.
    pub remote: String,

    /// Directory receiving one clone per year.
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Most recent year to fetch.
    #[serde(rename = "start-year")]
    pub start_year: i32,

    /// Oldest year to fetch.
    #[serde(rename = "end-year")]
    pub end_year: i32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            remote: String::new(),
            output_dir: PathBuf::from("tmp"),
            start_year: 2019,
            end_year: 2008,
        }
    }
}

/// Worker pool limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Concurrent git operations.
    #[serde(rename = "max-workers")]
    pub max_workers: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.git.params_file, PathBuf::from("params.yaml"));
        assert_eq!(settings.git.remote, "origin");
        assert_eq!(settings.publish.years, 12);
        assert_eq!(settings.fetch.start_year, 2019);
        assert_eq!(settings.fetch.end_year, 2008);
        assert_eq!(settings.concurrency.max_workers, 4);
    }

    #[test]
    fn test_default_settings_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_invalid() {
        let settings = Settings {
            concurrency: ConcurrencyConfig { max_workers: 0 },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_years_invalid() {
        let settings = Settings {
            publish: PublishConfig {
                years: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_inverted_fetch_range_invalid() {
        let settings = Settings {
            fetch: FetchConfig {
                start_year: 2008,
                end_year: 2019,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_blank_identity_rejected() {
        let settings = Settings::default();
        assert!(settings.validate_identity().is_err());

        let settings = Settings {
            identity: IdentityConfig {
                name: "Dev".to_string(),
                email: "   ".to_string(),
            },
            ..Default::default()
        };
        assert!(settings.validate_identity().is_err());
    }

    #[test]
    fn test_filled_identity_accepted() {
        let settings = Settings {
            identity: IdentityConfig {
                name: "Dev".to_string(),
                email: "dev@example.com".to_string(),
            },
            ..Default::default()
        };
        assert!(settings.validate_identity().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
identity:
  name: Dev
  email: dev@example.com
git:
  params-file: params.yml
  template: multirrotulo-train
publish:
  years: 3
  dest-dir: /data/snapshots
concurrency:
  max-workers: 8
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.identity.name, "Dev");
        assert_eq!(settings.git.params_file, PathBuf::from("params.yml"));
        assert_eq!(settings.git.template, BranchTemplate::MultirrotuloTrain);
        assert_eq!(settings.publish.years, 3);
        assert_eq!(
            settings.publish.dest_dir,
            Some(PathBuf::from("/data/snapshots"))
        );
        assert_eq!(settings.concurrency.max_workers, 8);
        // untouched sections keep their defaults
        assert_eq!(settings.fetch.start_year, 2019);
        assert_eq!(settings.git.remote, "origin");
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("snapr.yml");
        fs::write(&path, "publish:\n  years: 5\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.publish.years, 5);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("absent.yml");
        assert!(Settings::load(Some(&path)).is_err());
    }
}
