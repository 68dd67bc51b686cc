//! Params document access.
//!
//! The params file is the single source of truth for the current training
//! window. Only the two date fields under `collect` are touched; everything
//! else in the document round-trips with its value unchanged (key order and
//! formatting may differ after a rewrite).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde_yaml::Value;

use crate::error::{Result, SnaprError};
use crate::window::DateWindow;

/// Key of the window start date inside the `collect` section.
pub const START_KEY: &str = "data-inicio-treino";

/// Key of the window end date inside the `collect` section.
pub const END_KEY: &str = "data-fim-treino";

/// Textual format of both date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const COLLECT_KEY: &str = "collect";

/// A loaded params document, addressed by its file path.
#[derive(Debug, Clone)]
pub struct ParamsFile {
    path: PathBuf,
    doc: Value,
}

impl ParamsFile {
    /// Open an existing params file. Never creates the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(SnaprError::ConfigNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        let doc = serde_yaml::from_str(&content)?;
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current training window.
    pub fn window(&self) -> Result<DateWindow> {
        let start = self.date_field(START_KEY)?;
        let end = self.date_field(END_KEY)?;
        Ok(DateWindow::new(start, end))
    }

    fn date_field(&self, key: &str) -> Result<NaiveDate> {
        let value = self
            .doc
            .get(COLLECT_KEY)
            .and_then(|collect| collect.get(key))
            .and_then(|value| value.as_str())
            .ok_or_else(|| SnaprError::InvalidParams(format!("missing collect.{key}")))?;
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| SnaprError::InvalidParams(format!("collect.{key}: {e}")))
    }

    /// Set the two window fields, leaving the rest of the document untouched.
    pub fn set_window(&mut self, window: &DateWindow) -> Result<()> {
        let collect = self
            .doc
            .get_mut(COLLECT_KEY)
            .and_then(|collect| collect.as_mapping_mut())
            .ok_or_else(|| SnaprError::InvalidParams(format!("missing {COLLECT_KEY} section")))?;
        collect.insert(
            Value::from(START_KEY),
            Value::from(window.start.format(DATE_FORMAT).to_string()),
        );
        collect.insert(
            Value::from(END_KEY),
            Value::from(window.end.format(DATE_FORMAT).to_string()),
        );
        Ok(())
    }

    /// Write the document back to its path.
    pub fn save(&self) -> Result<()> {
        let content = serde_yaml::to_string(&self.doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Rewrite the window fields of the params file at `path`.
///
/// Fails with `ConfigNotFound` when the path does not resolve to an existing
/// file; the file is never created.
pub fn update_window(path: &Path, window: &DateWindow) -> Result<()> {
    info!(
        "Updating {} with {} and {}",
        path.display(),
        window.start,
        window.end
    );
    let mut params = ParamsFile::open(path)?;
    params.set_window(window)?;
    params.save()?;
    info!("{} updated", path.display());
    Ok(())
}
