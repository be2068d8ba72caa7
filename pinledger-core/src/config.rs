//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "adminCode": "0666",
//!   "historyLimit": 10,
//!   "exportLimit": 50,
//!   "exportDir": "/home/me/statements"
//! }
//! ```
//! Every key is optional and unknown keys are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::result::Result;
use crate::services::DEFAULT_EXPORT_LIMIT;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const DEFAULT_ADMIN_CODE: &str = "0666";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Environment variable that overrides the admin code
pub const ADMIN_CODE_ENV: &str = "BANK_ADMIN_CODE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsFile {
    admin_code: Option<String>,
    history_limit: Option<usize>,
    export_limit: Option<usize>,
    export_dir: Option<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub admin_code: String,
    /// Rows shown by "View History"
    pub history_limit: usize,
    /// Rows written by a statement export
    pub export_limit: usize,
    /// Where statements go; `None` means the current directory
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            export_limit: DEFAULT_EXPORT_LIMIT,
            export_dir: None,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or unreadable settings file yields the defaults. The admin
    /// code can be overridden with `BANK_ADMIN_CODE`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILENAME))?;
        let defaults = Config::default();

        let admin_code = std::env::var(ADMIN_CODE_ENV)
            .ok()
            .filter(|code| !code.trim().is_empty())
            .or(raw.admin_code)
            .map(|code| code.trim().to_string())
            .unwrap_or(defaults.admin_code);

        Ok(Self {
            admin_code,
            history_limit: raw.history_limit.filter(|n| *n > 0).unwrap_or(defaults.history_limit),
            export_limit: raw.export_limit.filter(|n| *n > 0).unwrap_or(defaults.export_limit),
            export_dir: raw.export_dir,
        })
    }

    /// Directory for statement exports
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}
