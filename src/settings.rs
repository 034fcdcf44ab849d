use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audit::{AuditOptions, DEFAULT_OUTLIER_K};
use crate::context::DEFAULT_EXCERPT_ROWS;
use crate::error::{MedicaoError, Result};
use crate::kpi::{DEFAULT_TARGET_FACTOR, DEFAULT_TOP_GROUPS};
use crate::schema::KeywordTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_outlier_k")]
    pub outlier_k: f64,
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
    #[serde(default = "default_top_groups")]
    pub top_groups: usize,
    #[serde(default = "default_excerpt_rows")]
    pub excerpt_rows: usize,
    #[serde(default = "default_target_factor")]
    pub target_factor: f64,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub keywords: KeywordTable,
}

fn default_outlier_k() -> f64 {
    DEFAULT_OUTLIER_K
}

fn default_true() -> bool {
    true
}

fn default_top_groups() -> usize {
    DEFAULT_TOP_GROUPS
}

fn default_excerpt_rows() -> usize {
    DEFAULT_EXCERPT_ROWS
}

fn default_target_factor() -> f64 {
    DEFAULT_TARGET_FACTOR
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            outlier_k: default_outlier_k(),
            audit_enabled: true,
            top_groups: default_top_groups(),
            excerpt_rows: default_excerpt_rows(),
            target_factor: default_target_factor(),
            currency_symbol: default_currency_symbol(),
            keywords: KeywordTable::default(),
        }
    }
}

impl Settings {
    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            enabled: self.audit_enabled,
            outlier_k: self.outlier_k,
        }
    }
}

/// `~/.config/medicao/settings.json`, or relative to the working
/// directory when there is no home.
pub fn settings_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("medicao").join("settings.json")
}

/// Parses one settings file. Fields missing from it take their defaults.
pub fn read_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| MedicaoError::Settings(format!("{}: {e}", path.display())))
}

pub fn write_settings_file(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| MedicaoError::Settings(e.to_string()))?;
    std::fs::write(path, json + "\n")?;
    Ok(())
}

/// Settings for this run. A missing or broken file means defaults; the
/// broken case is logged.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    read_settings_file(&path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable settings, using defaults");
        Settings::default()
    })
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    write_settings_file(&settings_path(), settings)
}
