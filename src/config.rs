//! Tool configuration: table references, sheet layouts, and the fixed
//! contract constants.
//!
//! The defaults mirror the production deployment so the tool works without a
//! config file; a JSON file at `~/.config/entrega/config.json` (or `--config`)
//! overrides them. Missing fields fall back to defaults, so a config can pin
//! just the spreadsheet ids.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogLayout;
use crate::directory::DirectoryLayout;
use crate::ledger::{LedgerLayout, LEDGER_COLUMNS};
use crate::sheets::TableRef;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schema_version: u32,
    /// The log sheet mapping deliverable codes to catalog metadata.
    pub catalog: TableRef,
    /// The personnel sheet.
    pub directory: TableRef,
    /// The delivered-documents sheet rows are appended to.
    pub ledger: TableRef,
    pub directory_layout: DirectoryLayout,
    pub catalog_layout: CatalogLayout,
    pub ledger_layout: LedgerLayout,
    /// Written verbatim into every ledger row.
    pub contract_name: String,
    pub delivered_by: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        default_config()
    }
}

/// The production deployment this tool was built for.
pub fn default_config() -> AppConfig {
    AppConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        catalog: TableRef {
            spreadsheet_id: "1mMQMXNsiZOXNVVtjzI7ERZPd6sjGhvfIDPU1i5eKm-c".to_string(),
            sheet_title: "LOG".to_string(),
            sheet_gid: 1371253785,
        },
        directory: TableRef {
            spreadsheet_id: "1ndFNkOAGysRB-aTI930Rs31yjDy_2GnUpSNO9CEKt5Y".to_string(),
            sheet_title: "Listado de Personal".to_string(),
            sheet_gid: 1937104554,
        },
        ledger: TableRef {
            spreadsheet_id: "1w0OfsVR00UbBiNALVLbjEvc7wD_tpvj3BUBduTU8cnA".to_string(),
            sheet_title: "DOC. ENTREGADOS".to_string(),
            sheet_gid: 366220896,
        },
        directory_layout: DirectoryLayout::default(),
        catalog_layout: CatalogLayout::default(),
        ledger_layout: LedgerLayout::default(),
        contract_name: "ALIMENTACIÓN Y PREPARACIÓN CENIZA DE SODA PREPARE N° 4 Y N° 5"
            .to_string(),
        delivered_by: "MARÍA REYES".to_string(),
    }
}

/// Default config location under the user config directory.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow!("no user config directory available"))?;
    Ok(base.join("entrega").join("config.json"))
}

/// Load the effective config.
///
/// An explicit path must exist; the default path is optional and falls back
/// to the built-in defaults when absent.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path()?;
            if !path.exists() {
                tracing::debug!("no config file, using built-in defaults");
                return Ok(default_config());
            }
            path
        }
    };
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: AppConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config in stable pretty JSON.
pub fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    for (label, table) in [
        ("catalog", &config.catalog),
        ("directory", &config.directory),
        ("ledger", &config.ledger),
    ] {
        if table.spreadsheet_id.trim().is_empty() {
            return Err(anyhow!("{label} spreadsheet_id must be non-empty"));
        }
        if table.sheet_title.trim().is_empty() {
            return Err(anyhow!("{label} sheet_title must be non-empty"));
        }
    }
    if config.directory_layout.header_row == 0 || config.catalog_layout.header_row == 0 {
        return Err(anyhow!("header rows are 1-based and must be positive"));
    }
    if config.catalog_layout.lookup_column.trim().is_empty() {
        return Err(anyhow!("catalog lookup_column must be non-empty"));
    }
    let ledger = &config.ledger_layout;
    if ledger.start_row == 0 {
        return Err(anyhow!("ledger start_row is 1-based and must be positive"));
    }
    if ledger.column_span as usize != LEDGER_COLUMNS {
        return Err(anyhow!(
            "ledger column_span must be {LEDGER_COLUMNS} (got {})",
            ledger.column_span
        ));
    }
    if ledger.item_column == 0 || ledger.item_column > ledger.column_span {
        return Err(anyhow!(
            "ledger item_column must fall within the {} written columns",
            ledger.column_span
        ));
    }
    if ledger.format_source_offset == 0 {
        return Err(anyhow!("ledger format_source_offset must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        validate_config(&default_config()).unwrap();
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"contract_name": "OTRO CONTRATO"}"#).unwrap();
        assert_eq!(config.contract_name, "OTRO CONTRATO");
        assert_eq!(config.ledger_layout.start_row, 29);
        assert_eq!(config.catalog.sheet_title, "LOG");
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = default_config();
        config.delivered_by = "OTRA PERSONA".to_string();
        write_config(&path, &config).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.delivered_by, "OTRA PERSONA");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/config.json"))).is_err());
    }

    #[test]
    fn bad_geometry_is_rejected() {
        let mut config = default_config();
        config.ledger_layout.item_column = 20;
        assert!(validate_config(&config).is_err());
        let mut config = default_config();
        config.ledger_layout.column_span = 5;
        assert!(validate_config(&config).is_err());
        let mut config = default_config();
        config.schema_version = 99;
        assert!(validate_config(&config).is_err());
    }
}
