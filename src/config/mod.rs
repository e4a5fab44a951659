use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration. Defaults mirror the production setup; any subset of
/// fields can be overridden from a YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Directory holding the per-region source tables.
    pub base_dir: PathBuf,
    /// Glob pattern (relative to `base_dir`) matching the source tables.
    pub source_pattern: String,
    /// Destination for the panel checkpoint and the final panel.
    pub output_path: PathBuf,
    /// Inclusive year bounds for the panel.
    pub year_min: i64,
    pub year_max: i64,
    /// Synthetic department bucket dropped at record level. Compared
    /// case-insensitively, exact match.
    pub excluded_department: String,
    /// Category assigned to blank or missing closure status.
    pub missing_category_label: String,
    /// Categories that count as a registered closure for NPROJ. Their exact
    /// spelling is a contract with the source data, so they are injectable
    /// rather than hard-coded.
    pub closed_status_labels: Vec<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_pattern: "GOBIERNO_REGIONAL_*_PROCESADO_CON_DURACION.csv".to_string(),
            output_path: PathBuf::from("PANEL_REGISTRO_CIERRE_2015_2024.parquet"),
            year_min: 2015,
            year_max: 2024,
            excluded_department: "MULTI-DEPARTAMENTO".to_string(),
            missing_category_label: "Sin registro".to_string(),
            closed_status_labels: vec![
                "SI/SNIP".to_string(),
                "Sí, con liquidación".to_string(),
                "Sí, en proceso de liquidación".to_string(),
            ],
        }
    }
}

impl PanelConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
