use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEPARTMENT_COLUMN: &str = "Departamento";
pub const YEAR_COLUMN: &str = "año";
pub const STATUS_COLUMN: &str = "Registro Cierre";
pub const DURATION_COLUMN: &str = "duracion_meses";

/// One project observation as it comes off a source table, projected down to
/// the required columns. Nothing is cleaned yet: the year may have failed to
/// parse, the closure status may be blank or absent, and the duration stays
/// raw text until aggregation coerces it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub department: String,
    pub year: Option<i64>,
    pub closure_status: Option<String>,
    pub duration_months: Option<String>,
}

/// Read every source table and concatenate their rows in file order.
///
/// A table missing any required column is logged and skipped; its rows
/// contribute nothing. A table that cannot be opened or parsed at all is
/// fatal for the whole run. Rows are never deduplicated.
pub fn load_sources(paths: &[PathBuf], require_duration: bool) -> Result<Vec<ProjectRecord>> {
    let mut required = vec![DEPARTMENT_COLUMN, YEAR_COLUMN, STATUS_COLUMN];
    if require_duration {
        required.push(DURATION_COLUMN);
    }

    let mut records = Vec::new();
    for path in paths {
        let before = records.len();
        if load_one(path, &required, &mut records)? {
            info!(
                file = %path.display(),
                rows = records.len() - before,
                "source table loaded"
            );
        }
    }
    Ok(records)
}

/// Returns false when the table was skipped for missing columns.
fn load_one(path: &Path, required: &[&str], out: &mut Vec<ProjectRecord>) -> Result<bool> {
    let file = File::open(path)
        .with_context(|| format!("failed to open source table {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .clone();

    let mut missing = Vec::new();
    let mut indices = Vec::with_capacity(required.len());
    for name in required {
        match headers.iter().position(|h| h.trim() == *name) {
            Some(i) => indices.push(i),
            None => missing.push(*name),
        }
    }
    if !missing.is_empty() {
        warn!(
            file = %path.display(),
            missing = ?missing,
            "source table missing required columns; skipped"
        );
        return Ok(false);
    }

    let duration_index = indices.get(3).copied();
    for (row, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at row {}", path.display(), row))?;
        out.push(ProjectRecord {
            department: record.get(indices[0]).unwrap_or_default().to_string(),
            year: record
                .get(indices[1])
                .and_then(|s| s.trim().parse::<i64>().ok()),
            closure_status: record.get(indices[2]).map(str::to_string),
            duration_months: duration_index
                .and_then(|i| record.get(i))
                .map(str::to_string),
        });
    }
    Ok(true)
}
