use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use csv::ReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const REGION_COLUMN: &str = "REGION";
pub const YEAR_COLUMN: &str = "AÑO";
pub const SURFACE_COLUMN: &str = "SUPERFICIE";

/// One row of the long surface panel: a region's surface area replicated
/// for a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRow {
    pub region: String,
    pub year: i64,
    pub surface: Option<f64>,
}

/// Read the regional surface table: first column is the region, second the
/// surface area. Column names are ignored; position is the contract.
/// Non-numeric surface values become None.
pub fn read_region_surfaces(path: &Path) -> Result<Vec<(String, Option<f64>)>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open surface table {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut regions = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at row {}", path.display(), row))?;
        let region = record.get(0).unwrap_or_default().trim().to_string();
        let surface = record
            .get(1)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        regions.push((region, surface));
    }
    info!(regions = regions.len(), file = %path.display(), "surface table loaded");
    Ok(regions)
}

/// Replicate each region's surface value across every year in the inclusive
/// bounds, sorted by (region, year).
pub fn expand_surface_panel(
    regions: &[(String, Option<f64>)],
    year_min: i64,
    year_max: i64,
) -> Vec<SurfaceRow> {
    let mut rows: Vec<SurfaceRow> = regions
        .iter()
        .flat_map(|(region, surface)| {
            (year_min..=year_max).map(move |year| SurfaceRow {
                region: region.clone(),
                year,
                surface: *surface,
            })
        })
        .collect();
    rows.sort_by(|a, b| (a.region.as_str(), a.year).cmp(&(b.region.as_str(), b.year)));
    rows
}

/// Persist the long panel as Parquet: REGION | AÑO | SUPERFICIE.
pub fn write_surface_panel(rows: &[SurfaceRow], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(REGION_COLUMN, DataType::Utf8, false),
        Field::new(YEAR_COLUMN, DataType::Int64, false),
        Field::new(SURFACE_COLUMN, DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.region.as_str()),
        )),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.surface))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .context("assembling surface panel batch")?;

    let tmp_path = path.with_extension("parquet.tmp");
    let file = File::create(&tmp_path)
        .with_context(|| format!("creating temporary surface panel {}", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).context("initializing Parquet writer")?;
    writer.write(&batch).context("writing surface panel batch")?;
    writer.close().context("closing Parquet writer")?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming surface panel into place at {}", path.display()))?;

    info!(path = %path.display(), rows = rows.len(), "surface panel written");
    Ok(())
}
