use crate::panel::{Panel, PanelRow};
use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const DEPARTMENT_COLUMN: &str = "Departamento";
pub const YEAR_COLUMN: &str = "año";
pub const TOTAL_COLUMN: &str = "Total general";
pub const DURATION_COLUMN: &str = "DUR";
pub const CLOSED_COUNT_COLUMN: &str = "NPROJ";
pub const PROPORTION_COLUMN: &str = "PC";

/// Persist the panel as a single-batch Parquet file.
///
/// The arrow schema is built at runtime from the category vocabulary; DUR,
/// NPROJ and PC columns are written only when the corresponding stage has
/// run. The file is written to a temp path and renamed into place, so a
/// reader never sees a half-written checkpoint.
pub fn write_panel(panel: &Panel, path: &Path) -> Result<()> {
    let (schema, columns) = panel_columns(panel);
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .context("assembling panel record batch")?;

    let tmp_path = path.with_extension("parquet.tmp");
    let file = File::create(&tmp_path)
        .with_context(|| format!("creating temporary panel file {}", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).context("initializing Parquet writer")?;
    writer.write(&batch).context("writing panel batch")?;
    writer.close().context("closing Parquet writer")?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming panel file into place at {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = panel.rows.len(),
        categories = panel.categories.len(),
        "panel written"
    );
    Ok(())
}

fn panel_columns(panel: &Panel) -> (Schema, Vec<ArrayRef>) {
    let rows = &panel.rows;
    let mut fields = vec![
        Field::new(DEPARTMENT_COLUMN, DataType::Utf8, false),
        Field::new(YEAR_COLUMN, DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.department.as_str()),
        )),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
    ];

    for (i, category) in panel.categories.iter().enumerate() {
        fields.push(Field::new(category, DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from_iter_values(
            rows.iter().map(|r| r.counts[i]),
        )));
    }

    fields.push(Field::new(TOTAL_COLUMN, DataType::Int64, false));
    columns.push(Arc::new(Int64Array::from_iter_values(
        rows.iter().map(|r| r.total),
    )));

    if panel.has_durations() {
        fields.push(Field::new(DURATION_COLUMN, DataType::Int64, true));
        columns.push(Arc::new(Int64Array::from_iter(
            rows.iter().map(|r| r.mean_duration),
        )));
    }

    if panel.has_indicators() {
        fields.push(Field::new(CLOSED_COUNT_COLUMN, DataType::Int64, true));
        columns.push(Arc::new(Int64Array::from_iter(
            rows.iter().map(|r| r.closed_count),
        )));
        fields.push(Field::new(PROPORTION_COLUMN, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from_iter(
            rows.iter().map(|r| r.closure_proportion),
        )));
    }

    (Schema::new(fields), columns)
}

/// Reload a persisted panel.
///
/// `Departamento`, `año` and `Total general` must be present; a checkpoint
/// without them is structurally incompatible and the run aborts with the
/// missing column named. DUR, NPROJ and PC are optional. Every remaining
/// column is a category column, in file order. Null cells come back as None,
/// never as zero.
pub fn read_panel(path: &Path) -> Result<Panel> {
    let file =
        File::open(path).with_context(|| format!("opening panel file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading Parquet metadata of {}", path.display()))?;
    let schema = builder.schema().clone();
    let mut reader = builder
        .with_batch_size(8_192)
        .build()
        .with_context(|| format!("building Parquet reader for {}", path.display()))?;

    let mut department_idx = None;
    let mut year_idx = None;
    let mut total_idx = None;
    let mut duration_idx = None;
    let mut closed_idx = None;
    let mut proportion_idx = None;
    let mut categories = Vec::new();
    let mut category_indices = Vec::new();

    for (i, field) in schema.fields().iter().enumerate() {
        match field.name().as_str() {
            DEPARTMENT_COLUMN => department_idx = Some(i),
            YEAR_COLUMN => year_idx = Some(i),
            TOTAL_COLUMN => total_idx = Some(i),
            DURATION_COLUMN => duration_idx = Some(i),
            CLOSED_COUNT_COLUMN => closed_idx = Some(i),
            PROPORTION_COLUMN => proportion_idx = Some(i),
            other => {
                categories.push(other.to_string());
                category_indices.push(i);
            }
        }
    }
    let department_idx = department_idx.ok_or_else(|| missing_column(path, DEPARTMENT_COLUMN))?;
    let year_idx = year_idx.ok_or_else(|| missing_column(path, YEAR_COLUMN))?;
    let total_idx = total_idx.ok_or_else(|| missing_column(path, TOTAL_COLUMN))?;

    let mut rows = Vec::new();
    while let Some(batch) = reader
        .next()
        .transpose()
        .with_context(|| format!("reading record batch from {}", path.display()))?
    {
        let departments = string_column(&batch, department_idx, DEPARTMENT_COLUMN)?;
        let years = int64_column(&batch, year_idx, YEAR_COLUMN)?;
        let totals = int64_column(&batch, total_idx, TOTAL_COLUMN)?;
        let durations = duration_idx
            .map(|i| int64_column(&batch, i, DURATION_COLUMN))
            .transpose()?;
        let closed = closed_idx
            .map(|i| int64_column(&batch, i, CLOSED_COUNT_COLUMN))
            .transpose()?;
        let proportions = proportion_idx
            .map(|i| float64_column(&batch, i, PROPORTION_COLUMN))
            .transpose()?;
        let count_columns = category_indices
            .iter()
            .zip(&categories)
            .map(|(&i, name)| int64_column(&batch, i, name))
            .collect::<Result<Vec<_>>>()?;

        for r in 0..batch.num_rows() {
            rows.push(PanelRow {
                department: departments.value(r).to_string(),
                year: years.value(r),
                counts: count_columns.iter().map(|col| col.value(r)).collect(),
                total: totals.value(r),
                mean_duration: durations.and_then(|col| nullable_i64(col, r)),
                closed_count: closed.and_then(|col| nullable_i64(col, r)),
                closure_proportion: proportions.and_then(|col| nullable_f64(col, r)),
            });
        }
    }

    info!(
        path = %path.display(),
        rows = rows.len(),
        categories = categories.len(),
        "panel reloaded"
    );
    Ok(Panel { categories, rows })
}

fn missing_column(path: &Path, column: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "panel file {} is missing the `{}` column; the checkpoint is structurally incompatible",
        path.display(),
        column
    )
}

fn string_column<'a>(batch: &'a RecordBatch, idx: usize, name: &str) -> Result<&'a StringArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| format!("column `{name}` is not a string column"))
}

fn int64_column<'a>(batch: &'a RecordBatch, idx: usize, name: &str) -> Result<&'a Int64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Int64Array>()
        .with_context(|| format!("column `{name}` is not an integer column"))
}

fn float64_column<'a>(batch: &'a RecordBatch, idx: usize, name: &str) -> Result<&'a Float64Array> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .with_context(|| format!("column `{name}` is not a float column"))
}

fn nullable_i64(array: &Int64Array, row: usize) -> Option<i64> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row))
    }
}

fn nullable_f64(array: &Float64Array, row: usize) -> Option<f64> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row))
    }
}
