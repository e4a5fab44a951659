pub mod duration;
pub mod indicators;

use crate::clean::CleanRecord;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The wide panel: one row per (department, year), one count column per
/// closure-status category. The category vocabulary is discovered from the
/// data at runtime, so the row shape is a parallel `counts` vector rather
/// than a fixed struct.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    /// Global ordered category vocabulary; every row carries a count for
    /// every entry, observed or not.
    pub categories: Vec<String>,
    /// Sorted ascending by (department, year).
    pub rows: Vec<PanelRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub department: String,
    pub year: i64,
    /// Parallel to `Panel::categories`.
    pub counts: Vec<i64>,
    /// Row-wise sum of `counts`.
    pub total: i64,
    /// DUR: rounded mean of duracion_meses, None when no numeric durations
    /// exist for the group.
    pub mean_duration: Option<i64>,
    /// NPROJ: set by the indicator stage.
    pub closed_count: Option<i64>,
    /// PC: set by the indicator stage; None when total is zero.
    pub closure_proportion: Option<f64>,
}

impl Panel {
    pub fn category_index(&self, label: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == label)
    }

    /// True once the indicator stage has run over every row.
    pub fn has_indicators(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.closed_count.is_some())
    }

    /// True when at least one group produced a mean duration.
    pub fn has_durations(&self) -> bool {
        self.rows.iter().any(|r| r.mean_duration.is_some())
    }
}

/// Group records by (department, year, category), count, and pivot dense:
/// every distinct category observed anywhere becomes a column for every row,
/// with 0 where the combination never occurred. Rows come out sorted by
/// (department, year).
pub fn build_panel(records: &[CleanRecord]) -> Panel {
    // First pass: the global category vocabulary.
    let vocabulary: BTreeSet<&str> = records.iter().map(|r| r.closure_status.as_str()).collect();
    let categories: Vec<String> = vocabulary.into_iter().map(str::to_string).collect();
    let index: BTreeMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    debug!(categories = ?categories, "panel category vocabulary");

    // Second pass: dense counts per (department, year).
    let mut groups: BTreeMap<(String, i64), Vec<i64>> = BTreeMap::new();
    for record in records {
        let counts = groups
            .entry((record.department.clone(), record.year))
            .or_insert_with(|| vec![0; categories.len()]);
        counts[index[record.closure_status.as_str()]] += 1;
    }

    let rows = groups
        .into_iter()
        .map(|((department, year), counts)| {
            let total = counts.iter().sum();
            PanelRow {
                department,
                year,
                counts,
                total,
                mean_duration: None,
                closed_count: None,
                closure_proportion: None,
            }
        })
        .collect();

    Panel { categories, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn record(
        department: &str,
        year: i64,
        status: &str,
        duration: Option<&str>,
    ) -> CleanRecord {
        CleanRecord {
            department: department.to_string(),
            year,
            closure_status: status.to_string(),
            duration_months: duration.map(str::to_string),
        }
    }

    #[test]
    fn pivot_is_dense_over_the_global_vocabulary() {
        // "No" only ever occurs in Cusco, but Lima still gets the column.
        let records = vec![
            record("Lima", 2015, "Sí", None),
            record("Cusco", 2015, "No", None),
            record("Cusco", 2016, "Sí", None),
        ];
        let panel = build_panel(&records);
        assert_eq!(panel.categories, vec!["No".to_string(), "Sí".to_string()]);
        for row in &panel.rows {
            assert_eq!(row.counts.len(), panel.categories.len());
        }

        let lima = &panel.rows[panel
            .rows
            .iter()
            .position(|r| r.department == "Lima")
            .unwrap()];
        assert_eq!(lima.counts, vec![0, 1]);
    }

    #[test]
    fn total_equals_sum_of_category_counts() {
        let records = vec![
            record("Lima", 2015, "Sí", None),
            record("Lima", 2015, "Sí", None),
            record("Lima", 2015, "No", None),
            record("Lima", 2015, "Sin registro", None),
        ];
        let panel = build_panel(&records);
        assert_eq!(panel.rows.len(), 1);
        let row = &panel.rows[0];
        assert_eq!(row.total, row.counts.iter().sum::<i64>());
        assert_eq!(row.total, 4);
    }

    #[test]
    fn rows_sorted_by_department_then_year() {
        let records = vec![
            record("Puno", 2016, "Sí", None),
            record("Cusco", 2020, "Sí", None),
            record("Puno", 2015, "Sí", None),
            record("Cusco", 2015, "Sí", None),
        ];
        let panel = build_panel(&records);
        let keys: Vec<(&str, i64)> = panel
            .rows
            .iter()
            .map(|r| (r.department.as_str(), r.year))
            .collect();
        assert_eq!(
            keys,
            vec![("Cusco", 2015), ("Cusco", 2020), ("Puno", 2015), ("Puno", 2016)]
        );
    }

    #[test]
    fn empty_input_yields_empty_panel() {
        let panel = build_panel(&[]);
        assert!(panel.categories.is_empty());
        assert!(panel.rows.is_empty());
    }
}
