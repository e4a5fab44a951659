use crate::config::PanelConfig;
use crate::load::ProjectRecord;
use std::collections::BTreeSet;
use tracing::info;

/// A record that survived normalization: the closure status is non-empty,
/// the department is not the excluded synthetic bucket, and the year is
/// inside the configured bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub department: String,
    pub year: i64,
    pub closure_status: String,
    pub duration_months: Option<String>,
}

/// Clean the closure-status field and filter out excluded records.
///
/// Blank or missing closure status degrades into the configured sentinel
/// category rather than failing; dirty data is normalized, never rejected.
/// Records in the excluded department bucket (exact match, case-insensitive)
/// or outside the year bounds are dropped. Idempotent over already-clean
/// input.
pub fn normalize(records: &[ProjectRecord], config: &PanelConfig) -> Vec<CleanRecord> {
    let raw_categories: BTreeSet<&str> = records
        .iter()
        .map(|r| r.closure_status.as_deref().unwrap_or(""))
        .collect();
    info!(categories = ?raw_categories, "closure status values before cleaning");

    let mut excluded_department = 0usize;
    let mut out_of_range_year = 0usize;
    let mut clean = Vec::with_capacity(records.len());

    for record in records {
        if record
            .department
            .eq_ignore_ascii_case(&config.excluded_department)
        {
            excluded_department += 1;
            continue;
        }
        let year = match record.year {
            Some(y) if y >= config.year_min && y <= config.year_max => y,
            _ => {
                out_of_range_year += 1;
                continue;
            }
        };

        let status = record.closure_status.as_deref().map(str::trim).unwrap_or("");
        let closure_status = if status.is_empty() {
            config.missing_category_label.clone()
        } else {
            status.to_string()
        };

        clean.push(CleanRecord {
            department: record.department.clone(),
            year,
            closure_status,
            duration_months: record.duration_months.clone(),
        });
    }

    let clean_categories: BTreeSet<&str> =
        clean.iter().map(|r| r.closure_status.as_str()).collect();
    info!(
        kept = clean.len(),
        excluded_department, out_of_range_year,
        categories = ?clean_categories,
        "closure status values after cleaning"
    );
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(department: &str, year: Option<i64>, status: Option<&str>) -> ProjectRecord {
        ProjectRecord {
            department: department.to_string(),
            year,
            closure_status: status.map(str::to_string),
            duration_months: None,
        }
    }

    #[test]
    fn blank_and_missing_status_become_the_sentinel() {
        let config = PanelConfig::default();
        let records = vec![
            raw("Lima", Some(2015), Some("")),
            raw("Lima", Some(2015), Some("   ")),
            raw("Lima", Some(2015), None),
            raw("Lima", Some(2015), Some("  Sí  ")),
        ];
        let clean = normalize(&records, &config);
        assert_eq!(clean.len(), 4);
        assert_eq!(clean[0].closure_status, "Sin registro");
        assert_eq!(clean[1].closure_status, "Sin registro");
        assert_eq!(clean[2].closure_status, "Sin registro");
        assert_eq!(clean[3].closure_status, "Sí");
    }

    #[test]
    fn excluded_department_is_dropped_case_insensitively() {
        let config = PanelConfig::default();
        let records = vec![
            raw("Multi-Departamento", Some(2015), Some("Sí")),
            raw("MULTI-DEPARTAMENTO", Some(2015), Some("Sí")),
            raw("Lima", Some(2015), Some("Sí")),
        ];
        let clean = normalize(&records, &config);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].department, "Lima");
    }

    #[test]
    fn exclusion_is_exact_match_not_substring() {
        let config = PanelConfig::default();
        let records = vec![raw("Multi-Departamento Norte", Some(2015), Some("Sí"))];
        let clean = normalize(&records, &config);
        assert_eq!(clean.len(), 1);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let config = PanelConfig::default();
        let records = vec![
            raw("Lima", Some(2014), Some("Sí")),
            raw("Lima", Some(2015), Some("Sí")),
            raw("Lima", Some(2024), Some("Sí")),
            raw("Lima", Some(2025), Some("Sí")),
            raw("Lima", None, Some("Sí")),
        ];
        let clean = normalize(&records, &config);
        let years: Vec<i64> = clean.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2015, 2024]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let config = PanelConfig::default();
        let records = vec![
            raw("Lima", Some(2015), Some("")),
            raw("Multi-Departamento", Some(2016), Some("No")),
            raw("Cusco", Some(2020), Some("Sí")),
        ];
        let once = normalize(&records, &config);

        let as_raw: Vec<ProjectRecord> = once
            .iter()
            .map(|r| ProjectRecord {
                department: r.department.clone(),
                year: Some(r.year),
                closure_status: Some(r.closure_status.clone()),
                duration_months: r.duration_months.clone(),
            })
            .collect();
        let twice = normalize(&as_raw, &config);
        assert_eq!(once, twice);
    }
}
