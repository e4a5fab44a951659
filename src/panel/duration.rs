use super::Panel;
use crate::clean::CleanRecord;
use std::collections::BTreeMap;
use tracing::debug;

/// Compute the mean `duracion_meses` per (department, year) and join it onto
/// the panel rows as DUR.
///
/// Non-numeric durations are missing, not errors; the mean ignores them. A
/// group with no numeric durations at all gets None, never zero. The mean is
/// rounded to a whole number of months with ties-to-even (2.5 rounds to 2,
/// 3.5 rounds to 4). Panel rows with no matching duration group stay None.
pub fn attach_mean_durations(panel: &mut Panel, records: &[CleanRecord]) {
    let mut sums: BTreeMap<(&str, i64), (f64, u64)> = BTreeMap::new();
    for record in records {
        let Some(raw) = record.duration_months.as_deref() else {
            continue;
        };
        let Ok(value) = raw.trim().parse::<f64>() else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        let entry = sums
            .entry((record.department.as_str(), record.year))
            .or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    debug!(groups = sums.len(), "duration means computed");

    for row in &mut panel.rows {
        row.mean_duration = sums
            .get(&(row.department.as_str(), row.year))
            .map(|&(sum, n)| (sum / n as f64).round_ties_even() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::record;
    use super::*;
    use crate::panel::build_panel;

    fn panel_with_durations(records: &[CleanRecord]) -> Panel {
        let mut panel = build_panel(records);
        attach_mean_durations(&mut panel, records);
        panel
    }

    #[test]
    fn mean_ignores_missing_and_non_numeric_values() {
        let records = vec![
            record("Lima", 2015, "Sí", Some("10")),
            record("Lima", 2015, "Sí", Some("20")),
            record("Lima", 2015, "Sí", Some("abc")),
            record("Lima", 2015, "Sí", None),
        ];
        let panel = panel_with_durations(&records);
        assert_eq!(panel.rows[0].mean_duration, Some(15));
    }

    #[test]
    fn group_with_no_numeric_durations_is_null_not_zero() {
        let records = vec![
            record("Lima", 2015, "Sí", None),
            record("Lima", 2015, "Sí", Some("NaN")),
        ];
        let panel = panel_with_durations(&records);
        assert_eq!(panel.rows[0].mean_duration, None);
    }

    #[test]
    fn rounding_is_ties_to_even() {
        // mean 2.5 -> 2
        let records = vec![
            record("Lima", 2015, "Sí", Some("2")),
            record("Lima", 2015, "Sí", Some("3")),
        ];
        assert_eq!(panel_with_durations(&records).rows[0].mean_duration, Some(2));

        // mean 3.5 -> 4
        let records = vec![
            record("Lima", 2015, "Sí", Some("3")),
            record("Lima", 2015, "Sí", Some("4")),
        ];
        assert_eq!(panel_with_durations(&records).rows[0].mean_duration, Some(4));
    }

    #[test]
    fn groups_are_keyed_by_department_and_year() {
        let records = vec![
            record("Lima", 2015, "Sí", Some("10")),
            record("Lima", 2016, "Sí", Some("30")),
            record("Cusco", 2015, "Sí", Some("6")),
        ];
        let panel = panel_with_durations(&records);
        let by_key: Vec<(&str, i64, Option<i64>)> = panel
            .rows
            .iter()
            .map(|r| (r.department.as_str(), r.year, r.mean_duration))
            .collect();
        assert_eq!(
            by_key,
            vec![
                ("Cusco", 2015, Some(6)),
                ("Lima", 2015, Some(10)),
                ("Lima", 2016, Some(30)),
            ]
        );
    }
}
