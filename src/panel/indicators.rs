use super::Panel;
use tracing::warn;

/// Derive NPROJ and PC over a panel, normally one freshly reloaded from the
/// checkpoint file.
///
/// Each designated closed-status label that was never observed in the data
/// is created as an all-zero category column, with a diagnostic. NPROJ is
/// the elementwise sum of the designated columns. PC is NPROJ divided by the
/// row total, unrounded, and stays None wherever the total is zero; 0/0 is
/// never computed.
pub fn attach_indicators(panel: &mut Panel, closed_labels: &[String]) {
    for label in closed_labels {
        if panel.category_index(label).is_none() {
            warn!(
                category = %label,
                "designated closed category never observed; creating it with zeros"
            );
            panel.categories.push(label.clone());
            for row in &mut panel.rows {
                row.counts.push(0);
            }
        }
    }

    let closed_indices: Vec<usize> = closed_labels
        .iter()
        .filter_map(|label| panel.category_index(label))
        .collect();

    for row in &mut panel.rows {
        let closed: i64 = closed_indices.iter().map(|&i| row.counts[i]).sum();
        row.closed_count = Some(closed);
        row.closure_proportion = if row.total > 0 {
            Some(closed as f64 / row.total as f64)
        } else {
            None
        };
    }
}
