use cierre_panel::store;
use std::{env, path::Path, process::exit};

/// Print a persisted panel's columns and rows for a quick eyeball check.
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PANEL_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let panel = store::read_panel(path)?;

    println!("=== Panel: {} ===", path.display());
    println!("Rows:       {}", panel.rows.len());
    println!("Categories: {}", panel.categories.len());
    for category in &panel.categories {
        println!("  - {category}");
    }
    println!();

    for row in &panel.rows {
        let dur = row
            .mean_duration
            .map_or("<null>".to_string(), |v| v.to_string());
        let nproj = row
            .closed_count
            .map_or("<null>".to_string(), |v| v.to_string());
        let pc = row
            .closure_proportion
            .map_or("<null>".to_string(), |v| format!("{v:.4}"));
        println!(
            "{} | {} | total={} | DUR={} | NPROJ={} | PC={}",
            row.department, row.year, row.total, dur, nproj, pc
        );
    }
    Ok(())
}
