use anyhow::Result;
use cierre_panel::{
    clean,
    config::PanelConfig,
    discover, load,
    panel::{build_panel, duration, indicators},
    store,
};
use std::{env, path::Path};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Full pipeline: per-region sources in, indicator panel out. The panel is
/// checkpointed to disk after the counts and durations, re-read, and only
/// then extended with NPROJ and PC, so the final file is the product of a
/// real write-then-read round trip.
fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = match env::args().nth(1) {
        Some(path) => PanelConfig::load(Path::new(&path))?,
        None => PanelConfig::default(),
    };
    info!(
        base_dir = %config.base_dir.display(),
        pattern = %config.source_pattern,
        "run configuration"
    );

    // ─── 3) discover sources ─────────────────────────────────────────
    let sources = discover::discover_sources(&config.base_dir, &config.source_pattern)?;
    if sources.is_empty() {
        warn!("no source tables matched the pattern; nothing to do");
        return Ok(());
    }

    // ─── 4) load + normalize ─────────────────────────────────────────
    let raw = load::load_sources(&sources, true)?;
    info!(rows = raw.len(), "records loaded from all sources");
    let records = clean::normalize(&raw, &config);

    // ─── 5) counts panel + durations ─────────────────────────────────
    let mut panel = build_panel(&records);
    duration::attach_mean_durations(&mut panel, &records);
    info!(
        rows = panel.rows.len(),
        categories = panel.categories.len(),
        "panel built"
    );

    // ─── 6) checkpoint ───────────────────────────────────────────────
    store::write_panel(&panel, &config.output_path)?;

    // ─── 7) reload + indicators ──────────────────────────────────────
    let mut panel = store::read_panel(&config.output_path)?;
    indicators::attach_indicators(&mut panel, &config.closed_status_labels);

    // ─── 8) final write ──────────────────────────────────────────────
    store::write_panel(&panel, &config.output_path)?;
    info!(path = %config.output_path.display(), "panel complete");
    Ok(())
}
