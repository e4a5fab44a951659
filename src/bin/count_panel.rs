//! Count-only variant of the pipeline: builds the category-count panel with
//! its totals but skips the duration and indicator stages. Useful when the
//! source tables carry no `duracion_meses` column.

use anyhow::Result;
use cierre_panel::{clean, config::PanelConfig, discover, load, panel::build_panel, store};
use std::{env, path::Path};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = match env::args().nth(1) {
        Some(path) => PanelConfig::load(Path::new(&path))?,
        None => PanelConfig::default(),
    };

    let sources = discover::discover_sources(&config.base_dir, &config.source_pattern)?;
    if sources.is_empty() {
        warn!("no source tables matched the pattern; nothing to do");
        return Ok(());
    }

    let raw = load::load_sources(&sources, false)?;
    info!(rows = raw.len(), "records loaded from all sources");
    let records = clean::normalize(&raw, &config);

    let panel = build_panel(&records);
    store::write_panel(&panel, &config.output_path)?;
    info!(path = %config.output_path.display(), "count panel complete");
    Ok(())
}
