//! Converts the regional surface table into a long panel, replicating each
//! region's surface value for every year in the configured bounds.
//! Output: REGION | AÑO | SUPERFICIE.

use anyhow::Result;
use cierre_panel::config::PanelConfig;
use cierre_panel::surface;
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let input = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("SUPERFICIE REGIONAL.csv"));
    let output = env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("SUPERFICIE_PANEL_LARGO_2015_2024.parquet"));
    let config = PanelConfig::default();

    let regions = surface::read_region_surfaces(&input)?;
    let rows = surface::expand_surface_panel(&regions, config.year_min, config.year_max);
    surface::write_surface_panel(&rows, &output)?;
    info!(path = %output.display(), rows = rows.len(), "surface panel complete");
    Ok(())
}
