use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::info;

/// Enumerate the per-region source tables under `base_dir` that match
/// `pattern`, sorted by path so runs are deterministic regardless of
/// filesystem order. An empty result is not an error here; the caller
/// decides whether a run without sources is worth anything.
pub fn discover_sources(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = base_dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();

    let mut paths = Vec::new();
    for entry in
        glob(&full_pattern).with_context(|| format!("invalid source pattern `{full_pattern}`"))?
    {
        let path = entry.context("failed to read glob entry")?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    info!(count = paths.len(), pattern = %full_pattern, "source tables discovered");
    for path in &paths {
        info!(file = %path.display(), "found source table");
    }
    Ok(paths)
}
