use crate::index::ingest::{load_csv, IngestStats};
use crate::index::trie::GeoTrie;
use crate::index::writer::{TrieWriter, WriteSummary};
use crate::utils::progress::spinner;
use crate::utils::resolve_path;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Options for [`build_index`]
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Suppress the progress spinner
    pub silent: bool,
}

/// Outcome of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub csv_path: PathBuf,
    pub index_path: PathBuf,
    pub ingest: IngestStats,
    pub index: WriteSummary,
    pub elapsed: Duration,
}

/// Build a trie index at `out_path` from a `fid,geohash` CSV file.
///
/// Relative paths are resolved against the working directory.
pub fn build_index(csv_path: &Path, out_path: &Path, options: &BuildOptions) -> Result<BuildSummary> {
    let start = Instant::now();
    let csv_path = resolve_path(csv_path)?;
    let index_path = resolve_path(out_path)?;

    let progress = spinner("Reading rows...", options.silent)?;

    let mut trie = GeoTrie::new();
    let ingest = load_csv(&mut trie, &csv_path)
        .with_context(|| format!("Failed to load rows from {}", csv_path.display()))?;

    if let Some(pb) = &progress {
        pb.set_message("Writing binary index...");
    }

    let index = TrieWriter::save(&trie, &index_path)
        .with_context(|| format!("Failed to write index {}", index_path.display()))?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let elapsed = start.elapsed();
    info!(
        csv = %csv_path.display(),
        index = %index_path.display(),
        keys = trie.len(),
        rows_dropped = ingest.rows_dropped,
        elapsed_ms = elapsed.as_millis() as u64,
        "index build finished"
    );

    Ok(BuildSummary {
        csv_path,
        index_path,
        ingest,
        index,
        elapsed,
    })
}
