use crate::index::reader::IndexReader;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Summary of a trie index file
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub path: PathBuf,
    pub file_size: u64,
    pub version: u32,
    pub root_offset: u64,
    pub node_count: u32,
}

impl IndexStats {
    pub fn from_reader(reader: &IndexReader) -> Self {
        let header = reader.header();
        Self {
            path: reader.path().to_path_buf(),
            file_size: reader.file_size() as u64,
            version: header.version,
            root_offset: header.root_offset,
            node_count: header.node_count,
        }
    }
}

/// Display index statistics
pub fn show_stats(index_path: &Path, json: bool) -> Result<()> {
    let reader = IndexReader::open(index_path)?;
    let stats = IndexStats::from_reader(&reader);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", stats.path.display());
    println!("Format version:   {}", stats.version);
    println!("Node count:       {}", stats.node_count);
    println!("Root offset:      {}", stats.root_offset);
    println!("Index size:       {}", format_size(stats.file_size));

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
