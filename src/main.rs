use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geotrie::index::build::{build_index, BuildOptions};
use geotrie::index::stats::show_stats;
use geotrie::index::{FixedLengthLookup, Fid, IndexReader};
use geotrie::logging::init_logging;
use geotrie::utils::{get_config_path, AppConfig};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geotrie")]
#[command(about = "Memory-mapped geohash prefix index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a binary index from a fid,geohash CSV file
    Build {
        /// CSV file with a header row and fid,geohash rows
        csv: PathBuf,

        /// Output index file
        out: PathBuf,

        /// Hide the progress spinner
        #[arg(short, long)]
        quiet: bool,
    },
    /// Resolve fixed-length geohashes (gate prefix first, then the full key)
    Lookup {
        /// Index file (defaults to default_index from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// File with one geohash per line, looked up in parallel
        #[arg(long)]
        keys_file: Option<PathBuf>,

        /// Geohashes to resolve
        keys: Vec<String>,
    },
    /// Longest-prefix search for keys of any length
    Search {
        /// Index file (defaults to default_index from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Keys to search
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Show index statistics
    Stats {
        /// Index file (defaults to default_index from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the structure of an index file
    Verify {
        /// Index file (defaults to default_index from the config)
        #[arg(short, long)]
        index: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => get_config_path()?,
    };
    let config = AppConfig::load_from(&config_path)?;

    let filter = if cli.verbose { "debug" } else { config.log_filter.as_str() };
    init_logging(filter);

    match cli.command {
        Commands::Build { csv, out, quiet } => {
            let summary = build_index(&csv, &out, &BuildOptions { silent: quiet })?;
            println!(
                "Indexed {} rows into {} ({} nodes, {} bytes) in {:.2?}",
                summary.ingest.rows_inserted,
                summary.index_path.display(),
                summary.index.node_count,
                summary.index.bytes_written,
                summary.elapsed
            );
            if summary.ingest.rows_dropped > 0 || summary.ingest.ids_coerced > 0 {
                println!(
                    "Skipped {} malformed rows, stored {} unparseable ids as 0",
                    summary.ingest.rows_dropped, summary.ingest.ids_coerced
                );
            }
        }
        Commands::Lookup {
            index,
            keys_file,
            mut keys,
        } => {
            if let Some(path) = keys_file {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read keys from {}", path.display()))?;
                keys.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(String::from),
                );
            }
            if keys.is_empty() {
                anyhow::bail!("No keys given. Pass geohashes or --keys-file.");
            }

            let reader = IndexReader::open(&config.resolve_index(index)?)?;
            let lookup = FixedLengthLookup::new(&reader, config.lookup)?;

            let results: Vec<_> = keys.par_iter().map(|key| lookup.lookup(key)).collect();
            print_results(&keys, results)?;
        }
        Commands::Search { index, keys } => {
            let reader = IndexReader::open(&config.resolve_index(index)?)?;
            let results: Vec<_> = keys.iter().map(|key| reader.search_geohash(key)).collect();
            print_results(&keys, results)?;
        }
        Commands::Stats { index, json } => {
            show_stats(&config.resolve_index(index)?, json)?;
        }
        Commands::Verify { index } => {
            let reader = IndexReader::open(&config.resolve_index(index)?)?;
            let report = reader.verify()?;
            println!(
                "OK: {} nodes, {} keys, deepest key {} characters",
                report.nodes_visited, report.terminal_nodes, report.max_depth
            );
        }
        Commands::Config => {
            println!("Config file: {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Print `key<TAB>fid` per key, reporting failed keys on stderr
fn print_results(keys: &[String], results: Vec<geotrie::Result<Fid>>) -> Result<()> {
    let mut failed = 0;
    for (key, result) in keys.iter().zip(results) {
        match result {
            Ok(fid) => println!("{}\t{}", key, fid),
            Err(e) => {
                eprintln!("{}\terror: {}", key, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} keys failed", failed, keys.len());
    }
    Ok(())
}
