//! # geotrie - memory-mapped geohash prefix index
//!
//! geotrie maps geohash cell codes to integer feature ids (FIDs). An index
//! is built once from `fid,geohash` rows, written to a compact binary file,
//! and then served through a read-only memory mapping with allocation-free
//! longest-prefix lookups.
//!
//! ## Architecture
//!
//! - [`index::trie`] - In-memory prefix tree (insert, longest-prefix search)
//! - [`index::ingest`] - `fid,geohash` row ingestion
//! - [`index::writer`] - Two-pass binary serializer
//! - [`index::view`] - Bounds-checked traversal over serialized bytes
//! - [`index::reader`] - Memory-mapped index reader
//! - [`index::lookup`] - Fixed-length lookup policy (3-character gate, 6-character key)
//! - [`utils`] - Configuration, path resolution, progress
//!
//! ## Quick Start
//!
//! ```no_run
//! use geotrie::index::{lookup6, GeoTrie, IndexReader, TrieWriter};
//! use std::path::Path;
//!
//! # fn main() -> geotrie::Result<()> {
//! let mut trie = GeoTrie::new();
//! trie.insert("wyd", 55);
//! trie.insert("wydj55", 3);
//! TrieWriter::save(&trie, Path::new("geohash_trie.bin"))?;
//!
//! let reader = IndexReader::open(Path::new("geohash_trie.bin"))?;
//! assert_eq!(lookup6(&reader, "wydj50")?, 55);
//! assert_eq!(lookup6(&reader, "wydj55")?, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! An [`IndexReader`](index::IndexReader) is `Send + Sync`. The mapping never
//! changes after it is opened, so lookups from many threads need no locking.

pub mod error;
pub mod index;
pub mod logging;
pub mod utils;

pub use error::{GeoTrieError, Result};
