//! Row ingestion from `fid,geohash` text sources
//!
//! The first line is always a header. Every other line must have exactly two
//! comma-separated fields; anything else is dropped without error. Ids that
//! do not parse become 0. Keys are taken as raw bytes, so a row in a legacy
//! encoding is ingested like any other.

use crate::error::{GeoTrieError, Result};
use crate::index::trie::GeoTrie;
use crate::index::types::Fid;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Counters collected while ingesting rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestStats {
    /// Data rows seen (header excluded)
    pub rows_read: usize,
    /// Rows inserted into the trie
    pub rows_inserted: usize,
    /// Rows dropped for a wrong field count or an empty key
    pub rows_dropped: usize,
    /// Inserted rows whose id did not parse and was stored as 0
    pub ids_coerced: usize,
}

/// A parsed data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub fid: Fid,
    /// Raw key bytes; not required to be UTF-8
    pub key: &'a [u8],
    /// The id field was not a number and `fid` defaulted to 0
    pub coerced: bool,
}

/// Parse one data row, returning `None` for rows that must be dropped
pub fn parse_row(line: &[u8]) -> Option<Row<'_>> {
    let mut fields = line.split(|&b| b == b',');
    let id = fields.next()?;
    let key = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let key = key.trim_ascii();
    if key.is_empty() {
        return None;
    }

    let (fid, coerced) = match parse_leading_int(id.trim_ascii()) {
        Some(fid) => (fid, false),
        None => (0, true),
    };

    Some(Row { fid, key, coerced })
}

/// Parse the leading integer of `bytes` ("12abc" -> 12), like a scanf `%d`
fn parse_leading_int(bytes: &[u8]) -> Option<Fid> {
    let sign_len = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let digits = bytes[sign_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    std::str::from_utf8(&bytes[..sign_len + digits])
        .ok()?
        .parse()
        .ok()
}

/// Feeds rows from a byte source into a [`GeoTrie`]
pub struct RowIngest<'t> {
    trie: &'t mut GeoTrie,
    stats: IngestStats,
}

impl<'t> RowIngest<'t> {
    pub fn new(trie: &'t mut GeoTrie) -> Self {
        Self {
            trie,
            stats: IngestStats::default(),
        }
    }

    /// Ingest every row of `reader`, skipping the first line as a header.
    ///
    /// Lines are split on `\n` with an optional trailing `\r`. Row content is
    /// never decoded as text, so only read failures are errors.
    pub fn read_from<R: BufRead>(mut self, reader: R) -> Result<IngestStats> {
        let mut lines = reader.split(b'\n');

        // Header
        if let Some(header) = lines.next() {
            header?;
        }

        for line in lines {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.ingest_line(&line);
        }

        debug!(
            rows_read = self.stats.rows_read,
            rows_inserted = self.stats.rows_inserted,
            rows_dropped = self.stats.rows_dropped,
            ids_coerced = self.stats.ids_coerced,
            "row ingestion finished"
        );
        Ok(self.stats)
    }

    fn ingest_line(&mut self, line: &[u8]) {
        self.stats.rows_read += 1;

        let Some(row) = parse_row(line) else {
            self.stats.rows_dropped += 1;
            return;
        };

        if row.coerced {
            self.stats.ids_coerced += 1;
            warn!(
                line = self.stats.rows_read + 1,
                key = %String::from_utf8_lossy(row.key),
                "unparseable id stored as 0"
            );
        }

        self.trie.insert(row.key, row.fid);
        self.stats.rows_inserted += 1;
    }
}

/// Load a CSV file of `fid,geohash` rows into `trie`
pub fn load_csv(trie: &mut GeoTrie, path: &Path) -> Result<IngestStats> {
    let file = File::open(path).map_err(|e| GeoTrieError::io_at(path, e))?;
    RowIngest::new(trie)
        .read_from(BufReader::with_capacity(65536, file))
        .map_err(|e| match e {
            GeoTrieError::Io(source) => GeoTrieError::io_at(path, source),
            other => other,
        })
}
