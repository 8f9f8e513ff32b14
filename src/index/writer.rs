//! Trie index writer
//!
//! Serialization runs in two passes. The layout pass walks the trie in
//! pre-order and assigns every node its final offset; a node's size depends
//! only on its own child count, so offsets are known before any byte is
//! written. The emit pass then streams header and records strictly forward,
//! which works for any `Write`, seekable or not.

use crate::error::{GeoTrieError, Result};
use crate::index::trie::{GeoTrie, NodeId, ROOT};
use crate::index::types::*;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File offsets assigned to every node of a trie
#[derive(Debug, Clone)]
pub struct TrieLayout {
    /// Offset of each node, indexed by arena id
    offsets: Vec<NodeOffset>,
    /// Arena ids in file order (pre-order)
    order: Vec<NodeId>,
    /// Total file size including the header
    total_size: u64,
}

impl TrieLayout {
    /// Assign offsets in pre-order, children in insertion order
    pub fn compute(trie: &GeoTrie) -> Self {
        let mut offsets = vec![0; trie.node_count()];
        let mut order = Vec::with_capacity(trie.node_count());
        let mut next = FileHeader::SIZE as u64;

        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = trie.node(id);
            offsets[id] = next;
            order.push(id);
            next += NodeRecord::encoded_size(node.children().len());

            // Reversed so the first child is laid out first
            stack.extend(node.children().iter().rev().map(|&(_, child)| child));
        }

        Self {
            offsets,
            order,
            total_size: next,
        }
    }

    pub fn offset_of(&self, id: NodeId) -> NodeOffset {
        self.offsets[id]
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }
}

/// Outcome of writing an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WriteSummary {
    pub root_offset: NodeOffset,
    pub node_count: u32,
    pub bytes_written: u64,
}

/// Writes a [`GeoTrie`] in the binary index format
pub struct TrieWriter;

impl TrieWriter {
    /// Serialize `trie` to an arbitrary byte sink
    pub fn write_to<W: Write>(trie: &GeoTrie, out: &mut W) -> Result<WriteSummary> {
        let layout = TrieLayout::compute(trie);
        let node_count = u32::try_from(layout.node_count()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} nodes exceed the format limit", layout.node_count()),
            )
        })?;

        let root_offset = layout.offset_of(ROOT);
        out.write_all(&FileHeader::new(root_offset, node_count).to_bytes())?;

        let mut record = Vec::with_capacity(NODE_HEADER_SIZE + 32 * CHILD_POINTER_SIZE);
        for &id in &layout.order {
            let node = trie.node(id);
            let children = node.children();

            record.clear();
            record.push(0); // reserved
            record.push(u8::from(node.is_end));
            record.extend_from_slice(&node.fid.to_le_bytes());
            record.extend_from_slice(&(children.len() as u32).to_le_bytes());
            for &(byte, child) in children {
                record.push(byte);
                record.extend_from_slice(&layout.offset_of(child).to_le_bytes());
            }
            out.write_all(&record)?;
        }

        Ok(WriteSummary {
            root_offset,
            node_count,
            bytes_written: layout.total_size(),
        })
    }

    /// Serialize `trie` to `path`.
    ///
    /// Bytes go to a sibling `.tmp` file that is renamed over `path` only
    /// after a successful flush, so a failed save never leaves a loadable
    /// partial index behind.
    pub fn save(trie: &GeoTrie, path: &Path) -> Result<WriteSummary> {
        let tmp_path = tmp_path_for(path);

        let result = Self::save_to_tmp(trie, &tmp_path).and_then(|summary| {
            fs::rename(&tmp_path, path).map_err(|e| GeoTrieError::io_at(path, e))?;
            Ok(summary)
        });

        match result {
            Ok(summary) => {
                info!(
                    path = %path.display(),
                    node_count = summary.node_count,
                    bytes = summary.bytes_written,
                    "trie index saved"
                );
                Ok(summary)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }

    fn save_to_tmp(trie: &GeoTrie, tmp_path: &Path) -> Result<WriteSummary> {
        let io_err = |e| GeoTrieError::io_at(tmp_path, e);

        let file = File::create(tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::with_capacity(65536, file);
        let summary = Self::write_to(trie, &mut writer).map_err(|e| match e {
            GeoTrieError::Io(source) => io_err(source),
            other => other,
        })?;

        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;
        Ok(summary)
    }
}

/// `index.bin` -> `index.bin.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::lookup::lookup6;
    use crate::index::view::TrieView;
    use tempfile::tempdir;

    fn reference_trie() -> GeoTrie {
        let mut trie = GeoTrie::new();
        trie.insert("wyd", 55);
        trie.insert("wydm9q", 1);
        trie.insert("wydj55", 3);
        trie
    }

    #[test]
    fn test_layout_preorder() {
        let mut trie = GeoTrie::new();
        trie.insert("ab", 1);
        trie.insert("c", 2);
        let layout = TrieLayout::compute(&trie);

        // root(2 children) @20, a(1 child) @48, b @67, c @77
        assert_eq!(layout.offset_of(ROOT), 20);
        assert_eq!(layout.order.len(), 4);
        let offsets: Vec<_> = layout.order.iter().map(|&id| layout.offset_of(id)).collect();
        assert_eq!(offsets, vec![20, 48, 67, 77]);
        assert_eq!(layout.total_size(), 87);
    }

    #[test]
    fn test_write_to_vec() {
        let trie = reference_trie();
        let mut buf = Vec::new();
        let summary = TrieWriter::write_to(&trie, &mut buf).unwrap();

        assert_eq!(summary.node_count, 10);
        assert_eq!(summary.root_offset, FileHeader::SIZE as u64);
        assert_eq!(summary.bytes_written, buf.len() as u64);

        let view = TrieView::parse(&buf).unwrap();
        assert_eq!(view.header().node_count, 10);
        assert_eq!(view.search(b"wydj55").unwrap(), 3);
        assert_eq!(view.search(b"wydj50").unwrap(), 55);
        assert_eq!(view.search(b"wydm9q").unwrap(), 1);
        assert_eq!(view.verify().unwrap().nodes_visited, 10);
    }

    #[test]
    fn test_lookup6_over_serialized_bytes() {
        let trie = reference_trie();
        let mut buf = Vec::new();
        TrieWriter::write_to(&trie, &mut buf).unwrap();
        let view = TrieView::parse(&buf).unwrap();

        assert_eq!(lookup6(&view, "wydj50").unwrap(), 55);
        assert_eq!(lookup6(&view, "wydj55").unwrap(), 3);
        assert_eq!(lookup6(&view, "wydm9q").unwrap(), 1);
        assert_eq!(lookup6(&view, "wy0000").unwrap(), 0);
        for key in ["wydj50", "wydj55", "wydm9q", "wy0000", "u4pruy"] {
            assert_eq!(lookup6(&view, key).unwrap(), lookup6(&trie, key).unwrap(), "{}", key);
        }
        assert!(matches!(
            lookup6(&view, "wyd"),
            Err(GeoTrieError::InvalidKeyLength { expected: 6, actual: 3 })
        ));
    }

    #[test]
    fn test_node_record_bytes() {
        let mut trie = GeoTrie::new();
        trie.insert("a", -2);
        let mut buf = Vec::new();
        TrieWriter::write_to(&trie, &mut buf).unwrap();

        // root @20: reserved, end, fid, count=1, ('a', 39)
        assert_eq!(&buf[20..30], &[0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(buf[30], b'a');
        assert_eq!(u64::from_le_bytes(buf[31..39].try_into().unwrap()), 39);
        // leaf @39
        assert_eq!(buf[39], 0);
        assert_eq!(buf[40], 1);
        assert_eq!(i32::from_le_bytes(buf[41..45].try_into().unwrap()), -2);
        assert_eq!(buf.len(), 49);
    }

    #[test]
    fn test_empty_trie_writes_root() {
        let trie = GeoTrie::new();
        let mut buf = Vec::new();
        let summary = TrieWriter::write_to(&trie, &mut buf).unwrap();

        assert_eq!(summary.node_count, 1);
        assert_eq!(buf.len(), FileHeader::SIZE + NODE_HEADER_SIZE);
        assert_eq!(TrieView::parse(&buf).unwrap().search(b"wyd").unwrap(), 0);
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("geohash_trie.bin");

        let summary = TrieWriter::save(&reference_trie(), &path).unwrap();

        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), summary.bytes_written);
    }

    #[test]
    fn test_save_overwrites_existing() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("geohash_trie.bin");
        fs::write(&path, b"stale").unwrap();

        TrieWriter::save(&reference_trie(), &path).unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(TrieView::parse(&data).unwrap().search(b"wyd").unwrap(), 55);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing").join("geohash_trie.bin");

        let err = TrieWriter::save(&reference_trie(), &path).unwrap_err();
        assert!(matches!(err, GeoTrieError::IoAt { .. }));
        assert!(!path.exists());
    }
}
