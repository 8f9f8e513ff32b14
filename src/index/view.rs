//! Bounds-checked access to serialized trie bytes
//!
//! Nothing here indexes the underlying slice directly: every field read goes
//! through [`ByteView`], which turns an out-of-range offset into
//! [`GeoTrieError::CorruptIndex`] instead of a panic.

use crate::error::{GeoTrieError, Result};
use crate::index::types::*;

/// Read-only little-endian field accessors over a byte slice
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy `N` bytes starting at `offset`
    #[inline]
    pub fn read_array<const N: usize>(&self, offset: u64) -> Result<[u8; N]> {
        let out_of_range = || GeoTrieError::CorruptIndex {
            offset,
            len: N,
            size: self.data.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_range())?;
        let end = start.checked_add(N).ok_or_else(out_of_range)?;
        self.data
            .get(start..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(out_of_range)
    }

    #[inline]
    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    #[inline]
    pub fn read_u32(&self, offset: u64) -> Result<u32> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_i32(&self, offset: u64) -> Result<i32> {
        self.read_array(offset).map(i32::from_le_bytes)
    }

    #[inline]
    pub fn read_u64(&self, offset: u64) -> Result<u64> {
        self.read_array(offset).map(u64::from_le_bytes)
    }
}

/// A validated trie index over borrowed bytes
#[derive(Debug, Clone, Copy)]
pub struct TrieView<'a> {
    bytes: ByteView<'a>,
    header: FileHeader,
}

impl<'a> TrieView<'a> {
    /// Validate the file header and wrap `data`
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < FileHeader::SIZE {
            return Err(GeoTrieError::FileTooSmall {
                size: data.len() as u64,
            });
        }

        let bytes = ByteView::new(data);

        let magic = bytes.read_u32(0)?;
        if magic != TRIE_MAGIC {
            return Err(GeoTrieError::BadMagic { found: magic });
        }

        let version = bytes.read_u32(4)?;
        if version != TRIE_VERSION {
            return Err(GeoTrieError::UnsupportedVersion { found: version });
        }

        let header = FileHeader {
            magic,
            version,
            root_offset: bytes.read_u64(8)?,
            node_count: bytes.read_u32(16)?,
        };

        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Size of the underlying bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Wrap bytes whose header was already validated by [`TrieView::parse`]
    pub(crate) fn from_validated(data: &'a [u8], header: FileHeader) -> Self {
        Self {
            bytes: ByteView::new(data),
            header,
        }
    }

    /// Read the fixed part of the node record at `offset`
    pub fn node(&self, offset: NodeOffset) -> Result<NodeRecord> {
        let raw: [u8; NODE_HEADER_SIZE] = self.bytes.read_array(offset)?;
        Ok(NodeRecord {
            offset,
            is_end: raw[1] != 0,
            fid: i32::from_le_bytes([raw[2], raw[3], raw[4], raw[5]]),
            child_count: u32::from_le_bytes([raw[6], raw[7], raw[8], raw[9]]),
        })
    }

    /// Read child pointer `index` of `node`
    pub fn child_at(&self, node: &NodeRecord, index: u32) -> Result<ChildPointer> {
        // node.offset was bounds-checked when the record was read, so this cannot overflow
        let pos = node.children_start() + u64::from(index) * CHILD_POINTER_SIZE as u64;
        let raw: [u8; CHILD_POINTER_SIZE] = self.bytes.read_array(pos)?;
        Ok(ChildPointer {
            byte: raw[0],
            offset: u64::from_le_bytes([
                raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7], raw[8],
            ]),
        })
    }

    /// Find the child of `node` reached by `byte`
    pub fn find_child(&self, node: &NodeRecord, byte: u8) -> Result<Option<NodeOffset>> {
        for i in 0..node.child_count {
            let child = self.child_at(node, i)?;
            if child.byte == byte {
                return Ok(Some(child.offset));
            }
        }
        Ok(None)
    }

    /// Longest-matching-prefix search over the serialized trie.
    ///
    /// Only end-marked nodes with a nonzero fid are matches. Returns 0 for an
    /// empty index or when no prefix of `key` matches.
    pub fn search(&self, key: &[u8]) -> Result<Fid> {
        if self.header.is_empty() {
            return Ok(0);
        }

        let mut current = self.header.root_offset;
        let mut best = 0;

        for &byte in key {
            let node = self.node(current)?;
            let fid = node.matched_fid();
            if fid != 0 {
                best = fid;
            }

            match self.find_child(&node, byte)? {
                Some(child) => current = child,
                None => break,
            }
        }

        // Re-check the node the walk stopped on
        let last = self.node(current)?.matched_fid();
        Ok(if last != 0 { last } else { best })
    }

    /// Walk every node reachable from the root, checking structure
    pub fn verify(&self) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();
        if self.header.is_empty() {
            return Ok(report);
        }

        // Each offset is visited at most once, which also ends the walk on cyclic input
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![(self.header.root_offset, 0usize)];

        while let Some((offset, depth)) = stack.pop() {
            if offset < FileHeader::SIZE as u64 {
                return Err(GeoTrieError::Malformed {
                    offset,
                    reason: "node offset points into the file header".to_string(),
                });
            }
            if !seen.insert(offset) {
                return Err(GeoTrieError::Malformed {
                    offset,
                    reason: "node reachable from more than one parent".to_string(),
                });
            }

            let node = self.node(offset)?;
            report.nodes_visited += 1;
            report.max_depth = report.max_depth.max(depth);
            if node.matched_fid() != 0 {
                report.terminal_nodes += 1;
            }

            for i in 0..node.child_count {
                let child = self.child_at(&node, i)?;
                stack.push((child.offset, depth + 1));
            }
        }

        if report.nodes_visited != self.header.node_count as usize {
            return Err(GeoTrieError::Malformed {
                offset: 0,
                reason: format!(
                    "header declares {} nodes, {} reachable",
                    self.header.node_count, report.nodes_visited
                ),
            });
        }

        Ok(report)
    }
}

/// Result of a successful structural check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct VerifyReport {
    /// Nodes reachable from the root
    pub nodes_visited: usize,
    /// End-marked nodes carrying a nonzero fid
    pub terminal_nodes: usize,
    /// Depth of the deepest node, i.e. the longest key path
    pub max_depth: usize,
}
