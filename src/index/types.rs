//! On-disk layout of the geohash trie index.
//!
//! ```text
//! file header (20 bytes)
//!   0  u32  magic        0x47545249 ("GTRI")
//!   4  u32  version      1
//!   8  u64  root offset  0 = empty index
//!  16  u32  node count
//!
//! node record (10 + 9 * child_count bytes)
//!   0  u8   reserved     always 0
//!   1  u8   end flag     0 / 1
//!   2  i32  fid
//!   6  u32  child count
//!  10  child_count * { u8 byte, u64 absolute offset }
//! ```
//!
//! All integers are little-endian. Child pointers are kept in insertion
//! order, so readers scan them linearly.

/// Feature identifier stored on terminal nodes (0 means "no identifier")
pub type Fid = i32;

/// Absolute byte position of a node record within the index file
pub type NodeOffset = u64;

/// Magic number for trie index files
pub const TRIE_MAGIC: u32 = 0x47545249; // "GTRI"

/// Current version of the trie index format
pub const TRIE_VERSION: u32 = 1;

/// Fixed part of a node record: reserved + end flag + fid + child count
pub const NODE_HEADER_SIZE: usize = 1 + 1 + 4 + 4; // 10 bytes

/// One child pointer entry: byte + absolute offset
pub const CHILD_POINTER_SIZE: usize = 1 + 8; // 9 bytes

/// Header at the start of every index file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic number (TRIE_MAGIC)
    pub magic: u32,
    /// Format version
    pub version: u32,
    /// Offset of the root node record, 0 for an empty index
    pub root_offset: NodeOffset,
    /// Number of node records in the file
    pub node_count: u32,
}

impl FileHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 8 + 4; // 20 bytes

    pub fn new(root_offset: NodeOffset, node_count: u32) -> Self {
        Self {
            magic: TRIE_MAGIC,
            version: TRIE_VERSION,
            root_offset,
            node_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..16].copy_from_slice(&self.root_offset.to_le_bytes());
        buf[16..20].copy_from_slice(&self.node_count.to_le_bytes());
        buf
    }

    pub fn is_empty(&self) -> bool {
        self.root_offset == 0
    }
}

/// Fixed-size part of a node record as read back from an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord {
    pub offset: NodeOffset,
    pub is_end: bool,
    pub fid: Fid,
    pub child_count: u32,
}

impl NodeRecord {
    /// Total encoded size of a node with `child_count` children
    #[inline]
    pub fn encoded_size(child_count: usize) -> u64 {
        (NODE_HEADER_SIZE + CHILD_POINTER_SIZE * child_count) as u64
    }

    /// Offset of the first child pointer entry
    #[inline]
    pub fn children_start(&self) -> u64 {
        self.offset + NODE_HEADER_SIZE as u64
    }

    /// The fid this node contributes to a lookup, or 0.
    ///
    /// Only end-marked nodes with a nonzero fid count as a match.
    #[inline]
    pub fn matched_fid(&self) -> Fid {
        if self.is_end && self.fid != 0 {
            self.fid
        } else {
            0
        }
    }
}

/// A child pointer entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildPointer {
    pub byte: u8,
    pub offset: NodeOffset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = FileHeader::new(20, 7);
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..4], &[0x49, 0x52, 0x54, 0x47]);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 20);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 7);
    }

    #[test]
    fn test_matched_fid_requires_end_flag() {
        let mut node = NodeRecord {
            offset: 20,
            is_end: false,
            fid: 9,
            child_count: 0,
        };
        assert_eq!(node.matched_fid(), 0);

        node.is_end = true;
        assert_eq!(node.matched_fid(), 9);

        node.fid = 0;
        assert_eq!(node.matched_fid(), 0);
    }

    #[test]
    fn test_encoded_size() {
        assert_eq!(NodeRecord::encoded_size(0), 10);
        assert_eq!(NodeRecord::encoded_size(3), 37);
    }
}
