//! In-memory geohash trie
//!
//! Nodes live in a flat arena and refer to their children by arena id,
//! so every node has a stable sequential id from the moment it is created.
//! The writer relies on those ids to assign file offsets without any
//! identity-keyed bookkeeping.

use crate::index::types::Fid;

/// Index of a node in the trie arena
pub type NodeId = usize;

/// Arena id of the root node
pub const ROOT: NodeId = 0;

/// A single trie node
#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    /// (byte, child) pairs in insertion order
    children: Vec<(u8, NodeId)>,
    /// Some inserted key terminates at this node
    pub is_end: bool,
    /// Identifier of the key terminating here (0 = none)
    pub fid: Fid,
}

impl TrieNode {
    /// Children in insertion order
    pub fn children(&self) -> &[(u8, NodeId)] {
        &self.children
    }

    #[inline]
    fn child(&self, byte: u8) -> Option<NodeId> {
        // Geohash fan-out is at most 32, a linear scan beats hashing here
        self.children
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|&(_, id)| id)
    }
}

/// Prefix tree mapping geohash strings to feature ids
#[derive(Debug, Clone)]
pub struct GeoTrie {
    nodes: Vec<TrieNode>,
    key_count: usize,
}

impl Default for GeoTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoTrie {
    /// Create an empty trie containing only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            key_count: 0,
        }
    }

    /// Insert `key` with identifier `fid`.
    ///
    /// Re-inserting an existing key overwrites its identifier.
    pub fn insert(&mut self, key: impl AsRef<[u8]>, fid: Fid) {
        let mut node = ROOT;
        for &byte in key.as_ref() {
            node = match self.nodes[node].child(byte) {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.push((byte, child));
                    child
                }
            };
        }

        let terminal = &mut self.nodes[node];
        if !terminal.is_end {
            self.key_count += 1;
        }
        terminal.is_end = true;
        terminal.fid = fid;
    }

    /// Longest-matching-prefix search.
    ///
    /// Returns the fid of the deepest end-marked node along `key`'s path, or 0
    /// if no inserted key is a prefix of `key`. A full match on an end-marked
    /// node always wins, even when its fid is 0.
    pub fn search(&self, key: impl AsRef<[u8]>) -> Fid {
        let mut node = ROOT;
        let mut best = 0;

        for &byte in key.as_ref() {
            let current = &self.nodes[node];
            if current.is_end {
                best = current.fid;
            }
            match current.child(byte) {
                Some(child) => node = child,
                None => return best,
            }
        }

        let last = &self.nodes[node];
        if last.is_end { last.fid } else { best }
    }

    /// Root node
    pub fn root(&self) -> &TrieNode {
        &self.nodes[ROOT]
    }

    /// Node by arena id
    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct inserted keys
    pub fn len(&self) -> usize {
        self.key_count
    }

    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }
}
