//! Fixed-length geohash lookups
//!
//! A lookup first queries a short gate prefix of the key. A miss there ends
//! the lookup with 0; otherwise the full key is queried and, if that finds
//! nothing, the gate result is returned. Indexes are populated so that every
//! matchable cell has an identifier within its gate prefix, which lets most
//! misses stop after one short traversal.

use crate::error::{GeoTrieError, Result};
use crate::index::reader::IndexReader;
use crate::index::trie::GeoTrie;
use crate::index::types::Fid;
use crate::index::view::TrieView;
use serde::{Deserialize, Serialize};

/// Anything that answers longest-matching-prefix queries
pub trait PrefixIndex {
    fn search_prefix(&self, key: &[u8]) -> Result<Fid>;
}

impl PrefixIndex for GeoTrie {
    fn search_prefix(&self, key: &[u8]) -> Result<Fid> {
        Ok(self.search(key))
    }
}

impl PrefixIndex for IndexReader {
    fn search_prefix(&self, key: &[u8]) -> Result<Fid> {
        self.search_geohash(key)
    }
}

impl PrefixIndex for TrieView<'_> {
    fn search_prefix(&self, key: &[u8]) -> Result<Fid> {
        self.search(key)
    }
}

/// Gate and key lengths of a fixed-length lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupPolicy {
    /// Length of the prefix queried first
    pub gate_len: usize,
    /// Required key length
    pub key_len: usize,
}

impl LookupPolicy {
    /// 3-character gate, 6-character keys
    pub const GEOHASH6: Self = Self {
        gate_len: 3,
        key_len: 6,
    };

    pub fn validate(&self) -> Result<()> {
        if self.gate_len == 0 || self.gate_len >= self.key_len {
            return Err(GeoTrieError::Config(format!(
                "gate length {} must be between 1 and key length {} (exclusive)",
                self.gate_len, self.key_len
            )));
        }
        Ok(())
    }
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self::GEOHASH6
    }
}

/// Two-phase lookup over a [`PrefixIndex`]
pub struct FixedLengthLookup<'a, I: ?Sized> {
    index: &'a I,
    policy: LookupPolicy,
}

impl<'a, I: PrefixIndex + ?Sized> FixedLengthLookup<'a, I> {
    pub fn new(index: &'a I, policy: LookupPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { index, policy })
    }

    /// Lookup with 3-character gate and 6-character keys
    pub fn geohash6(index: &'a I) -> Self {
        Self {
            index,
            policy: LookupPolicy::GEOHASH6,
        }
    }

    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    /// Resolve `key`, which must be exactly `key_len` bytes
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Result<Fid> {
        let key = key.as_ref();
        if key.len() != self.policy.key_len {
            return Err(GeoTrieError::InvalidKeyLength {
                expected: self.policy.key_len,
                actual: key.len(),
            });
        }

        let gate = self.index.search_prefix(&key[..self.policy.gate_len])?;
        if gate == 0 {
            return Ok(0);
        }

        let full = self.index.search_prefix(key)?;
        Ok(if full != 0 { full } else { gate })
    }
}

/// Resolve a 6-character geohash against `index`
pub fn lookup6<I: PrefixIndex + ?Sized>(index: &I, key: impl AsRef<[u8]>) -> Result<Fid> {
    FixedLengthLookup::geohash6(index).lookup(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn reference_trie() -> GeoTrie {
        let mut trie = GeoTrie::new();
        trie.insert("wyd", 55);
        trie.insert("wydm9q", 1);
        trie.insert("wydj55", 3);
        trie
    }

    /// Index with canned answers that records every query
    #[derive(Default)]
    struct RecordingIndex {
        answers: HashMap<Vec<u8>, Fid>,
        queries: RefCell<Vec<Vec<u8>>>,
    }

    impl RecordingIndex {
        fn with(answers: &[(&str, Fid)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|&(k, f)| (k.as_bytes().to_vec(), f))
                    .collect(),
                queries: RefCell::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries
                .borrow()
                .iter()
                .map(|q| String::from_utf8_lossy(q).into_owned())
                .collect()
        }
    }

    impl PrefixIndex for RecordingIndex {
        fn search_prefix(&self, key: &[u8]) -> Result<Fid> {
            self.queries.borrow_mut().push(key.to_vec());
            Ok(self.answers.get(key).copied().unwrap_or(0))
        }
    }

    #[test]
    fn test_reference_scenario() {
        let trie = reference_trie();
        assert_eq!(lookup6(&trie, "wydj50").unwrap(), 55);
        assert_eq!(lookup6(&trie, "wydj55").unwrap(), 3);
        assert_eq!(lookup6(&trie, "wydm9q").unwrap(), 1);
        assert_eq!(lookup6(&trie, "wy0000").unwrap(), 0);
    }

    #[test]
    fn test_wrong_length_performs_no_query() {
        let index = RecordingIndex::with(&[("wyd", 55)]);

        for key in ["", "wyd", "wydj5", "wydj550"] {
            assert!(matches!(
                lookup6(&index, key),
                Err(GeoTrieError::InvalidKeyLength { expected: 6, .. })
            ));
        }
        assert!(index.queries().is_empty());
    }

    #[test]
    fn test_gate_miss_short_circuits() {
        // The full key would match, but the gate does not
        let index = RecordingIndex::with(&[("abcdef", 9)]);
        assert_eq!(lookup6(&index, "abcdef").unwrap(), 0);
        assert_eq!(index.queries(), vec!["abc"]);
    }

    #[test]
    fn test_full_miss_falls_back_to_gate() {
        let index = RecordingIndex::with(&[("abc", 4)]);
        assert_eq!(lookup6(&index, "abcdef").unwrap(), 4);
        assert_eq!(index.queries(), vec!["abc", "abcdef"]);
    }

    #[test]
    fn test_full_hit_wins() {
        let index = RecordingIndex::with(&[("abc", 4), ("abcdef", 8)]);
        assert_eq!(lookup6(&index, "abcdef").unwrap(), 8);
    }

    #[test]
    fn test_custom_policy() {
        let mut trie = GeoTrie::new();
        trie.insert("u4", 2);
        trie.insert("u4pruy", 7);

        let policy = LookupPolicy {
            gate_len: 2,
            key_len: 4,
        };
        let lookup = FixedLengthLookup::new(&trie, policy).unwrap();
        assert_eq!(lookup.lookup("u4pr").unwrap(), 2);
        assert_eq!(lookup.lookup("u5pr").unwrap(), 0);
        assert!(lookup.lookup("u4pruy").is_err());
    }

    #[test]
    fn test_invalid_policy() {
        let trie = GeoTrie::new();
        for (gate_len, key_len) in [(0, 6), (6, 6), (7, 6)] {
            let policy = LookupPolicy { gate_len, key_len };
            assert!(matches!(
                FixedLengthLookup::new(&trie, policy),
                Err(GeoTrieError::Config(_))
            ));
        }
    }
}
