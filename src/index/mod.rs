pub mod build;
pub mod ingest;
pub mod lookup;
pub mod reader;
pub mod stats;
pub mod trie;
pub mod types;
pub mod view;
pub mod writer;

pub use lookup::{lookup6, FixedLengthLookup, LookupPolicy, PrefixIndex};
pub use reader::IndexReader;
pub use trie::GeoTrie;
pub use types::*;
pub use writer::TrieWriter;
