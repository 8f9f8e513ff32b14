//! Memory-mapped trie index reader
//!
//! The mapping is created once in [`IndexReader::open`] and never mutated,
//! so a reader is `Send + Sync` and any number of threads may search it
//! through a shared reference. Dropping the reader (or calling
//! [`IndexReader::close`]) unmaps the file; the borrow checker guarantees no
//! search is still running at that point.

use crate::error::{GeoTrieError, Result};
use crate::index::types::*;
use crate::index::view::{TrieView, VerifyReport};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, trace};

/// Read-only handle on a serialized trie index
pub struct IndexReader {
    path: PathBuf,
    mmap: Mmap,
    header: FileHeader,
}

impl IndexReader {
    /// Open and memory-map the index at `path`, validating its header
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| GeoTrieError::io_at(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| GeoTrieError::io_at(path, e))?
            .len();
        if size < FileHeader::SIZE as u64 {
            return Err(GeoTrieError::FileTooSmall { size });
        }

        // SAFETY: the index is immutable after it is written; the mapping is
        // read-only and every access goes through bounds-checked reads.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| GeoTrieError::io_at(path, e))?;

        // A failed check drops `mmap` here, releasing the mapping
        let header = *TrieView::parse(&mmap)?.header();

        info!(
            path = %path.display(),
            node_count = header.node_count,
            size = mmap.len(),
            "trie index loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            header,
        })
    }

    #[inline]
    fn view(&self) -> TrieView<'_> {
        // Header was validated in open() and the bytes cannot change
        TrieView::from_validated(&self.mmap, self.header)
    }

    /// Longest-matching-prefix search for `key`
    pub fn search_geohash(&self, key: impl AsRef<[u8]>) -> Result<Fid> {
        let key = key.as_ref();
        let fid = self.view().search(key)?;
        trace!(key = %String::from_utf8_lossy(key), fid, "search");
        Ok(fid)
    }

    /// Walk the whole index and check its structure
    pub fn verify(&self) -> Result<VerifyReport> {
        self.view().verify()
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn root_offset(&self) -> NodeOffset {
        self.header.root_offset
    }

    pub fn node_count(&self) -> u32 {
        self.header.node_count
    }

    /// Size of the mapped file in bytes
    pub fn file_size(&self) -> usize {
        self.mmap.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unmap the index and close its file.
    ///
    /// Taking `self` by value means no search can be in flight or start
    /// afterwards. Equivalent to dropping the reader.
    pub fn close(self) {
        drop(self);
    }
}

impl std::fmt::Debug for IndexReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexReader")
            .field("path", &self.path)
            .field("header", &self.header)
            .field("size", &self.mmap.len())
            .finish()
    }
}
