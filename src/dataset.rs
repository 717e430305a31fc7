// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The document collection: a read-only CSR store of sparse vectors.
//!
//! [`SparseDataset`] packs every document into three flat arrays
//! (offsets / components / values), giving random access by doc_id without
//! per-document allocation. [`SparseDatasetMut`] is the append-only builder;
//! freezing it into a `SparseDataset` is a move, not a copy.
//!
//! # Binary collection format
//!
//! All integers are unsigned 32-bit little-endian, all weights IEEE-754
//! 32-bit little-endian:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ record_count: u32                            │
//! ├──────────────────────────────────────────────┤
//! │ For each record:                             │
//! │   term_count: u32                            │
//! │   term_ids:   [u32; term_count]              │
//! │   weights:    [f32; term_count]  (aligned    │
//! │               positionally with term_ids)    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Ascending term_id order is the writing convention; the reader accepts
//! any order and canonicalizes, but rejects duplicate term_ids within a
//! record. A stream that ends before the declared counts are satisfied is
//! a format error, never an empty collection.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{DocId, TermId};

/// Hard limit on the declared record count (prevents huge allocations from
/// a corrupt header).
pub const MAX_RECORD_COUNT: u64 = 100_000_000;

/// Read-only collection of sparse vectors in CSR layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseDataset {
    offsets: Vec<usize>,
    components: Vec<TermId>,
    values: Vec<f32>,
    dim: usize,
}

impl SparseDataset {
    /// Number of documents.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality: largest term_id in the collection plus one.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Total number of non-zero components across all documents.
    pub fn nnz(&self) -> usize {
        self.components.len()
    }

    /// The (components, values) slices of one document.
    ///
    /// Panics if `doc_id >= self.len()`; doc_ids come from the index and
    /// are valid by construction.
    #[inline]
    pub fn get(&self, doc_id: DocId) -> (&[TermId], &[f32]) {
        let lo = self.offsets[doc_id];
        let hi = self.offsets[doc_id + 1];
        (&self.components[lo..hi], &self.values[lo..hi])
    }

    /// Iterate documents in doc_id order.
    pub fn iter(&self) -> impl Iterator<Item = (&[TermId], &[f32])> + '_ {
        (0..self.len()).map(move |doc_id| self.get(doc_id))
    }

    /// Approximate heap footprint in bytes.
    pub fn space_usage_bytes(&self) -> usize {
        self.offsets.len() * std::mem::size_of::<usize>()
            + self.components.len() * std::mem::size_of::<TermId>()
            + self.values.len() * std::mem::size_of::<f32>()
    }

    /// Load a collection from the binary format.
    ///
    /// An unreadable file is [`Error::Io`] with the OS error attached; a
    /// readable but malformed one is a `Format*` error.
    pub fn read_bin_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse a collection from an in-memory byte buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let record_count = reader.read_u32()? as u64;
        if record_count > MAX_RECORD_COUNT {
            return Err(Error::FormatCountTooLarge {
                declared: record_count,
                limit: MAX_RECORD_COUNT,
            });
        }

        let mut dataset = SparseDatasetMut::default();
        let mut pairs: Vec<(TermId, f32)> = Vec::new();
        for record in 0..record_count as usize {
            let term_count = reader.read_u32()? as usize;
            // Both arrays must fit in the remaining stream before we
            // allocate anything proportional to the declared count.
            reader.ensure(term_count * 8)?;

            pairs.clear();
            pairs.reserve(term_count);
            for _ in 0..term_count {
                pairs.push((reader.read_u32()?, 0.0));
            }
            for pair in pairs.iter_mut() {
                pair.1 = reader.read_f32()?;
            }

            pairs.sort_unstable_by_key(|&(c, _)| c);
            for window in pairs.windows(2) {
                if window[0].0 == window[1].0 {
                    return Err(Error::FormatDuplicateTerm {
                        record,
                        term_id: window[0].0,
                    });
                }
            }
            dataset.push_sorted(&pairs);
        }

        Ok(dataset.freeze())
    }

    /// Write the collection in the binary format, ascending term_id order.
    pub fn write_bin_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        fs::write(path, self.to_bytes())
    }

    /// Serialize the collection to the binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.nnz() * 8 + self.len() * 4);
        out.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for (components, values) in self.iter() {
            out.extend_from_slice(&(components.len() as u32).to_le_bytes());
            for &c in components {
                out.extend_from_slice(&c.to_le_bytes());
            }
            for &v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }
}

/// Append-only builder for [`SparseDataset`].
#[derive(Debug, Clone)]
pub struct SparseDatasetMut {
    offsets: Vec<usize>,
    components: Vec<TermId>,
    values: Vec<f32>,
    dim: usize,
}

impl Default for SparseDatasetMut {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            components: Vec::new(),
            values: Vec::new(),
            dim: 0,
        }
    }
}

impl SparseDatasetMut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one document given ascending-sorted (term_id, weight) pairs.
    ///
    /// Caller guarantees strict ascending order; the reader sorts and
    /// deduplicates before calling this.
    pub fn push_sorted(&mut self, pairs: &[(TermId, f32)]) {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
        for &(c, v) in pairs {
            self.components.push(c);
            self.values.push(v);
            self.dim = self.dim.max(c as usize + 1);
        }
        self.offsets.push(self.components.len());
    }

    /// Append one document from parallel component/value slices, sorting if
    /// needed. Returns `false` (appending nothing) on a duplicate term_id.
    pub fn push(&mut self, components: &[TermId], values: &[f32]) -> bool {
        debug_assert_eq!(components.len(), values.len());
        let mut pairs: Vec<(TermId, f32)> = components
            .iter()
            .copied()
            .zip(values.iter().copied())
            .collect();
        pairs.sort_unstable_by_key(|&(c, _)| c);
        if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
            return false;
        }
        self.push_sorted(&pairs);
        true
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze into the read-only CSR form.
    pub fn freeze(self) -> SparseDataset {
        SparseDataset {
            offsets: self.offsets,
            components: self.components,
            values: self.values,
            dim: self.dim,
        }
    }
}

impl From<SparseDatasetMut> for SparseDataset {
    fn from(builder: SparseDatasetMut) -> Self {
        builder.freeze()
    }
}

/// Little-endian cursor over a byte slice with explicit truncation errors.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(Error::FormatEof {
                expected_bytes: needed,
                remaining_bytes: self.remaining(),
            });
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let raw = [
            self.bytes[self.pos],
            self.bytes[self.pos + 1],
            self.bytes[self.pos + 2],
            self.bytes[self.pos + 3],
        ];
        self.pos += 4;
        Ok(u32::from_le_bytes(raw))
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }
}
