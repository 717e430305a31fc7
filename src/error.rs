// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the engine.
//!
//! Four families, matching the operations that can fail:
//!
//! - `Io` — the collection file could not be read in the first place.
//!   Raised by [`crate::SparseDataset::read_bin_file`] with the OS error
//!   text attached.
//! - `Format*` — the binary collection stream is malformed (truncated, or a
//!   record declares a duplicate term). Raised by [`crate::SparseDataset`].
//! - `Build*` — the build configuration is out of range, or the collection
//!   is empty. Raised by [`crate::InvertedIndex::build`]. Build is
//!   all-or-nothing: a failed build leaves no partially usable index.
//! - `Invalid*` — malformed query parameters (zero k, zero threads, NaN or
//!   negative heap factor). Raised per query, or per batch for the thread
//!   count.
//!
//! None of these are ever swallowed into an empty result set: an empty
//! answer for a malformed input would be indistinguishable from a
//! legitimately empty answer.

use std::fmt;

/// Error type for every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The collection file could not be read at all (missing, permission
    /// denied). Carries the OS error text; distinct from `Format*`, which
    /// means the bytes were read but are malformed.
    Io { message: String },
    /// The stream ended before the declared counts were satisfied.
    FormatEof {
        expected_bytes: usize,
        remaining_bytes: usize,
    },
    /// A record contains the same term_id twice.
    FormatDuplicateTerm { record: usize, term_id: u32 },
    /// A declared count exceeds the hard limit on collection size.
    FormatCountTooLarge { declared: u64, limit: u64 },
    /// The collection is empty; an index over zero documents is useless.
    BuildEmptyCollection,
    /// A build parameter is outside its valid range.
    BuildInvalidParameter {
        parameter: &'static str,
        value: f64,
    },
    /// k must be at least 1.
    InvalidK,
    /// The batch thread count must be at least 1 (or the pool could not be
    /// created for the requested count).
    InvalidThreads { requested: usize },
    /// heap_factor must be finite and non-negative.
    InvalidHeapFactor { value: f32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { message } => {
                write!(f, "cannot read collection file: {}", message)
            }
            Error::FormatEof {
                expected_bytes,
                remaining_bytes,
            } => {
                write!(
                    f,
                    "truncated collection stream: needed {} bytes, {} remain",
                    expected_bytes, remaining_bytes
                )
            }
            Error::FormatDuplicateTerm { record, term_id } => {
                write!(
                    f,
                    "record {} declares term_id {} more than once",
                    record, term_id
                )
            }
            Error::FormatCountTooLarge { declared, limit } => {
                write!(f, "declared count {} exceeds limit {}", declared, limit)
            }
            Error::BuildEmptyCollection => {
                write!(f, "cannot build an index over an empty collection")
            }
            Error::BuildInvalidParameter { parameter, value } => {
                write!(
                    f,
                    "build parameter {} = {} is out of range",
                    parameter, value
                )
            }
            Error::InvalidK => write!(f, "k must be at least 1"),
            Error::InvalidThreads { requested } => {
                write!(f, "invalid thread count {}", requested)
            }
            Error::InvalidHeapFactor { value } => {
                write!(f, "heap_factor {} must be finite and non-negative", value)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
