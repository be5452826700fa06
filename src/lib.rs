//! Adaptive per-column accumulators for a parallel, column-oriented CSV
//! parser.
//!
//! Each tokenizer worker owns one [`ColumnChunk`] per column. Numbers are kept
//! in the narrowest lossless width ([`WideningVector`]); once real text shows
//! up the chunk converts to dictionary-encoded categorical data and stays
//! that way. Merging chunks across workers is left to the caller, which gets
//! [`ValueType::common`] and the per-chunk dictionaries to work with.

pub mod chunk;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod value_type;
pub mod widening;

pub use chunk::{ChunkParts, ChunkSummary, ColumnChunk, FinishedChunk, Semantics};
pub use config::{ChunkConfig, ColumnConfig};
pub use dictionary::Dictionary;
pub use error::{ColumnError, Result};
pub use value_type::{Element, Scalar, ValueType};
pub use widening::{Ladder, WideningVector};
