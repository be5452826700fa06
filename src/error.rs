//! Error taxonomy shared by [`WideningVector`](crate::widening::WideningVector)
//! and [`ColumnChunk`](crate::chunk::ColumnChunk).
//!
//! Every variant is a contract violation by the caller or a misconfigured
//! candidate ladder. Nothing here is transient, so there is no retry story.

use thiserror::Error;

use crate::{chunk::Semantics, value_type::ValueType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    /// A read was requested for a mode the column is not in. After a numeric
    /// column converts to categorical the numeric data is gone.
    #[error("Column holds {actual} data; {expected} read is not possible")]
    InvalidState {
        expected: Semantics,
        actual: Semantics,
    },

    #[error("Index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// No candidate of the ladder can hold the value, not even the widest.
    #[error("No candidate up to {widest} can represent value {value}")]
    PromotionFailure { value: String, widest: ValueType },
}

pub type Result<T> = std::result::Result<T, ColumnError>;
