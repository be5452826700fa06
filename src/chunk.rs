//! Per-column accumulator fed by one tokenizer worker.
//!
//! A [`ColumnChunk`] starts out numeric and stores values in a
//! [`WideningVector`] over [`Ladder::NUMERIC`]. The first non-empty text field
//! flips it to categorical for good: the numeric history is rendered to text,
//! interned in first-seen order, and replaced by a vector of dictionary codes.
//!
//! ## Mode rules
//!
//! - numeric with data, empty text: stored as numeric zero (blank cells in
//!   sparse numeric columns)
//! - numeric with data, other text: convert history, then intern the text
//! - empty or categorical: intern the text
//! - numbers arriving in categorical mode are interned as canonical text
//!
//! Each chunk is owned by exactly one worker. [`ColumnChunk::finish`] hands a
//! read-only [`FinishedChunk`] to whatever merges chunks across workers.

use std::{fmt, ops::Deref};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::ColumnConfig,
    dictionary::Dictionary,
    error::{ColumnError, Result},
    value_type::{Element, Scalar, ValueType},
    widening::{Ladder, WideningVector},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semantics {
    Numeric,
    Categorical,
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantics::Numeric => f.write_str("numeric"),
            Semantics::Categorical => f.write_str("categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Store {
    Numeric(WideningVector),
    /// Never empty: entered only by appending a code.
    Categorical(WideningVector),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunk {
    name: String,
    store: Store,
    dictionary: Dictionary,
    force_categorical: bool,
}

impl ColumnChunk {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: Store::Numeric(WideningVector::new(Ladder::NUMERIC)),
            dictionary: Dictionary::new(),
            force_categorical: false,
        }
    }

    pub fn from_config(config: &ColumnConfig) -> Self {
        Self {
            name: config.name.clone(),
            store: Store::Numeric(WideningVector::with_capacity(
                Ladder::NUMERIC,
                config.capacity_hint,
            )),
            dictionary: Dictionary::new(),
            force_categorical: config.force_categorical,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn process_float(&mut self, value: f64) -> Result<()> {
        self.process_number(Scalar::Float(value))
    }

    pub fn process_integer(&mut self, value: i64) -> Result<()> {
        self.process_number(Scalar::Int(value))
    }

    fn process_number(&mut self, value: Scalar) -> Result<()> {
        if !self.force_categorical
            && let Store::Numeric(numbers) = &mut self.store
        {
            return numbers.append(value);
        }
        self.process_categorical(&value.to_string())
    }

    pub fn process_categorical(&mut self, text: &str) -> Result<()> {
        if let Store::Numeric(numbers) = &mut self.store
            && !numbers.is_empty()
        {
            if text.is_empty() {
                return numbers.append(0_i64);
            }
            self.convert_to_string()?;
        }
        self.push_code(text)
    }

    /// Interns `text` without the empty-field special case. Numeric history,
    /// if any, is converted first.
    pub fn add_cat_data(&mut self, text: &str) -> Result<()> {
        self.convert_to_string()?;
        self.push_code(text)
    }

    /// Moves every numeric value, in order, into the dictionary as canonical
    /// text. One-way; a no-op without numeric data.
    pub fn convert_to_string(&mut self) -> Result<()> {
        let Store::Numeric(numbers) = &self.store else {
            return Ok(());
        };
        if numbers.is_empty() {
            return Ok(());
        }
        let mut codes = WideningVector::with_capacity(Ladder::CODES, numbers.len() + 1);
        for value in numbers.scalars() {
            codes.append(self.dictionary.intern(&value.to_string()))?;
        }
        debug!(
            "Column '{}' converted {} numeric value(s) into {} categorical level(s)",
            self.name,
            codes.len(),
            self.dictionary.len()
        );
        self.store = Store::Categorical(codes);
        Ok(())
    }

    fn push_code(&mut self, text: &str) -> Result<()> {
        let code = self.dictionary.intern(text);
        match &mut self.store {
            Store::Categorical(codes) => codes.append(code),
            Store::Numeric(_) => {
                let mut codes = WideningVector::new(Ladder::CODES);
                codes.append(code)?;
                self.store = Store::Categorical(codes);
                Ok(())
            }
        }
    }

    pub fn get_semantics(&self) -> Semantics {
        match &self.store {
            Store::Categorical(codes) if !codes.is_empty() => Semantics::Categorical,
            _ => Semantics::Numeric,
        }
    }

    pub fn type_identifier(&self) -> ValueType {
        match &self.store {
            Store::Numeric(numbers) => numbers.type_identifier(),
            Store::Categorical(_) => ValueType::String,
        }
    }

    pub fn common_type_identifier(&self, other: ValueType) -> ValueType {
        match &self.store {
            Store::Numeric(numbers) => numbers.common_type_identifier(other),
            Store::Categorical(_) => ValueType::String,
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Numeric(values) | Store::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties both stores and the dictionary; the chunk reads as numeric
    /// again.
    pub fn clear(&mut self) {
        self.store = Store::Numeric(WideningVector::new(Ladder::NUMERIC));
        self.dictionary.clear();
    }

    fn numbers(&self) -> Result<&WideningVector> {
        match &self.store {
            Store::Numeric(numbers) => Ok(numbers),
            Store::Categorical(_) => Err(ColumnError::InvalidState {
                expected: Semantics::Numeric,
                actual: Semantics::Categorical,
            }),
        }
    }

    fn codes(&self) -> Result<&WideningVector> {
        match &self.store {
            Store::Categorical(codes) => Ok(codes),
            Store::Numeric(_) => Err(ColumnError::InvalidState {
                expected: Semantics::Categorical,
                actual: Semantics::Numeric,
            }),
        }
    }

    /// Numeric value at `index` converted to `T`.
    pub fn get<T: Element>(&self, index: usize) -> Result<T> {
        self.numbers()?.get(index)
    }

    /// Dictionary code at `index`.
    pub fn code(&self, index: usize) -> Result<usize> {
        self.codes()?.get(index)
    }

    /// Decoded text at `index`.
    pub fn category(&self, index: usize) -> Result<&str> {
        let code = self.code(index)?;
        self.dictionary
            .key(code)
            .ok_or(ColumnError::OutOfRange {
                index: code,
                len: self.dictionary.len(),
            })
    }

    /// Copies the numeric values into `out`, converting each to `T`, and
    /// returns how many were written.
    pub fn copy_numeric_into<T: Element>(&self, out: &mut [T]) -> Result<usize> {
        let numbers = self.numbers()?;
        if out.len() < numbers.len() {
            return Err(ColumnError::OutOfRange {
                index: out.len(),
                len: out.len(),
            });
        }
        for (slot, value) in out.iter_mut().zip(numbers.scalars()) {
            *slot = T::from_scalar(value);
        }
        Ok(numbers.len())
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Decode table, indexed by code. Empty in numeric mode.
    pub fn cat_keys(&self) -> &[String] {
        self.dictionary.keys()
    }

    pub fn summary(&self) -> ChunkSummary {
        ChunkSummary {
            name: self.name.clone(),
            semantics: self.get_semantics(),
            value_type: self.type_identifier(),
            len: self.len(),
            levels: self.dictionary.len(),
        }
    }

    /// Freezes the chunk once its worker has consumed its row range.
    pub fn finish(self) -> FinishedChunk {
        debug!(
            "Column '{}' finished with {} {} value(s) stored as {}",
            self.name,
            self.len(),
            self.get_semantics(),
            self.type_identifier()
        );
        FinishedChunk { chunk: self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    pub name: String,
    pub semantics: Semantics,
    pub value_type: ValueType,
    pub len: usize,
    pub levels: usize,
}

/// Read-only view of a chunk whose worker is done.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedChunk {
    chunk: ColumnChunk,
}

/// Owned pieces of a finished chunk for a merge step. `values` holds numbers
/// in numeric mode and dictionary codes into `keys` in categorical mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkParts {
    pub name: String,
    pub semantics: Semantics,
    pub values: WideningVector,
    pub keys: Vec<String>,
}

impl FinishedChunk {
    pub fn into_parts(self) -> ChunkParts {
        let semantics = self.chunk.get_semantics();
        let ColumnChunk {
            name,
            store,
            dictionary,
            ..
        } = self.chunk;
        let values = match store {
            Store::Numeric(values) | Store::Categorical(values) => values,
        };
        ChunkParts {
            name,
            semantics,
            values,
            keys: dictionary.into_keys(),
        }
    }
}

impl Deref for FinishedChunk {
    type Target = ColumnChunk;

    fn deref(&self) -> &Self::Target {
        &self.chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_chunk(values: &[i64]) -> ColumnChunk {
        let mut chunk = ColumnChunk::new("amount");
        for value in values {
            chunk.process_integer(*value).unwrap();
        }
        chunk
    }

    #[test]
    fn empty_text_after_numbers_is_stored_as_zero() {
        let mut chunk = numeric_chunk(&[1, 2]);
        chunk.process_categorical("").unwrap();
        assert_eq!(chunk.get_semantics(), Semantics::Numeric);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.get::<i64>(2).unwrap(), 0);
    }

    #[test]
    fn text_after_numbers_converts_history_in_order() {
        let mut chunk = numeric_chunk(&[1, 2]);
        chunk.process_categorical("").unwrap();
        chunk.process_categorical("x").unwrap();
        assert_eq!(chunk.get_semantics(), Semantics::Categorical);
        assert_eq!(chunk.len(), 4);
        assert_eq!(chunk.cat_keys(), ["1", "2", "0", "x"]);
        let decoded: Vec<&str> = (0..chunk.len())
            .map(|idx| chunk.category(idx).unwrap())
            .collect();
        assert_eq!(decoded, vec!["1", "2", "0", "x"]);
    }

    #[test]
    fn empty_text_first_is_interned() {
        let mut chunk = ColumnChunk::new("notes");
        chunk.process_categorical("").unwrap();
        assert_eq!(chunk.get_semantics(), Semantics::Categorical);
        assert_eq!(chunk.category(0).unwrap(), "");
    }

    #[test]
    fn numbers_after_conversion_are_textified() {
        let mut chunk = ColumnChunk::new("mixed");
        chunk.process_categorical("n/a").unwrap();
        chunk.process_float(2.5).unwrap();
        chunk.process_integer(7).unwrap();
        chunk.process_float(7.0).unwrap();
        assert_eq!(chunk.get_semantics(), Semantics::Categorical);
        assert_eq!(chunk.cat_keys(), ["n/a", "2.5", "7"]);
        assert_eq!(chunk.code(3).unwrap(), 2);
    }

    #[test]
    fn numeric_read_after_conversion_is_invalid_state() {
        let mut chunk = numeric_chunk(&[5]);
        chunk.convert_to_string().unwrap();
        assert_eq!(
            chunk.get::<i64>(0),
            Err(ColumnError::InvalidState {
                expected: Semantics::Numeric,
                actual: Semantics::Categorical,
            })
        );
        let mut out = [0_i64; 1];
        assert!(matches!(
            chunk.copy_numeric_into(&mut out),
            Err(ColumnError::InvalidState { .. })
        ));
    }

    #[test]
    fn code_read_in_numeric_mode_is_invalid_state() {
        let chunk = numeric_chunk(&[5]);
        assert!(matches!(
            chunk.code(0),
            Err(ColumnError::InvalidState {
                expected: Semantics::Categorical,
                ..
            })
        ));
    }

    #[test]
    fn add_cat_data_converts_numbers_and_keeps_empty_text() {
        let mut chunk = numeric_chunk(&[3]);
        chunk.add_cat_data("").unwrap();
        assert_eq!(chunk.get_semantics(), Semantics::Categorical);
        assert_eq!(chunk.cat_keys(), ["3", ""]);
    }

    #[test]
    fn type_identifier_tracks_mode() {
        let mut chunk = numeric_chunk(&[1, 1_000]);
        assert_eq!(chunk.type_identifier(), ValueType::I16);
        assert_eq!(chunk.common_type_identifier(ValueType::I32), ValueType::I32);
        assert_eq!(
            chunk.common_type_identifier(ValueType::String),
            ValueType::String
        );
        chunk.process_categorical("text").unwrap();
        assert_eq!(chunk.type_identifier(), ValueType::String);
        assert_eq!(chunk.common_type_identifier(ValueType::I8), ValueType::String);
    }

    #[test]
    fn copy_numeric_into_checks_buffer_length() {
        let chunk = numeric_chunk(&[4, 300, -2]);
        let mut short = [0_i32; 2];
        assert_eq!(
            chunk.copy_numeric_into(&mut short),
            Err(ColumnError::OutOfRange { index: 2, len: 2 })
        );
        let mut out = [0.0_f64; 4];
        assert_eq!(chunk.copy_numeric_into(&mut out).unwrap(), 3);
        assert_eq!(out, [4.0, 300.0, -2.0, 0.0]);
    }

    #[test]
    fn clear_returns_to_fresh_numeric_state() {
        let mut chunk = numeric_chunk(&[1]);
        chunk.process_categorical("a").unwrap();
        chunk.clear();
        assert!(chunk.is_empty());
        assert_eq!(chunk.get_semantics(), Semantics::Numeric);
        assert!(chunk.cat_keys().is_empty());
        chunk.process_integer(9).unwrap();
        assert_eq!(chunk.get::<u8>(0).unwrap(), 9);
    }

    #[test]
    fn finished_chunk_hands_over_parts() {
        let mut chunk = ColumnChunk::new("status");
        for text in ["open", "closed", "open"] {
            chunk.process_categorical(text).unwrap();
        }
        let finished = chunk.finish();
        assert_eq!(finished.len(), 3);
        let parts = finished.into_parts();
        assert_eq!(parts.name, "status");
        assert_eq!(parts.semantics, Semantics::Categorical);
        assert_eq!(parts.keys, vec!["open", "closed"]);
        assert_eq!(parts.values.type_identifier(), ValueType::U8);
        assert_eq!(parts.values.get::<usize>(2).unwrap(), 0);
    }
}
