//! Append-only numeric storage that keeps every value in the narrowest
//! lossless candidate type of a fixed [`Ladder`].
//!
//! Storage is a closed set of typed vectors. When an appended value does not
//! fit the active type, [`WideningVector::append`] looks further up the ladder
//! for the first candidate that does, re-encodes the existing elements into it
//! once, and only then stores the new value. The active type never narrows
//! except through [`WideningVector::clear`].

use log::debug;

use crate::{
    error::{ColumnError, Result},
    value_type::{Element, Scalar, ValueType},
};

/// Ordered candidate types, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ladder {
    candidates: &'static [ValueType],
}

impl Ladder {
    /// Raw numeric values: signed integers, then floating point.
    pub const NUMERIC: Ladder = Ladder::new(&[
        ValueType::I8,
        ValueType::I16,
        ValueType::I32,
        ValueType::I64,
        ValueType::F64,
    ]);

    /// Dictionary codes.
    pub const CODES: Ladder = Ladder::new(&[
        ValueType::U8,
        ValueType::U16,
        ValueType::U32,
        ValueType::U64,
    ]);

    /// # Panics
    ///
    /// When `candidates` is empty or contains [`ValueType::String`].
    pub const fn new(candidates: &'static [ValueType]) -> Self {
        assert!(
            !candidates.is_empty(),
            "ladder needs at least one candidate"
        );
        let mut idx = 0;
        while idx < candidates.len() {
            assert!(
                !matches!(candidates[idx], ValueType::String),
                "ladder candidates must be numeric"
            );
            idx += 1;
        }
        Self { candidates }
    }

    pub fn candidates(&self) -> &'static [ValueType] {
        self.candidates
    }

    pub fn narrowest(&self) -> ValueType {
        self.candidates[0]
    }

    pub fn widest(&self) -> ValueType {
        self.candidates[self.candidates.len() - 1]
    }

    fn position(&self, ty: ValueType) -> usize {
        self.candidates
            .iter()
            .position(|candidate| *candidate == ty)
            .unwrap_or(0)
    }

    /// First candidate strictly above `active` that can hold `value`.
    fn wider_fit(&self, active: ValueType, value: Scalar) -> Option<ValueType> {
        self.candidates[self.position(active) + 1..]
            .iter()
            .copied()
            .find(|candidate| candidate.can_represent(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F64(Vec<f64>),
}

macro_rules! dispatch {
    ($storage:expr, $values:ident => $body:expr) => {
        match $storage {
            Storage::U8($values) => $body,
            Storage::U16($values) => $body,
            Storage::U32($values) => $body,
            Storage::U64($values) => $body,
            Storage::I8($values) => $body,
            Storage::I16($values) => $body,
            Storage::I32($values) => $body,
            Storage::I64($values) => $body,
            Storage::F64($values) => $body,
        }
    };
}

impl Storage {
    fn with_capacity(ty: ValueType, capacity: usize) -> Self {
        match ty {
            ValueType::U8 => Storage::U8(Vec::with_capacity(capacity)),
            ValueType::U16 => Storage::U16(Vec::with_capacity(capacity)),
            ValueType::U32 => Storage::U32(Vec::with_capacity(capacity)),
            ValueType::U64 => Storage::U64(Vec::with_capacity(capacity)),
            ValueType::I8 => Storage::I8(Vec::with_capacity(capacity)),
            ValueType::I16 => Storage::I16(Vec::with_capacity(capacity)),
            ValueType::I32 => Storage::I32(Vec::with_capacity(capacity)),
            ValueType::I64 => Storage::I64(Vec::with_capacity(capacity)),
            ValueType::F64 => Storage::F64(Vec::with_capacity(capacity)),
            ValueType::String => unreachable!("ladders never hold the string type"),
        }
    }

    fn value_type(&self) -> ValueType {
        match self {
            Storage::U8(_) => ValueType::U8,
            Storage::U16(_) => ValueType::U16,
            Storage::U32(_) => ValueType::U32,
            Storage::U64(_) => ValueType::U64,
            Storage::I8(_) => ValueType::I8,
            Storage::I16(_) => ValueType::I16,
            Storage::I32(_) => ValueType::I32,
            Storage::I64(_) => ValueType::I64,
            Storage::F64(_) => ValueType::F64,
        }
    }

    fn len(&self) -> usize {
        dispatch!(self, values => values.len())
    }

    fn scalar_at(&self, index: usize) -> Option<Scalar> {
        dispatch!(self, values => values.get(index).map(|value| Scalar::from(*value)))
    }

    /// Caller guarantees the active type can represent `value`.
    fn push(&mut self, value: Scalar) {
        dispatch!(self, values => values.push(Element::from_scalar(value)))
    }

    fn clear(&mut self) {
        dispatch!(self, values => values.clear())
    }

    fn shrink_to_fit(&mut self) {
        dispatch!(self, values => values.shrink_to_fit())
    }

    fn reencode(&self, ty: ValueType) -> Storage {
        let mut widened = Storage::with_capacity(ty, self.len() + 1);
        for index in 0..self.len() {
            if let Some(value) = self.scalar_at(index) {
                widened.push(value);
            }
        }
        widened
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideningVector {
    ladder: Ladder,
    storage: Storage,
}

impl WideningVector {
    pub fn new(ladder: Ladder) -> Self {
        Self::with_capacity(ladder, 0)
    }

    /// Reserves `capacity` slots of the narrowest candidate up front.
    pub fn with_capacity(ladder: Ladder, capacity: usize) -> Self {
        Self {
            ladder,
            storage: Storage::with_capacity(ladder.narrowest(), capacity),
        }
    }

    pub fn ladder(&self) -> Ladder {
        self.ladder
    }

    /// Appends `value`, promoting the active type first when it cannot hold it.
    ///
    /// Fails with [`ColumnError::PromotionFailure`] when no candidate of the
    /// ladder fits; the vector is left untouched in that case.
    pub fn append<V: Into<Scalar>>(&mut self, value: V) -> Result<()> {
        let value = value.into();
        let active = self.storage.value_type();
        if !active.can_represent(value) {
            let target = self.ladder.wider_fit(active, value).ok_or_else(|| {
                ColumnError::PromotionFailure {
                    value: value.to_string(),
                    widest: self.ladder.widest(),
                }
            })?;
            self.promote(target);
        }
        self.storage.push(value);
        Ok(())
    }

    fn promote(&mut self, target: ValueType) {
        let len = self.storage.len();
        if len > 0 {
            debug!(
                "Promoting {len} value(s) from {} to {target}",
                self.storage.value_type()
            );
        }
        self.storage = self.storage.reencode(target);
    }

    /// Value at `index` converted to `T`.
    pub fn get<T: Element>(&self, index: usize) -> Result<T> {
        self.scalar(index).map(T::from_scalar)
    }

    pub fn scalar(&self, index: usize) -> Result<Scalar> {
        self.storage
            .scalar_at(index)
            .ok_or(ColumnError::OutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Stored values in append order.
    pub fn scalars(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |index| self.storage.scalar_at(index))
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every value and resets the active type to the narrowest
    /// candidate.
    pub fn clear(&mut self) {
        if self.storage.value_type() == self.ladder.narrowest() {
            self.storage.clear();
        } else {
            self.storage = Storage::with_capacity(self.ladder.narrowest(), 0);
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.storage.shrink_to_fit();
    }

    pub fn type_identifier(&self) -> ValueType {
        self.storage.value_type()
    }

    pub fn common_type_identifier(&self, other: ValueType) -> ValueType {
        self.type_identifier().common(other)
    }
}
