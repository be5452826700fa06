//! Type identity plumbing for adaptive column storage.
//!
//! [`ValueType`] is the opaque identifier a chunk reports for its active
//! representation and the currency of [`ValueType::common`], which an external
//! merge step uses to reconcile independently-typed chunks of one column.
//! [`Scalar`] carries a single numeric value between the tokenizer, the
//! widening storage, and typed reads.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F64,
    String,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F64 => "f64",
            ValueType::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueType::String)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            ValueType::I8 | ValueType::I16 | ValueType::I32 | ValueType::I64 | ValueType::F64
        )
    }

    fn bits(&self) -> u32 {
        match self {
            ValueType::U8 | ValueType::I8 => 8,
            ValueType::U16 | ValueType::I16 => 16,
            ValueType::U32 | ValueType::I32 => 32,
            ValueType::U64 | ValueType::I64 | ValueType::F64 => 64,
            ValueType::String => 0,
        }
    }

    fn integer_bounds(&self) -> Option<(i128, i128)> {
        let bounds = match self {
            ValueType::U8 => (0, u8::MAX as i128),
            ValueType::U16 => (0, u16::MAX as i128),
            ValueType::U32 => (0, u32::MAX as i128),
            ValueType::U64 => (0, u64::MAX as i128),
            ValueType::I8 => (i8::MIN as i128, i8::MAX as i128),
            ValueType::I16 => (i16::MIN as i128, i16::MAX as i128),
            ValueType::I32 => (i32::MIN as i128, i32::MAX as i128),
            ValueType::I64 => (i64::MIN as i128, i64::MAX as i128),
            ValueType::F64 | ValueType::String => return None,
        };
        Some(bounds)
    }

    /// Whether `value` can be stored in this type without losing information.
    ///
    /// `F64` is the terminal candidate of the numeric domain and accepts every
    /// scalar; integers wider than 53 bits round to the nearest double there.
    pub fn can_represent(&self, value: Scalar) -> bool {
        match self {
            ValueType::String => false,
            ValueType::F64 => true,
            integer => {
                let Some(exact) = value.exact_integer() else {
                    return false;
                };
                integer
                    .integer_bounds()
                    .is_some_and(|(min, max)| min <= exact && exact <= max)
            }
        }
    }

    /// Narrowest type able to hold values of both `self` and `other`.
    ///
    /// Symmetric. `String` absorbs everything, then `F64`. Integers of equal
    /// signedness resolve to the wider one; mixed signedness resolves to the
    /// narrowest signed type covering the unsigned range, or `F64` for `U64`.
    pub fn common(self, other: ValueType) -> ValueType {
        if self == other {
            return self;
        }
        match (self, other) {
            (ValueType::String, _) | (_, ValueType::String) => ValueType::String,
            (ValueType::F64, _) | (_, ValueType::F64) => ValueType::F64,
            _ if self.is_signed() == other.is_signed() => {
                if self.bits() >= other.bits() {
                    self
                } else {
                    other
                }
            }
            _ if self.is_signed() => signed_covering(self, other),
            _ => signed_covering(other, self),
        }
    }
}

fn signed_covering(signed: ValueType, unsigned: ValueType) -> ValueType {
    match signed.bits().max(unsigned.bits() * 2) {
        16 => ValueType::I16,
        32 => ValueType::I32,
        64 => ValueType::I64,
        _ => ValueType::F64,
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numeric value, as handed over by a tokenizer or read back from storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    /// The value as an integer, if it is one exactly. Negative zero is not,
    /// since an integer slot would drop its sign.
    fn exact_integer(&self) -> Option<i128> {
        match *self {
            Scalar::Int(value) => Some(value as i128),
            Scalar::UInt(value) => Some(value as i128),
            Scalar::Float(value) => {
                if !value.is_finite() || value.fract() != 0.0 {
                    return None;
                }
                if value == 0.0 && value.is_sign_negative() {
                    return None;
                }
                Some(value as i128)
            }
        }
    }
}

/// Canonical decimal text: integers as-is, floats in shortest round-trip form
/// (`1.0` renders as `1`).
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::UInt(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Primitive numeric types that can be stored in, or read out of, widening
/// storage.
pub trait Element: Copy + Into<Scalar> {
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_element {
    ($variant:ident as $wide:ty => $($ty:ty),+) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value as $wide)
                }
            }

            impl Element for $ty {
                fn from_scalar(value: Scalar) -> Self {
                    match value {
                        Scalar::Int(v) => v as $ty,
                        Scalar::UInt(v) => v as $ty,
                        Scalar::Float(v) => v as $ty,
                    }
                }
            }
        )+
    };
}

impl_element!(Int as i64 => i8, i16, i32, i64, isize);
impl_element!(UInt as u64 => u8, u16, u32, u64, usize);
impl_element!(Float as f64 => f32, f64);
