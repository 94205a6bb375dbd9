//! Conversion of metric values into portable JSON/SQL scalars.
//!
//! The scoring stage may hand over single or double precision floats,
//! integers of several widths, zero-dimensional arrays or plain arrays.
//! Everything written to the result store goes through [`normalize`] first
//! so the serializer only ever sees `null`, `i64`, `f64` or flat lists of
//! those.

use crate::errors::{
    NonPortableReason,
    NumericError,
};
use crate::models::RawValue;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
};

/// What to do with NaN, infinities and missing values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonFinitePolicy {
    /// Fail the materialization.
    #[default]
    Reject,
    /// Store as JSON `null` / SQL `NULL`.
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlainValue {
    Null,
    Int(i64),
    Float(f64),
    /// Elements are never themselves sequences.
    Seq(Vec<PlainValue>),
}

impl PlainValue {
    /// Numeric value of a scalar, `None` for null and sequences.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(x) => Some(*x as f64),
            Self::Float(x) => Some(*x),
            Self::Null | Self::Seq(_) => None,
        }
    }
}

impl Serialize for PlainValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Int(x) => serializer.serialize_i64(*x),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Seq(xs) => serializer.collect_seq(xs),
        }
    }
}

fn float(x: f64, policy: NonFinitePolicy) -> Result<PlainValue, NumericError> {
    if x.is_finite() {
        return Ok(PlainValue::Float(x));
    }
    match policy {
        NonFinitePolicy::Reject => Err(NumericError::new(NonPortableReason::NonFinite(x))),
        NonFinitePolicy::Null => Ok(PlainValue::Null),
    }
}

fn scalar(value: &RawValue, policy: NonFinitePolicy) -> Result<PlainValue, NumericError> {
    match value {
        RawValue::F64(x) => float(*x, policy),
        // Widening is exact, no rounding to the shortest f32 repr.
        RawValue::F32(x) => float(*x as f64, policy),
        RawValue::I32(x) => Ok(PlainValue::Int(*x as i64)),
        RawValue::I64(x) => Ok(PlainValue::Int(*x)),
        RawValue::U64(x) => i64::try_from(*x)
            .map(PlainValue::Int)
            .map_err(|_| NumericError::new(NonPortableReason::IntegerOverflow(*x))),
        RawValue::Bool(x) => Ok(PlainValue::Int(*x as i64)),
        RawValue::ZeroDim(inner) => match inner.as_ref() {
            RawValue::Array(_) | RawValue::ZeroDim(_) => {
                Err(NumericError::new(NonPortableReason::NestedSequence))
            }
            other => scalar(other, policy),
        },
        RawValue::Missing => match policy {
            NonFinitePolicy::Reject => Err(NumericError::new(NonPortableReason::Missing)),
            NonFinitePolicy::Null => Ok(PlainValue::Null),
        },
        RawValue::Text(_) => Err(NumericError::new(NonPortableReason::UnsupportedType(
            value.type_name(),
        ))),
        RawValue::Array(_) => Err(NumericError::new(NonPortableReason::NestedSequence)),
    }
}

/// Converts any metric value into its portable form.
///
/// Arrays become flat sequences, converted element-wise. Arrays of arrays
/// are rejected.
pub fn normalize(value: &RawValue, policy: NonFinitePolicy) -> Result<PlainValue, NumericError> {
    match value {
        RawValue::Array(xs) => xs
            .iter()
            .map(|x| scalar(x, policy))
            .collect::<Result<Vec<_>, _>>()
            .map(PlainValue::Seq),
        other => scalar(other, policy),
    }
}

/// Normalizes a value destined for a dedicated numeric column.
///
/// Integers are widened to `f64`. `None` is only produced under
/// [`NonFinitePolicy::Null`].
pub fn normalize_scalar_column(
    value: &RawValue,
    policy: NonFinitePolicy,
) -> Result<Option<f64>, NumericError> {
    match value {
        RawValue::Array(_) => Err(NumericError::new(NonPortableReason::UnsupportedType(
            value.type_name(),
        ))),
        other => Ok(scalar(other, policy)?.as_f64()),
    }
}
