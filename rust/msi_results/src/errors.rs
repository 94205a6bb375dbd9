use crate::models::FormulaIndex;
use std::fmt::Display;
use std::path::PathBuf;

/// Inputs handed over by the search stage are inconsistent.
///
/// None of these are recoverable locally, the materialization is aborted
/// before a partial result set can be written.
#[derive(Debug)]
pub enum UpstreamDataError {
    MissingColumn {
        column: String,
    },
    DuplicateIon {
        formula_i: FormulaIndex,
        context: &'static str,
    },
    UnknownIon {
        formula_i: FormulaIndex,
    },
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    TooManyPeakSlots {
        formula_i: FormulaIndex,
        max_slots: usize,
        real: usize,
    },
    ImageShapeMismatch {
        formula_i: FormulaIndex,
        slot: usize,
        expected: (usize, usize),
        real: (usize, usize),
    },
    PixelOutOfBounds {
        row: u32,
        col: u32,
        shape: (usize, usize),
    },
    RaggedMask {
        row: usize,
        expected: usize,
        real: usize,
    },
    EmptyMask,
}

impl Display for UpstreamDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { column } => {
                write!(f, "metrics table has no column named '{}'", column)
            }
            Self::DuplicateIon { formula_i, context } => {
                write!(f, "formula_i={} appears more than once ({})", formula_i, context)
            }
            Self::UnknownIon { formula_i } => write!(
                f,
                "image references exist for formula_i={} but the metrics table has no such row",
                formula_i
            ),
            Self::ExpectedSlicesSameLength {
                expected,
                other,
                context,
            } => write!(
                f,
                "expected slices of the same length, got {} and {} ({})",
                expected, other, context
            ),
            Self::TooManyPeakSlots {
                formula_i,
                max_slots,
                real,
            } => write!(
                f,
                "formula_i={} has {} peak slots, the job allows {}",
                formula_i, real, max_slots
            ),
            Self::ImageShapeMismatch {
                formula_i,
                slot,
                expected,
                real,
            } => write!(
                f,
                "formula_i={} slot {} has shape {:?}, mask is {:?}",
                formula_i, slot, real, expected
            ),
            Self::PixelOutOfBounds { row, col, shape } => {
                write!(f, "pixel ({}, {}) outside of grid {:?}", row, col, shape)
            }
            Self::RaggedMask {
                row,
                expected,
                real,
            } => write!(
                f,
                "mask row {} has {} columns, expected {}",
                row, real, expected
            ),
            Self::EmptyMask => write!(f, "mask has no pixels"),
        }
    }
}

/// An external store (image store or relational store) failed.
#[derive(Debug)]
pub enum StoreError {
    ImageStore {
        store_kind: String,
        source: String,
    },
    ResultStore {
        source: String,
    },
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageStore { store_kind, source } => {
                write!(f, "image store '{}' failed: {}", store_kind, source)
            }
            Self::ResultStore { source } => write!(f, "result store failed: {}", source),
            Self::Io { source, path } => match path {
                Some(path) => write!(f, "io error at {}: {}", path.display(), source),
                None => write!(f, "io error: {}", source),
            },
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(x: rusqlite::Error) -> Self {
        Self::ResultStore {
            source: x.to_string(),
        }
    }
}

impl From<parquet::errors::ParquetError> for StoreError {
    fn from(x: parquet::errors::ParquetError) -> Self {
        Self::ResultStore {
            source: x.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NonPortableReason {
    NonFinite(f64),
    Missing,
    IntegerOverflow(u64),
    NestedSequence,
    UnsupportedType(&'static str),
    Serialization(String),
}

/// A metric value that cannot be written as a plain JSON number or list.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericError {
    pub reason: NonPortableReason,
    pub field: Option<String>,
    pub formula_i: Option<FormulaIndex>,
}

impl NumericError {
    pub fn new(reason: NonPortableReason) -> Self {
        Self {
            reason,
            field: None,
            formula_i: None,
        }
    }

    pub fn with_location(mut self, field: &str, formula_i: FormulaIndex) -> Self {
        self.field = Some(field.to_string());
        self.formula_i = Some(formula_i);
        self
    }
}

impl Display for NumericError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "non portable value {:?}", self.reason)?;
        if let Some(field) = &self.field {
            write!(f, " in field '{}'", field)?;
        }
        if let Some(formula_i) = self.formula_i {
            write!(f, " for formula_i={}", formula_i)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum MaterializationError {
    UpstreamData(UpstreamDataError),
    StoreUnavailable(StoreError),
    NonPortableNumericValue(NumericError),
}

impl Display for MaterializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpstreamData(e) => write!(f, "upstream data error: {}", e),
            Self::StoreUnavailable(e) => write!(f, "store unavailable: {}", e),
            Self::NonPortableNumericValue(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MaterializationError {}

pub type Result<T> = std::result::Result<T, MaterializationError>;

impl From<UpstreamDataError> for MaterializationError {
    fn from(x: UpstreamDataError) -> Self {
        Self::UpstreamData(x)
    }
}

impl From<StoreError> for MaterializationError {
    fn from(x: StoreError) -> Self {
        Self::StoreUnavailable(x)
    }
}

impl From<NumericError> for MaterializationError {
    fn from(x: NumericError) -> Self {
        Self::NonPortableNumericValue(x)
    }
}
