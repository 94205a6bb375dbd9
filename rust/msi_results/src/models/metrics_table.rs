use super::ion::FormulaIndex;
use crate::errors::UpstreamDataError;
use nohash_hasher::IntMap;
use serde::{
    Deserialize,
    Serialize,
};

/// A metric value in whatever representation the scoring stage produced.
///
/// Nothing here is guaranteed to be portable, values have to go through
/// [`crate::metrics::normalize`] before they are serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    F32(f32),
    F64(f64),
    I32(i32),
    I64(i64),
    U64(u64),
    Bool(bool),
    /// Scalar wrapped in a zero-dimensional array.
    ZeroDim(Box<RawValue>),
    Array(Vec<RawValue>),
    Missing,
    Text(String),
}

impl RawValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::Bool(_) => "bool",
            Self::ZeroDim(_) => "zero-dim array",
            Self::Array(_) => "array",
            Self::Missing => "missing",
            Self::Text(_) => "text",
        }
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        Self::F64(x)
    }
}

impl From<f32> for RawValue {
    fn from(x: f32) -> Self {
        Self::F32(x)
    }
}

impl From<i64> for RawValue {
    fn from(x: i64) -> Self {
        Self::I64(x)
    }
}

impl From<i32> for RawValue {
    fn from(x: i32) -> Self {
        Self::I32(x)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(x: Vec<T>) -> Self {
        Self::Array(x.into_iter().map(Into::into).collect())
    }
}

impl From<&serde_json::Value> for RawValue {
    fn from(x: &serde_json::Value) -> Self {
        use serde_json::Value;
        match x {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Self::U64(u)
                } else {
                    // Without arbitrary_precision every json number fits one of the three.
                    Self::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(arr) => Self::Array(arr.iter().map(Self::from).collect()),
            Value::Object(_) => Self::Text(x.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub formula_i: FormulaIndex,
    pub formula: String,
    pub adduct: String,
    pub values: Vec<RawValue>,
}

/// Per-ion metrics, one row per ion, indexed by `formula_i`.
///
/// Every row carries one value per entry of `columns`, in column order.
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    columns: Vec<String>,
    rows: Vec<MetricsRow>,
    index: IntMap<FormulaIndex, usize>,
}

impl MetricsTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            index: IntMap::default(),
        }
    }

    pub fn push_row(
        &mut self,
        formula_i: FormulaIndex,
        formula: impl Into<String>,
        adduct: impl Into<String>,
        values: Vec<RawValue>,
    ) -> Result<(), UpstreamDataError> {
        if values.len() != self.columns.len() {
            return Err(UpstreamDataError::ExpectedSlicesSameLength {
                expected: self.columns.len(),
                other: values.len(),
                context: format!("metrics row for formula_i={}", formula_i),
            });
        }
        if self.index.contains_key(&formula_i) {
            return Err(UpstreamDataError::DuplicateIon {
                formula_i,
                context: "metrics table",
            });
        }
        self.index.insert(formula_i, self.rows.len());
        self.rows.push(MetricsRow {
            formula_i,
            formula: formula.into(),
            adduct: adduct.into(),
            values,
        });
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Result<usize, UpstreamDataError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| UpstreamDataError::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn get(&self, formula_i: FormulaIndex) -> Option<&MetricsRow> {
        self.index.get(&formula_i).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, formula_i: FormulaIndex) -> bool {
        self.index.contains_key(&formula_i)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// On-disk layout of a metrics table.
///
/// ```json
/// {
///   "columns": ["chaos", "spatial", "spectral", "msm", "fdr"],
///   "rows": [{"formula_i": 13, "formula": "H2O", "adduct": "+H", "values": [0.9, 0.9, 0.9, 0.729, 0.5]}]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsTableFile {
    pub columns: Vec<String>,
    pub rows: Vec<MetricsRowFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRowFile {
    pub formula_i: FormulaIndex,
    pub formula: String,
    pub adduct: String,
    pub values: Vec<serde_json::Value>,
}

impl TryFrom<MetricsTableFile> for MetricsTable {
    type Error = UpstreamDataError;

    fn try_from(file: MetricsTableFile) -> Result<Self, Self::Error> {
        let mut table = MetricsTable::new(file.columns);
        for row in file.rows {
            let values = row.values.iter().map(RawValue::from).collect();
            table.push_row(row.formula_i, row.formula, row.adduct, values)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_lookup_by_formula_index() {
        let mut table = MetricsTable::new(cols(&["msm", "fdr"]));
        table
            .push_row(13, "H2O", "+H", vec![RawValue::F64(0.5), RawValue::F64(0.1)])
            .unwrap();
        table
            .push_row(7, "CO2", "+Na", vec![RawValue::F64(0.2), RawValue::F64(0.2)])
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(7).unwrap().formula, "CO2");
        assert!(table.get(8).is_none());
        assert_eq!(table.column_index("fdr").unwrap(), 1);
        assert!(matches!(
            table.column_index("chaos"),
            Err(UpstreamDataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_short_rows_rejected() {
        let mut table = MetricsTable::new(cols(&["msm"]));
        table.push_row(1, "H2O", "+H", vec![RawValue::F64(0.5)]).unwrap();
        assert!(matches!(
            table.push_row(1, "H2O", "+K", vec![RawValue::F64(0.5)]),
            Err(UpstreamDataError::DuplicateIon { formula_i: 1, .. })
        ));
        assert!(matches!(
            table.push_row(2, "H2O", "+K", vec![]),
            Err(UpstreamDataError::ExpectedSlicesSameLength { .. })
        ));
    }

    #[test]
    fn test_table_file_deserializable() {
        let text = r#"{
            "columns": ["chaos", "total_iso_ints", "fdr"],
            "rows": [{"formula_i": 13, "formula": "H2O", "adduct": "+H", "values": [0.9, [100, 10], null]}]
        }"#;
        let file: MetricsTableFile = serde_json::from_str(text).unwrap();
        let table = MetricsTable::try_from(file).unwrap();
        let row = table.get(13).unwrap();
        assert_eq!(row.values[0], RawValue::F64(0.9));
        assert_eq!(
            row.values[1],
            RawValue::Array(vec![RawValue::I64(100), RawValue::I64(10)])
        );
        assert_eq!(row.values[2], RawValue::Missing);
    }
}
