use super::normalize::PlainValue;
use serde::ser::SerializeMap;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
};

pub const DEFAULT_METRICS: [&str; 7] = [
    "chaos",
    "spatial",
    "spectral",
    "msm",
    "total_iso_ints",
    "min_iso_ints",
    "max_iso_ints",
];

/// Declared field order of the stored metrics json.
///
/// The order is part of the stored format and is identical for every row of
/// a job. `msm` may appear here even though it also has its own column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsLayout {
    fields: Vec<String>,
}

impl MetricsLayout {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for MetricsLayout {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS.iter().map(|x| x.to_string()).collect())
    }
}

/// Ordered (name, value) pairs, serialized as a json object in push order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsBundle {
    entries: Vec<(String, PlainValue)>,
}

impl MetricsBundle {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: PlainValue) {
        self.entries.push((name.into(), value));
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for MetricsBundle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in self.entries.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_keeps_push_order() {
        let mut bundle = MetricsBundle::default();
        bundle.push("spectral", PlainValue::Float(0.25));
        bundle.push("chaos", PlainValue::Int(1));
        bundle.push("all", PlainValue::Seq(vec![PlainValue::Null]));
        assert_eq!(
            bundle.to_json().unwrap(),
            r#"{"spectral":0.25,"chaos":1,"all":[null]}"#
        );
    }

    #[test]
    fn test_default_layout() {
        let layout = MetricsLayout::default();
        assert_eq!(layout.len(), 7);
        assert_eq!(layout.fields()[3], "msm");
        let parsed: MetricsLayout = serde_json::from_str(r#"["chaos","msm"]"#).unwrap();
        assert_eq!(parsed.fields(), ["chaos", "msm"]);
    }
}
