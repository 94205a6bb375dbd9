//! Per-stage wall times of one materialization run.

use serde::Serialize;
use std::time::Duration;

/// Accumulated timings for the three materialization stages.
///
/// `posting` is the wall time of the parallel stage, not the summed store
/// time of all workers.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MaterializationTimings {
    pub posting: Duration,
    pub row_building: Duration,
    pub writing: Duration,
}

impl MaterializationTimings {
    pub fn total(&self) -> Duration {
        self.posting + self.row_building + self.writing
    }
}

impl Serialize for MaterializationTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("MaterializationTimings", 3)?;
        state.serialize_field("posting_ms", &self.posting.as_millis())?;
        state.serialize_field("row_building_ms", &self.row_building.as_millis())?;
        state.serialize_field("writing_ms", &self.writing.as_millis())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_millis() {
        let timings = MaterializationTimings {
            posting: Duration::from_millis(1500),
            row_building: Duration::from_micros(2500),
            writing: Duration::from_millis(7),
        };
        assert_eq!(
            serde_json::to_string(&timings).unwrap(),
            r#"{"posting_ms":1500,"row_building_ms":2,"writing_ms":7}"#
        );
    }
}
