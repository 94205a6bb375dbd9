use super::traits::ResultStore;
use crate::errors::MaterializationError;
use crate::metrics::{
    ResultRecord,
    ResultRow,
};
use std::time::Instant;
use tracing::{
    info,
    warn,
};

/// Writes all records of a job with a single batched insert.
///
/// An empty batch still reaches the store, so the store sees exactly one
/// call per materialization. A failed insert is propagated unchanged,
/// whether the store rolled back is up to its own transaction semantics.
pub fn write_results<R: ResultStore + ?Sized>(
    records: Vec<ResultRecord>,
    store: &mut R,
    statement: &str,
) -> Result<usize, MaterializationError> {
    let st = Instant::now();
    let rows: Vec<ResultRow> = records.into_iter().map(ResultRecord::into_row).collect();
    if rows.is_empty() {
        warn!("Writing an empty result batch");
    }

    let written = store.insert(statement, &rows)?;
    info!("Inserted {} result rows in {:?}", written, st.elapsed());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::models::ImageId;
    use crate::storage::METRICS_INSERT;

    #[derive(Default)]
    struct RecordingStore {
        calls: Vec<(String, Vec<ResultRow>)>,
    }

    impl ResultStore for RecordingStore {
        fn insert(&mut self, statement: &str, rows: &[ResultRow]) -> Result<usize, StoreError> {
            self.calls.push((statement.to_string(), rows.to_vec()));
            Ok(rows.len())
        }
    }

    struct DownStore;

    impl ResultStore for DownStore {
        fn insert(&mut self, _statement: &str, _rows: &[ResultRow]) -> Result<usize, StoreError> {
            Err(StoreError::ResultStore {
                source: "database is locked".into(),
            })
        }
    }

    fn record(formula_i: i64) -> ResultRecord {
        ResultRecord {
            job_id: 0,
            formula_i,
            formula: "H2O".into(),
            adduct: "+H".into(),
            msm: Some(1.0),
            fdr: Some(0.5),
            metrics_json: "{}".into(),
            image_ids: vec![Some(ImageId::from("iso_image_1")), None],
        }
    }

    #[test]
    fn test_single_insert_call() {
        let mut store = RecordingStore::default();
        let n = write_results(vec![record(1), record(2)], &mut store, METRICS_INSERT).unwrap();
        assert_eq!(n, 2);
        assert_eq!(store.calls.len(), 1);
        let (statement, rows) = &store.calls[0];
        assert_eq!(statement, METRICS_INSERT);
        assert_eq!(rows[0].1, 1);
        assert_eq!(rows[1].7, vec![Some("iso_image_1".to_string()), None]);
    }

    #[test]
    fn test_empty_batch_still_inserted_once() {
        let mut store = RecordingStore::default();
        assert_eq!(write_results(vec![], &mut store, METRICS_INSERT).unwrap(), 0);
        assert_eq!(store.calls.len(), 1);
        assert!(store.calls[0].1.is_empty());
    }

    #[test]
    fn test_store_failure_propagates() {
        let err = write_results(vec![record(1)], &mut DownStore, METRICS_INSERT).unwrap_err();
        assert!(matches!(err, MaterializationError::StoreUnavailable(_)));
    }
}
