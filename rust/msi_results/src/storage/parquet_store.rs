use super::traits::ResultStore;
use crate::errors::StoreError;
use crate::metrics::ResultRow;
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RecordWriter;
use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    debug,
    info,
};

#[derive(Debug, Clone, ParquetRecordWriter)]
struct ResultParquetRow {
    job_id: i64,
    formula_i: i64,
    formula: String,
    adduct: String,
    msm: Option<f64>,
    fdr: Option<f64>,
    metrics_json: String,
    // Lists of optional strings are not supported by the derive,
    // the slot list is kept as its json text.
    image_ids: String,
}

impl TryFrom<&ResultRow> for ResultParquetRow {
    type Error = StoreError;

    fn try_from(row: &ResultRow) -> Result<Self, Self::Error> {
        let (job_id, formula_i, formula, adduct, msm, fdr, metrics_json, image_ids) = row;
        Ok(Self {
            job_id: *job_id,
            formula_i: *formula_i,
            formula: formula.clone(),
            adduct: adduct.clone(),
            msm: *msm,
            fdr: *fdr,
            metrics_json: metrics_json.clone(),
            image_ids: serde_json::to_string(image_ids).map_err(|e| StoreError::ResultStore {
                source: e.to_string(),
            })?,
        })
    }
}

/// Result store writing each inserted batch as one row group of a new
/// parquet file. Refuses to overwrite an existing file.
#[derive(Debug, Clone)]
pub struct ParquetResultStore {
    path: PathBuf,
}

impl ParquetResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for ParquetResultStore {
    fn insert(&mut self, statement: &str, rows: &[ResultRow]) -> Result<usize, StoreError> {
        debug!("Parquet store ignores statement template: {}", statement);
        let records = rows
            .iter()
            .map(ResultParquetRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let file = match File::create_new(&self.path) {
            Ok(file) => file,
            Err(err) => {
                tracing::error!(
                    "Failed to open file {:?} with error: {}",
                    self.path,
                    err
                );
                return Err(StoreError::Io {
                    source: err,
                    path: Some(self.path.clone()),
                });
            }
        };

        let records: &[ResultParquetRow] = &records;
        let schema = records.schema()?;
        let mut writer = SerializedFileWriter::new(file, schema, Default::default())?;
        let mut row_group = writer.next_row_group()?;
        records.write_to_row_group(&mut row_group)?;
        row_group.close()?;
        writer.close()?;

        info!("Wrote {} rows to {}", records.len(), self.path.display());
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::METRICS_INSERT;
    use parquet::file::reader::{
        FileReader,
        SerializedFileReader,
    };

    fn row(formula_i: i64) -> ResultRow {
        (
            1,
            formula_i,
            "C6H12O6".into(),
            "+K".into(),
            Some(0.5),
            Some(0.1),
            r#"{"chaos":0.5}"#.into(),
            vec![None, Some("x".into())],
        )
    }

    #[test]
    fn test_batch_written_as_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("results.parquet");
        let mut store = ParquetResultStore::new(&path);
        assert_eq!(store.insert(METRICS_INSERT, &[row(1), row(2), row(3)]).unwrap(), 3);

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 3);
        assert_eq!(reader.metadata().num_row_groups(), 1);
    }

    #[test]
    fn test_existing_file_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("results.parquet");
        std::fs::write(&path, b"keep me").unwrap();
        let mut store = ParquetResultStore::new(&path);
        assert!(matches!(
            store.insert(METRICS_INSERT, &[row(1)]),
            Err(StoreError::Io { .. })
        ));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }
}
