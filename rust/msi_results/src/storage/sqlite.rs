use super::traits::ResultStore;
use crate::errors::StoreError;
use crate::metrics::ResultRow;
use crate::models::JobId;
use rusqlite::{
    params,
    Connection,
};
use std::path::Path;
use tracing::{
    debug,
    info,
};

pub const METRICS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS iso_image_metrics (
    job_id INTEGER NOT NULL,
    formula_i INTEGER NOT NULL,
    sf TEXT NOT NULL,
    adduct TEXT NOT NULL,
    msm REAL,
    fdr REAL,
    stats TEXT NOT NULL,
    iso_image_ids TEXT NOT NULL
);
"#;

/// Result store backed by a sqlite database.
///
/// Image id lists have no native column type here, they are stored as json
/// arrays (`["a", null, null, null]`).
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        info!("Opening result database at {}", path.as_ref().display());
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(METRICS_TABLE_DDL)?;
        Ok(())
    }

    pub fn count_rows(&self, job_id: JobId) -> Result<usize, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM iso_image_metrics WHERE job_id = ?1",
            params![job_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// Reads back the rows of one job, ordered by `formula_i`.
    pub fn fetch_job(&self, job_id: JobId) -> Result<Vec<ResultRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, formula_i, sf, adduct, msm, fdr, stats, iso_image_ids
             FROM iso_image_metrics WHERE job_id = ?1 ORDER BY formula_i",
        )?;
        let raw = stmt
            .query_map(params![job_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<f64>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(job_id, formula_i, sf, adduct, msm, fdr, stats, ids)| {
                let ids: Vec<Option<String>> =
                    serde_json::from_str(&ids).map_err(|e| StoreError::ResultStore {
                        source: format!("malformed iso_image_ids for formula_i={}: {}", formula_i, e),
                    })?;
                Ok((job_id, formula_i, sf, adduct, msm, fdr, stats, ids))
            })
            .collect()
    }
}

impl ResultStore for SqliteResultStore {
    fn insert(&mut self, statement: &str, rows: &[ResultRow]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(statement)?;
            for (job_id, formula_i, formula, adduct, msm, fdr, metrics_json, image_ids) in rows {
                let image_ids =
                    serde_json::to_string(image_ids).map_err(|e| StoreError::ResultStore {
                        source: e.to_string(),
                    })?;
                stmt.execute(params![
                    job_id,
                    formula_i,
                    formula,
                    adduct,
                    msm,
                    fdr,
                    metrics_json,
                    image_ids
                ])?;
            }
        }
        tx.commit()?;
        debug!("Committed {} rows", rows.len());
        Ok(rows.len())
    }
}
