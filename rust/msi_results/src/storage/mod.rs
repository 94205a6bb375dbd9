pub mod fs_image_store;
pub mod parquet_store;
pub mod sqlite;
pub mod traits;
pub mod writer;

pub use fs_image_store::{
    FsImageStore,
    FS_STORE_KIND,
};
pub use parquet_store::ParquetResultStore;
pub use sqlite::{
    SqliteResultStore,
    METRICS_TABLE_DDL,
};
pub use traits::{
    ImageStore,
    ResultStore,
};
pub use writer::write_results;

/// Insert statement for the per-ion metrics table, one placeholder per
/// column of a [`crate::metrics::ResultRow`].
pub const METRICS_INSERT: &str = "INSERT INTO iso_image_metrics \
    (job_id, formula_i, sf, adduct, msm, fdr, stats, iso_image_ids) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
