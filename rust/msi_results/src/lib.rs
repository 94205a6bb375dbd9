pub mod errors;
pub mod images;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod timings;
extern crate parquet;
#[macro_use]
extern crate parquet_derive;

pub use errors::MaterializationError;
pub use metrics::{
    MetricsLayout,
    NonFinitePolicy,
    ResultRecord,
};
pub use models::{
    ImageRefs,
    IonImages,
    JobContext,
    MetricsTable,
    SparseImage,
    SpatialMask,
};
pub use pipeline::{
    MaterializationReport,
    ResultMaterializer,
};
pub use storage::{
    FsImageStore,
    ImageStore,
    ParquetResultStore,
    ResultStore,
    SqliteResultStore,
};
