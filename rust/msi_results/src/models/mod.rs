pub mod ion;
pub mod job;
pub mod mask;
pub mod metrics_table;
pub mod sparse_image;

pub use ion::{
    FormulaIndex,
    ImageId,
    ImageRefs,
    IonImages,
};
pub use job::{
    JobContext,
    JobId,
};
pub use mask::SpatialMask;
pub use metrics_table::{
    MetricsRow,
    MetricsTable,
    MetricsTableFile,
    RawValue,
};
pub use sparse_image::{
    DenseImage,
    SparseImage,
    StoredImage,
};
