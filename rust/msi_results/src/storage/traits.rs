use crate::errors::StoreError;
use crate::metrics::ResultRow;
use crate::models::{
    DenseImage,
    ImageId,
};

/// Capability to persist one raster and hand back a reference to it.
///
/// Every parallel worker owns its handle, so implementations may keep
/// per-handle buffers. Posting the same image twice must be tolerated,
/// callers never deduplicate.
pub trait ImageStore: Send {
    fn post_image(
        &mut self,
        store_kind: &str,
        dataset_id: &str,
        image: &DenseImage<'_>,
    ) -> Result<ImageId, StoreError>;
}

/// Capability to insert a batch of result rows in one call.
///
/// `statement` names the target table and columns and is opaque to the
/// caller. Returns the number of rows written.
pub trait ResultStore {
    fn insert(&mut self, statement: &str, rows: &[ResultRow]) -> Result<usize, StoreError>;
}
