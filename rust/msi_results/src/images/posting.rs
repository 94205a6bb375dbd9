use super::accumulator::{
    PostedIon,
    PostingAccumulator,
};
use super::reconstruct::{
    reconstruct,
    ReconstructedIon,
};
use crate::errors::{
    MaterializationError,
    StoreError,
    UpstreamDataError,
};
use crate::models::{
    ImageRefs,
    IonImages,
    JobContext,
    SpatialMask,
};
use crate::storage::ImageStore;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use rayon::prelude::*;
use std::time::{
    Duration,
    Instant,
};
use tracing::{
    debug,
    info,
};

#[derive(Debug)]
pub struct PostingSummary {
    pub refs: ImageRefs,
    pub n_ions: usize,
    pub n_images: usize,
    /// Summed over all workers, so it can exceed `wall_time`.
    pub store_time: Duration,
    pub wall_time: Duration,
}

/// Posts every present peak of one ion, in slot order.
///
/// Absent slots map to `None` without touching the store. A store failure
/// aborts the ion, nothing is retried.
pub fn post_ion_images<S: ImageStore + ?Sized>(
    ion: &ReconstructedIon<'_>,
    store: &mut S,
    job: &JobContext,
) -> Result<PostedIon, StoreError> {
    let st = Instant::now();
    let mut image_ids = Vec::with_capacity(ion.num_slots());
    let mut n_posted = 0;
    for slot in 0..ion.num_slots() {
        let id = match ion.densify_slot(slot) {
            Some(dense) => {
                let id = store.post_image(&job.store_kind, &job.dataset_id, &dense)?;
                debug!(
                    "Posted formula_i={} slot={} as {}",
                    ion.formula_i, slot, id
                );
                n_posted += 1;
                Some(id)
            }
            None => None,
        };
        image_ids.push(id);
    }
    if n_posted == 0 {
        debug!("formula_i={} has no present peaks", ion.formula_i);
    }

    Ok(PostedIon {
        formula_i: ion.formula_i,
        image_ids,
        n_posted,
        elapsed: st.elapsed(),
    })
}

fn progress_bar(len: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}

/// Posts the isotope images of all ions and gathers their references.
///
/// Every ion is validated against `mask` and `job.peak_slots` before the
/// first store call. Posting then runs in parallel, each worker thread
/// posting through its own clone of `store`.
pub fn post_images<S>(
    ions: &[IonImages],
    mask: &SpatialMask,
    store: &S,
    job: &JobContext,
) -> Result<PostingSummary, MaterializationError>
where
    S: ImageStore + Clone + Sync,
{
    info!(
        "Posting iso images of {} ions to '{}' (dataset {})",
        ions.len(),
        job.store_kind,
        job.dataset_id
    );
    let st = Instant::now();

    let reconstructed = ions
        .par_iter()
        .map(|ion| reconstruct(ion, mask, job.peak_slots))
        .collect::<Result<Vec<_>, UpstreamDataError>>()?;

    #[cfg(not(feature = "serial_posting"))]
    let acc: PostingAccumulator = {
        use indicatif::ParallelProgressIterator;
        reconstructed
            .par_iter()
            .progress_with(progress_bar(reconstructed.len()))
            .map_init(
                || store.clone(),
                |worker_store, ion| post_ion_images(ion, worker_store, job),
            )
            .collect::<Result<_, StoreError>>()?
    };

    #[cfg(feature = "serial_posting")]
    let acc: PostingAccumulator = {
        use indicatif::ProgressIterator;
        let mut worker_store = store.clone();
        reconstructed
            .iter()
            .progress_with(progress_bar(reconstructed.len()))
            .map(|ion| post_ion_images(ion, &mut worker_store, job))
            .collect::<Result<_, StoreError>>()?
    };

    if let Some(&formula_i) = acc.duplicates.first() {
        return Err(UpstreamDataError::DuplicateIon {
            formula_i,
            context: "ion image collection",
        }
        .into());
    }

    let summary = PostingSummary {
        n_ions: acc.refs.len(),
        n_images: acc.n_images,
        refs: acc.refs,
        store_time: acc.store_time,
        wall_time: st.elapsed(),
    };
    info!(
        "Posted {} images for {} ions in {:?} ({:?} spent in store calls across workers)",
        summary.n_images, summary.n_ions, summary.wall_time, summary.store_time
    );
    Ok(summary)
}
