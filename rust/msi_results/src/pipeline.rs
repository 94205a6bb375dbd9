//! End to end materialization of one annotation job.
//!
//! Stages, in order:
//!
//! 1. **Validation**: every ion must have a metrics table row and is checked
//!    against the mask and the job's peak slot count. Nothing reaches a store
//!    if any ion is unknown or malformed.
//! 2. **Posting**: present isotope images are densified and posted in
//!    parallel, one image store handle per worker thread. References are
//!    gathered at a single barrier.
//! 3. **Row building**: single threaded, one record per metrics table row.
//! 4. **Writing**: one batched insert into the result store.
//!
//! A run that fails after posting leaves the posted images behind. Rerunning
//! a job posts them again under new ids.

use crate::errors::{
    Result,
    UpstreamDataError,
};
use crate::images::post_images;
use crate::metrics::{
    MetricsLayout,
    NonFinitePolicy,
    RowBuilder,
};
use crate::models::{
    IonImages,
    JobContext,
    MetricsTable,
    SpatialMask,
};
use crate::storage::{
    write_results,
    ImageStore,
    ResultStore,
    METRICS_INSERT,
};
use crate::timings::MaterializationTimings;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Image references of an ion without a metrics row could never be written.
fn check_known_ions(ions: &[IonImages], table: &MetricsTable) -> Result<()> {
    match ions.iter().find(|ion| !table.contains(ion.formula_i)) {
        Some(ion) => Err(UpstreamDataError::UnknownIon {
            formula_i: ion.formula_i,
        }
        .into()),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterializationReport {
    pub n_ions_posted: usize,
    pub n_images_posted: usize,
    pub n_records: usize,
    pub timings: MaterializationTimings,
}

#[derive(Debug, Clone)]
pub struct ResultMaterializer {
    pub job: JobContext,
    pub layout: MetricsLayout,
    pub policy: NonFinitePolicy,
    statement: String,
}

impl ResultMaterializer {
    pub fn new(job: JobContext) -> Self {
        Self {
            job,
            layout: MetricsLayout::default(),
            policy: NonFinitePolicy::default(),
            statement: METRICS_INSERT.to_string(),
        }
    }

    pub fn with_layout(mut self, layout: MetricsLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_policy(mut self, policy: NonFinitePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the insert statement handed to the result store.
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = statement.into();
        self
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    fn row_builder(&self) -> RowBuilder {
        RowBuilder {
            job_id: self.job.job_id,
            layout: self.layout.clone(),
            policy: self.policy,
            peak_slots: self.job.peak_slots,
        }
    }

    pub fn materialize<S, R>(
        &self,
        ions: &[IonImages],
        mask: &SpatialMask,
        table: &MetricsTable,
        image_store: &S,
        result_store: &mut R,
    ) -> Result<MaterializationReport>
    where
        S: ImageStore + Clone + Sync,
        R: ResultStore + ?Sized,
    {
        info!(
            "Materializing job {} ({} ions, {} metrics rows, mask {}x{} with {} sampled pixels)",
            self.job.job_id,
            ions.len(),
            table.len(),
            mask.height(),
            mask.width(),
            mask.num_sampled()
        );
        let mut timings = MaterializationTimings::default();

        check_known_ions(ions, table)?;

        let st = Instant::now();
        let posted = post_images(ions, mask, image_store, &self.job)?;
        timings.posting = st.elapsed();

        let st = Instant::now();
        let records = self.row_builder().build_rows(table, &posted.refs)?;
        timings.row_building = st.elapsed();
        info!(
            "Built {} result records in {:?}",
            records.len(),
            timings.row_building
        );

        let st = Instant::now();
        let n_records = write_results(records, result_store, &self.statement)?;
        timings.writing = st.elapsed();

        let report = MaterializationReport {
            n_ions_posted: posted.n_ions,
            n_images_posted: posted.n_images,
            n_records,
            timings,
        };
        info!(
            "Job {} materialized in {:?}: {} images, {} records",
            self.job.job_id,
            timings.total(),
            report.n_images_posted,
            report.n_records
        );
        Ok(report)
    }
}
