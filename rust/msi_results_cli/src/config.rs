use msi_results::{
    JobContext,
    MetricsLayout,
    NonFinitePolicy,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::MaterializeArgs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub job: JobContext,
    /// Ordered fields of the stored metrics json.
    #[serde(default)]
    pub metrics: MetricsLayout,
    #[serde(default)]
    pub non_finite: NonFinitePolicy,
    pub image_store: ImageStoreConfig,
    pub result_store: ResultStoreConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum ImageStoreConfig {
    #[serde(rename = "fs")]
    Fs { root: PathBuf },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum ResultStoreConfig {
    #[serde(rename = "sqlite")]
    Sqlite { path: PathBuf },
    #[serde(rename = "parquet")]
    Parquet { path: PathBuf },
}

impl Config {
    /// Command line values take precedence over the file.
    pub fn apply_args(&mut self, args: &MaterializeArgs) {
        if let Some(job_id) = args.job_id {
            self.job.job_id = job_id;
        }
        if let Some(dataset_id) = &args.dataset_id {
            self.job.dataset_id = dataset_id.clone();
        }
    }
}
