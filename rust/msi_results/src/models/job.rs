use serde::{
    Deserialize,
    Serialize,
};

pub type JobId = i64;

pub const DEFAULT_PEAK_SLOTS: usize = 4;
pub const DEFAULT_STORE_KIND: &str = "fs";

fn default_peak_slots() -> usize {
    DEFAULT_PEAK_SLOTS
}

fn default_store_kind() -> String {
    DEFAULT_STORE_KIND.to_string()
}

/// Identity and fixed shape of one annotation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    pub job_id: JobId,
    pub dataset_id: String,
    /// Backend name handed to the image store on every post.
    #[serde(default = "default_store_kind")]
    pub store_kind: String,
    /// Number of isotope peak images per ion.
    #[serde(default = "default_peak_slots")]
    pub peak_slots: usize,
}

impl JobContext {
    pub fn new(job_id: JobId, dataset_id: impl Into<String>) -> Self {
        Self {
            job_id,
            dataset_id: dataset_id.into(),
            store_kind: default_store_kind(),
            peak_slots: DEFAULT_PEAK_SLOTS,
        }
    }

    pub fn with_peak_slots(mut self, peak_slots: usize) -> Self {
        self.peak_slots = peak_slots;
        self
    }

    pub fn with_store_kind(mut self, store_kind: impl Into<String>) -> Self {
        self.store_kind = store_kind.into();
        self
    }
}
