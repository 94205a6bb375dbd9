use super::bundle::{
    MetricsBundle,
    MetricsLayout,
};
use super::normalize::{
    normalize,
    normalize_scalar_column,
    NonFinitePolicy,
};
use crate::errors::{
    MaterializationError,
    NonPortableReason,
    NumericError,
    UpstreamDataError,
};
use crate::models::{
    FormulaIndex,
    ImageId,
    ImageRefs,
    JobId,
    MetricsTable,
};
use serde::Serialize;
use tracing::debug;

/// The persisted unit, one per ion of the metrics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub job_id: JobId,
    pub formula_i: FormulaIndex,
    pub formula: String,
    pub adduct: String,
    pub msm: Option<f64>,
    pub fdr: Option<f64>,
    pub metrics_json: String,
    pub image_ids: Vec<Option<ImageId>>,
}

/// Row tuple in wire column order:
/// `(job_id, formula_i, formula, adduct, msm, fdr, metrics_json, image_ids)`.
pub type ResultRow = (
    JobId,
    FormulaIndex,
    String,
    String,
    Option<f64>,
    Option<f64>,
    String,
    Vec<Option<String>>,
);

impl ResultRecord {
    pub fn into_row(self) -> ResultRow {
        (
            self.job_id,
            self.formula_i,
            self.formula,
            self.adduct,
            self.msm,
            self.fdr,
            self.metrics_json,
            self.image_ids
                .into_iter()
                .map(|x| x.map(|id| id.as_str().to_string()))
                .collect(),
        )
    }
}

fn located(field: &str, formula_i: FormulaIndex) -> impl Fn(NumericError) -> NumericError + '_ {
    move |e| e.with_location(field, formula_i)
}

/// Fuses the metrics table with the gathered image references.
#[derive(Debug, Clone)]
pub struct RowBuilder {
    pub job_id: JobId,
    pub layout: MetricsLayout,
    pub policy: NonFinitePolicy,
    pub peak_slots: usize,
}

impl RowBuilder {
    /// Builds exactly one record per metrics table row, in table order.
    ///
    /// Ions without image references get an all-null slot list, shorter
    /// lists are padded. Image references for ions the table does not know
    /// about, or with more entries than `peak_slots`, are an error.
    pub fn build_rows(
        &self,
        table: &MetricsTable,
        image_refs: &ImageRefs,
    ) -> Result<Vec<ResultRecord>, MaterializationError> {
        for formula_i in image_refs.formula_indices() {
            if !table.contains(formula_i) {
                return Err(UpstreamDataError::UnknownIon { formula_i }.into());
            }
        }

        let msm_col = table.column_index("msm")?;
        let fdr_col = table.column_index("fdr")?;
        let field_cols = self
            .layout
            .fields()
            .iter()
            .map(|f| table.column_index(f).map(|i| (f.as_str(), i)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(table.len());
        for row in table.rows() {
            let msm = normalize_scalar_column(&row.values[msm_col], self.policy)
                .map_err(located("msm", row.formula_i))?;
            let fdr = normalize_scalar_column(&row.values[fdr_col], self.policy)
                .map_err(located("fdr", row.formula_i))?;

            let mut bundle = MetricsBundle::with_capacity(field_cols.len());
            for &(field, col) in field_cols.iter() {
                let value = normalize(&row.values[col], self.policy)
                    .map_err(located(field, row.formula_i))?;
                bundle.push(field, value);
            }
            let metrics_json = bundle.to_json().map_err(|e| {
                NumericError::new(NonPortableReason::Serialization(e.to_string()))
                    .with_location("metrics_json", row.formula_i)
            })?;

            let image_ids = match image_refs.get(row.formula_i) {
                Some(ids) if ids.len() > self.peak_slots => {
                    return Err(UpstreamDataError::TooManyPeakSlots {
                        formula_i: row.formula_i,
                        max_slots: self.peak_slots,
                        real: ids.len(),
                    }
                    .into());
                }
                Some(ids) => {
                    let mut ids = ids.to_vec();
                    ids.resize(self.peak_slots, None);
                    ids
                }
                None => {
                    debug!("No image references for formula_i={}", row.formula_i);
                    vec![None; self.peak_slots]
                }
            };

            records.push(ResultRecord {
                job_id: self.job_id,
                formula_i: row.formula_i,
                formula: row.formula.clone(),
                adduct: row.adduct.clone(),
                msm,
                fdr,
                metrics_json,
                image_ids,
            });
        }

        Ok(records)
    }
}
