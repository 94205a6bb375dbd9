use crate::errors::UpstreamDataError;
use crate::models::{
    DenseImage,
    FormulaIndex,
    IonImages,
    SparseImage,
    SpatialMask,
};

/// Validated view of one ion's peak slots.
///
/// Always holds exactly `peak_slots` entries, trailing slots the search
/// stage did not emit are absent. Presence is decided by the slot alone,
/// an image with only zero intensities is still present. Slots are only
/// ever densified onto the mask they were checked against.
#[derive(Debug, Clone)]
pub struct ReconstructedIon<'a> {
    pub formula_i: FormulaIndex,
    slots: Vec<Option<&'a SparseImage>>,
    mask: &'a SpatialMask,
}

impl<'a> ReconstructedIon<'a> {
    pub fn presence(&self) -> Vec<bool> {
        self.slots.iter().map(|x| x.is_some()).collect()
    }

    pub fn num_present(&self) -> usize {
        self.slots.iter().filter(|x| x.is_some()).count()
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<&'a SparseImage>] {
        &self.slots
    }

    /// Dense raster of slot `i`, `None` for absent (or out of range) slots.
    pub fn densify_slot(&self, i: usize) -> Option<DenseImage<'a>> {
        self.slots
            .get(i)
            .copied()
            .flatten()
            .map(|img| img.to_dense(self.mask))
    }
}

/// Checks an ion against the job shape and the dataset mask.
pub fn reconstruct<'a>(
    ion: &'a IonImages,
    mask: &'a SpatialMask,
    peak_slots: usize,
) -> Result<ReconstructedIon<'a>, UpstreamDataError> {
    if ion.peaks.len() > peak_slots {
        return Err(UpstreamDataError::TooManyPeakSlots {
            formula_i: ion.formula_i,
            max_slots: peak_slots,
            real: ion.peaks.len(),
        });
    }

    let mut slots = Vec::with_capacity(peak_slots);
    for (i, peak) in ion.peaks.iter().enumerate() {
        if let Some(img) = peak {
            if img.shape != mask.shape() {
                return Err(UpstreamDataError::ImageShapeMismatch {
                    formula_i: ion.formula_i,
                    slot: i,
                    expected: mask.shape(),
                    real: img.shape,
                });
            }
            img.validate()?;
        }
        slots.push(peak.as_ref());
    }
    slots.resize(peak_slots, None);

    Ok(ReconstructedIon {
        formula_i: ion.formula_i,
        slots,
        mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask() -> SpatialMask {
        SpatialMask::from_int_rows(vec![vec![1, 1], vec![1, 0]]).unwrap()
    }

    fn img(rows: &[Vec<f32>]) -> SparseImage {
        SparseImage::from_dense_rows(rows).unwrap()
    }

    #[test]
    fn test_presence_pattern_and_padding() {
        let ion = IonImages::new(
            0,
            vec![
                Some(img(&[vec![0.0, 0.0], vec![0.0, 1.0]])),
                None,
                Some(img(&[vec![2.0, 3.0], vec![1.0, 0.0]])),
            ],
        );
        let mask = mask();
        let rec = reconstruct(&ion, &mask, 4).unwrap();
        assert_eq!(rec.presence(), vec![true, false, true, false]);
        assert_eq!(rec.num_present(), 2);

        let dense: Vec<_> = (0..rec.num_slots())
            .map(|i| rec.densify_slot(i))
            .collect();
        assert_eq!(dense.len(), 4);
        assert_eq!(dense[0].as_ref().unwrap().intensities, vec![0.0, 0.0, 0.0, 1.0]);
        assert!(dense[1].is_none());
        assert!(dense[3].is_none());
    }

    #[test]
    fn test_densify_uses_checked_mask() {
        let ion = IonImages::new(0, vec![Some(img(&[vec![2.0, 3.0], vec![1.0, 0.0]]))]);
        let mask = mask();
        let rec = reconstruct(&ion, &mask, 1).unwrap();
        let dense = rec.densify_slot(0).unwrap();
        assert_eq!((dense.height, dense.width), mask.shape());
        assert_eq!(dense.alpha, mask.as_slice());
        assert_eq!(dense.intensities, vec![2.0, 3.0, 1.0, 0.0]);
        assert!(rec.densify_slot(1).is_none());
    }

    #[test]
    fn test_all_zero_image_is_present() {
        let zero = SparseImage::try_new((2, 2), vec![], vec![], vec![]).unwrap();
        let ion = IonImages::new(5, vec![Some(zero), None]);
        let mask = mask();
        let rec = reconstruct(&ion, &mask, 2).unwrap();
        assert_eq!(rec.presence(), vec![true, false]);
    }

    #[test]
    fn test_all_absent_ion_is_kept() {
        let ion = IonImages::new(5, vec![None, None, None, None]);
        let mask = mask();
        let rec = reconstruct(&ion, &mask, 4).unwrap();
        assert_eq!(rec.num_present(), 0);
        assert_eq!(rec.num_slots(), 4);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let ion = IonImages::new(1, vec![Some(img(&[vec![1.0, 2.0, 3.0]]))]);
        let err = reconstruct(&ion, &mask(), 4).unwrap_err();
        assert!(matches!(
            err,
            UpstreamDataError::ImageShapeMismatch {
                formula_i: 1,
                slot: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_too_many_slots_rejected() {
        let ion = IonImages::new(2, vec![None; 5]);
        let err = reconstruct(&ion, &mask(), 4).unwrap_err();
        assert!(matches!(
            err,
            UpstreamDataError::TooManyPeakSlots { real: 5, .. }
        ));
    }

    #[test]
    fn test_deserialized_image_revalidated() {
        let bad = SparseImage {
            shape: (2, 2),
            rows: vec![0, 1],
            cols: vec![0],
            values: vec![1.0, 1.0],
        };
        let ion = IonImages::new(3, vec![Some(bad)]);
        assert!(reconstruct(&ion, &mask(), 4).is_err());
    }
}
