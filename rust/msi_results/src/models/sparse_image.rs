use super::mask::SpatialMask;
use crate::errors::UpstreamDataError;
use serde::{
    Deserialize,
    Serialize,
};

/// Isotope peak intensities in coordinate (COO) format.
///
/// Explicitly stored zeros are kept. Repeated coordinates are summed when
/// the image is densified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseImage {
    pub shape: (usize, usize),
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseImage {
    pub fn try_new(
        shape: (usize, usize),
        rows: Vec<u32>,
        cols: Vec<u32>,
        values: Vec<f32>,
    ) -> Result<Self, UpstreamDataError> {
        let out = Self {
            shape,
            rows,
            cols,
            values,
        };
        out.validate()?;
        Ok(out)
    }

    /// Builds the sparse form of a dense row-major grid, skipping zeros.
    pub fn from_dense_rows(rows: &[Vec<f32>]) -> Result<Self, UpstreamDataError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut out = Self {
            shape: (height, width),
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
        };
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(UpstreamDataError::ExpectedSlicesSameLength {
                    expected: width,
                    other: row.len(),
                    context: format!("dense image row {}", i),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    out.rows.push(i as u32);
                    out.cols.push(j as u32);
                    out.values.push(v);
                }
            }
        }
        Ok(out)
    }

    /// Checks the triplet arrays line up and stay inside `shape`.
    ///
    /// Deserialized images bypass [`SparseImage::try_new`], so this has to
    /// be called again before they are densified.
    pub fn validate(&self) -> Result<(), UpstreamDataError> {
        if self.rows.len() != self.cols.len() {
            return Err(UpstreamDataError::ExpectedSlicesSameLength {
                expected: self.rows.len(),
                other: self.cols.len(),
                context: "sparse image rows vs cols".into(),
            });
        }
        if self.rows.len() != self.values.len() {
            return Err(UpstreamDataError::ExpectedSlicesSameLength {
                expected: self.rows.len(),
                other: self.values.len(),
                context: "sparse image rows vs values".into(),
            });
        }
        let (height, width) = self.shape;
        for (&row, &col) in self.rows.iter().zip(self.cols.iter()) {
            if row as usize >= height || col as usize >= width {
                return Err(UpstreamDataError::PixelOutOfBounds {
                    row,
                    col,
                    shape: self.shape,
                });
            }
        }
        Ok(())
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Expands the image onto the pixel grid of `mask`.
    ///
    /// The caller must have checked that the shapes agree.
    pub fn to_dense<'m>(&self, mask: &'m SpatialMask) -> DenseImage<'m> {
        debug_assert_eq!(self.shape, mask.shape());
        let width = mask.width();
        let mut intensities = vec![0.0f32; mask.num_pixels()];
        for ((&row, &col), &val) in self
            .rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.values.iter())
        {
            intensities[row as usize * width + col as usize] += val;
        }
        DenseImage {
            height: mask.height(),
            width,
            intensities,
            alpha: mask.as_slice(),
        }
    }
}

/// Row-major raster handed to the image store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseImage<'m> {
    pub height: usize,
    pub width: usize,
    pub intensities: Vec<f32>,
    pub alpha: &'m [bool],
}

impl DenseImage<'_> {
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.intensities[row * self.width + col])
    }
}

/// Owned counterpart of [`DenseImage`], used when reading rasters back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub height: usize,
    pub width: usize,
    pub intensities: Vec<f32>,
    pub alpha: Vec<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_2x2() -> SpatialMask {
        SpatialMask::from_int_rows(vec![vec![1, 1], vec![1, 0]]).unwrap()
    }

    #[test]
    fn test_densify_sums_duplicates() {
        let img = SparseImage::try_new((2, 2), vec![0, 0, 1], vec![1, 1, 1], vec![2.0, 3.0, 7.0])
            .unwrap();
        let mask = mask_2x2();
        let dense = img.to_dense(&mask);
        assert_eq!(dense.intensities, vec![0.0, 5.0, 0.0, 7.0]);
        assert_eq!(dense.alpha, &[true, true, true, false]);
        assert_eq!(dense.get(1, 1), Some(7.0));
        assert_eq!(dense.get(2, 0), None);
    }

    #[test]
    fn test_explicit_zero_is_kept() {
        let img = SparseImage::try_new((2, 2), vec![0], vec![0], vec![0.0]).unwrap();
        assert_eq!(img.nnz(), 1);
        let mask = mask_2x2();
        assert_eq!(img.to_dense(&mask).intensities, vec![0.0; 4]);
    }

    #[test]
    fn test_from_dense_rows_skips_zeros() {
        let img = SparseImage::from_dense_rows(&[vec![2.0, 3.0], vec![1.0, 0.0]]).unwrap();
        assert_eq!(img.shape, (2, 2));
        assert_eq!(img.rows, vec![0, 0, 1]);
        assert_eq!(img.cols, vec![0, 1, 0]);
        assert_eq!(img.values, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let err = SparseImage::try_new((2, 2), vec![2], vec![0], vec![1.0]).unwrap_err();
        assert!(matches!(err, UpstreamDataError::PixelOutOfBounds { row: 2, .. }));
    }

    #[test]
    fn test_unequal_triplets_rejected() {
        let err = SparseImage::try_new((2, 2), vec![0, 1], vec![0], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            UpstreamDataError::ExpectedSlicesSameLength { .. }
        ));
    }
}
