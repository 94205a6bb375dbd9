use crate::errors::UpstreamDataError;

/// Binary pixel sampling grid shared by every image of a dataset.
///
/// Pixels are stored row-major. The mask fixes the coordinate space that
/// sparse isotope images are densified into, and doubles as the alpha
/// channel of the stored raster (unsampled pixels are transparent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialMask {
    height: usize,
    width: usize,
    pixels: Vec<bool>,
}

impl SpatialMask {
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, UpstreamDataError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(UpstreamDataError::EmptyMask);
        }

        let mut pixels = Vec::with_capacity(height * width);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(UpstreamDataError::RaggedMask {
                    row: i,
                    expected: width,
                    real: row.len(),
                });
            }
            pixels.extend(row);
        }

        Ok(Self {
            height,
            width,
            pixels,
        })
    }

    /// Same as [`SpatialMask::from_rows`] but any non-zero cell is sampled.
    pub fn from_int_rows(rows: Vec<Vec<u8>>) -> Result<Self, UpstreamDataError> {
        Self::from_rows(
            rows.into_iter()
                .map(|r| r.into_iter().map(|x| x != 0).collect())
                .collect(),
        )
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn num_pixels(&self) -> usize {
        self.pixels.len()
    }

    pub fn num_sampled(&self) -> usize {
        self.pixels.iter().filter(|&&x| x).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_from_int_rows() {
        let mask = SpatialMask::from_int_rows(vec![vec![1, 1], vec![1, 0]]).unwrap();
        assert_eq!(mask.shape(), (2, 2));
        assert_eq!(mask.num_sampled(), 3);
        assert_eq!(mask.as_slice(), &[true, true, true, false]);
    }

    #[test]
    fn test_ragged_mask_rejected() {
        let err = SpatialMask::from_rows(vec![vec![true, true], vec![true]]).unwrap_err();
        assert!(matches!(
            err,
            UpstreamDataError::RaggedMask {
                row: 1,
                expected: 2,
                real: 1
            }
        ));
    }

    #[test]
    fn test_empty_mask_rejected() {
        assert!(matches!(
            SpatialMask::from_rows(vec![]),
            Err(UpstreamDataError::EmptyMask)
        ));
        assert!(matches!(
            SpatialMask::from_rows(vec![vec![]]),
            Err(UpstreamDataError::EmptyMask)
        ));
    }
}
