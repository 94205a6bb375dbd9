use super::sparse_image::SparseImage;
use nohash_hasher::IntMap;
use serde::{
    Deserialize,
    Serialize,
};

/// Opaque identifier of a formula as assigned by the search stage.
pub type FormulaIndex = i64;

/// Isotope peak images of one ion, in peak order.
///
/// A `None` slot means no signal was detected for that peak. This is a
/// different state from an image whose pixels are all zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonImages {
    pub formula_i: FormulaIndex,
    pub peaks: Vec<Option<SparseImage>>,
}

impl IonImages {
    pub fn new(formula_i: FormulaIndex, peaks: Vec<Option<SparseImage>>) -> Self {
        Self { formula_i, peaks }
    }

    pub fn num_present(&self) -> usize {
        self.peaks.iter().filter(|p| p.is_some()).count()
    }
}

/// Reference returned by the image store for one posted image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(x: &str) -> Self {
        Self(x.to_string())
    }
}

/// Per-ion image reference lists, one slot per isotope peak.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRefs {
    refs: IntMap<FormulaIndex, Vec<Option<ImageId>>>,
}

impl ImageRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous slot list if `formula_i` was already present.
    pub fn insert(
        &mut self,
        formula_i: FormulaIndex,
        ids: Vec<Option<ImageId>>,
    ) -> Option<Vec<Option<ImageId>>> {
        self.refs.insert(formula_i, ids)
    }

    pub fn get(&self, formula_i: FormulaIndex) -> Option<&[Option<ImageId>]> {
        self.refs.get(&formula_i).map(|x| x.as_slice())
    }

    pub fn contains(&self, formula_i: FormulaIndex) -> bool {
        self.refs.contains_key(&formula_i)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn formula_indices(&self) -> impl Iterator<Item = FormulaIndex> + '_ {
        self.refs.keys().copied()
    }
}

impl IntoIterator for ImageRefs {
    type Item = (FormulaIndex, Vec<Option<ImageId>>);
    type IntoIter = std::collections::hash_map::IntoIter<FormulaIndex, Vec<Option<ImageId>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.into_iter()
    }
}

impl FromIterator<(FormulaIndex, Vec<Option<ImageId>>)> for ImageRefs {
    fn from_iter<I: IntoIterator<Item = (FormulaIndex, Vec<Option<ImageId>>)>>(iter: I) -> Self {
        Self {
            refs: iter.into_iter().collect(),
        }
    }
}
