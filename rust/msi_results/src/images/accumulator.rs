//! Gathering of per-ion posting results from the parallel workers.
//!
//! Each worker folds the ions it posted into a local accumulator, local
//! accumulators are then merged pairwise. This is the only point where
//! results of different workers meet.

use crate::models::{
    FormulaIndex,
    ImageId,
    ImageRefs,
};
use rayon::iter::{
    FromParallelIterator,
    IntoParallelIterator,
    ParallelIterator,
};
use std::time::Duration;

/// Image references of one ion after all its present peaks were posted.
#[derive(Debug, Clone)]
pub struct PostedIon {
    pub formula_i: FormulaIndex,
    pub image_ids: Vec<Option<ImageId>>,
    pub n_posted: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct PostingAccumulator {
    pub(crate) refs: ImageRefs,
    /// Ions seen more than once. Their images were still posted.
    pub(crate) duplicates: Vec<FormulaIndex>,
    pub(crate) n_images: usize,
    pub(crate) store_time: Duration,
}

impl PostingAccumulator {
    fn insert(&mut self, formula_i: FormulaIndex, ids: Vec<Option<ImageId>>) {
        if self.refs.insert(formula_i, ids).is_some() {
            self.duplicates.push(formula_i);
        }
    }

    pub(crate) fn fold(mut self, item: PostedIon) -> Self {
        self.n_images += item.n_posted;
        self.store_time += item.elapsed;
        self.insert(item.formula_i, item.image_ids);
        self
    }

    pub(crate) fn reduce(mut self, other: Self) -> Self {
        self.n_images += other.n_images;
        self.store_time += other.store_time;
        self.duplicates.extend(other.duplicates);
        for (formula_i, ids) in other.refs {
            self.insert(formula_i, ids);
        }
        self
    }
}

impl FromIterator<PostedIon> for PostingAccumulator {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = PostedIon>,
    {
        iter.into_iter()
            .fold(PostingAccumulator::default(), PostingAccumulator::fold)
    }
}

impl FromParallelIterator<PostedIon> for PostingAccumulator {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = PostedIon>,
    {
        par_iter
            .into_par_iter()
            .fold(PostingAccumulator::default, PostingAccumulator::fold)
            .reduce(PostingAccumulator::default, PostingAccumulator::reduce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posted(formula_i: FormulaIndex, n: usize) -> PostedIon {
        PostedIon {
            formula_i,
            image_ids: (0..n).map(|i| Some(ImageId::new(format!("{}_{}", formula_i, i)))).collect(),
            n_posted: n,
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_parallel_gather_matches_serial() {
        let items: Vec<PostedIon> = (0..1000).map(|i| posted(i, (i % 3) as usize)).collect();
        let serial: PostingAccumulator = items.clone().into_iter().collect();
        let parallel: PostingAccumulator = items.into_par_iter().collect();
        assert_eq!(serial.refs, parallel.refs);
        assert_eq!(serial.n_images, parallel.n_images);
        assert_eq!(parallel.refs.len(), 1000);
        assert!(parallel.duplicates.is_empty());
    }

    #[test]
    fn test_duplicates_detected_across_workers() {
        let items = vec![posted(1, 1), posted(2, 1), posted(1, 2)];
        let acc: PostingAccumulator = items.into_par_iter().collect();
        assert_eq!(acc.duplicates, vec![1]);
        assert_eq!(acc.n_images, 4);
        assert_eq!(acc.store_time, Duration::from_millis(3));
    }
}
