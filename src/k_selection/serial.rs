use super::{Candidate, KSelector};
use crate::ClusterError;
use num_traits::Float;

impl<'a, T: Float> KSelector<'a, T> {
    pub(super) fn evaluate_candidates(
        &self,
        candidates: &[usize],
    ) -> Result<Vec<Candidate<T>>, ClusterError> {
        candidates.iter().map(|&k| self.evaluate(k)).collect()
    }
}
