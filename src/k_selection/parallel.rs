#![cfg(feature = "parallel")]
use super::{Candidate, KSearch, KSelector};
use crate::ClusterError;
use num_traits::Float;
use rayon::prelude::*;

impl<'a, T: Float + Send + Sync> KSelector<'a, T> {
    /// Evaluates the candidates on the rayon thread pool and post-processes the best. The
    /// selection is the same as [`KSelector::select`], whatever order candidates finish in.
    pub fn select_par(&self) -> Result<KSearch<T>, ClusterError> {
        let candidates = self.candidates()?;
        let evaluated = self.evaluate_candidates_par(&candidates)?;
        self.finish(evaluated)
    }

    fn evaluate_candidates_par(
        &self,
        candidates: &[usize],
    ) -> Result<Vec<Candidate<T>>, ClusterError> {
        // Indexed collect keeps search order, which the tie-break relies on
        candidates.par_iter().map(|&k| self.evaluate(k)).collect()
    }
}
