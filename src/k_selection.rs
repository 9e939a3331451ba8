//! Silhouette based selection of K for `KCount` algorithms, and removal of samples that fit
//! their cluster poorly.
//!
//! Every candidate K is clustered and scored independently, so the candidates can be evaluated
//! in sequence or on a thread pool. Both paths reduce the scores in search order and keep the
//! first candidate with the highest mean silhouette width.

use crate::format::group_by_label;
use crate::invoker::ClusterInvoker;
use crate::order::order_by_silhouette;
use crate::silhouette::{
    clustered_silhouette_widths, mean_defined_width, mean_width, silhouette_widths,
    SilhouetteScores,
};
use crate::validation::DataValidator;
use crate::{
    AlgorithmCategory, AlgorithmParams, CancellationToken, ClusterError, KParams, LabelVector,
    OrderBy, OutputShape, PartitionList, PostProcessConfig, UNCLUSTERED,
};
use num_traits::Float;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
mod parallel;
mod serial;

// Default search window, relative to a given k or absolute
const K_BELOW_GIVEN: usize = 2;
const K_ABOVE_GIVEN: usize = 20;
const K_SEARCH_MINIMUM: usize = 2;
const K_SEARCH_MAXIMUM: usize = 20;

/// Mean silhouette width obtained for one candidate K.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CandidateScore<T> {
    pub k: usize,
    pub mean_width: T,
}

/// The outcome of a K search.
#[derive(Debug, Clone, PartialEq)]
pub struct KSearch<T> {
    /// Every candidate evaluated, in search order.
    pub candidates: Vec<CandidateScore<T>>,
    /// The selected K.
    pub best_k: usize,
    /// Labels of the selected clustering, after silhouette based removal.
    pub labels: LabelVector,
    /// Silhouette widths of the selected clustering; `-inf` for removed samples, `NaN` where
    /// undefined.
    pub widths: SilhouetteScores<T>,
    /// The selected clusters, without the unclustered group.
    pub partition: PartitionList,
}

struct Candidate<T> {
    k: usize,
    labels: LabelVector,
    widths: SilhouetteScores<T>,
    mean_width: T,
}

/// Searches candidate values of K for the clustering with the highest mean silhouette width.
pub struct KSelector<'a, T> {
    invoker: &'a ClusterInvoker<'a, T>,
    params: KParams,
    config: &'a PostProcessConfig<T>,
    order_by: OrderBy,
    diss: &'a [Vec<T>],
    // List-native algorithms leave unclustered samples out of every set, they come back as -1
    unclustered_sentinel: bool,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, T: Float> KSelector<'a, T> {
    /// # Returns
    /// * The selector, or a `ClusterError::Configuration` when the algorithm is not `KCount`,
    ///   when `k` is missing without `find_best_k`, or when no dissimilarity is available to
    ///   score silhouettes with.
    pub fn new(
        invoker: &'a ClusterInvoker<'a, T>,
        params: &AlgorithmParams,
        config: &'a PostProcessConfig<T>,
        order_by: OrderBy,
    ) -> Result<Self, ClusterError> {
        let spec = invoker.spec();
        if spec.category() != AlgorithmCategory::KCount {
            return Err(ClusterError::config(format!(
                "K selection needs a KCount algorithm, '{}' is {:?}",
                spec.name(),
                spec.category()
            )));
        }
        let params = *params.k_count()?;
        if !config.find_best_k() && params.k().is_none() {
            return Err(ClusterError::config(
                "k must be given when findBestK is false",
            ));
        }

        let input = invoker.input();
        let diss = match config.diss() {
            Some(diss) => {
                DataValidator::new(input).validate_override(diss)?;
                diss.values()
            }
            None if input.is_dissimilarity() => input.matrix().values(),
            None => {
                return Err(ClusterError::config(
                    "silhouette scoring needs a dissimilarity: pass one in the 'diss' option \
                    or cluster a dissimilarity matrix",
                ))
            }
        };

        Ok(KSelector {
            invoker,
            params,
            config,
            order_by,
            diss,
            unclustered_sentinel: spec.output_shape() == OutputShape::List,
            cancel: None,
        })
    }

    /// Checks the token before each candidate is evaluated.
    pub fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The values of K to evaluate, in search order.
    ///
    /// Without `find_best_k` this is the single given `k`. Otherwise it is the configured range,
    /// or a default window. Values below 2 or not below the number of samples are dropped, as
    /// are repeats.
    ///
    /// # Returns
    /// * The candidates, or a `ClusterError::Configuration` if none remain.
    pub fn candidates(&self) -> Result<Vec<usize>, ClusterError> {
        let n_samples = self.invoker.input().n_samples();
        let requested: Vec<usize> = if !self.config.find_best_k() {
            self.params.k().into_iter().collect()
        } else if let Some(k_range) = self.config.k_range() {
            k_range.to_vec()
        } else if let Some(k) = self.params.k() {
            (k.saturating_sub(K_BELOW_GIVEN)..=k + K_ABOVE_GIVEN).collect()
        } else {
            (K_SEARCH_MINIMUM..=K_SEARCH_MAXIMUM).collect()
        };

        let mut candidates = Vec::with_capacity(requested.len());
        for k in requested {
            if k >= K_SEARCH_MINIMUM && k < n_samples && !candidates.contains(&k) {
                candidates.push(k);
            }
        }
        if candidates.is_empty() {
            return Err(ClusterError::config(format!(
                "no value of K left to search: values must be at least {K_SEARCH_MINIMUM} \
                and below the number of samples ({n_samples})"
            )));
        }
        Ok(candidates)
    }

    /// Evaluates the candidates one after another and post-processes the best.
    pub fn select(&self) -> Result<KSearch<T>, ClusterError> {
        let candidates = self.candidates()?;
        let evaluated = self.evaluate_candidates(&candidates)?;
        self.finish(evaluated)
    }

    fn evaluate(&self, k: usize) -> Result<Candidate<T>, ClusterError> {
        if self.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ClusterError::Cancelled);
        }
        let params = AlgorithmParams::KCount(self.params.with_k(k));
        let labels = self.invoker.labels(&params)?;
        let (widths, mean_width) = if self.unclustered_sentinel {
            let widths = clustered_silhouette_widths(self.diss, &labels)?;
            let clustered: Vec<usize> = (0..labels.len())
                .filter(|&sample| labels[sample] != UNCLUSTERED)
                .collect();
            let mean_width = mean_defined_width(&widths, &clustered);
            (widths, mean_width)
        } else {
            let widths = silhouette_widths(self.diss, &labels)?;
            let mean_width = mean_width(&widths);
            (widths, mean_width)
        };
        debug!(k, mean_width = mean_width.to_f64().unwrap_or(f64::NAN), "evaluated candidate K");
        Ok(Candidate {
            k,
            labels,
            widths,
            mean_width,
        })
    }

    fn finish(&self, evaluated: Vec<Candidate<T>>) -> Result<KSearch<T>, ClusterError> {
        let scores: Vec<CandidateScore<T>> = evaluated
            .iter()
            .map(|c| CandidateScore {
                k: c.k,
                mean_width: c.mean_width,
            })
            .collect();
        let best = best_candidate(&scores);
        let Candidate {
            k: best_k,
            labels,
            widths,
            ..
        } = evaluated.into_iter().nth(best).ok_or_else(|| {
            ClusterError::InvariantViolation(String::from("no candidate K was evaluated"))
        })?;
        info!(
            best_k,
            mean_width = scores[best].mean_width.to_f64().unwrap_or(f64::NAN),
            n_candidates = scores.len(),
            "selected K"
        );

        let (labels, widths) = if self.config.remove_sil() {
            self.remove_poor_fits(labels, widths)?
        } else {
            (labels, widths)
        };

        let mut groups = group_by_label(&labels);
        if self.order_by == OrderBy::Best {
            groups = order_by_silhouette(groups, &widths);
        }
        if self.config.remove_sil() || self.unclustered_sentinel {
            let unclustered: Vec<usize> = groups
                .iter()
                .enumerate()
                .filter(|(_, (label, _))| *label == UNCLUSTERED)
                .map(|(position, _)| position)
                .collect();
            match unclustered.as_slice() {
                [] => {}
                [position] => {
                    groups.remove(*position);
                }
                _ => {
                    return Err(ClusterError::InvariantViolation(format!(
                        "found {} unclustered groups, expected at most one",
                        unclustered.len()
                    )))
                }
            }
        }

        Ok(KSearch {
            candidates: scores,
            best_k,
            labels,
            widths,
            partition: groups.into_iter().map(|(_, members)| members).collect(),
        })
    }

    /// Unclusters every sample whose width does not exceed the cutoff. Removed samples get
    /// width `-inf`.
    fn remove_poor_fits(
        &self,
        labels: LabelVector,
        widths: SilhouetteScores<T>,
    ) -> Result<(LabelVector, SilhouetteScores<T>), ClusterError> {
        let cutoff = T::from(self.config.sil_cutoff())
            .ok_or_else(|| ClusterError::config("silCutoff cannot be represented in the input type"))?;
        let (labels, widths): (LabelVector, SilhouetteScores<T>) = labels
            .into_iter()
            .zip(widths)
            .map(|(label, width)| {
                if width > cutoff {
                    (label, width)
                } else {
                    (UNCLUSTERED, T::neg_infinity())
                }
            })
            .unzip();
        let n_removed = labels.iter().filter(|&&label| label == UNCLUSTERED).count();
        debug!(n_removed, "removed samples below the silhouette cutoff");
        Ok((labels, widths))
    }
}

/// Position of the highest mean width, the earliest one on ties. Undefined means never beat a
/// defined one.
fn best_candidate<T: Float>(scores: &[CandidateScore<T>]) -> usize {
    let mut best = 0;
    for (position, score) in scores.iter().enumerate().skip(1) {
        let current = scores[best].mean_width;
        if score.mean_width > current || (current.is_nan() && !score.mean_width.is_nan()) {
            best = position;
        }
    }
    best
}
