//! Descriptions of clustering algorithms and the registry used to look them up by name.
//!
//! An algorithm is a pure function from a [`ClusterInput`] and an [`AlgorithmParams`] record to a
//! [`ClusterOutput`], tagged with its category and the shape it natively returns. The
//! post-processing in this crate never looks inside the function.

use crate::builtin;
use crate::distance::DistanceMetric;
use crate::{ClusterError, ClusterInput, LabelVector, PartitionList};
use num_traits::Float;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::warn;

/// The two families of clustering algorithms understood by the pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AlgorithmCategory {
    /// Works on a dissimilarity matrix with a similarity tolerance `alpha`.
    Threshold,
    /// Works towards a target number of clusters `k`, on data or a dissimilarity.
    KCount,
}

/// The shape of result an algorithm returns natively.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputShape {
    Vector,
    List,
}

/// Raw result of a clustering algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterOutput {
    /// A label per sample, `-1` or other negative values are left to the algorithm's convention.
    Labels(LabelVector),
    /// Disjoint sets of sample positions.
    Partition(PartitionList),
}

impl ClusterOutput {
    pub fn shape(&self) -> OutputShape {
        match self {
            ClusterOutput::Labels(_) => OutputShape::Vector,
            ClusterOutput::Partition(_) => OutputShape::List,
        }
    }
}

// Defaults and bounds for the parameter records
const ALPHA_MINIMUM: f64 = 0.0;
const ALPHA_MAXIMUM: f64 = 1.0;
const K_MINIMUM: usize = 1;

/// Parameters of a `Threshold` algorithm.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ThresholdParams {
    alpha: f64,
}

impl ThresholdParams {
    /// Creates threshold parameters, failing if `alpha` is outside `[0, 1]`.
    pub fn new(alpha: f64) -> Result<Self, ClusterError> {
        if !(ALPHA_MINIMUM..=ALPHA_MAXIMUM).contains(&alpha) {
            return Err(ClusterError::config(format!(
                "alpha must be in [{ALPHA_MINIMUM}, {ALPHA_MAXIMUM}], got {alpha}"
            )));
        }
        Ok(ThresholdParams { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Parameters of a `KCount` algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct KParams {
    k: Option<usize>,
    dist_metric: DistanceMetric,
}

impl KParams {
    /// Parameters with a fixed number of clusters.
    pub fn new(k: usize) -> Result<Self, ClusterError> {
        if k < K_MINIMUM {
            return Err(ClusterError::config(format!(
                "k must be at least {K_MINIMUM}, got {k}"
            )));
        }
        Ok(KParams {
            k: Some(k),
            dist_metric: DistanceMetric::default(),
        })
    }

    /// Parameters without a fixed number of clusters, only usable when K is searched for.
    pub fn without_k() -> Self {
        KParams::default()
    }

    /// Sets the metric used when the algorithm is handed a data matrix.
    pub fn with_dist_metric(mut self, dist_metric: DistanceMetric) -> Self {
        self.dist_metric = dist_metric;
        self
    }

    pub fn k(&self) -> Option<usize> {
        self.k
    }

    pub fn dist_metric(&self) -> DistanceMetric {
        self.dist_metric
    }

    pub(crate) fn with_k(self, k: usize) -> Self {
        KParams { k: Some(k), ..self }
    }

    /// The fixed `k`, required by the algorithm functions themselves.
    pub fn require_k(&self) -> Result<usize, ClusterError> {
        self.k
            .ok_or_else(|| ClusterError::config("a KCount algorithm needs a value for k"))
    }
}

/// Per-category parameter record handed to an algorithm function.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AlgorithmParams {
    Threshold(ThresholdParams),
    KCount(KParams),
}

impl AlgorithmParams {
    pub fn category(&self) -> AlgorithmCategory {
        match self {
            AlgorithmParams::Threshold(_) => AlgorithmCategory::Threshold,
            AlgorithmParams::KCount(_) => AlgorithmCategory::KCount,
        }
    }

    pub fn threshold(&self) -> Result<&ThresholdParams, ClusterError> {
        match self {
            AlgorithmParams::Threshold(params) => Ok(params),
            AlgorithmParams::KCount(_) => Err(ClusterError::config(
                "expected Threshold parameters, got KCount parameters",
            )),
        }
    }

    pub fn k_count(&self) -> Result<&KParams, ClusterError> {
        match self {
            AlgorithmParams::KCount(params) => Ok(params),
            AlgorithmParams::Threshold(_) => Err(ClusterError::config(
                "expected KCount parameters, got Threshold parameters",
            )),
        }
    }
}

/// Signature every clustering function conforms to. The final flag asks the algorithm for
/// labels only, without any extra diagnostics it may otherwise compute.
pub type ClusterFn<T> = Arc<
    dyn Fn(&ClusterInput<'_, T>, &AlgorithmParams, bool) -> Result<ClusterOutput, ClusterError>
        + Send
        + Sync,
>;

/// A clustering algorithm: its category, native output shape and implementing function.
#[derive(Clone)]
pub struct AlgorithmSpec<T> {
    name: String,
    category: AlgorithmCategory,
    output_shape: OutputShape,
    func: ClusterFn<T>,
}

impl<T> AlgorithmSpec<T> {
    pub fn new<F>(
        name: impl Into<String>,
        category: AlgorithmCategory,
        output_shape: OutputShape,
        func: F,
    ) -> Self
    where
        F: Fn(&ClusterInput<'_, T>, &AlgorithmParams, bool) -> Result<ClusterOutput, ClusterError>
            + Send
            + Sync
            + 'static,
    {
        AlgorithmSpec {
            name: name.into(),
            category,
            output_shape,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> AlgorithmCategory {
        self.category
    }

    pub fn output_shape(&self) -> OutputShape {
        self.output_shape
    }

    pub(crate) fn call(
        &self,
        input: &ClusterInput<'_, T>,
        params: &AlgorithmParams,
        labels_only: bool,
    ) -> Result<ClusterOutput, ClusterError> {
        (self.func)(input, params, labels_only)
    }
}

impl<T> Debug for AlgorithmSpec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmSpec")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("output_shape", &self.output_shape)
            .finish_non_exhaustive()
    }
}

/// Name based lookup of clustering algorithms.
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry<T> {
    algorithms: BTreeMap<String, AlgorithmSpec<T>>,
}

impl<T> Default for AlgorithmRegistry<T> {
    fn default() -> Self {
        AlgorithmRegistry {
            algorithms: BTreeMap::new(),
        }
    }
}

impl<T> AlgorithmRegistry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an algorithm, replacing any previous algorithm of the same name.
    pub fn register(&mut self, spec: AlgorithmSpec<T>) {
        if let Some(previous) = self.algorithms.insert(spec.name.clone(), spec) {
            warn!(name = previous.name(), "replaced registered clustering algorithm");
        }
    }

    /// Looks an algorithm up by name.
    ///
    /// # Returns
    /// * The algorithm, or `ClusterError::NotFound` if the name is unknown.
    pub fn get(&self, name: &str) -> Result<&AlgorithmSpec<T>, ClusterError> {
        self.algorithms
            .get(name)
            .ok_or_else(|| ClusterError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(String::as_str)
    }
}

impl<T: Float + Send + Sync + 'static> AlgorithmRegistry<T> {
    /// A registry holding the built-in algorithms: `pam`, `hierarchicalK` and `hierarchical01`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(AlgorithmSpec::new(
            builtin::PAM,
            AlgorithmCategory::KCount,
            OutputShape::Vector,
            builtin::pam::<T>,
        ));
        registry.register(AlgorithmSpec::new(
            builtin::HIERARCHICAL_K,
            AlgorithmCategory::KCount,
            OutputShape::List,
            builtin::hierarchical_k::<T>,
        ));
        registry.register(AlgorithmSpec::new(
            builtin::HIERARCHICAL_01,
            AlgorithmCategory::Threshold,
            OutputShape::List,
            builtin::hierarchical_01::<T>,
        ));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_is_not_found() {
        let registry: AlgorithmRegistry<f64> = AlgorithmRegistry::with_builtins();
        assert!(registry.get("pam").is_ok());
        assert!(matches!(
            registry.get("kmeans"),
            Err(ClusterError::NotFound(name)) if name == "kmeans"
        ));
    }

    #[test]
    fn builtins_are_tagged() {
        let registry: AlgorithmRegistry<f64> = AlgorithmRegistry::with_builtins();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["hierarchical01", "hierarchicalK", "pam"]);
        let hier01 = registry.get("hierarchical01").unwrap();
        assert_eq!(hier01.category(), AlgorithmCategory::Threshold);
        assert_eq!(hier01.output_shape(), OutputShape::List);
    }

    #[test]
    fn parameter_records_are_validated() {
        assert!(ThresholdParams::new(0.1).is_ok());
        assert!(ThresholdParams::new(1.5).is_err());
        assert!(KParams::new(0).is_err());
        assert_eq!(KParams::new(3).unwrap().k(), Some(3));
        assert!(KParams::without_k().require_k().is_err());
    }
}
