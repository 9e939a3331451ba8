use crate::format::{filter_min_size, labels_to_partition, partition_to_labels};
use crate::invoker::ClusterInvoker;
use crate::k_selection::{KSearch, KSelector};
use crate::order::order_by_size;
use crate::{
    AlgorithmCategory, AlgorithmParams, AlgorithmSpec, CancellationToken, ClusterError,
    ClusterInput, ClusterOutput, Clustering, NamedLabels, OrderBy, OutputFormat, PartitionList,
    PostProcessConfig,
};
use num_traits::Float;
use tracing::{debug, warn};

// Defaults for the driver options
const MIN_SIZE_DEFAULT: usize = 1;
const MIN_SIZE_MINIMUM: usize = 1;

/// Runs a clustering algorithm and turns its output into a final, validated partition:
/// optional K selection and silhouette based removal, minimum size filtering, ordering and
/// formatting.
#[derive(Debug, Clone)]
pub struct PostProcessor<'a, T> {
    spec: &'a AlgorithmSpec<T>,
    input: ClusterInput<'a, T>,
    params: AlgorithmParams,
    config: PostProcessConfig<T>,
    min_size: usize,
    order_by: OrderBy,
    output_format: OutputFormat,
    cancel: Option<CancellationToken>,
}

/// A clustering paired with the input it was computed from, for chaining further steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedClustering<'a, T> {
    pub clustering: Clustering,
    pub input: ClusterInput<'a, T>,
}

impl<'a, T: Float + Send + Sync> PostProcessor<'a, T> {
    /// Creates a post-processor with default options: no K search or silhouette removal, a
    /// minimum cluster size of 1, ordering by size and vector output.
    ///
    /// # Parameters
    /// * `spec` - the clustering algorithm.
    /// * `input` - the data or dissimilarity matrix to cluster.
    /// * `params` - the parameter record matching the algorithm's category.
    ///
    /// # Examples
    /// ```
    ///use clusterpost::{AlgorithmParams, AlgorithmRegistry, ClusterInput, KParams, LabeledMatrix, PostProcessor};
    ///
    ///let diss = LabeledMatrix::new(vec![
    ///    vec![0.0, 0.1, 0.2, 5.0],
    ///    vec![0.1, 0.0, 0.1, 5.1],
    ///    vec![0.2, 0.1, 0.0, 5.2],
    ///    vec![5.0, 5.1, 5.2, 0.0],
    ///]);
    ///let registry = AlgorithmRegistry::with_builtins();
    ///let pam = registry.get("pam").unwrap();
    ///let params = AlgorithmParams::KCount(KParams::new(2).unwrap());
    ///let processor = PostProcessor::new(pam, ClusterInput::dissimilarity(&diss), params);
    ///let clustering = processor.run().unwrap();
    ///assert_eq!(clustering.as_labels().unwrap(), &vec![1, 1, 1, 2]);
    /// ```
    pub fn new(
        spec: &'a AlgorithmSpec<T>,
        input: ClusterInput<'a, T>,
        params: AlgorithmParams,
    ) -> Self {
        PostProcessor {
            spec,
            input,
            params,
            config: PostProcessConfig::default(),
            min_size: MIN_SIZE_DEFAULT,
            order_by: OrderBy::default(),
            output_format: OutputFormat::default(),
            cancel: None,
        }
    }

    /// Sets the silhouette based post-processing options.
    pub fn config(mut self, config: PostProcessConfig<T>) -> Self {
        self.config = config;
        self
    }

    /// Sets the minimum number of samples a cluster needs to be kept. Values below 1 are
    /// raised to 1.
    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = if min_size < MIN_SIZE_MINIMUM {
            warn!("minSize ({min_size}) cannot be lower than {MIN_SIZE_MINIMUM}. Set to {MIN_SIZE_MINIMUM}.");
            MIN_SIZE_MINIMUM
        } else {
            min_size
        };
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Lets a K search be stopped early through the token.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Runs the algorithm and post-processes its output.
    ///
    /// # Returns
    /// * A result that, if successful, holds either a label vector (labels `1..=k` in the final
    ///   cluster order, `-1` for unclustered samples, with sample names when the input had
    ///   them) or a list of disjoint sets of sample positions. Errors are returned for invalid
    ///   input matrices, for configurations that cannot run and for malformed algorithm output.
    pub fn run(&self) -> Result<Clustering, ClusterError> {
        let invoker = self.invoker()?;
        let partition = if self.uses_k_selection() {
            self.k_selector(&invoker)?.select()?.partition
        } else {
            self.dispatch(&invoker)?
        };
        Ok(self.finalise(partition))
    }

    /// Like [`PostProcessor::run`], evaluating candidate values of K on the rayon thread pool.
    /// The result is identical to the sequential run.
    #[cfg(feature = "parallel")]
    pub fn run_par(&self) -> Result<Clustering, ClusterError> {
        let invoker = self.invoker()?;
        let partition = if self.uses_k_selection() {
            self.k_selector(&invoker)?.select_par()?.partition
        } else {
            self.dispatch(&invoker)?
        };
        Ok(self.finalise(partition))
    }

    /// Like [`PostProcessor::run`], returning the input alongside the clustering.
    pub fn run_with_input(&self) -> Result<ChainedClustering<'a, T>, ClusterError> {
        Ok(ChainedClustering {
            clustering: self.run()?,
            input: self.input,
        })
    }

    /// Runs only the K search, exposing every candidate's score.
    ///
    /// # Returns
    /// * The search outcome, or a `ClusterError::Configuration` if the algorithm is not
    ///   `KCount` or the search cannot run.
    pub fn select_k(&self) -> Result<KSearch<T>, ClusterError> {
        let invoker = self.invoker()?;
        self.k_selector(&invoker)?.select()
    }

    fn invoker(&self) -> Result<ClusterInvoker<'a, T>, ClusterError> {
        ClusterInvoker::new(self.spec, self.input)
    }

    fn uses_k_selection(&self) -> bool {
        self.spec.category() == AlgorithmCategory::KCount && self.config.needs_k_selection()
    }

    fn k_selector<'s>(
        &'s self,
        invoker: &'s ClusterInvoker<'s, T>,
    ) -> Result<KSelector<'s, T>, ClusterError> {
        let selector = KSelector::new(invoker, &self.params, &self.config, self.order_by)?;
        Ok(match &self.cancel {
            Some(cancel) => selector.with_cancellation(cancel),
            None => selector,
        })
    }

    fn dispatch(&self, invoker: &ClusterInvoker<'a, T>) -> Result<PartitionList, ClusterError> {
        if self.order_by == OrderBy::Best {
            debug!(
                algorithm = self.spec.name(),
                "ordering by silhouette only applies during K selection, keeping the algorithm's order"
            );
        }
        Ok(match invoker.invoke(&self.params, None)? {
            ClusterOutput::Labels(labels) => labels_to_partition(&labels),
            ClusterOutput::Partition(partition) => partition,
        })
    }

    fn finalise(&self, partition: PartitionList) -> Clustering {
        let n_found = partition.len();
        let mut partition = filter_min_size(partition, self.min_size);
        debug!(
            n_found,
            n_kept = partition.len(),
            min_size = self.min_size,
            "filtered clusters by size"
        );
        if self.order_by == OrderBy::Size {
            partition = order_by_size(partition);
        }

        match self.output_format {
            OutputFormat::List => Clustering::List(partition),
            OutputFormat::Vector => Clustering::Vector(NamedLabels {
                labels: partition_to_labels(&partition, self.input.n_samples()),
                names: self.input.sample_names().map(<[String]>::to_vec),
            }),
        }
    }
}
