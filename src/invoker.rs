use crate::format::{check_partition, labels_to_partition, partition_to_labels};
use crate::{
    AlgorithmCategory, AlgorithmParams, AlgorithmSpec, ClusterError, ClusterInput, ClusterOutput,
    LabelVector, OutputShape,
};
use crate::validation::DataValidator;
use num_traits::Float;
use tracing::debug;

/// Calls a clustering algorithm under the uniform argument contract and optionally converts
/// its native output.
pub struct ClusterInvoker<'a, T> {
    spec: &'a AlgorithmSpec<T>,
    input: ClusterInput<'a, T>,
}

impl<'a, T: Float> ClusterInvoker<'a, T> {
    /// Validates the input and pairs it with the algorithm.
    ///
    /// # Returns
    /// * The invoker, a `ClusterError::Configuration` if a `Threshold` algorithm is paired
    ///   with anything but a dissimilarity matrix, or the validation error of a malformed input.
    pub fn new(spec: &'a AlgorithmSpec<T>, input: ClusterInput<'a, T>) -> Result<Self, ClusterError> {
        if spec.category() == AlgorithmCategory::Threshold && !input.is_dissimilarity() {
            return Err(ClusterError::config(format!(
                "'{}' is a Threshold algorithm and requires a dissimilarity matrix, got input type '{}'",
                spec.name(),
                input.input_type()
            )));
        }
        DataValidator::new(input).validate_input_data()?;
        Ok(ClusterInvoker { spec, input })
    }

    pub fn spec(&self) -> &'a AlgorithmSpec<T> {
        self.spec
    }

    pub fn input(&self) -> ClusterInput<'a, T> {
        self.input
    }

    /// Runs the algorithm once.
    ///
    /// # Parameters
    /// * `params` - the parameter record, whose category must match the algorithm's.
    /// * `shape` - the shape to convert the result to. `None` returns the native shape.
    ///
    /// # Returns
    /// * The checked output of the algorithm.
    pub fn invoke(
        &self,
        params: &AlgorithmParams,
        shape: Option<OutputShape>,
    ) -> Result<ClusterOutput, ClusterError> {
        if params.category() != self.spec.category() {
            return Err(ClusterError::config(format!(
                "'{}' is a {:?} algorithm but was given {:?} parameters",
                self.spec.name(),
                self.spec.category(),
                params.category()
            )));
        }
        let labels_only = shape == Some(OutputShape::Vector);
        let output = self.spec.call(&self.input, params, labels_only)?;
        self.check_output(&output)?;

        let n_samples = self.input.n_samples();
        let converted = match (output, shape) {
            (ClusterOutput::Labels(labels), Some(OutputShape::List)) => {
                ClusterOutput::Partition(labels_to_partition(&labels))
            }
            (ClusterOutput::Partition(partition), Some(OutputShape::Vector)) => {
                ClusterOutput::Labels(partition_to_labels(&partition, n_samples))
            }
            (output, _) => output,
        };
        debug!(
            algorithm = self.spec.name(),
            native = ?self.spec.output_shape(),
            returned = ?converted.shape(),
            "clustering algorithm invoked"
        );
        Ok(converted)
    }

    /// Runs the algorithm and returns a label vector.
    pub fn labels(&self, params: &AlgorithmParams) -> Result<LabelVector, ClusterError> {
        match self.invoke(params, Some(OutputShape::Vector))? {
            ClusterOutput::Labels(labels) => Ok(labels),
            ClusterOutput::Partition(_) => Err(ClusterError::InvariantViolation(String::from(
                "vector conversion returned a partition list",
            ))),
        }
    }

    fn check_output(&self, output: &ClusterOutput) -> Result<(), ClusterError> {
        let n_samples = self.input.n_samples();
        match output {
            ClusterOutput::Labels(labels) if labels.len() != n_samples => {
                Err(ClusterError::AlgorithmFailure(format!(
                    "'{}' returned {} labels for {n_samples} samples",
                    self.spec.name(),
                    labels.len()
                )))
            }
            ClusterOutput::Labels(_) => Ok(()),
            ClusterOutput::Partition(partition) => check_partition(partition, n_samples)
                .map_err(|msg| {
                    ClusterError::AlgorithmFailure(format!("'{}': {msg}", self.spec.name()))
                }),
        }
    }
}
