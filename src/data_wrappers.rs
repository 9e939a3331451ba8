use crate::ClusterError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Cluster assignment per sample. Positive values are cluster labels, `-1` marks a sample as
/// unclustered.
pub type LabelVector = Vec<i32>;

/// Ordered list of disjoint sets of sample positions. Samples that appear in no set are
/// unclustered.
pub type PartitionList = Vec<Vec<usize>>;

/// Label given to samples that do not belong to any cluster.
pub const UNCLUSTERED: i32 = -1;

/// A dense, row major matrix of floating point values with optional names on either axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix<T> {
    values: Vec<Vec<T>>,
    row_names: Option<Vec<String>>,
    col_names: Option<Vec<String>>,
}

impl<T: Copy> LabeledMatrix<T> {
    pub fn new(values: Vec<Vec<T>>) -> Self {
        LabeledMatrix {
            values,
            row_names: None,
            col_names: None,
        }
    }

    pub fn with_row_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.row_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_col_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.col_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn values(&self) -> &[Vec<T>] {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.len()
    }

    /// Number of columns, read from the first row. Rectangularity is checked by validation.
    pub fn n_cols(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    pub fn row_names(&self) -> Option<&[String]> {
        self.row_names.as_deref()
    }

    pub fn col_names(&self) -> Option<&[String]> {
        self.col_names.as_deref()
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.values[row][col]
    }
}

/// How the matrix handed to a clustering algorithm should be interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputType {
    /// Features as rows, samples as columns.
    Data,
    /// A square N x N dissimilarity matrix between samples.
    Dissimilarity,
}

impl FromStr for InputType {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" | "data" => Ok(InputType::Data),
            "diss" | "dissimilarity" => Ok(InputType::Dissimilarity),
            other => Err(ClusterError::config(format!(
                "input type must be one of 'X' or 'diss', got '{other}'"
            ))),
        }
    }
}

impl Display for InputType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Data => write!(f, "X"),
            InputType::Dissimilarity => write!(f, "diss"),
        }
    }
}

/// A borrowed clustering input together with an explicit interpretation of its axes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterInput<'a, T> {
    matrix: &'a LabeledMatrix<T>,
    input_type: InputType,
}

impl<'a, T: Copy> ClusterInput<'a, T> {
    pub fn new(matrix: &'a LabeledMatrix<T>, input_type: InputType) -> Self {
        ClusterInput { matrix, input_type }
    }

    pub fn data(matrix: &'a LabeledMatrix<T>) -> Self {
        Self::new(matrix, InputType::Data)
    }

    pub fn dissimilarity(matrix: &'a LabeledMatrix<T>) -> Self {
        Self::new(matrix, InputType::Dissimilarity)
    }

    pub fn matrix(&self) -> &'a LabeledMatrix<T> {
        self.matrix
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn is_dissimilarity(&self) -> bool {
        self.input_type == InputType::Dissimilarity
    }

    pub fn n_samples(&self) -> usize {
        match self.input_type {
            InputType::Data => self.matrix.n_cols(),
            InputType::Dissimilarity => self.matrix.n_rows(),
        }
    }

    /// Names on the sample axis: row names of a dissimilarity, column names of a data matrix.
    pub fn sample_names(&self) -> Option<&'a [String]> {
        match self.input_type {
            InputType::Data => self.matrix.col_names(),
            InputType::Dissimilarity => self.matrix.row_names(),
        }
    }
}

/// One merge in an agglomerative tree. Node ids below the number of samples are individual
/// samples, the merge at position `i` creates node `n_samples + i`.
#[derive(Clone, Debug)]
pub(crate) struct MergeNode<T> {
    pub(crate) left_child: usize,
    pub(crate) right_child: usize,
    pub(crate) distance: T,
    pub(crate) size: usize,
}
