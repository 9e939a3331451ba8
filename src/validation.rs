use crate::{ClusterError, ClusterInput, InputType, LabeledMatrix};
use num_traits::Float;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataValidator<'a, T> {
    input: ClusterInput<'a, T>,
}

impl<'a, T: Float> DataValidator<'a, T> {
    pub(crate) fn new(input: ClusterInput<'a, T>) -> Self {
        Self { input }
    }

    pub(crate) fn validate_input_data(&self) -> Result<(), ClusterError> {
        let matrix = self.input.matrix();
        validate_matrix(matrix)?;
        if self.input.input_type() == InputType::Dissimilarity {
            validate_dissimilarity(matrix)?;
        }
        if let Some(names) = matrix.row_names() {
            if names.len() != matrix.n_rows() {
                return Err(ClusterError::WrongDimension(format!(
                    "{} row names given for {} rows",
                    names.len(),
                    matrix.n_rows()
                )));
            }
        }
        if let Some(names) = matrix.col_names() {
            if names.len() != matrix.n_cols() {
                return Err(ClusterError::WrongDimension(format!(
                    "{} column names given for {} columns",
                    names.len(),
                    matrix.n_cols()
                )));
            }
        }
        Ok(())
    }

    /// Checks an externally supplied dissimilarity against the number of samples in the input.
    pub(crate) fn validate_override(&self, diss: &LabeledMatrix<T>) -> Result<(), ClusterError> {
        validate_matrix(diss)?;
        validate_dissimilarity(diss)?;
        let n_samples = self.input.n_samples();
        if diss.n_rows() != n_samples {
            return Err(ClusterError::WrongDimension(format!(
                "Dissimilarity override is {0} x {0}, but the input has {n_samples} samples",
                diss.n_rows()
            )));
        }
        Ok(())
    }
}

fn validate_matrix<T: Float>(matrix: &LabeledMatrix<T>) -> Result<(), ClusterError> {
    if matrix.n_rows() == 0 || matrix.n_cols() == 0 {
        return Err(ClusterError::EmptyDataset);
    }
    let dims_0th = matrix.n_cols();
    for (n, row) in matrix.values().iter().enumerate() {
        if row.iter().any(|element| !element.is_finite()) {
            return Err(ClusterError::NonFiniteValue(format!(
                "{n}th row contains non-finite element(s)"
            )));
        }
        let dims_nth = row.len();
        if dims_nth != dims_0th {
            return Err(ClusterError::WrongDimension(format!(
                "0th row has {dims_0th} columns, but {n}th has {dims_nth}"
            )));
        }
    }
    Ok(())
}

fn validate_dissimilarity<T: Float>(matrix: &LabeledMatrix<T>) -> Result<(), ClusterError> {
    let n = matrix.n_rows();
    if matrix.n_cols() != n {
        return Err(ClusterError::WrongDimension(format!(
            "A dissimilarity matrix must be square, got {n} x {}",
            matrix.n_cols()
        )));
    }
    for i in 0..n {
        if matrix.get(i, i).abs() > T::epsilon() {
            return Err(ClusterError::InvalidDissimilarity(format!(
                "A dissimilarity matrix must have a zero diagonal, entry {i} is non-zero"
            )));
        }
        for j in (i + 1)..n {
            if !approx_equal(matrix.get(i, j), matrix.get(j, i)) {
                return Err(ClusterError::InvalidDissimilarity(format!(
                    "A dissimilarity matrix must be symmetrical, entries ({i}, {j}) and ({j}, {i}) differ"
                )));
            }
        }
    }
    Ok(())
}

/// Equal up to accumulated rounding: within the square root of machine epsilon, relative to
/// the larger magnitude.
fn approx_equal<T: Float>(a: T, b: T) -> bool {
    let scale = a.abs().max(b.abs()).max(T::one());
    (a - b).abs() <= T::epsilon().sqrt() * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_asymmetric_dissimilarity() {
        let matrix = LabeledMatrix::new(vec![vec![0.0, 1.0], vec![2.0, 0.0]]);
        let validator = DataValidator::new(ClusterInput::dissimilarity(&matrix));
        assert!(matches!(
            validator.validate_input_data(),
            Err(ClusterError::InvalidDissimilarity(..))
        ));
    }

    #[test]
    fn accepts_rounding_between_triangles() {
        let matrix = LabeledMatrix::new(vec![
            vec![0.0, 1000.0, 3.0],
            vec![1000.0 + 1e-10, 0.0, 2.0],
            vec![3.0, 2.0, 0.0],
        ]);
        let validator = DataValidator::new(ClusterInput::dissimilarity(&matrix));
        assert!(validator.validate_input_data().is_ok());
    }

    #[test]
    fn rejects_non_square_dissimilarity() {
        let matrix = LabeledMatrix::new(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 1.0]]);
        let validator = DataValidator::new(ClusterInput::dissimilarity(&matrix));
        assert!(matches!(
            validator.validate_input_data(),
            Err(ClusterError::WrongDimension(..))
        ));
    }

    #[test]
    fn rejects_non_zero_diagonal() {
        let matrix = LabeledMatrix::new(vec![vec![0.5, 1.0], vec![1.0, 0.0]]);
        let validator = DataValidator::new(ClusterInput::dissimilarity(&matrix));
        assert!(matches!(
            validator.validate_input_data(),
            Err(ClusterError::InvalidDissimilarity(..))
        ));
    }

    #[test]
    fn data_matrix_need_not_be_square() {
        let matrix = LabeledMatrix::new(vec![vec![0.5, 1.0, 3.0], vec![1.0, 0.0, 2.0]]);
        let validator = DataValidator::new(ClusterInput::data(&matrix));
        assert!(validator.validate_input_data().is_ok());
    }

    #[test]
    fn rejects_non_finite_values() {
        let matrix = LabeledMatrix::new(vec![vec![1.5, f64::NAN]]);
        let validator = DataValidator::new(ClusterInput::data(&matrix));
        assert!(matches!(
            validator.validate_input_data(),
            Err(ClusterError::NonFiniteValue(..))
        ));
    }

    #[test]
    fn rejects_wrong_number_of_names() {
        let matrix = LabeledMatrix::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]])
            .with_row_names(["a", "b", "c"]);
        let validator = DataValidator::new(ClusterInput::dissimilarity(&matrix));
        assert!(matches!(
            validator.validate_input_data(),
            Err(ClusterError::WrongDimension(..))
        ));
    }

    #[test]
    fn override_must_match_samples() {
        let data = LabeledMatrix::new(vec![vec![0.5, 1.0, 3.0]]);
        let diss = LabeledMatrix::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let validator = DataValidator::new(ClusterInput::data(&data));
        assert!(validator.validate_override(&diss).is_err());
    }

    #[test]
    fn empty_matrix() {
        let matrix: LabeledMatrix<f32> = LabeledMatrix::new(Vec::new());
        let validator = DataValidator::new(ClusterInput::data(&matrix));
        assert!(matches!(
            validator.validate_input_data(),
            Err(ClusterError::EmptyDataset)
        ));
    }
}
