use num_traits::Float;

/// Distance metrics used to turn a data matrix into a dissimilarity matrix between samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    pub(crate) fn calc_dist<T: Float>(&self, a: &[T], b: &[T]) -> T {
        match *self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Manhattan => manhattan_distance(a, b),
        }
    }
}

pub(crate) fn euclidean_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y) * (*x - *y))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt()
}

pub(crate) fn manhattan_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y).abs())
        .fold(T::zero(), std::ops::Add::add)
}

/// Computes the N x N dissimilarity between the columns (samples) of a feature by sample
/// matrix.
pub fn dissimilarity_from_columns<T: Float>(data: &[Vec<T>], metric: DistanceMetric) -> Vec<Vec<T>> {
    let n_samples = data.first().map_or(0, Vec::len);
    let columns: Vec<Vec<T>> = (0..n_samples)
        .map(|j| data.iter().map(|row| row[j]).collect())
        .collect();

    let mut diss = vec![vec![T::zero(); n_samples]; n_samples];
    for i in 0..n_samples {
        for j in (i + 1)..n_samples {
            let dist = metric.calc_dist(&columns[i], &columns[j]);
            diss[i][j] = dist;
            diss[j][i] = dist;
        }
    }
    diss
}
