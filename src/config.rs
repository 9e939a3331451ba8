use crate::{ClusterError, LabeledMatrix};
use num_traits::Float;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

// Defaults for parameters
const FIND_BEST_K_DEFAULT: bool = false;
const REMOVE_SIL_DEFAULT: bool = false;
const SIL_CUTOFF_DEFAULT: f64 = 0.0;

// Valid bounds of parameters
const SIL_CUTOFF_MINIMUM: f64 = -1.0;
const SIL_CUTOFF_MAXIMUM: f64 = 1.0;

/// Options controlling the silhouette based post-processing of `KCount` algorithms: searching
/// for the best K and excluding poorly fit samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessConfig<T> {
    pub(crate) find_best_k: bool,
    pub(crate) k_range: Option<Vec<usize>>,
    pub(crate) remove_sil: bool,
    pub(crate) sil_cutoff: f64,
    pub(crate) diss: Option<LabeledMatrix<T>>,
}

/// Builder object to set custom post-processing options.
#[derive(Debug, Clone)]
pub struct PostProcessConfigBuilder<T> {
    find_best_k: Option<bool>,
    k_range: Option<Vec<usize>>,
    remove_sil: Option<bool>,
    sil_cutoff: Option<f64>,
    diss: Option<LabeledMatrix<T>>,
}

impl<T: Float> Default for PostProcessConfig<T> {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<T: Float> PostProcessConfig<T> {
    /// Enters the builder pattern, allowing custom options to be set using various setter
    /// methods.
    ///
    /// # Returns
    /// * the post-processing configuration builder
    pub fn builder() -> PostProcessConfigBuilder<T> {
        PostProcessConfigBuilder {
            find_best_k: None,
            k_range: None,
            remove_sil: None,
            sil_cutoff: None,
            diss: None,
        }
    }

    /// Reads the configuration from a JSON object with the keys `findBestK`, `kRange`,
    /// `removeSil`, `silCutoff` and `diss`. Unrecognised keys are ignored with a warning.
    ///
    /// # Returns
    /// * The configuration, or a `ClusterError::Configuration` if a recognised key holds a value
    ///   of the wrong type.
    pub fn from_json(value: &Value) -> Result<Self, ClusterError> {
        let raw = RawPostProcessConfig::deserialize(value)
            .map_err(|e| ClusterError::config(format!("invalid post-processing options: {e}")))?;
        for key in raw.unrecognised.keys() {
            warn!(key = key.as_str(), "ignoring unrecognised post-processing option");
        }

        let mut builder = Self::builder();
        if let Some(find_best_k) = raw.find_best_k {
            builder = builder.find_best_k(find_best_k);
        }
        if let Some(k_range) = raw.k_range {
            builder = builder.k_range(k_range);
        }
        if let Some(remove_sil) = raw.remove_sil {
            builder = builder.remove_sil(remove_sil);
        }
        if let Some(sil_cutoff) = raw.sil_cutoff {
            builder = builder.sil_cutoff(sil_cutoff);
        }
        if let Some(rows) = raw.diss {
            let values = rows
                .into_iter()
                .map(|row| row.into_iter().map(|v| T::from(v).unwrap_or_else(T::nan)).collect())
                .collect();
            builder = builder.diss(LabeledMatrix::new(values));
        }
        Ok(builder.build())
    }

    pub fn find_best_k(&self) -> bool {
        self.find_best_k
    }

    pub fn k_range(&self) -> Option<&[usize]> {
        self.k_range.as_deref()
    }

    pub fn remove_sil(&self) -> bool {
        self.remove_sil
    }

    pub fn sil_cutoff(&self) -> f64 {
        self.sil_cutoff
    }

    pub fn diss(&self) -> Option<&LabeledMatrix<T>> {
        self.diss.as_ref()
    }

    /// Whether any silhouette based post-processing has been asked for.
    pub fn needs_k_selection(&self) -> bool {
        self.find_best_k || self.remove_sil
    }
}

impl<T: Float> PostProcessConfigBuilder<T> {
    /// Sets whether to search over a range of K for the value with the highest mean
    /// silhouette width. Defaults to false.
    ///
    /// # Parameters
    /// * find_best_k - whether to search for K
    ///
    /// # Returns
    /// * the configuration builder
    pub fn find_best_k(mut self, find_best_k: bool) -> PostProcessConfigBuilder<T> {
        self.find_best_k = Some(find_best_k);
        self
    }

    /// Sets the candidate values of K, searched in the given order. Values below 2, or not
    /// below the number of samples, are dropped when the search runs. Defaults to
    /// `k - 2 ..= k + 20` when a fixed `k` is given and `2 ..= 20` otherwise.
    ///
    /// # Parameters
    /// * k_range - the candidate values of K
    ///
    /// # Returns
    /// * the configuration builder
    pub fn k_range(mut self, k_range: impl IntoIterator<Item = usize>) -> PostProcessConfigBuilder<T> {
        self.k_range = Some(k_range.into_iter().collect());
        self
    }

    /// Sets whether samples whose silhouette width does not exceed the cutoff are removed from
    /// their cluster. Defaults to false.
    ///
    /// # Returns
    /// * the configuration builder
    pub fn remove_sil(mut self, remove_sil: bool) -> PostProcessConfigBuilder<T> {
        self.remove_sil = Some(remove_sil);
        self
    }

    /// Sets the silhouette width a sample must exceed to stay in its cluster when `remove_sil`
    /// is set. Clamped into `[-1, 1]`. Defaults to 0.
    ///
    /// # Returns
    /// * the configuration builder
    pub fn sil_cutoff(mut self, sil_cutoff: f64) -> PostProcessConfigBuilder<T> {
        self.sil_cutoff = Some(Self::validate_sil_cutoff(sil_cutoff));
        self
    }

    /// Sets a dissimilarity matrix to score silhouettes with, in place of the clustering
    /// input. Required when the clustering input is a data matrix.
    ///
    /// # Returns
    /// * the configuration builder
    pub fn diss(mut self, diss: LabeledMatrix<T>) -> PostProcessConfigBuilder<T> {
        self.diss = Some(diss);
        self
    }

    /// Finishes the building of the configuration.
    ///
    /// # Returns
    /// * The completed post-processing configuration.
    pub fn build(self) -> PostProcessConfig<T> {
        PostProcessConfig {
            find_best_k: self.find_best_k.unwrap_or(FIND_BEST_K_DEFAULT),
            k_range: self.k_range,
            remove_sil: self.remove_sil.unwrap_or(REMOVE_SIL_DEFAULT),
            sil_cutoff: self.sil_cutoff.unwrap_or(SIL_CUTOFF_DEFAULT),
            diss: self.diss,
        }
    }

    fn validate_sil_cutoff(sil_cutoff: f64) -> f64 {
        if sil_cutoff.is_nan() {
            warn!("silCutoff is NaN. Set to {SIL_CUTOFF_DEFAULT}.");
            return SIL_CUTOFF_DEFAULT;
        }
        let clamped = sil_cutoff.clamp(SIL_CUTOFF_MINIMUM, SIL_CUTOFF_MAXIMUM);
        if clamped != sil_cutoff {
            warn!(
                "silCutoff ({sil_cutoff}) must lie in [{SIL_CUTOFF_MINIMUM}, \
                {SIL_CUTOFF_MAXIMUM}]. Set to {clamped}."
            );
        }
        clamped
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPostProcessConfig {
    find_best_k: Option<bool>,
    k_range: Option<Vec<usize>>,
    remove_sil: Option<bool>,
    sil_cutoff: Option<f64>,
    diss: Option<Vec<Vec<f64>>>,
    #[serde(flatten)]
    unrecognised: BTreeMap<String, Value>,
}
