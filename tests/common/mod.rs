#![allow(dead_code)]
use clusterpost::{
    AlgorithmCategory, AlgorithmParams, AlgorithmRegistry, AlgorithmSpec, CancellationToken,
    ClusterError, ClusterInput, ClusterOutput, Clustering, KParams, LabeledMatrix, OrderBy,
    OutputFormat, OutputShape, PostProcessConfig, PostProcessor, ThresholdParams, UNCLUSTERED,
};
use std::collections::HashSet;

pub fn test_two_triplets<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 0.2, 10.0, 10.1, 10.2]);
    let registry = AlgorithmRegistry::with_builtins();
    let pam = registry.get("pam").unwrap();
    let config = PostProcessConfig::builder().remove_sil(true).build();
    let processor = PostProcessor::new(pam, ClusterInput::dissimilarity(&diss), k_params(2))
        .config(config)
        .output_format(OutputFormat::List);

    let result = cluster_fn(&processor).unwrap();
    assert_eq!(
        result.as_partition().unwrap(),
        &vec![vec![0, 1, 2], vec![3, 4, 5]]
    );

    let search = processor.select_k().unwrap();
    assert_eq!(search.best_k, 2);
    assert!(search.widths.iter().all(|&w| w > 0.0));
}

pub fn test_best_order<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    // The second triplet is tighter, so it has the higher mean silhouette width
    let diss = line_dissimilarity(&[0.0, 0.3, 0.6, 10.0, 10.05, 10.1]);
    let registry = AlgorithmRegistry::with_builtins();
    let pam = registry.get("pam").unwrap();
    let config = PostProcessConfig::builder()
        .find_best_k(true)
        .k_range([2, 3])
        .build();
    let input = ClusterInput::dissimilarity(&diss);

    let by_best = PostProcessor::new(pam, input, AlgorithmParams::KCount(KParams::without_k()))
        .config(config.clone())
        .order_by(OrderBy::Best)
        .output_format(OutputFormat::List);
    assert_eq!(
        cluster_fn(&by_best).unwrap().as_partition().unwrap(),
        &vec![vec![3, 4, 5], vec![0, 1, 2]]
    );

    let by_size = by_best.clone().order_by(OrderBy::Size);
    assert_eq!(
        cluster_fn(&by_size).unwrap().as_partition().unwrap(),
        &vec![vec![0, 1, 2], vec![3, 4, 5]]
    );
}

pub fn test_min_size_filter<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 5.0, 5.1, 5.2, 5.3, 0.1]);
    let spec: AlgorithmSpec<f64> = AlgorithmSpec::new(
        "two-and-four",
        AlgorithmCategory::KCount,
        OutputShape::List,
        |_, _, _| Ok(ClusterOutput::Partition(vec![vec![0, 5], vec![1, 2, 3, 4]])),
    );
    let processor =
        PostProcessor::new(&spec, ClusterInput::dissimilarity(&diss), k_params(2)).min_size(3);

    let result = cluster_fn(&processor).unwrap();
    assert_eq!(result.as_labels().unwrap(), &vec![-1, 1, 1, 1, 1, -1]);

    let listed = cluster_fn(&processor.clone().output_format(OutputFormat::List)).unwrap();
    assert_eq!(listed.as_partition().unwrap(), &vec![vec![1, 2, 3, 4]]);
}

pub fn test_tie_break_earliest<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 0.2, 10.0, 10.1, 10.2]);
    // K = 3 and K = 4 give the same partition under swapped labels, so their mean silhouette
    // widths are equal. K = 2 is a poor split.
    let spec: AlgorithmSpec<f64> = AlgorithmSpec::new(
        "tied",
        AlgorithmCategory::KCount,
        OutputShape::Vector,
        |_, params, _| {
            let labels = match params.k_count()?.require_k()? {
                3 => vec![1, 1, 1, 2, 2, 2],
                4 => vec![2, 2, 2, 1, 1, 1],
                _ => vec![1, 2, 1, 2, 1, 2],
            };
            Ok(ClusterOutput::Labels(labels))
        },
    );
    let input = ClusterInput::dissimilarity(&diss);
    let search_in = |k_range: [usize; 3]| {
        PostProcessor::new(&spec, input, AlgorithmParams::KCount(KParams::without_k()))
            .config(
                PostProcessConfig::builder()
                    .find_best_k(true)
                    .k_range(k_range)
                    .build(),
            )
            .output_format(OutputFormat::List)
    };

    let four_first = search_in([2, 4, 3]);
    assert_eq!(
        cluster_fn(&four_first).unwrap().as_partition().unwrap(),
        &vec![vec![3, 4, 5], vec![0, 1, 2]]
    );
    assert_eq!(four_first.select_k().unwrap().best_k, 4);

    let three_first = search_in([3, 2, 4]);
    assert_eq!(
        cluster_fn(&three_first).unwrap().as_partition().unwrap(),
        &vec![vec![0, 1, 2], vec![3, 4, 5]]
    );
    assert_eq!(three_first.select_k().unwrap().best_k, 3);
}

pub fn test_remove_sil_cutoff<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 0.2, 4.0, 10.0, 10.1, 10.2]);
    let registry = AlgorithmRegistry::with_builtins();
    let pam = registry.get("pam").unwrap();
    let cutoff = 0.5;
    let config = PostProcessConfig::builder()
        .remove_sil(true)
        .sil_cutoff(cutoff)
        .build();
    let processor =
        PostProcessor::new(pam, ClusterInput::dissimilarity(&diss), k_params(2)).config(config);

    let labels = cluster_fn(&processor).unwrap().as_labels().unwrap().clone();
    let search = processor.select_k().unwrap();
    for (sample, &label) in labels.iter().enumerate() {
        if label > 0 {
            assert!(search.widths[sample] > cutoff);
        }
    }
    // The sample between the two groups fits neither well
    assert_eq!(labels[3], UNCLUSTERED);
    assert_eq!(labels.iter().filter(|&&l| l == UNCLUSTERED).count(), 1);
}

pub fn test_size_order_non_increasing<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 5.0, 5.1, 5.2, 5.3, 9.0, 9.1, 9.2]);
    let registry = AlgorithmRegistry::with_builtins();
    let hier = registry.get("hierarchicalK").unwrap();
    let processor = PostProcessor::new(hier, ClusterInput::dissimilarity(&diss), k_params(3))
        .output_format(OutputFormat::List);

    let result = cluster_fn(&processor).unwrap();
    let partition = result.as_partition().unwrap();
    assert_eq!(
        partition,
        &vec![vec![2, 3, 4, 5], vec![6, 7, 8], vec![0, 1]]
    );
    assert!(partition.windows(2).all(|w| w[0].len() >= w[1].len()));
}

pub fn test_threshold_with_data_input<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let data = LabeledMatrix::new(vec![vec![0.0, 0.1, 5.0]]);
    let registry = AlgorithmRegistry::with_builtins();
    let hier01 = registry.get("hierarchical01").unwrap();
    let params = AlgorithmParams::Threshold(ThresholdParams::new(0.2).unwrap());
    let processor = PostProcessor::new(hier01, ClusterInput::data(&data), params);
    assert!(matches!(
        cluster_fn(&processor),
        Err(ClusterError::Configuration(..))
    ));
}

pub fn test_dissimilarity_names<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 0.2, 0.7, 0.75, 5.0])
        .with_row_names(["a", "b", "c", "d", "e", "f"]);
    let registry = AlgorithmRegistry::with_builtins();
    let hier01 = registry.get("hierarchical01").unwrap();
    let params = AlgorithmParams::Threshold(ThresholdParams::new(0.25).unwrap());
    let processor =
        PostProcessor::new(hier01, ClusterInput::dissimilarity(&diss), params).min_size(2);

    let Clustering::Vector(named) = cluster_fn(&processor).unwrap() else {
        panic!("vector output was requested");
    };
    assert_eq!(named.labels, vec![1, 1, 1, 2, 2, -1]);
    let pairs: Vec<_> = named.named().unwrap().collect();
    assert_eq!(pairs[5], ("f", -1));
    assert_eq!(pairs[0], ("a", 1));
}

pub fn test_data_input_with_override<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    // Two features, six samples as columns
    let data = LabeledMatrix::new(vec![
        vec![0.0, 0.1, 0.0, 8.0, 8.1, 8.0],
        vec![0.0, 0.0, 0.1, 8.0, 8.0, 8.1],
    ])
    .with_col_names(["s1", "s2", "s3", "s4", "s5", "s6"]);
    let diss = LabeledMatrix::new(clusterpost::dissimilarity_from_columns(
        data.values(),
        clusterpost::DistanceMetric::Euclidean,
    ));
    let registry = AlgorithmRegistry::with_builtins();
    let hier = registry.get("hierarchicalK").unwrap();
    let config = PostProcessConfig::builder()
        .find_best_k(true)
        .diss(diss)
        .build();
    let processor = PostProcessor::new(
        hier,
        ClusterInput::data(&data),
        AlgorithmParams::KCount(KParams::without_k()),
    )
    .config(config);

    let Clustering::Vector(named) = cluster_fn(&processor).unwrap() else {
        panic!("vector output was requested");
    };
    assert_eq!(named.labels, vec![1, 1, 1, 2, 2, 2]);
    assert_eq!(named.names.unwrap()[3], "s4");
}

pub fn test_empty_data<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss: LabeledMatrix<f64> = LabeledMatrix::new(Vec::new());
    let registry = AlgorithmRegistry::with_builtins();
    let pam = registry.get("pam").unwrap();
    let processor = PostProcessor::new(pam, ClusterInput::dissimilarity(&diss), k_params(2));
    assert!(matches!(
        cluster_fn(&processor),
        Err(ClusterError::EmptyDataset)
    ));
}

pub fn test_cancelled_search<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 0.2, 10.0, 10.1, 10.2]);
    let registry = AlgorithmRegistry::with_builtins();
    let pam = registry.get("pam").unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let processor = PostProcessor::new(pam, ClusterInput::dissimilarity(&diss), k_params(2))
        .config(PostProcessConfig::builder().find_best_k(true).build())
        .cancellation(token);
    assert!(matches!(
        cluster_fn(&processor),
        Err(ClusterError::Cancelled)
    ));
}

pub fn test_partition_is_disjoint<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.4, 1.1, 2.0, 2.2, 4.0, 4.5, 7.0, 7.7, 8.0]);
    let registry = AlgorithmRegistry::with_builtins();
    let pam = registry.get("pam").unwrap();
    let config = PostProcessConfig::builder()
        .find_best_k(true)
        .remove_sil(true)
        .sil_cutoff(0.2)
        .build();
    let processor = PostProcessor::new(
        pam,
        ClusterInput::dissimilarity(&diss),
        AlgorithmParams::KCount(KParams::without_k()),
    )
    .config(config)
    .min_size(2);

    let listed = cluster_fn(&processor.clone().output_format(OutputFormat::List)).unwrap();
    let partition = listed.as_partition().unwrap();
    let mut seen = HashSet::new();
    for members in partition {
        assert!(members.len() >= 2);
        for &sample in members {
            assert!(sample < 10);
            assert!(seen.insert(sample), "sample {sample} is in two clusters");
        }
    }

    let labels = cluster_fn(&processor).unwrap().as_labels().unwrap().clone();
    for (sample, &label) in labels.iter().enumerate() {
        if label == UNCLUSTERED {
            assert!(!seen.contains(&sample));
        } else {
            assert!(partition[label as usize - 1].contains(&sample));
        }
    }
}

pub fn test_list_output_keeps_unclustered<F>(cluster_fn: F)
where
    F: Fn(&PostProcessor<f64>) -> Result<Clustering, ClusterError>,
{
    let diss = line_dissimilarity(&[0.0, 0.1, 5.0, 5.1, 9.0, 9.1]);
    // Samples 4 and 5 are left out of every set
    let spec: AlgorithmSpec<f64> = AlgorithmSpec::new(
        "partial",
        AlgorithmCategory::KCount,
        OutputShape::List,
        |_, _, _| Ok(ClusterOutput::Partition(vec![vec![0, 1], vec![2, 3]])),
    );
    let input = ClusterInput::dissimilarity(&diss);

    let direct = PostProcessor::new(&spec, input, k_params(2));
    assert_eq!(
        cluster_fn(&direct).unwrap().as_labels().unwrap(),
        &vec![1, 1, 2, 2, -1, -1]
    );

    let searched = PostProcessor::new(&spec, input, k_params(2))
        .config(PostProcessConfig::builder().find_best_k(true).k_range([2]).build());
    assert_eq!(
        cluster_fn(&searched).unwrap().as_labels().unwrap(),
        &vec![1, 1, 2, 2, -1, -1]
    );
    let listed = cluster_fn(&searched.clone().output_format(OutputFormat::List)).unwrap();
    assert_eq!(listed.as_partition().unwrap(), &vec![vec![0, 1], vec![2, 3]]);

    let search = searched.select_k().unwrap();
    assert!(search.widths[4].is_nan() && search.widths[5].is_nan());
    assert!(search.candidates[0].mean_width > 0.9);
}

pub fn k_params(k: usize) -> AlgorithmParams {
    AlgorithmParams::KCount(KParams::new(k).unwrap())
}

/// Dissimilarity between points on a line.
pub fn line_dissimilarity(positions: &[f64]) -> LabeledMatrix<f64> {
    LabeledMatrix::new(
        positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs()).collect())
            .collect(),
    )
}
