//! Workload partitioning.
//!
//! This is the only place chunk sizes are decided. A total of `N` paths over
//! `C` workers becomes `C` chunks of `⌊N/C⌋` paths, the first `N mod C`
//! chunks taking one extra path. Empty chunks (when `C > N`) are dropped.
//! Workers only ever see their own chunk's path count.

use risk_core::SimulationRequest;

use crate::config::{SamplingScheme, SimulationConfig};
use crate::gbm::GbmParams;
use crate::rng::chunk_seed;

/// One unit of dispatched work.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkTask {
    /// Position of the chunk in the plan.
    pub index: usize,
    /// Full copy of the model parameters.
    pub params: GbmParams,
    /// Number of paths this chunk simulates.
    pub path_count: usize,
    /// Seed of this chunk's private generator.
    pub seed: u64,
    /// Declared sampling scheme.
    pub scheme: SamplingScheme,
    /// How many of this chunk's first paths keep their full trajectory.
    pub retain_paths: usize,
}

/// Splits `total` paths over `concurrency` workers.
///
/// A concurrency of 0 is treated as 1. Zero-sized chunks are not returned.
///
/// # Examples
///
/// ```rust
/// use risk_simulation::partition::partition_sizes;
///
/// assert_eq!(partition_sizes(10_000, 4), vec![2500, 2500, 2500, 2500]);
/// assert_eq!(partition_sizes(10_001, 4), vec![2501, 2500, 2500, 2500]);
/// assert_eq!(partition_sizes(3, 8), vec![1, 1, 1]);
/// ```
pub fn partition_sizes(total: usize, concurrency: usize) -> Vec<usize> {
    let chunks = concurrency.max(1);
    let base = total / chunks;
    let rem = total % chunks;
    (0..chunks)
        .map(|i| if i < rem { base + 1 } else { base })
        .filter(|&n| n > 0)
        .collect()
}

/// Builds the chunk plan for a validated request.
///
/// The trajectory budget of the configuration is handed out from the first
/// chunk onward, so the retained paths are the first paths of the ensemble.
pub fn plan_chunks(
    request: &SimulationRequest,
    concurrency: usize,
    config: &SimulationConfig,
    base_seed: u64,
) -> Vec<ChunkTask> {
    let params = GbmParams::from_request(request);
    let mut retain_budget = config.trajectory_sample().min(request.path_count);

    partition_sizes(request.path_count, concurrency)
        .into_iter()
        .enumerate()
        .map(|(index, path_count)| {
            let retain_paths = retain_budget.min(path_count);
            retain_budget -= retain_paths;
            ChunkTask {
                index,
                params,
                path_count,
                seed: chunk_seed(base_seed, index),
                scheme: config.scheme(),
                retain_paths,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(partition_sizes(10_000, 4), vec![2500; 4]);
    }

    #[test]
    fn test_remainder_goes_to_first_chunks() {
        assert_eq!(partition_sizes(10_001, 4), vec![2501, 2500, 2500, 2500]);
        assert_eq!(partition_sizes(10_003, 4), vec![2501, 2501, 2501, 2500]);
    }

    #[test]
    fn test_more_workers_than_paths() {
        assert_eq!(partition_sizes(2, 5), vec![1, 1]);
    }

    #[test]
    fn test_single_worker_and_zero_concurrency() {
        assert_eq!(partition_sizes(17, 1), vec![17]);
        assert_eq!(partition_sizes(17, 0), vec![17]);
    }

    #[test]
    fn test_plan_carries_parameters() {
        let request = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 21, 10);
        let config = SimulationConfig::default();
        let plan = plan_chunks(&request, 3, &config, 42);

        assert_eq!(plan.len(), 3);
        let counts: Vec<usize> = plan.iter().map(|t| t.path_count).collect();
        assert_eq!(counts, vec![4, 3, 3]);
        for (i, t) in plan.iter().enumerate() {
            assert_eq!(t.index, i);
            assert_eq!(t.params.spot, 100.0);
            assert_eq!(t.params.n_steps, 21);
        }
        assert_ne!(plan[0].seed, plan[1].seed);
    }

    #[test]
    fn test_trajectory_budget_spans_chunks() {
        let request = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 5, 12);
        let config = SimulationConfig::builder().trajectory_sample(7).build().unwrap();
        let plan = plan_chunks(&request, 4, &config, 1);

        let retained: Vec<usize> = plan.iter().map(|t| t.retain_paths).collect();
        assert_eq!(retained, vec![3, 3, 1, 0]);
    }

    #[test]
    fn test_trajectory_budget_capped_by_paths() {
        let request = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 5, 4);
        let config = SimulationConfig::builder().trajectory_sample(50).build().unwrap();
        let plan = plan_chunks(&request, 2, &config, 1);
        assert_eq!(plan.iter().map(|t| t.retain_paths).sum::<usize>(), 4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(1000))]

            #[test]
            fn test_sizes_sum_to_total(total in 0usize..1_000_000, workers in 1usize..256) {
                let sizes = partition_sizes(total, workers);
                prop_assert_eq!(sizes.iter().sum::<usize>(), total);
                prop_assert!(sizes.len() <= workers);
                prop_assert!(sizes.iter().all(|&n| n > 0));
            }

            #[test]
            fn test_sizes_differ_by_at_most_one(total in 1usize..1_000_000, workers in 1usize..256) {
                let sizes = partition_sizes(total, workers);
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                prop_assert!(max - min <= 1);
                // Larger chunks come first
                prop_assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }
}
