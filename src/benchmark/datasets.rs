//! Synthetic dataset generation for benchmarking.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A dataset for ANN benchmarking.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Training vectors (the database to index)
    pub train: Vec<Vec<f32>>,
    /// Test/query vectors
    pub test: Vec<Vec<f32>>,
    /// Vector dimensionality
    pub dimension: usize,
}

impl Dataset {
    /// Number of training vectors.
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    /// Number of test vectors.
    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Create a dataset with vectors uniform in [0, 1]^d.
pub fn create_benchmark_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample = |n: usize| -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
            .collect()
    };

    let train = sample(n_train);
    let test = sample(n_test);
    Dataset {
        train,
        test,
        dimension,
    }
}

/// Create a dataset with i.i.d. Gaussian coordinates `N(mean, std^2)`.
///
/// Every coordinate shares the same mean, so the cloud sits off the origin;
/// useful for checking that nothing assumes centred data.
pub fn create_gaussian_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    mean: f32,
    std: f32,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample = |n: usize| -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| {
                (0..dimension)
                    .map(|_| {
                        // Box-Muller
                        let u1: f32 = 1.0 - rng.random::<f32>();
                        let u2: f32 = rng.random();
                        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                        mean + z * std
                    })
                    .collect()
            })
            .collect()
    };

    let train = sample(n_train);
    let test = sample(n_test);
    Dataset {
        train,
        test,
        dimension,
    }
}

/// Exact k-nearest neighbors of `query` in `database`, ties broken by index.
pub fn compute_ground_truth(query: &[f32], database: &[Vec<f32>], k: usize) -> Vec<u32> {
    let mut distances: Vec<(u32, f32)> = database
        .iter()
        .enumerate()
        .map(|(i, vec)| (i as u32, crate::simd::l2_distance_squared(query, vec)))
        .collect();

    distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    distances.into_iter().take(k).map(|(id, _)| id).collect()
}

/// Compute ground truth for all test queries.
pub fn compute_all_ground_truth(dataset: &Dataset, k: usize) -> Vec<Vec<u32>> {
    dataset
        .test
        .iter()
        .map(|query| compute_ground_truth(query, &dataset.train, k))
        .collect()
}
