//! Benchmark utilities for ANN evaluation.
//!
//! Seeded synthetic datasets, brute-force ground truth and recall metrics,
//! shared by the integration tests and the criterion benches.

pub mod datasets;
pub mod metrics;

pub use datasets::{
    compute_all_ground_truth, compute_ground_truth, create_benchmark_dataset,
    create_gaussian_dataset, Dataset,
};
pub use metrics::{evaluate_recall, mean_recall, recall_at_k, RecallReport};
