//! Retrieval quality metrics.

use crate::ann::ANNIndex;
use crate::RetrieveError;
use std::collections::HashSet;

/// Compute recall@k: fraction of true k-nearest neighbors that were retrieved.
///
/// recall@k = |retrieved ∩ ground_truth| / min(k, |ground_truth|)
///
/// Dividing by the ground-truth size keeps recall at 1.0 when the index is
/// smaller than `k` and every point came back.
pub fn recall_at_k(ground_truth: &[u32], retrieved: &[u32], k: usize) -> f32 {
    let expected = k.min(ground_truth.len());
    if expected == 0 {
        return 0.0;
    }

    let gt_set: HashSet<u32> = ground_truth.iter().take(k).copied().collect();
    let ret_set: HashSet<u32> = retrieved.iter().take(k).copied().collect();
    gt_set.intersection(&ret_set).count() as f32 / expected as f32
}

/// Compute mean recall across multiple queries.
pub fn mean_recall(ground_truths: &[Vec<u32>], retrievals: &[Vec<u32>], k: usize) -> f32 {
    if ground_truths.is_empty() {
        return 0.0;
    }

    let total: f32 = ground_truths
        .iter()
        .zip(retrievals.iter())
        .map(|(gt, ret)| recall_at_k(gt, ret, k))
        .sum();

    total / ground_truths.len() as f32
}

/// Recall of one index against another over a query set.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallReport {
    pub k: usize,
    pub n_queries: usize,
    pub mean_recall: f32,
    pub min_recall: f32,
}

/// Measure recall@k of `index` against `truth`, which must hold the same
/// points under the same ids.
pub fn evaluate_recall(
    index: &dyn ANNIndex,
    truth: &dyn ANNIndex,
    queries: &[Vec<f32>],
    k: usize,
) -> Result<RecallReport, RetrieveError> {
    let mut recalls = Vec::with_capacity(queries.len());
    for q in queries {
        let gt: Vec<u32> = truth.search(q, k)?.into_iter().map(|(id, _)| id).collect();
        let got: Vec<u32> = index.search(q, k)?.into_iter().map(|(id, _)| id).collect();
        recalls.push(recall_at_k(&gt, &got, k));
    }

    let n = recalls.len();
    let mean_recall = if n == 0 {
        0.0
    } else {
        recalls.iter().sum::<f32>() / n as f32
    };
    let min_recall = recalls.iter().copied().fold(f32::INFINITY, f32::min);

    Ok(RecallReport {
        k,
        n_queries: n,
        mean_recall,
        min_recall: if n == 0 { 0.0 } else { min_recall },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::ExactIndex;

    #[test]
    fn test_recall_at_k() {
        let gt = vec![1, 2, 3, 4, 5];
        let retrieved = vec![1, 2, 3, 6, 7];
        assert!((recall_at_k(&gt, &retrieved, 5) - 0.6).abs() < 0.001);

        // Perfect recall
        let perfect = vec![1, 2, 3, 4, 5];
        assert!((recall_at_k(&gt, &perfect, 5) - 1.0).abs() < 0.001);

        // Zero recall
        let miss = vec![6, 7, 8, 9, 10];
        assert!((recall_at_k(&gt, &miss, 5) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_recall_small_ground_truth() {
        // Index of 2 points queried with k = 10.
        assert!((recall_at_k(&[4, 9], &[9, 4], 10) - 1.0).abs() < 0.001);
        assert_eq!(recall_at_k(&[], &[1], 10), 0.0);
    }

    #[test]
    fn test_mean_recall() {
        let gts = vec![vec![1, 2], vec![3, 4]];
        let rets = vec![vec![1, 2], vec![3, 9]];
        assert!((mean_recall(&gts, &rets, 2) - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_exact_against_itself() {
        let mut exact = ExactIndex::new(2).unwrap();
        for i in 0..20 {
            exact.add(&[i as f32, (i * i % 7) as f32]).unwrap();
        }
        let queries = vec![vec![3.5, 1.0], vec![10.0, 6.0]];
        let report = evaluate_recall(&exact, &exact, &queries, 4).unwrap();
        assert_eq!(report.n_queries, 2);
        assert_eq!(report.mean_recall, 1.0);
        assert_eq!(report.min_recall, 1.0);
    }
}
