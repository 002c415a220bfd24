//! Vector primitives used by projection and re-ranking.
//!
//! When the `innr` feature is enabled (default), the kernels come from the
//! `innr` crate's SIMD implementations. Otherwise portable loops are used,
//! chunked by 8 with independent accumulators so they auto-vectorize.
//!
//! ```rust
//! use dci::simd::{dot, l2_distance, norm};
//!
//! let a = [3.0_f32, 4.0];
//! let b = [0.0_f32, 0.0];
//!
//! assert!((dot(&a, &a) - 25.0).abs() < 1e-6);
//! assert!((norm(&a) - 5.0).abs() < 1e-6);
//! assert!((l2_distance(&a, &b) - 5.0).abs() < 1e-6);
//! ```

#[cfg(feature = "innr")]
pub use innr::{dot, l2_distance, l2_distance_squared, norm};

#[cfg(not(feature = "innr"))]
mod fallback {
    //! Portable fallback implementations when innr is not available.

    const LANES: usize = 8;

    /// Dot product of two vectors.
    ///
    /// Extra trailing elements of the longer slice are ignored.
    #[inline]
    #[must_use]
    pub fn dot(a: &[f32], b: &[f32]) -> f32 {
        let n = a.len().min(b.len());
        let (a, b) = (&a[..n], &b[..n]);

        let mut acc = [0.0f32; LANES];
        let chunks_a = a.chunks_exact(LANES);
        let chunks_b = b.chunks_exact(LANES);
        let tail: f32 = chunks_a
            .remainder()
            .iter()
            .zip(chunks_b.remainder())
            .map(|(x, y)| x * y)
            .sum();

        for (ca, cb) in chunks_a.zip(chunks_b) {
            for i in 0..LANES {
                acc[i] += ca[i] * cb[i];
            }
        }

        acc.iter().sum::<f32>() + tail
    }

    /// L2 norm of a vector.
    #[inline]
    #[must_use]
    pub fn norm(v: &[f32]) -> f32 {
        dot(v, v).sqrt()
    }

    /// L2 distance squared (cheaper when only comparing distances).
    #[inline]
    #[must_use]
    pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
        let n = a.len().min(b.len());
        let (a, b) = (&a[..n], &b[..n]);

        let mut acc = [0.0f32; LANES];
        let chunks_a = a.chunks_exact(LANES);
        let chunks_b = b.chunks_exact(LANES);
        let tail: f32 = chunks_a
            .remainder()
            .iter()
            .zip(chunks_b.remainder())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();

        for (ca, cb) in chunks_a.zip(chunks_b) {
            for i in 0..LANES {
                let d = ca[i] - cb[i];
                acc[i] += d * d;
            }
        }

        acc.iter().sum::<f32>() + tail
    }

    /// L2 (Euclidean) distance between two vectors.
    #[inline]
    #[must_use]
    pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
        l2_distance_squared(a, b).sqrt()
    }
}

#[cfg(not(feature = "innr"))]
pub use fallback::*;

// Always local, built on whichever `norm` is in scope.

/// Scale `v` to unit length in place and return its original norm.
///
/// Vectors with a norm below `min_norm` are left untouched.
#[inline]
pub fn normalize_in_place(v: &mut [f32], min_norm: f32) -> f32 {
    let n = norm(v);
    if n >= min_norm {
        for x in v.iter_mut() {
            *x /= n;
        }
    }
    n
}
