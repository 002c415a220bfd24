//! Random projection directions.
//!
//! DCI projects every point onto `L · m` unit directions, split into `L`
//! groups (one per level) of `m` directions each. Directions are drawn from an
//! isotropic Gaussian and normalised, which makes them uniform on the sphere.
//! When orthonormal groups are requested, each group is additionally run
//! through modified Gram–Schmidt so the `m` directions of a level are
//! mutually orthogonal.
//!
//! Generation is a pure function of `(dimension, seed, groups, per_group,
//! orthonormal)`; the resulting [`Directions`] is immutable and owned by the
//! index that requested it.

use crate::error::{Result, RetrieveError};
use crate::simd;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound on `L · m`.
pub const MAX_DIRECTIONS: usize = 1 << 16;

/// Norm below which a sampled (or orthogonalised) vector counts as degenerate.
const MIN_NORM: f32 = 1e-4;

/// Attempts per direction before giving up on a degenerate sample.
const MAX_RESAMPLES: usize = 32;

/// A fixed set of unit directions, stored group-major in one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    data: Vec<f32>,
    dimension: usize,
    groups: usize,
    per_group: usize,
}

impl Directions {
    /// Total number of directions (`groups * per_group`).
    pub fn len(&self) -> usize {
        self.groups * self.per_group
    }

    /// True when there are no directions. Never the case for generated sets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn per_group(&self) -> usize {
        self.per_group
    }

    /// Direction `i` in group-major order, or `None` past the last one.
    pub fn get(&self, i: usize) -> Option<&[f32]> {
        (i < self.len()).then(|| {
            let start = i * self.dimension;
            &self.data[start..start + self.dimension]
        })
    }

    /// The directions belonging to `group`, or `None` for a group that does not exist.
    pub fn group(&self, group: usize) -> Option<std::slice::ChunksExact<'_, f32>> {
        if group >= self.groups {
            return None;
        }
        let width = self.per_group * self.dimension;
        let start = group * width;
        Some(self.data[start..start + width].chunks_exact(self.dimension))
    }

    /// Scalar projections of `point` onto every direction, group-major.
    ///
    /// `point` must have `dimension()` elements; callers validate.
    pub fn project(&self, point: &[f32]) -> Vec<f32> {
        self.data
            .chunks_exact(self.dimension)
            .map(|dir| simd::dot(point, dir))
            .collect()
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Seeded generator of projection directions.
///
/// ```rust
/// use dci::projection::DirectionGenerator;
///
/// # fn main() -> Result<(), dci::RetrieveError> {
/// let dirs = DirectionGenerator::new(16, 7).generate(4, 3, true)?;
/// assert_eq!(dirs.len(), 12);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DirectionGenerator {
    dimension: usize,
    seed: u64,
}

impl DirectionGenerator {
    pub fn new(dimension: usize, seed: u64) -> Self {
        Self { dimension, seed }
    }

    /// Generate `groups * per_group` unit directions.
    ///
    /// With `orthonormal`, the directions inside each group are mutually
    /// orthogonal, which requires `per_group <= dimension`.
    pub fn generate(&self, groups: usize, per_group: usize, orthonormal: bool) -> Result<Directions> {
        let d = self.dimension;
        if d == 0 {
            return Err(RetrieveError::InvalidConfig(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if groups == 0 || per_group == 0 {
            return Err(RetrieveError::InvalidConfig(format!(
                "need at least one direction per group and one group, got {groups} x {per_group}"
            )));
        }
        let total = groups.checked_mul(per_group).unwrap_or(usize::MAX);
        if total > MAX_DIRECTIONS {
            return Err(RetrieveError::InvalidConfig(format!(
                "{total} directions requested, at most {MAX_DIRECTIONS} supported"
            )));
        }
        if orthonormal && per_group > d {
            return Err(RetrieveError::InvalidConfig(format!(
                "cannot draw {per_group} orthonormal directions in {d} dimensions"
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut data = Vec::with_capacity(total * d);

        for g in 0..groups {
            let group_start = data.len();
            for j in 0..per_group {
                let dir = if orthonormal {
                    self.sample_orthogonal(&mut rng, &data[group_start..])
                } else {
                    self.sample_unit(&mut rng)
                };
                match dir {
                    Some(v) => data.extend_from_slice(&v),
                    None => {
                        return Err(RetrieveError::InvalidConfig(format!(
                            "could not produce independent direction {j} of group {g} \
                             after {MAX_RESAMPLES} attempts"
                        )))
                    }
                }
            }
        }

        log::debug!(
            "generated {total} projection directions in {d} dimensions ({groups} groups of {per_group}, orthonormal={orthonormal})"
        );

        Ok(Directions {
            data,
            dimension: d,
            groups,
            per_group,
        })
    }

    fn sample_unit(&self, rng: &mut StdRng) -> Option<Vec<f32>> {
        for _ in 0..MAX_RESAMPLES {
            let mut v = gaussian_vector(rng, self.dimension);
            if simd::normalize_in_place(&mut v, MIN_NORM) >= MIN_NORM {
                return Some(v);
            }
        }
        None
    }

    /// Sample a unit vector orthogonal to every row of `basis`.
    ///
    /// `basis` holds already-accepted orthonormal rows of the current group.
    fn sample_orthogonal(&self, rng: &mut StdRng, basis: &[f32]) -> Option<Vec<f32>> {
        let d = self.dimension;
        for _ in 0..MAX_RESAMPLES {
            let mut v = gaussian_vector(rng, d);
            simd::normalize_in_place(&mut v, MIN_NORM);
            // Two passes of modified Gram-Schmidt keep the group orthogonal to
            // working precision.
            for _ in 0..2 {
                for u in basis.chunks_exact(d) {
                    let c = simd::dot(&v, u);
                    for (x, y) in v.iter_mut().zip(u) {
                        *x -= c * y;
                    }
                }
            }
            if simd::normalize_in_place(&mut v, MIN_NORM) >= MIN_NORM {
                return Some(v);
            }
        }
        None
    }
}

/// Standard normal vector via Box–Muller.
fn gaussian_vector(rng: &mut StdRng, dimension: usize) -> Vec<f32> {
    (0..dimension)
        .map(|_| {
            // 1 - U keeps u1 in (0, 1] so ln never sees zero.
            let u1: f32 = 1.0 - rng.random::<f32>();
            let u2: f32 = rng.random();
            (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_unit_length() {
        let dirs = DirectionGenerator::new(32, 1).generate(5, 4, false).unwrap();
        assert_eq!(dirs.len(), 20);
        for i in 0..dirs.len() {
            assert!((simd::norm(dirs.get(i).unwrap()) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn orthonormal_groups_are_orthogonal() {
        let dirs = DirectionGenerator::new(8, 3).generate(5, 3, true).unwrap();
        for g in 0..dirs.groups() {
            let group: Vec<&[f32]> = dirs.group(g).unwrap().collect();
            assert_eq!(group.len(), 3);
            for a in 0..group.len() {
                assert!((simd::norm(group[a]) - 1.0).abs() < 1e-4);
                for b in (a + 1)..group.len() {
                    assert!(simd::dot(group[a], group[b]).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn full_orthonormal_basis() {
        let dirs = DirectionGenerator::new(6, 11).generate(2, 6, true).unwrap();
        let group: Vec<&[f32]> = dirs.group(1).unwrap().collect();
        for a in 0..6 {
            for b in (a + 1)..6 {
                assert!(simd::dot(group[a], group[b]).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn same_seed_same_directions() {
        let a = DirectionGenerator::new(16, 42).generate(3, 4, true).unwrap();
        let b = DirectionGenerator::new(16, 42).generate(3, 4, true).unwrap();
        let c = DirectionGenerator::new(16, 43).generate(3, 4, true).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_too_many_orthonormal_directions() {
        let err = DirectionGenerator::new(4, 0).generate(2, 5, true).unwrap_err();
        assert!(matches!(err, RetrieveError::InvalidConfig(_)));
        // Independent sampling has no such limit.
        assert!(DirectionGenerator::new(4, 0).generate(2, 5, false).is_ok());
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let gen = DirectionGenerator::new(4, 0);
        assert!(gen.generate(0, 2, false).is_err());
        assert!(gen.generate(2, 0, false).is_err());
        assert!(gen.generate(MAX_DIRECTIONS, 2, false).is_err());
        assert!(DirectionGenerator::new(0, 0).generate(1, 1, false).is_err());
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let dirs = DirectionGenerator::new(4, 2).generate(3, 2, true).unwrap();
        assert!(dirs.get(5).is_some());
        assert_eq!(dirs.get(6), None);
        assert!(dirs.group(2).is_some());
        assert!(dirs.group(3).is_none());
        assert_eq!(dirs.group(2).unwrap().next(), dirs.get(4));
    }

    #[test]
    fn project_matches_dot_products() {
        let dirs = DirectionGenerator::new(5, 9).generate(2, 2, true).unwrap();
        let point = [0.5_f32, -1.0, 2.0, 0.0, 3.0];
        let proj = dirs.project(&point);
        assert_eq!(proj.len(), 4);
        for (i, p) in proj.iter().enumerate() {
            assert!((p - simd::dot(&point, dirs.get(i).unwrap())).abs() < 1e-6);
        }
    }
}
