//! Index configuration.

use crate::error::{Result, RetrieveError};
use serde::{Deserialize, Serialize};

/// DCI construction parameters.
///
/// The dimension is passed separately to [`crate::dci::DciIndex::new`], the
/// way the other indexes in this crate take it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DciParams {
    /// Simples (directions) per level, `m`.
    pub num_simples: usize,

    /// Number of levels, `L`.
    pub num_levels: usize,

    /// Tolerance ε. Smaller values widen every level's candidate pool.
    pub epsilon: f32,

    /// Draw each level's directions mutually orthonormal.
    pub orthonormal: bool,

    /// Constant `c` in the per-level target `max(k, ceil(c · k / ε))`.
    pub candidate_scale: f32,

    /// Seed for direction generation. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for DciParams {
    fn default() -> Self {
        Self {
            num_simples: 5,
            num_levels: 15,
            epsilon: 1e-5,
            orthonormal: true,
            candidate_scale: 0.01,
            seed: None,
        }
    }
}

impl DciParams {
    /// Parameters with the given shape and defaults for the rest.
    pub fn new(num_simples: usize, num_levels: usize, epsilon: f32, orthonormal: bool) -> Self {
        Self {
            num_simples,
            num_levels,
            epsilon,
            orthonormal,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_candidate_scale(mut self, scale: f32) -> Self {
        self.candidate_scale = scale;
        self
    }

    /// Check everything that does not depend on the dimension.
    ///
    /// Direction-count and orthonormality limits are checked by the
    /// direction generator.
    pub fn validate(&self) -> Result<()> {
        if self.num_simples == 0 {
            return Err(RetrieveError::InvalidConfig(
                "num_simples must be greater than 0".to_string(),
            ));
        }
        if self.num_levels == 0 {
            return Err(RetrieveError::InvalidConfig(
                "num_levels must be greater than 0".to_string(),
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(RetrieveError::InvalidConfig(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if !(self.candidate_scale.is_finite() && self.candidate_scale > 0.0) {
            return Err(RetrieveError::InvalidConfig(format!(
                "candidate_scale must be positive and finite, got {}",
                self.candidate_scale
            )));
        }
        Ok(())
    }

    /// Candidates each level collects before it stops expanding.
    ///
    /// Never below `k`; saturates at `usize::MAX` for tiny ε.
    pub fn level_target(&self, k: usize) -> usize {
        let raw = (f64::from(self.candidate_scale) * k as f64 / f64::from(self.epsilon)).ceil();
        let target = if raw >= usize::MAX as f64 {
            usize::MAX
        } else {
            raw as usize
        };
        target.max(k)
    }
}
