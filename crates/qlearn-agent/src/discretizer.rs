//! Continuous-to-grid state discretization
//!
//! Each observation dimension is mapped onto `bins` evenly spaced grid points
//! between `low` and `high`. Values outside the nominal range (for example
//! because of sensor noise) land in the edge bins, so the resulting index is
//! always valid for the Q-table.

use serde::{Deserialize, Serialize};

use qlearn_core::{RLError, Result};

use crate::config::{BinSpec, DiscretizerConfig};

/// Grid cell of a discretized observation, one index per dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteState(pub Vec<usize>);

impl DiscreteState {
    /// Per-dimension bin indices
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl BinSpec {
    /// Bin index of `value`, clamped into `[0, bins - 1]`
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn index(&self, value: f64) -> usize {
        let last = self.bins - 1;
        let ratio = (value - self.low) / (self.high - self.low);
        let scaled = (last as f64 * ratio).round_ties_even();
        if scaled.is_nan() || scaled <= 0.0 {
            0
        } else if scaled >= last as f64 {
            last
        } else {
            scaled as usize
        }
    }
}

/// Maps observations onto a fixed per-dimension grid
#[derive(Debug, Clone, PartialEq)]
pub struct Discretizer {
    dims: Vec<BinSpec>,
}

impl Discretizer {
    /// Create a discretizer, rejecting empty grids, inverted bounds and grids
    /// whose cell count does not fit in `usize`
    pub fn new(dims: Vec<BinSpec>) -> Result<Self> {
        if dims.is_empty() {
            return Err(RLError::InvalidConfig(
                "discretizer needs at least one dimension".to_string(),
            ));
        }
        for (i, spec) in dims.iter().enumerate() {
            if spec.bins == 0 {
                return Err(RLError::InvalidConfig(format!("dimension {i} has zero bins")));
            }
            if !(spec.low.is_finite() && spec.high.is_finite() && spec.high > spec.low) {
                return Err(RLError::InvalidConfig(format!(
                    "dimension {i} has invalid bounds ({}, {})",
                    spec.low, spec.high
                )));
            }
        }
        if dims
            .iter()
            .try_fold(1usize, |cells, spec| cells.checked_mul(spec.bins))
            .is_none()
        {
            return Err(RLError::InvalidConfig(format!(
                "grid of {:?} bins has too many cells",
                dims.iter().map(|d| d.bins).collect::<Vec<_>>()
            )));
        }
        Ok(Self { dims })
    }

    /// Create a discretizer from its config section
    pub fn from_config(config: &DiscretizerConfig) -> Result<Self> {
        Self::new(config.dims.clone())
    }

    /// Number of observation dimensions
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dims.len()
    }

    /// Bin count per dimension
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.bins).collect()
    }

    /// Total number of grid cells
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.dims.iter().map(|d| d.bins).product()
    }

    /// Grid cell of `observation`.
    ///
    /// Dimensions beyond the configured grid are ignored.
    #[must_use]
    pub fn discretize(&self, observation: &[f64]) -> DiscreteState {
        DiscreteState(
            self.dims
                .iter()
                .zip(observation)
                .map(|(spec, &value)| spec.index(value))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_grid(bins: usize) -> Discretizer {
        Discretizer::new(vec![BinSpec::new(bins, -1.0, 1.0); 4]).unwrap()
    }

    #[test]
    fn test_midpoint_rounds_half_to_even() {
        let grid = unit_grid(2);
        let state = grid.discretize(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(state, DiscreteState(vec![0, 0, 0, 0]));
        // no hidden randomness
        for _ in 0..10 {
            assert_eq!(grid.discretize(&[0.0; 4]), state);
        }
    }

    #[test]
    fn test_rounds_to_nearest_grid_point() {
        let spec = BinSpec::new(5, 0.0, 4.0);
        assert_eq!(spec.index(0.0), 0);
        assert_eq!(spec.index(0.6), 1);
        assert_eq!(spec.index(2.4), 2);
        assert_eq!(spec.index(4.0), 4);
    }

    #[test]
    fn test_out_of_range_clamps_to_edges() {
        let grid = unit_grid(15);
        let state = grid.discretize(&[-5.0, 5.0, f64::NEG_INFINITY, f64::INFINITY]);
        assert_eq!(state, DiscreteState(vec![0, 14, 0, 14]));
    }

    #[test]
    fn test_nan_maps_to_first_bin() {
        assert_eq!(BinSpec::new(10, 0.0, 1.0).index(f64::NAN), 0);
    }

    #[test]
    fn test_single_bin_is_always_zero() {
        let spec = BinSpec::new(1, -1.0, 1.0);
        assert_eq!(spec.index(-3.0), 0);
        assert_eq!(spec.index(0.7), 0);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(Discretizer::new(vec![]).is_err());
        assert!(Discretizer::new(vec![BinSpec::new(0, -1.0, 1.0)]).is_err());
        assert!(Discretizer::new(vec![BinSpec::new(3, 1.0, 1.0)]).is_err());
        assert!(Discretizer::new(vec![BinSpec::new(3, 1.0, -1.0)]).is_err());
    }

    #[test]
    fn test_rejects_grid_with_overflowing_cell_count() {
        let huge = vec![BinSpec::new(100_000, -1.0, 1.0); 4];
        assert!(matches!(
            Discretizer::new(huge),
            Err(RLError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_config_shape() {
        let grid = Discretizer::from_config(&DiscretizerConfig::default()).unwrap();
        assert_eq!(grid.shape(), vec![15, 15, 15, 15]);
        assert_eq!(grid.num_states(), 15usize.pow(4));
    }

    proptest! {
        #[test]
        fn prop_in_bounds_stays_in_range(
            bins in 1usize..40,
            values in prop::collection::vec(-1.0f64..=1.0, 4),
        ) {
            let grid = unit_grid(bins);
            let state = grid.discretize(&values);
            prop_assert_eq!(state.0.len(), 4);
            prop_assert!(state.0.iter().all(|&i| i < bins));
        }

        #[test]
        fn prop_out_of_bounds_hits_boundary(
            bins in 1usize..40,
            excess in 0.0f64..1e6,
        ) {
            let grid = unit_grid(bins);
            let state = grid.discretize(&[1.0 + excess, -1.0 - excess, 1.0 + excess, -1.0 - excess]);
            prop_assert_eq!(state.0, vec![bins - 1, 0, bins - 1, 0]);
        }
    }
}
