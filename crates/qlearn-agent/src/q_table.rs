//! Dense tabular action-value function
//!
//! The table is stored as a `(num_states, num_actions)` matrix whose rows are
//! the grid cells in row-major order. Its logical shape, used for persistence,
//! is `bins_0 × .. × bins_{d-1} × num_actions`.

use ndarray::{Array2, ArrayD, ArrayView1, ArrayViewD, IxDyn};

use qlearn_core::{DiscreteAction, RLError, Result};

use crate::discretizer::DiscreteState;

/// Q-value table over a discretized state grid
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Array2<f64>,
    state_shape: Vec<usize>,
}

impl QTable {
    /// Create a zero-initialised table for the given grid and action count.
    ///
    /// Fails when there are no actions or the table would not fit in memory
    /// addressing.
    pub fn zeros(state_shape: &[usize], num_actions: usize) -> Result<Self> {
        if num_actions == 0 {
            return Err(RLError::InvalidConfig(
                "Q-table needs at least one action".to_string(),
            ));
        }
        let too_large = || {
            let mut shape = state_shape.to_vec();
            shape.push(num_actions);
            RLError::InvalidConfig(format!("Q-table of shape {shape:?} is too large"))
        };
        let num_states = state_shape
            .iter()
            .try_fold(1usize, |cells, &bins| cells.checked_mul(bins))
            .ok_or_else(too_large)?;
        let bytes = num_states
            .checked_mul(num_actions)
            .and_then(|cells| cells.checked_mul(std::mem::size_of::<f64>()))
            .ok_or_else(too_large)?;
        if isize::try_from(bytes).is_err() {
            return Err(too_large());
        }
        Ok(Self {
            values: Array2::zeros((num_states, num_actions)),
            state_shape: state_shape.to_vec(),
        })
    }

    /// Rebuild a table from its logical `bins × .. × num_actions` array
    pub fn from_array(array: ArrayD<f64>) -> Result<Self> {
        let shape = array.shape().to_vec();
        let Some((&num_actions, state_shape)) = shape.split_last() else {
            return Err(RLError::InvalidConfig(
                "Q-table array has no dimensions".to_string(),
            ));
        };
        if state_shape.is_empty() || shape.contains(&0) {
            return Err(RLError::InvalidConfig(format!(
                "Q-table array has degenerate shape {shape:?}"
            )));
        }
        let num_states: usize = state_shape.iter().product();
        let values = array
            .as_standard_layout()
            .into_owned()
            .into_shape((num_states, num_actions))
            .map_err(|_| RLError::ShapeMismatch {
                expected: vec![num_states, num_actions],
                actual: shape.clone(),
            })?;
        Ok(Self {
            values,
            state_shape: state_shape.to_vec(),
        })
    }

    /// View the table in its logical `bins × .. × num_actions` shape
    pub fn view_dyn(&self) -> Result<ArrayViewD<'_, f64>> {
        let shape = self.shape();
        self.values
            .view()
            .into_shape(IxDyn(&shape))
            .map_err(|_| RLError::ShapeMismatch {
                expected: shape,
                actual: self.values.shape().to_vec(),
            })
    }

    /// Logical shape: state grid followed by the action count
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = self.state_shape.clone();
        shape.push(self.num_actions());
        shape
    }

    /// Number of actions per state
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.values.ncols()
    }

    /// Number of grid cells
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.values.nrows()
    }

    /// Row-major flat index of a grid cell
    #[must_use]
    pub fn state_index(&self, state: &DiscreteState) -> usize {
        debug_assert_eq!(state.indices().len(), self.state_shape.len());
        state
            .indices()
            .iter()
            .zip(&self.state_shape)
            .fold(0, |acc, (&i, &bins)| acc * bins + i)
    }

    /// Q-values of every action in `state`
    #[must_use]
    pub fn action_values(&self, state: &DiscreteState) -> ArrayView1<'_, f64> {
        self.values.row(self.state_index(state))
    }

    /// Q-value of one state-action pair
    #[must_use]
    pub fn get(&self, state: &DiscreteState, action: DiscreteAction) -> f64 {
        self.values[[self.state_index(state), action.0]]
    }

    /// Mutable Q-value of one state-action pair
    pub fn get_mut(&mut self, state: &DiscreteState, action: DiscreteAction) -> &mut f64 {
        let row = self.state_index(state);
        &mut self.values[[row, action.0]]
    }

    /// Highest-valued action in `state`; ties go to the lowest index
    #[must_use]
    pub fn greedy_action(&self, state: &DiscreteState) -> DiscreteAction {
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (action, &value) in self.action_values(state).iter().enumerate() {
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        DiscreteAction(best)
    }

    /// Value of the greedy action in `state`
    #[must_use]
    pub fn max_value(&self, state: &DiscreteState) -> f64 {
        self.get(state, self.greedy_action(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(indices: &[usize]) -> DiscreteState {
        DiscreteState(indices.to_vec())
    }

    #[test]
    fn test_zeros_shape() {
        let table = QTable::zeros(&[2, 3, 4, 5], 2).unwrap();
        assert_eq!(table.shape(), vec![2, 3, 4, 5, 2]);
        assert_eq!(table.num_states(), 120);
        assert!(table.view_dyn().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_row_major_index() {
        let table = QTable::zeros(&[2, 3, 4], 2).unwrap();
        assert_eq!(table.state_index(&cell(&[0, 0, 0])), 0);
        assert_eq!(table.state_index(&cell(&[0, 0, 3])), 3);
        assert_eq!(table.state_index(&cell(&[0, 1, 0])), 4);
        assert_eq!(table.state_index(&cell(&[1, 2, 3])), 23);
    }

    #[test]
    fn test_view_matches_cells() {
        let mut table = QTable::zeros(&[2, 3], 2).unwrap();
        *table.get_mut(&cell(&[1, 2]), DiscreteAction(1)) = 7.5;

        let view = table.view_dyn().unwrap();
        assert_eq!(view[&[1, 2, 1][..]], 7.5);
        assert_eq!(view.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_greedy_prefers_lowest_index_on_ties() {
        let mut table = QTable::zeros(&[1], 3).unwrap();
        let s = cell(&[0]);
        assert_eq!(table.greedy_action(&s), DiscreteAction(0));

        *table.get_mut(&s, DiscreteAction(1)) = 2.0;
        *table.get_mut(&s, DiscreteAction(2)) = 2.0;
        assert_eq!(table.greedy_action(&s), DiscreteAction(1));
        assert_eq!(table.max_value(&s), 2.0);
    }

    #[test]
    fn test_greedy_with_negative_values() {
        let mut table = QTable::zeros(&[1], 2).unwrap();
        let s = cell(&[0]);
        *table.get_mut(&s, DiscreteAction(0)) = -3.0;
        *table.get_mut(&s, DiscreteAction(1)) = -1.0;
        assert_eq!(table.greedy_action(&s), DiscreteAction(1));
    }

    #[test]
    fn test_from_array_roundtrip() {
        let mut table = QTable::zeros(&[2, 2], 2).unwrap();
        *table.get_mut(&cell(&[1, 0]), DiscreteAction(0)) = -0.25;

        let rebuilt = QTable::from_array(table.view_dyn().unwrap().to_owned()).unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_zeros_rejects_oversized_and_empty_tables() {
        assert!(matches!(
            QTable::zeros(&[100_000; 4], 2),
            Err(RLError::InvalidConfig(_))
        ));
        assert!(matches!(
            QTable::zeros(&[usize::MAX / 2], 2),
            Err(RLError::InvalidConfig(_))
        ));
        assert!(matches!(
            QTable::zeros(&[3, 3], 0),
            Err(RLError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_array_rejects_degenerate_shapes() {
        assert!(QTable::from_array(ArrayD::zeros(IxDyn(&[4]))).is_err());
        assert!(QTable::from_array(ArrayD::zeros(IxDyn(&[3, 0, 2]))).is_err());
    }
}
