//! Wavefront cost field

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use ndarray::Array2;
use std::collections::VecDeque;

use super::{Cell, Direction, GridMap};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Number of moves from each cell to the goal, or `None` if the fill has not
/// reached the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CostField(Array2<Option<u32>>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CostField {
    /// Create a field with every cell unreached.
    pub fn new(size_x: usize, size_y: usize) -> Self {
        Self(Array2::from_elem((size_x, size_y), None))
    }

    /// Cost of the given cell, `None` if unreached or outside the field.
    pub fn get(&self, cell: Cell) -> Option<u32> {
        self.0.get(cell).copied().flatten()
    }

    /// True if the fill reached the given cell.
    pub fn is_reached(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    /// The raw field, indexed `[x, y]`.
    pub fn as_array(&self) -> &Array2<Option<u32>> {
        &self.0
    }

    fn set(&mut self, cell: Cell, cost: u32) {
        if let Some(c) = self.0.get_mut(cell) {
            *c = Some(cost);
        }
    }
}

impl GridMap {
    /// Fill the cost field outwards from `goal`.
    ///
    /// The fill is a breadth-first search over the axis-aligned connections,
    /// stopping as soon as `start` is reached or when every cell connected to
    /// the goal has been costed. The previous field is discarded.
    pub fn fill_cost_field(&mut self, start: Cell, goal: Cell) -> &CostField {
        let mut field = CostField::new(self.size_x, self.size_y);

        if !self.contains(goal) {
            self.cost_field = field;
            return &self.cost_field;
        }

        field.set(goal, 0);

        let mut queue = VecDeque::new();
        queue.push_back(goal);

        while !field.is_reached(start) {
            let current = match queue.pop_front() {
                Some(c) => c,
                None => break,
            };

            // Cells in the queue always have a cost
            let cost = field.get(current).unwrap_or(0);

            for &dir in Direction::AXIS_ALIGNED.iter() {
                if !self.is_connected(current, dir) {
                    continue;
                }

                if let Some(next) = self.neighbour(current, dir) {
                    if !field.is_reached(next) {
                        field.set(next, cost + 1);
                        queue.push_back(next);
                    }
                }
            }
        }

        trace!(
            "Cost field filled from {:?}, start {:?} cost {:?}",
            goal,
            start,
            field.get(start)
        );

        self.cost_field = field;
        &self.cost_field
    }
}
