//! Path extraction and replanning

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Cell, Direction, GridMap};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Selects which planner extracts a path from the cost field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerKind {
    /// Greedy descent of the cost field
    Greedy,

    /// Exhaustive search over every shortest path, preferring right-hand
    /// openings and fewer turns
    Bfs,
}

impl Default for PlannerKind {
    fn default() -> Self {
        PlannerKind::Greedy
    }
}

impl std::fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerKind::Greedy => write!(f, "greedy"),
            PlannerKind::Bfs => write!(f, "bfs"),
        }
    }
}

impl std::str::FromStr for PlannerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greedy" => Ok(PlannerKind::Greedy),
            "bfs" => Ok(PlannerKind::Bfs),
            _ => Err(format!("Unknown planner \"{}\", expected greedy or bfs", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridMap {
    /// Plan a path from `start` to `goal` by greedy descent of the cost field.
    ///
    /// The returned path starts with `start` and ends with `goal`. An empty
    /// path means the goal cannot be reached. Cells already on the path are
    /// never revisited, so a dead end ends the search rather than
    /// backtracking.
    pub fn plan_path(&mut self, start: Cell, goal: Cell) -> Vec<Cell> {
        if !self.contains(start) || !self.contains(goal) {
            warn!("Cannot plan from {:?} to {:?}, outside the map", start, goal);
            return Vec::new();
        }

        if !self.fill_cost_field(start, goal).is_reached(start) {
            debug!("Goal {:?} not reachable from {:?}", goal, start);
            return Vec::new();
        }

        let mut path = vec![start];
        let mut visited: HashSet<Cell> = HashSet::new();
        visited.insert(start);

        let mut current = start;

        while current != goal {
            let mut best: Option<(Cell, u32)> = None;

            for &dir in Direction::AXIS_ALIGNED.iter() {
                if !self.is_connected(current, dir) {
                    continue;
                }

                let next = match self.neighbour(current, dir) {
                    Some(n) => n,
                    None => continue,
                };

                if visited.contains(&next) {
                    continue;
                }

                if let Some(cost) = self.cost_field.get(next) {
                    // Strictly less so the first minimum in direction order
                    // is kept
                    if best.map_or(true, |(_, c)| cost < c) {
                        best = Some((next, cost));
                    }
                }
            }

            match best {
                Some((next, _)) => {
                    path.push(next);
                    visited.insert(next);
                    current = next;
                }
                None => {
                    debug!("Greedy descent stuck at {:?}", current);
                    return Vec::new();
                }
            }
        }

        debug!("Planned {} cell path from {:?} to {:?}", path.len(), start, goal);

        path
    }

    /// Plan a path with the chosen planner.
    pub fn plan(&mut self, start: Cell, goal: Cell, kind: PlannerKind) -> Vec<Cell> {
        match kind {
            PlannerKind::Greedy => self.plan_path(start, goal),
            PlannerKind::Bfs => self.plan_path_bfs(start, goal),
        }
    }

    /// Plan a path with the greedy planner, restoring deleted connections
    /// until a path is found.
    pub fn replan(&mut self, start: Cell, goal: Cell) -> Vec<Cell> {
        self.replan_with(start, goal, PlannerKind::Greedy)
    }

    /// Plan a path with the chosen planner, restoring deleted connections
    /// until a path is found.
    ///
    /// Connections are restored one at a time in ascending cost of their
    /// originating cell according to the cost field of the failed attempt.
    /// Cells the fill did not reach count as the lowest cost, so they are
    /// restored first. If every deleted connection has been restored
    /// and there is still no path an empty path is returned.
    pub fn replan_with(&mut self, start: Cell, goal: Cell, kind: PlannerKind) -> Vec<Cell> {
        if !self.contains(start) || !self.contains(goal) {
            warn!("Cannot replan from {:?} to {:?}, outside the map", start, goal);
            return Vec::new();
        }

        let mut path = self.plan(start, goal, kind);

        while path.is_empty() {
            if self.removed_walls.is_empty() {
                warn!(
                    "No path from {:?} to {:?} and no removed walls left to restore",
                    start, goal
                );
                return Vec::new();
            }

            // Stable sort, so equal costs keep the order they were removed in
            let field = &self.cost_field;
            self.removed_walls
                .sort_by_key(|w| match field.get(w.cell) {
                    None => (0, 0),
                    Some(c) => (1, c),
                });

            let wall = self.removed_walls.remove(0);

            info!(
                "No path from {:?} to {:?}, restoring connection {:?} from cell {:?}",
                start, goal, wall.dir, wall.cell
            );

            // The wall came from a valid cell so this can't fail, but a
            // failure would be reported rather than looping forever
            if let Err(e) = self.set_connection(wall.cell, wall.dir) {
                warn!("Could not restore connection: {}", e);
            }

            path = self.plan(start, goal, kind);
        }

        path
    }
}
