//! Exhaustive shortest path search
//!
//! Among all the shortest paths between two cells this planner picks the one
//! which most often has an opening on the right hand side of the cell being
//! left, then the one with the fewest changes of direction. Any remaining tie
//! goes to the path found first when enumerating moves in the order N, E, S, W.
//!
//! Every shortest path only ever steps to a cell whose cost is one less than
//! the current cell, so the paths form a layered graph over the cost field.
//! Both scores depend only on the current cell and the last move direction,
//! so the best path to each `(cell, last direction)` pair in a layer is
//! enough to build the best paths in the next layer.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::collections::HashMap;

use super::{Cell, Direction, GridMap};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The best partial path reaching a cell with a particular last move.
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: Cell,

    /// Direction of the move into this cell, `None` for the start
    dir: Option<Direction>,

    /// Number of moves so far with an opening to the right of the cell moved
    /// out of
    right_open: u32,

    /// Number of changes of direction so far
    turns: u32,

    /// Index of the previous node in the previous layer
    pred: Option<usize>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Node {
    /// True if this node scores strictly better than `other`.
    fn beats(&self, other: &Node) -> bool {
        self.right_open > other.right_open
            || (self.right_open == other.right_open && self.turns < other.turns)
    }

    /// Sort key reproducing the enumeration order of the paths
    fn order_key(&self) -> (Option<usize>, Option<u8>) {
        (self.pred, self.dir.map(Direction::code))
    }
}

impl GridMap {
    /// Plan a path from `start` to `goal` by searching every shortest path.
    ///
    /// The returned path starts with `start` and ends with `goal`. An empty
    /// path means the goal cannot be reached.
    pub fn plan_path_bfs(&mut self, start: Cell, goal: Cell) -> Vec<Cell> {
        if !self.contains(start) || !self.contains(goal) {
            return Vec::new();
        }

        let start_cost = match self.fill_cost_field(start, goal).get(start) {
            Some(c) => c,
            None => {
                debug!("Goal {:?} not reachable from {:?}", goal, start);
                return Vec::new();
            }
        };

        // Each layer is kept in path enumeration order
        let mut layers: Vec<Vec<Node>> = vec![vec![Node {
            cell: start,
            dir: None,
            right_open: 0,
            turns: 0,
            pred: None,
        }]];

        for _ in 0..start_cost {
            let prev = match layers.last() {
                Some(l) => l,
                None => break,
            };

            let mut next: Vec<Node> = Vec::new();
            let mut index: HashMap<(Cell, Direction), usize> = HashMap::new();

            for (pred_idx, node) in prev.iter().enumerate() {
                let cost = match self.cost_field.get(node.cell) {
                    Some(c) => c,
                    None => continue,
                };

                for &dir in Direction::AXIS_ALIGNED.iter() {
                    if !self.is_connected(node.cell, dir) {
                        continue;
                    }

                    let cell = match self.neighbour(node.cell, dir) {
                        Some(n) => n,
                        None => continue,
                    };

                    // Only moves which go one step closer to the goal are on a
                    // shortest path
                    if self.cost_field.get(cell) != Some(cost.saturating_sub(1)) || cost == 0 {
                        continue;
                    }

                    let candidate = Node {
                        cell,
                        dir: Some(dir),
                        right_open: node.right_open
                            + self.is_connected(node.cell, dir.right()) as u32,
                        turns: node.turns
                            + match node.dir {
                                Some(d) if d != dir => 1,
                                _ => 0,
                            },
                        pred: Some(pred_idx),
                    };

                    match index.get(&(cell, dir)) {
                        Some(&i) => {
                            if candidate.beats(&next[i]) {
                                next[i] = candidate;
                            }
                        }
                        None => {
                            index.insert((cell, dir), next.len());
                            next.push(candidate);
                        }
                    }
                }
            }

            next.sort_by_key(Node::order_key);
            layers.push(next);
        }

        // Pick the best path ending at the goal
        let last = match layers.last() {
            Some(l) => l,
            None => return Vec::new(),
        };

        let mut best: Option<(usize, &Node)> = None;
        for (i, node) in last.iter().enumerate() {
            if node.cell != goal {
                continue;
            }
            if best.map_or(true, |(_, b)| node.beats(b)) {
                best = Some((i, node));
            }
        }

        let mut idx = match best {
            Some((i, _)) => i,
            None => return Vec::new(),
        };

        // Walk back through the layers
        let mut path = Vec::with_capacity(layers.len());
        for layer in layers.iter().rev() {
            let node = &layer[idx];
            path.push(node.cell);
            idx = node.pred.unwrap_or(0);
        }
        path.reverse();

        if let Some(node) = best.map(|(_, n)| n) {
            debug!(
                "BFS planned {} cell path from {:?} to {:?} ({} right openings, {} turns)",
                path.len(),
                start,
                goal,
                node.right_open,
                node.turns
            );
        }

        path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bfs_trivial() {
        let mut map = GridMap::new_open(2, 2, 40.0).unwrap();
        assert_eq!(map.plan_path_bfs((1, 0), (1, 0)), vec![(1, 0)]);
    }

    #[test]
    fn test_bfs_prefers_right_openings() {
        // In an open 3x3 map, every move along the left column or the top row
        // towards the goal has an opening on its right, so going up then
        // across scores 4 right openings whereas going across then up scores
        // fewer
        let mut map = GridMap::new_open(3, 3, 40.0).unwrap();
        let path = map.plan_path_bfs((0, 0), (2, 2));

        assert_eq!(path, vec![(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_bfs_right_openings_then_turns() {
        // From the bottom right of a 2x3 map to the top left. Going W, N, N
        // has an opening on the right of every move, N, W, N only on two and
        // N, N, W on none.
        let mut map = GridMap::new_open(2, 3, 40.0).unwrap();
        let path = map.plan_path_bfs((1, 0), (0, 2));

        assert_eq!(path, vec![(1, 0), (0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_node_ordering() {
        let node = |right_open, turns| Node {
            cell: (0, 0),
            dir: None,
            right_open,
            turns,
            pred: None,
        };

        assert!(node(3, 4).beats(&node(2, 0)));
        assert!(node(2, 1).beats(&node(2, 2)));
        assert!(!node(2, 2).beats(&node(2, 2)));
        assert!(!node(1, 0).beats(&node(2, 5)));
    }

    #[test]
    fn test_bfs_matches_shortest_length() {
        let mut map = GridMap::new_open(5, 4, 40.0).unwrap();
        map.delete_connection((1, 0), Direction::N).unwrap();
        map.delete_connection((1, 1), Direction::N).unwrap();
        map.delete_connection((2, 2), Direction::E).unwrap();

        let greedy = map.plan_path((0, 0), (4, 3));
        let bfs = map.plan_path_bfs((0, 0), (4, 3));

        assert!(!greedy.is_empty());
        assert_eq!(greedy.len(), bfs.len());
        assert_eq!(bfs.first(), Some(&(0, 0)));
        assert_eq!(bfs.last(), Some(&(4, 3)));

        for pair in bfs.windows(2) {
            let dir = Direction::AXIS_ALIGNED
                .iter()
                .copied()
                .find(|d| map.neighbour(pair[0], *d) == Some(pair[1]))
                .unwrap();
            assert!(map.is_connected(pair[0], dir));
        }
    }

    #[test]
    fn test_bfs_unreachable() {
        let mut map = GridMap::new_open(3, 1, 40.0).unwrap();
        map.delete_connection((0, 0), Direction::E).unwrap();
        assert!(map.plan_path_bfs((0, 0), (2, 0)).is_empty());
    }
}
