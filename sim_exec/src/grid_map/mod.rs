//! # Grid map module
//!
//! The grid map describes the world the robot drives in as a set of square
//! cells, with walls or openings between neighbouring cells.
//!
//! Connectivity is stored in an interstitial grid of `(2*size_x + 1) x
//! (2*size_y + 1)` values. Cell `(x, y)` sits at interstitial coordinate
//! `(2x + 1, 2y + 1)`, and the value between two neighbouring cells is 1 if
//! the robot can pass between them or 0 if there is a wall:
//!
//! ```text
//!  y
//!  ^   0 0 0 0 0
//!  |   0 c 1 c 0     c = cell centre
//!  |   0 1 0 0 0
//!  |   0 c 1 c 0
//!  |   0 0 0 0 0
//!  +-------------> x
//! ```
//!
//! Paths are planned over the four axis-aligned directions only, using a
//! wavefront cost field filled out from the goal cell.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bfs_planner;
mod coords;
mod cost_field;
mod direction;
mod loader;
mod obstacle;
mod planner;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use ndarray::Array2;
use serde::Serialize;

// Internal
pub use cost_field::CostField;
pub use direction::Direction;
pub use loader::MapLoadError;
pub use planner::PlannerKind;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Index of a cell in the map, as `(x, y)`.
pub type Cell = (usize, usize);

/// A connection that was deleted from the map, which may be restored when
/// replanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovedWall {
    /// Coordinate of the connection in the interstitial grid
    pub conn: (usize, usize),

    /// Cell the connection was deleted from
    pub cell: Cell,

    /// Direction of the connection from `cell`
    pub dir: Direction,
}

/// The connectivity map of the world.
#[derive(Debug, Clone)]
pub struct GridMap {
    /// Number of cells along the X axis
    size_x: usize,

    /// Number of cells along the Y axis
    size_y: usize,

    /// Edge length of each cell
    cell_size_cm: f64,

    /// Interstitial connectivity grid, indexed `[conn_x, conn_y]`
    connectivity: Array2<u8>,

    /// Cost field from the most recent fill
    cost_field: CostField,

    /// Deleted connections, oldest first
    removed_walls: Vec<RemovedWall>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors from modifying a grid map.
#[derive(Debug, thiserror::Error)]
pub enum GridMapError {
    #[error("Cell {cell:?} in direction {dir:?} is outside the map")]
    OutOfBounds { cell: Cell, dir: Direction },

    #[error("The map must have at least one cell on each axis (got {0} x {1})")]
    ZeroSize(usize, usize),

    #[error("The cell size must be positive and finite (got {0} cm)")]
    InvalidCellSize(f64),

    #[error("A {0} x {1} map is too large to index")]
    TooLarge(usize, usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridMap {
    /// Create a map of the given size with every connection closed.
    pub fn new_closed(size_x: usize, size_y: usize, cell_size_cm: f64) -> Result<Self, GridMapError> {
        let dims = interstitial_dims(size_x, size_y)
            .ok_or(GridMapError::TooLarge(size_x, size_y))?;

        Self::from_connectivity(Array2::zeros(dims), cell_size_cm)
    }

    /// Create a map of the given size where every pair of neighbouring cells
    /// is connected, surrounded by a closed border.
    pub fn new_open(size_x: usize, size_y: usize, cell_size_cm: f64) -> Result<Self, GridMapError> {
        let (width, height) = interstitial_dims(size_x, size_y)
            .ok_or(GridMapError::TooLarge(size_x, size_y))?;

        let connectivity = Array2::from_shape_fn((width, height), |(cx, cy)| {
            let border = cx == 0 || cy == 0 || cx == width - 1 || cy == height - 1;
            if border {
                0
            } else {
                1
            }
        });

        Self::from_connectivity(connectivity, cell_size_cm)
    }

    /// Build a map from an interstitial grid, which must have odd dimensions.
    pub(crate) fn from_connectivity(
        connectivity: Array2<u8>,
        cell_size_cm: f64,
    ) -> Result<Self, GridMapError> {
        let (width, height) = connectivity.dim();
        let size_x = width / 2;
        let size_y = height / 2;

        if size_x == 0 || size_y == 0 {
            return Err(GridMapError::ZeroSize(size_x, size_y));
        }

        if !cell_size_cm.is_finite() || cell_size_cm <= 0.0 {
            return Err(GridMapError::InvalidCellSize(cell_size_cm));
        }

        Ok(Self {
            size_x,
            size_y,
            cell_size_cm,
            connectivity,
            cost_field: CostField::new(size_x, size_y),
            removed_walls: Vec::new(),
        })
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    pub fn cell_size_cm(&self) -> f64 {
        self.cell_size_cm
    }

    /// The interstitial connectivity grid, indexed `[conn_x, conn_y]`.
    pub fn connectivity(&self) -> &Array2<u8> {
        &self.connectivity
    }

    /// The cost field from the most recent planning request.
    pub fn cost_field(&self) -> &CostField {
        &self.cost_field
    }

    /// Connections deleted from the map which have not been restored, oldest
    /// first.
    pub fn removed_walls(&self) -> &[RemovedWall] {
        &self.removed_walls
    }

    /// True if the cell is inside the map.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.0 < self.size_x && cell.1 < self.size_y
    }

    /// Get the interstitial coordinate between `cell` and its neighbour in
    /// `dir`, or `None` if the cell is outside the map.
    pub fn cell_to_interstitial(&self, cell: Cell, dir: Direction) -> Option<(usize, usize)> {
        if !self.contains(cell) {
            return None;
        }

        let (dx, dy) = dir.offset();

        // Cell centres are at odd coordinates so the offset never leaves the
        // interstitial grid
        let conn_x = (2 * cell.0 + 1) as isize + dx;
        let conn_y = (2 * cell.1 + 1) as isize + dy;

        Some((conn_x as usize, conn_y as usize))
    }

    /// Get the neighbouring cell in the given direction, or `None` if it would
    /// be outside the map.
    pub fn neighbour(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        if !self.contains(cell) {
            return None;
        }

        let (dx, dy) = dir.offset();
        let nx = cell.0 as isize + dx;
        let ny = cell.1 as isize + dy;

        if nx < 0 || ny < 0 {
            return None;
        }

        let n = (nx as usize, ny as usize);
        if self.contains(n) {
            Some(n)
        } else {
            None
        }
    }

    /// True if the robot can pass from `cell` towards `dir`.
    ///
    /// Cells outside the map are never connected.
    pub fn is_connected(&self, cell: Cell, dir: Direction) -> bool {
        match self.cell_to_interstitial(cell, dir) {
            Some(conn) => self.connectivity[conn] == 1,
            None => false,
        }
    }

    /// Open the connection from `cell` towards `dir`.
    ///
    /// Any record of this connection having been deleted, from either side, is
    /// dropped.
    pub fn set_connection(&mut self, cell: Cell, dir: Direction) -> Result<(), GridMapError> {
        let conn = self
            .cell_to_interstitial(cell, dir)
            .ok_or(GridMapError::OutOfBounds { cell, dir })?;

        self.connectivity[conn] = 1;
        self.removed_walls.retain(|w| w.conn != conn);

        debug!("Connection {:?} from cell {:?} set", dir, cell);

        Ok(())
    }

    /// Close the connection from `cell` towards `dir`.
    ///
    /// If the connection was open it is recorded so that it can be restored
    /// during replanning.
    pub fn delete_connection(&mut self, cell: Cell, dir: Direction) -> Result<(), GridMapError> {
        let conn = self
            .cell_to_interstitial(cell, dir)
            .ok_or(GridMapError::OutOfBounds { cell, dir })?;

        if self.connectivity[conn] != 0 {
            self.removed_walls.push(RemovedWall { conn, cell, dir });
            self.connectivity[conn] = 0;

            debug!("Connection {:?} from cell {:?} deleted", dir, cell);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Dimensions of the interstitial grid for a map of the given size, `None` if
/// they overflow.
pub(crate) fn interstitial_dims(size_x: usize, size_y: usize) -> Option<(usize, usize)> {
    let width = size_x.checked_mul(2)?.checked_add(1)?;
    let height = size_y.checked_mul(2)?.checked_add(1)?;

    Some((width, height))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_constructors() {
        let closed = GridMap::new_closed(3, 2, 40.0).unwrap();
        assert_eq!(closed.connectivity().dim(), (7, 5));
        assert!(closed.connectivity().iter().all(|v| *v == 0));

        let open = GridMap::new_open(3, 2, 40.0).unwrap();
        assert_eq!(open.connectivity().dim(), (7, 5));
        assert!(open.is_connected((0, 0), Direction::N));
        assert!(open.is_connected((0, 0), Direction::E));
        assert!(!open.is_connected((0, 0), Direction::S));
        assert!(!open.is_connected((0, 0), Direction::W));
        assert!(!open.is_connected((2, 1), Direction::N));
        assert!(!open.is_connected((2, 1), Direction::E));

        assert!(matches!(
            GridMap::new_open(0, 2, 40.0),
            Err(GridMapError::ZeroSize(0, 2))
        ));
        assert!(matches!(
            GridMap::new_open(1, 1, 0.0),
            Err(GridMapError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridMap::new_closed(usize::MAX, 1, 40.0),
            Err(GridMapError::TooLarge(usize::MAX, 1))
        ));
        assert!(matches!(
            GridMap::new_open(1, usize::MAX / 2, 40.0),
            Err(GridMapError::TooLarge(..))
        ));
    }

    #[test]
    fn test_interstitial() {
        let map = GridMap::new_open(3, 3, 40.0).unwrap();

        assert_eq!(map.cell_to_interstitial((0, 0), Direction::N), Some((1, 2)));
        assert_eq!(map.cell_to_interstitial((1, 1), Direction::E), Some((4, 3)));
        assert_eq!(map.cell_to_interstitial((1, 1), Direction::SW), Some((2, 2)));
        assert_eq!(map.cell_to_interstitial((2, 2), Direction::NE), Some((6, 6)));
        assert_eq!(map.cell_to_interstitial((3, 0), Direction::N), None);

        assert_eq!(map.neighbour((0, 0), Direction::W), None);
        assert_eq!(map.neighbour((0, 0), Direction::N), Some((0, 1)));
        assert_eq!(map.neighbour((2, 2), Direction::N), None);
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let map = GridMap::new_open(2, 2, 40.0).unwrap();

        assert!(!map.is_connected((2, 0), Direction::W));
        assert!(!map.is_connected((0, 7), Direction::S));
        assert!(!map.is_connected((usize::MAX, 0), Direction::E));
    }

    #[test]
    fn test_set_delete_connection() {
        let mut map = GridMap::new_open(2, 2, 40.0).unwrap();

        map.delete_connection((0, 0), Direction::E).unwrap();
        assert!(!map.is_connected((0, 0), Direction::E));
        assert!(!map.is_connected((1, 0), Direction::W));
        assert_eq!(
            map.removed_walls(),
            &[RemovedWall { conn: (2, 1), cell: (0, 0), dir: Direction::E }]
        );

        // Deleting an existing wall doesn't add another record
        map.delete_connection((1, 0), Direction::W).unwrap();
        map.delete_connection((0, 0), Direction::S).unwrap();
        assert_eq!(map.removed_walls().len(), 1);

        // Restoring from the other side clears the record
        map.set_connection((1, 0), Direction::W).unwrap();
        assert!(map.is_connected((0, 0), Direction::E));
        assert!(map.removed_walls().is_empty());

        assert!(matches!(
            map.set_connection((2, 0), Direction::N),
            Err(GridMapError::OutOfBounds { cell: (2, 0), dir: Direction::N })
        ));
        assert!(matches!(
            map.delete_connection((0, 2), Direction::S),
            Err(GridMapError::OutOfBounds { .. })
        ));
    }
}
