//! Obstacle placement from a continuous heading

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;

use super::{Cell, Direction, GridMap, GridMapError};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridMap {
    /// Close the connection from `cell` on the side nearest to the heading.
    ///
    /// The heading is snapped to the nearest multiple of 90 degrees, 0 being
    /// the X+ side of the cell. Returns the direction which was closed.
    pub fn add_obstacle(&mut self, cell: Cell, theta_rad: f64) -> Result<Direction, GridMapError> {
        let dir = Direction::from_heading(theta_rad);
        self.delete_connection(cell, dir)?;

        info!("Obstacle added at cell {:?} towards {:?}", cell, dir);

        Ok(dir)
    }

    /// Open the connection from `cell` on the side nearest to the heading.
    ///
    /// The heading is snapped in the same way as for
    /// [`GridMap::add_obstacle`]. Returns the direction which was opened.
    pub fn remove_obstacle(&mut self, cell: Cell, theta_rad: f64) -> Result<Direction, GridMapError> {
        let dir = Direction::from_heading(theta_rad);
        self.set_connection(cell, dir)?;

        info!("Obstacle removed at cell {:?} towards {:?}", cell, dir);

        Ok(dir)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_add_remove_obstacle() {
        let mut map = GridMap::new_open(3, 3, 40.0).unwrap();

        assert_eq!(map.add_obstacle((1, 1), 0.1).unwrap(), Direction::E);
        assert!(!map.is_connected((1, 1), Direction::E));

        assert_eq!(map.add_obstacle((1, 1), PI / 2.0 + 0.3).unwrap(), Direction::N);
        assert_eq!(map.add_obstacle((1, 1), -PI).unwrap(), Direction::W);
        assert_eq!(map.add_obstacle((1, 1), -PI / 2.0).unwrap(), Direction::S);
        assert_eq!(map.removed_walls().len(), 4);

        // Snapping a heading of 270 degrees is the same as -90
        assert_eq!(map.remove_obstacle((1, 1), 3.0 * PI / 2.0).unwrap(), Direction::S);
        assert!(map.is_connected((1, 1), Direction::S));
        assert_eq!(map.removed_walls().len(), 3);

        assert!(map.add_obstacle((3, 3), 0.0).is_err());
    }

    #[test]
    fn test_obstacle_blocks_plan() {
        let mut map = GridMap::new_open(3, 1, 40.0).unwrap();
        map.add_obstacle((0, 0), 0.0).unwrap();

        assert!(map.plan_path((0, 0), (2, 0)).is_empty());

        map.remove_obstacle((1, 0), PI).unwrap();
        assert_eq!(map.plan_path((0, 0), (2, 0)).len(), 3);
    }
}
