//! Conversions between cells and positions in the map frame

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tc::PoseSpec;

use super::{Cell, GridMap};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridMap {
    /// Edge length of each cell in meters
    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_cm / 100.0
    }

    /// Get the cell containing the given position, or `None` if the position
    /// is outside the map.
    pub fn position_to_cell(&self, x_m: f64, y_m: f64) -> Option<Cell> {
        if !x_m.is_finite() || !y_m.is_finite() || x_m < 0.0 || y_m < 0.0 {
            return None;
        }

        let cell = (
            (x_m / self.cell_size_m()).floor() as usize,
            (y_m / self.cell_size_m()).floor() as usize,
        );

        if self.contains(cell) {
            Some(cell)
        } else {
            None
        }
    }

    /// Get the position of the centre of a cell.
    pub fn cell_to_position(&self, cell: Cell) -> (f64, f64) {
        (
            (cell.0 as f64 + 0.5) * self.cell_size_m(),
            (cell.1 as f64 + 0.5) * self.cell_size_m(),
        )
    }

    /// Convert a path of cells into waypoints at the cell centres.
    ///
    /// Each waypoint faces along the leg to the next one, and the last faces
    /// along `final_heading_rad`.
    pub fn path_to_waypoints(&self, path: &[Cell], final_heading_rad: f64) -> Vec<PoseSpec> {
        path.iter()
            .enumerate()
            .map(|(i, cell)| {
                let (x_m, y_m) = self.cell_to_position(*cell);

                let theta_rad = match path.get(i + 1) {
                    Some(next) => {
                        let (nx_m, ny_m) = self.cell_to_position(*next);
                        (ny_m - y_m).atan2(nx_m - x_m)
                    }
                    None => final_heading_rad,
                };

                PoseSpec::new(x_m, y_m, theta_rad)
            })
            .collect()
    }
}
