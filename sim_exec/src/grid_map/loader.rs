//! Map description loading
//!
//! A map description is a text file whose first line holds three integers,
//! `size_x size_y cell_size_cm`, followed by `2*size_y + 1` rows of the
//! interstitial grid, each holding `2*size_x + 1` values of 0 or 1. The first
//! row in the file is the top (largest Y) row of the map.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use ndarray::Array2;
use std::path::Path;

use super::{interstitial_dims, GridMap, GridMapError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while loading a map description.
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error("Could not read the map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("The map description is empty")]
    Empty,

    #[error("Expected a header of three integers (size_x size_y cell_size_cm), found \"{0}\"")]
    InvalidHeader(String),

    #[error("Expected {expected} rows of connectivity, found {found}")]
    WrongRowCount { expected: usize, found: usize },

    #[error("Row {row} should have {expected} values but has {found}")]
    WrongRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} column {col} has invalid value \"{value}\", expected 0 or 1")]
    InvalidValue {
        row: usize,
        col: usize,
        value: String,
    },

    #[error("Invalid map dimensions: {0}")]
    InvalidMap(#[from] GridMapError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GridMap {
    /// Load a map from a description file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapLoadError> {
        let desc = std::fs::read_to_string(path.as_ref())?;
        let map = Self::from_description(&desc)?;

        info!(
            "Loaded {} x {} map ({} cm cells) from {:?}",
            map.size_x,
            map.size_y,
            map.cell_size_cm,
            path.as_ref()
        );

        Ok(map)
    }

    /// Parse a map from the contents of a description file.
    pub fn from_description(desc: &str) -> Result<Self, MapLoadError> {
        let mut lines = desc.lines().filter(|l| !l.trim().is_empty());

        // ---- HEADER ----

        let header_line = lines.next().ok_or(MapLoadError::Empty)?;

        let header = header_line
            .split_whitespace()
            .map(|v| v.parse::<usize>())
            .collect::<Result<Vec<usize>, _>>()
            .map_err(|_| MapLoadError::InvalidHeader(header_line.trim().to_string()))?;

        let (size_x, size_y, cell_size_cm) = match header.as_slice() {
            [x, y, c] => (*x, *y, *c),
            _ => return Err(MapLoadError::InvalidHeader(header_line.trim().to_string())),
        };

        if size_x == 0 || size_y == 0 {
            return Err(GridMapError::ZeroSize(size_x, size_y).into());
        }

        let (width, height) = interstitial_dims(size_x, size_y)
            .ok_or_else(|| MapLoadError::InvalidHeader(header_line.trim().to_string()))?;

        // ---- CONNECTIVITY ----

        // Every row is checked before the grid is allocated, so the header
        // can't request more memory than the description supplies
        let rows: Vec<&str> = lines.collect();
        if rows.len() != height {
            return Err(MapLoadError::WrongRowCount {
                expected: height,
                found: rows.len(),
            });
        }

        let mut values: Vec<Vec<u8>> = Vec::with_capacity(height);

        for (row, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();

            if tokens.len() != width {
                return Err(MapLoadError::WrongRowLength {
                    row,
                    expected: width,
                    found: tokens.len(),
                });
            }

            let row_values = tokens
                .iter()
                .enumerate()
                .map(|(col, value)| match *value {
                    "0" => Ok(0),
                    "1" => Ok(1),
                    _ => Err(MapLoadError::InvalidValue {
                        row,
                        col,
                        value: value.to_string(),
                    }),
                })
                .collect::<Result<Vec<u8>, _>>()?;

            values.push(row_values);
        }

        // First row in the file is the top of the map
        let connectivity = Array2::from_shape_fn((width, height), |(col, conn_y)| {
            values[height - 1 - conn_y][col]
        });

        Ok(GridMap::from_connectivity(connectivity, cell_size_cm as f64)?)
    }
}
