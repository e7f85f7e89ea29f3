//! Per-cell geometric measurements and the validated 64-cell grid.
//!
//! Measurements come from an external image-analysis step as a JSON document,
//! either a bare array of cell objects or `{"cells": [...]}`. Construction of
//! a [`MeasurementGrid`] is the only validation point: once built, the grid
//! is guaranteed to hold exactly one finite record per cell in row-major order.

use gridkey_error::{GridKeyError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CELL_COUNT, GRID_SIDE};

/// Axis-aligned bounding box of a cell's outer contour, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    fn values(&self) -> [(&'static str, f64); 4] {
        [
            ("bbox.x", self.x),
            ("bbox.y", self.y),
            ("bbox.width", self.width),
            ("bbox.height", self.height),
        ]
    }
}

/// Measurements for one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellMeasurement {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub outer_area: f64,
    pub inner_area: f64,
    pub shell_area: f64,
    pub perimeter: f64,
    pub bbox: BoundingBox,
    pub intensity: f64,
}

impl CellMeasurement {
    /// Build a record whose derived fields follow the document defaults:
    /// row/col from the index, shell = outer - inner.
    pub fn from_areas(index: usize, outer_area: f64, inner_area: f64) -> Self {
        Self {
            index,
            row: index / GRID_SIDE,
            col: index % GRID_SIDE,
            outer_area,
            inner_area,
            shell_area: outer_area - inner_area,
            perimeter: 0.0,
            bbox: BoundingBox::default(),
            intensity: 0.0,
        }
    }

    fn attributes(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("outer_area", self.outer_area),
            ("inner_area", self.inner_area),
            ("shell_area", self.shell_area),
            ("perimeter", self.perimeter),
            ("intensity", self.intensity),
        ]
        .into_iter()
        .chain(self.bbox.values())
    }
}

/// Wire form of a cell record; optional fields fall back to derived values.
#[derive(Debug, Deserialize)]
struct CellRecord {
    index: usize,
    row: Option<usize>,
    col: Option<usize>,
    outer_area: f64,
    inner_area: f64,
    shell_area: Option<f64>,
    #[serde(default)]
    perimeter: f64,
    #[serde(default)]
    bbox: BoundingBox,
    #[serde(default)]
    intensity: f64,
}

impl From<CellRecord> for CellMeasurement {
    fn from(record: CellRecord) -> Self {
        Self {
            index: record.index,
            row: record.row.unwrap_or(record.index / GRID_SIDE),
            col: record.col.unwrap_or(record.index % GRID_SIDE),
            outer_area: record.outer_area,
            inner_area: record.inner_area,
            shell_area: record
                .shell_area
                .unwrap_or(record.outer_area - record.inner_area),
            perimeter: record.perimeter,
            bbox: record.bbox,
            intensity: record.intensity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeasurementDocument {
    Cells(Vec<CellRecord>),
    Wrapped { cells: Vec<CellRecord> },
}

/// Exactly 64 validated cell measurements, ordered by index.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementGrid {
    cells: Vec<CellMeasurement>,
}

impl MeasurementGrid {
    pub fn new(mut cells: Vec<CellMeasurement>) -> Result<Self> {
        if cells.len() != CELL_COUNT {
            return Err(GridKeyError::MeasurementCount {
                expected: CELL_COUNT,
                actual: cells.len(),
            });
        }

        cells.sort_by_key(|cell| cell.index);
        for (position, cell) in cells.iter().enumerate() {
            if cell.index >= CELL_COUNT {
                return Err(GridKeyError::malformed(
                    cell.index,
                    format!("index must be below {CELL_COUNT}"),
                ));
            }
            // Sorted and in range, so any gap or repeat shows up as a mismatch here.
            if cell.index != position {
                return Err(GridKeyError::malformed(
                    cell.index,
                    format!("duplicate index, cell {position} is missing"),
                ));
            }
            let (row, col) = (cell.index / GRID_SIDE, cell.index % GRID_SIDE);
            if cell.row != row || cell.col != col {
                return Err(GridKeyError::malformed(
                    cell.index,
                    format!(
                        "row/col ({}, {}) do not match row-major layout ({row}, {col})",
                        cell.row, cell.col
                    ),
                ));
            }
            if let Some((name, value)) = cell.attributes().find(|(_, value)| !value.is_finite()) {
                return Err(GridKeyError::malformed(
                    cell.index,
                    format!("{name} is not finite ({value})"),
                ));
            }
        }

        Ok(Self { cells })
    }

    /// Parse and validate a measurement document.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let document: MeasurementDocument = serde_json::from_slice(bytes).map_err(|err| {
            GridKeyError::Serialization(format!("measurement document parse failure: {err}"))
        })?;
        let records = match document {
            MeasurementDocument::Cells(records) | MeasurementDocument::Wrapped { cells: records } => {
                records
            }
        };
        debug!(records = records.len(), "measurement document parsed");
        Self::new(records.into_iter().map(CellMeasurement::from).collect())
    }

    pub fn cells(&self) -> &[CellMeasurement] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&CellMeasurement> {
        self.cells.get(index)
    }

    /// Project one attribute across the grid in index order.
    pub fn project(&self, f: impl Fn(&CellMeasurement) -> f64) -> Vec<f64> {
        self.cells.iter().map(f).collect()
    }
}
