//! Named area-source vectors.
//!
//! An area source maps every cell to one number. The catalog below is the
//! registration point: adding a strategy means adding one entry, not a new
//! loop in the orchestrator. Ratios over a zero denominator (and any other
//! non-finite result) collapse to 0.

use std::collections::BTreeMap;

use gridkey_error::{GridKeyError, Result};

use crate::{CELL_COUNT, CellMeasurement, MeasurementGrid};

/// One registered area source.
#[derive(Debug, Clone, Copy)]
pub struct AreaSourceDef {
    pub name: &'static str,
    pub derive: fn(&CellMeasurement) -> f64,
}

pub const AREA_SOURCE_CATALOG: &[AreaSourceDef] = &[
    AreaSourceDef {
        name: "outer",
        derive: |c| c.outer_area,
    },
    AreaSourceDef {
        name: "inner",
        derive: |c| c.inner_area,
    },
    AreaSourceDef {
        name: "shell",
        derive: |c| c.shell_area,
    },
    AreaSourceDef {
        name: "perimeter",
        derive: |c| c.perimeter,
    },
    AreaSourceDef {
        name: "intensity",
        derive: |c| c.intensity,
    },
    AreaSourceDef {
        name: "width",
        derive: |c| c.bbox.width,
    },
    AreaSourceDef {
        name: "height",
        derive: |c| c.bbox.height,
    },
    AreaSourceDef {
        name: "bbox_area",
        derive: |c| c.bbox.area(),
    },
    AreaSourceDef {
        name: "bbox_sum",
        derive: |c| c.bbox.width + c.bbox.height,
    },
    AreaSourceDef {
        name: "bbox_perimeter",
        derive: |c| 2.0 * (c.bbox.width + c.bbox.height),
    },
    AreaSourceDef {
        name: "shell_ratio",
        derive: |c| c.shell_area / c.outer_area,
    },
    AreaSourceDef {
        name: "inner_ratio",
        derive: |c| c.inner_area / c.outer_area,
    },
    AreaSourceDef {
        name: "aspect_ratio",
        derive: |c| c.bbox.width / c.bbox.height,
    },
    AreaSourceDef {
        name: "outer_plus_inner",
        derive: |c| c.outer_area + c.inner_area,
    },
    AreaSourceDef {
        name: "shell_weighted",
        derive: |c| 2.0f64.mul_add(c.shell_area, c.inner_area),
    },
];

/// Immutable name → 64-vector map, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaSources {
    vectors: BTreeMap<String, Vec<f64>>,
}

impl AreaSources {
    /// Evaluate every catalog entry over the grid.
    pub fn from_grid(grid: &MeasurementGrid) -> Self {
        let vectors = AREA_SOURCE_CATALOG
            .iter()
            .map(|def| {
                let values = grid.project(|cell| neutral((def.derive)(cell)));
                (def.name.to_owned(), values)
            })
            .collect();
        Self { vectors }
    }

    /// Register an extra source; used for hand-built vectors.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != CELL_COUNT {
            return Err(GridKeyError::MeasurementCount {
                expected: CELL_COUNT,
                actual: values.len(),
            });
        }
        let values = values.into_iter().map(neutral).collect();
        self.vectors.insert(name, values);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.vectors.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn neutral(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
