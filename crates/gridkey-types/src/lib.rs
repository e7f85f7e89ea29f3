//! Core data model for gridkey: the 8×8 grid of cell measurements, the
//! named area-source vectors derived from it, and the tick-adjustment model.

pub mod adjust;
pub mod area;
pub mod measurement;
pub mod selection;

pub use adjust::{AdjustmentMode, AdjustmentTable, apply_post, apply_pre, combine_pairs};
pub use area::{AREA_SOURCE_CATALOG, AreaSourceDef, AreaSources};
pub use measurement::{BoundingBox, CellMeasurement, MeasurementGrid};
pub use selection::Selection;

/// Cells per grid side.
pub const GRID_SIDE: usize = 8;

/// Total number of measured cells.
pub const CELL_COUNT: usize = GRID_SIDE * GRID_SIDE;

/// Number of index pairs in a pairing scheme (and bytes in a candidate key).
pub const PAIR_COUNT: usize = CELL_COUNT / 2;

/// One ordered pair of cell indices.
pub type IndexPair = (usize, usize);
