//! Search configuration.

use gridkey_types::{AdjustmentMode, AdjustmentTable, Selection};

/// The address the puzzle pays out to.
pub const DEFAULT_TARGET: &str = "1cryptoGeCRiTzVgxBQcKFFjSVydN1GW7";

/// Everything a run needs besides the measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub areas: Selection,
    pub pairings: Selection,
    /// Requested order is kept; repeats are dropped.
    pub pre_modes: Vec<AdjustmentMode>,
    pub post_modes: Vec<AdjustmentMode>,
    pub start_index: usize,
    /// Exclusive; clamped to the combination count.
    pub end_index: Option<usize>,
    /// Maximum transforms evaluated per combination.
    pub transform_limit: Option<usize>,
    /// Skip keys already derived earlier in the same worker.
    pub dedupe: bool,
    pub workers: usize,
    pub stop_on_match: bool,
    pub target: String,
    pub table: AdjustmentTable,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            areas: Selection::All,
            pairings: Selection::All,
            pre_modes: AdjustmentMode::ALL.to_vec(),
            post_modes: AdjustmentMode::ALL.to_vec(),
            start_index: 0,
            end_index: None,
            transform_limit: None,
            dedupe: true,
            workers: 1,
            stop_on_match: false,
            target: DEFAULT_TARGET.to_owned(),
            table: AdjustmentTable::tick_corrections(),
        }
    }
}
