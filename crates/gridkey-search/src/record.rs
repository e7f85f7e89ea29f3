//! JSONL record shapes.

use gridkey_types::AdjustmentMode;
use serde::{Deserialize, Serialize};

use crate::plan::Combination;

/// Per-combination counters, written once the combination finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboSummary {
    pub combo_index: usize,
    pub area: String,
    pub pre_tick: AdjustmentMode,
    pub post_tick: AdjustmentMode,
    pub pairing: String,
    pub transforms_processed: usize,
    /// Keys that survived filtering and deduplication and were derived.
    pub candidates_processed: usize,
    pub unique_keys: usize,
    pub matches: usize,
}

impl ComboSummary {
    pub fn empty(combination: &Combination) -> Self {
        Self {
            combo_index: combination.index,
            area: combination.area.clone(),
            pre_tick: combination.pre_tick,
            post_tick: combination.post_tick,
            pairing: combination.pairing.clone(),
            transforms_processed: 0,
            candidates_processed: 0,
            unique_keys: 0,
            matches: 0,
        }
    }
}

/// A derived address equal to the target, with full provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub combo_index: usize,
    pub area: String,
    pub pre_tick: AdjustmentMode,
    pub post_tick: AdjustmentMode,
    pub pairing: String,
    pub transform: String,
    pub format: String,
    pub hex_key: String,
    pub address: String,
}

/// Whole-run totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub combinations_total: usize,
    pub combinations_processed: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub total_transforms: usize,
    pub total_candidates: usize,
    pub matches_found: usize,
}

/// The closing line of a summary log: `{"summary": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    pub summary: RunSummary,
}
