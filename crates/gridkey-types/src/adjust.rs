//! Tick adjustments: small fixed per-index corrections applied either to the
//! raw 64-vector (pre-pairing) or to the 32 pair sums (post-pairing).

use std::fmt;
use std::str::FromStr;

use gridkey_error::GridKeyError;
use serde::{Deserialize, Serialize};

use crate::IndexPair;

/// How a table magnitude is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMode {
    None,
    Add,
    Subtract,
    Multiply,
}

impl AdjustmentMode {
    pub const ALL: [Self; 4] = [Self::None, Self::Add, Self::Subtract, Self::Multiply];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
        }
    }
}

impl fmt::Display for AdjustmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentMode {
    type Err = GridKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| GridKeyError::UnsupportedAdjustmentMode(s.to_owned()))
    }
}

/// Index → magnitude corrections, sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentTable {
    entries: Vec<(usize, f64)>,
}

impl AdjustmentTable {
    pub fn new(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|&(index, _)| index);
        entries.dedup_by_key(|&mut (index, _)| index);
        Self { entries }
    }

    /// The fixed corrections read off the puzzle grid: cell 40 carries 17
    /// tick marks and cell 53 carries 6 (zero-based 39 and 52).
    pub fn tick_corrections() -> Self {
        Self::new(vec![(39, 17.0), (52, 6.0)])
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|&(index, _)| index)
    }

    pub fn magnitude(&self, index: usize) -> Option<f64> {
        self.entries
            .iter()
            .find(|&&(i, _)| i == index)
            .map(|&(_, m)| m)
    }
}

impl Default for AdjustmentTable {
    fn default() -> Self {
        Self::tick_corrections()
    }
}

/// Apply the table directly to the raw per-cell vector.
pub fn apply_pre(values: &[f64], table: &AdjustmentTable, mode: AdjustmentMode) -> Vec<f64> {
    let mut adjusted = values.to_vec();
    for &(index, magnitude) in table.entries() {
        let Some(slot) = adjusted.get_mut(index) else {
            continue;
        };
        match mode {
            AdjustmentMode::None => {}
            AdjustmentMode::Add => *slot += magnitude,
            AdjustmentMode::Subtract => *slot -= magnitude,
            AdjustmentMode::Multiply => *slot *= magnitude,
        }
    }
    adjusted
}

/// Apply the table to pair sums: each pair gets the combined delta (sum) or
/// factor (product) of the table indices it contains.
pub fn apply_post(
    pair_sums: &[f64],
    pairs: &[IndexPair],
    table: &AdjustmentTable,
    mode: AdjustmentMode,
) -> Vec<f64> {
    pair_sums
        .iter()
        .zip(pairs)
        .map(|(&sum, &(a, b))| {
            let touched: Vec<f64> = table
                .entries()
                .iter()
                .filter(|&&(index, _)| index == a || index == b)
                .map(|&(_, magnitude)| magnitude)
                .collect();
            if touched.is_empty() {
                return sum;
            }
            match mode {
                AdjustmentMode::None => sum,
                AdjustmentMode::Add => sum + touched.iter().sum::<f64>(),
                AdjustmentMode::Subtract => sum - touched.iter().sum::<f64>(),
                AdjustmentMode::Multiply => sum * touched.iter().product::<f64>(),
            }
        })
        .collect()
}

/// Sum each pair of cells into one value.
pub fn combine_pairs(values: &[f64], pairs: &[IndexPair]) -> Vec<f64> {
    pairs.iter().map(|&(a, b)| values[a] + values[b]).collect()
}
