//! Byte-transform generator.
//!
//! A [`TransformSet`] prepares statistics for one numeric vector and hands out
//! a lazy, finite, restartable iterator of `(id, bytes)` outputs. Transforms
//! whose preconditions fail for the vector (zero range, zero variance) are
//! skipped, never reported as errors.

pub mod family;
pub mod prepared;

use std::fmt;
use std::iter::FusedIterator;

pub use family::{
    AFFINE_CONSTANTS, AFFINE_MULTIPLIERS, HINT_SBOX, LEADING_TRANSFORMS, NamedTransform,
    TRAILING_TRANSFORMS,
};
pub use prepared::PreparedVector;

/// Identity of one transform in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformId {
    Named(&'static str),
    Affine { multiplier: u32, constant: u32 },
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Affine {
                multiplier,
                constant,
            } => write!(f, "affine_{multiplier}_{constant}"),
        }
    }
}

/// One emitted candidate byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub id: TransformId,
    pub bytes: Vec<u8>,
}

/// Number of transforms in the catalog, before degenerate ones are skipped.
pub const CATALOG_LEN: usize = LEADING_TRANSFORMS.len()
    + AFFINE_MULTIPLIERS.len() * AFFINE_CONSTANTS.len()
    + TRAILING_TRANSFORMS.len();

/// All transforms of one input vector.
#[derive(Debug, Clone)]
pub struct TransformSet {
    prepared: PreparedVector,
}

impl TransformSet {
    pub fn new(raw: &[f64]) -> Self {
        Self {
            prepared: PreparedVector::new(raw),
        }
    }

    pub fn prepared(&self) -> &PreparedVector {
        &self.prepared
    }

    /// Start a fresh pass over the catalog.
    pub fn iter(&self) -> TransformIter<'_> {
        TransformIter {
            prepared: &self.prepared,
            stage: Stage::Leading(0),
        }
    }
}

impl<'a> IntoIterator for &'a TransformSet {
    type Item = TransformOutput;
    type IntoIter = TransformIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Leading(usize),
    Affine(usize),
    Trailing(usize),
    Done,
}

/// Catalog order: leading named transforms, the affine grid, then the
/// bitwise tail.
#[derive(Debug, Clone)]
pub struct TransformIter<'a> {
    prepared: &'a PreparedVector,
    stage: Stage,
}

impl Iterator for TransformIter<'_> {
    type Item = TransformOutput;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stage {
                Stage::Leading(i) => {
                    let Some(def) = LEADING_TRANSFORMS.get(i) else {
                        self.stage = Stage::Affine(0);
                        continue;
                    };
                    self.stage = Stage::Leading(i + 1);
                    if let Some(output) = def.output(self.prepared) {
                        return Some(output);
                    }
                }
                Stage::Affine(i) => {
                    let constants = AFFINE_CONSTANTS.len();
                    let Some(&multiplier) = AFFINE_MULTIPLIERS.get(i / constants) else {
                        self.stage = Stage::Trailing(0);
                        continue;
                    };
                    self.stage = Stage::Affine(i + 1);
                    let constant = AFFINE_CONSTANTS[i % constants];
                    return Some(TransformOutput {
                        id: TransformId::Affine {
                            multiplier,
                            constant,
                        },
                        bytes: family::affine(self.prepared, multiplier, constant),
                    });
                }
                Stage::Trailing(i) => {
                    let Some(def) = TRAILING_TRANSFORMS.get(i) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    self.stage = Stage::Trailing(i + 1);
                    if let Some(output) = def.output(self.prepared) {
                        return Some(output);
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

impl FusedIterator for TransformIter<'_> {}
