//! The transform catalog.
//!
//! Named transforms are plain function pointers over a [`PreparedVector`];
//! a new strategy is added by registering one more entry. Rounding is
//! half-to-even throughout.

use crate::prepared::{PreparedVector, neutral};
use crate::{TransformId, TransformOutput};

/// Byte table indexed by rank (mod 8), taken from the puzzle's hint digits.
pub const HINT_SBOX: [u8; 8] = [0x09, 0x11, 0x18, 0x19, 0x77, 0x0C, 0x0D, 0x0A];

pub const AFFINE_MULTIPLIERS: [u32; 9] = [1, 3, 5, 7, 9, 11, 13, 15, 255];

/// Multiples of 8, then the hint-derived extras.
pub const AFFINE_CONSTANTS: [u32; 37] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 72, 80, 88, 96, 104, 112, 120, 128, 136, 144, 152, 160, 168,
    176, 184, 192, 200, 208, 216, 224, 232, 240, 248, 9, 17, 25, 77, 119,
];

/// A named transform; `None` means its precondition does not hold.
#[derive(Debug, Clone, Copy)]
pub struct NamedTransform {
    pub name: &'static str,
    pub apply: fn(&PreparedVector) -> Option<Vec<u8>>,
}

impl NamedTransform {
    pub(crate) fn output(&self, prepared: &PreparedVector) -> Option<TransformOutput> {
        (self.apply)(prepared).map(|bytes| TransformOutput {
            id: TransformId::Named(self.name),
            bytes,
        })
    }
}

/// Emitted before the affine grid.
pub const LEADING_TRANSFORMS: &[NamedTransform] = &[
    NamedTransform {
        name: "mod256",
        apply: |p| Some(p.residues().to_vec()),
    },
    NamedTransform {
        name: "scale_to_max",
        apply: scale_to_max,
    },
    NamedTransform {
        name: "minmax_norm",
        apply: |p| rescale(p.raw()),
    },
    NamedTransform {
        name: "sqrt",
        apply: |p| shifted_then(p, f64::sqrt),
    },
    NamedTransform {
        name: "cube_root",
        apply: |p| shifted_then(p, f64::cbrt),
    },
    NamedTransform {
        name: "square",
        apply: |p| shifted_then(p, |v| v * v),
    },
    NamedTransform {
        name: "log1p",
        apply: |p| shifted_then(p, f64::ln_1p),
    },
    NamedTransform {
        name: "logistic",
        apply: |p| standardized_then(p, |z| 1.0 / (1.0 + (-z).exp())),
    },
    NamedTransform {
        name: "tanh",
        apply: |p| standardized_then(p, f64::tanh),
    },
    NamedTransform {
        name: "rank_scaled",
        apply: rank_scaled,
    },
    NamedTransform {
        name: "hint_sbox_rank",
        apply: |p| Some(p.ranks().iter().map(|&r| HINT_SBOX[r % HINT_SBOX.len()]).collect()),
    },
];

/// Bitwise tail, all over the mod-256 residues.
pub const TRAILING_TRANSFORMS: &[NamedTransform] = &[
    NamedTransform {
        name: "xor_55",
        apply: |p| Some(map_residues(p, |b| b ^ 0x55)),
    },
    NamedTransform {
        name: "xor_aa",
        apply: |p| Some(map_residues(p, |b| b ^ 0xAA)),
    },
    NamedTransform {
        name: "xor_77",
        apply: |p| Some(map_residues(p, |b| b ^ 0x77)),
    },
    NamedTransform {
        name: "negate",
        apply: |p| Some(map_residues(p, u8::wrapping_neg)),
    },
    NamedTransform {
        name: "bit_reverse",
        apply: |p| Some(map_residues(p, u8::reverse_bits)),
    },
];

/// `(multiplier * v + constant) mod 256` over the residues.
pub fn affine(prepared: &PreparedVector, multiplier: u32, constant: u32) -> Vec<u8> {
    prepared
        .residues()
        .iter()
        .map(|&b| ((multiplier * u32::from(b) + constant) % 256) as u8)
        .collect()
}

fn map_residues(prepared: &PreparedVector, f: fn(u8) -> u8) -> Vec<u8> {
    prepared.residues().iter().copied().map(f).collect()
}

fn scale_to_max(prepared: &PreparedVector) -> Option<Vec<u8>> {
    let max = prepared.max();
    (max > 0.0).then(|| {
        prepared
            .raw()
            .iter()
            .map(|v| to_byte(v / max * 255.0))
            .collect()
    })
}

/// Min-max rescale to 0..=255; `None` when the values have no range.
fn rescale(values: &[f64]) -> Option<Vec<u8>> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let spread = max - min;
    if !(spread > 0.0 && spread.is_finite()) {
        return None;
    }
    Some(
        values
            .iter()
            .map(|v| to_byte((v - min) / spread * 255.0))
            .collect(),
    )
}

fn shifted_then(prepared: &PreparedVector, f: fn(f64) -> f64) -> Option<Vec<u8>> {
    let shifted = prepared.shifted();
    if shifted.iter().all(|&v| v == 0.0) {
        return None;
    }
    let mapped: Vec<f64> = shifted.into_iter().map(|v| neutral(f(v))).collect();
    rescale(&mapped)
}

fn standardized_then(prepared: &PreparedVector, f: fn(f64) -> f64) -> Option<Vec<u8>> {
    let mapped: Vec<f64> = prepared
        .standardized()?
        .into_iter()
        .map(|z| neutral(f(z)))
        .collect();
    rescale(&mapped)
}

fn rank_scaled(prepared: &PreparedVector) -> Option<Vec<u8>> {
    let n = prepared.len();
    if n <= 1 {
        return Some(vec![0; n]);
    }
    let top = (n - 1) as f64;
    Some(
        prepared
            .ranks()
            .iter()
            .map(|&rank| to_byte(rank as f64 * 255.0 / top))
            .collect(),
    )
}

fn to_byte(value: f64) -> u8 {
    neutral(value).round_ties_even().clamp(0.0, 255.0) as u8
}
