//! Pairing schemes built from base orders plus rotation and swap variants.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use gridkey_error::{GridKeyError, Result};
use gridkey_types::{AdjustmentTable, CELL_COUNT, IndexPair, PAIR_COUNT};
use tracing::debug;

use crate::order::base_orders;

/// Left-rotation offsets tried for every base order, on top of the
/// adjustment-table indices.
pub const ROTATION_OFFSETS: [usize; 8] = [0, 1, 2, 3, 7, 8, 16, 32];

/// A named perfect partition of the 64 cells into 32 ordered pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingScheme {
    name: String,
    pairs: Vec<IndexPair>,
}

impl PairingScheme {
    pub fn new(name: impl Into<String>, pairs: Vec<IndexPair>) -> Result<Self> {
        let name = name.into();
        if pairs.len() != PAIR_COUNT {
            return Err(GridKeyError::InvalidPairing {
                detail: format!("has {} pairs, expected {PAIR_COUNT}", pairs.len()),
                name,
            });
        }
        let mut seen = [false; CELL_COUNT];
        for &(a, b) in &pairs {
            for index in [a, b] {
                match seen.get_mut(index) {
                    None => {
                        return Err(GridKeyError::InvalidPairing {
                            detail: format!("index {index} is outside the grid"),
                            name,
                        });
                    }
                    Some(true) => {
                        return Err(GridKeyError::InvalidPairing {
                            detail: format!("index {index} appears more than once"),
                            name,
                        });
                    }
                    Some(slot) => *slot = true,
                }
            }
        }
        Ok(Self { name, pairs })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pairs(&self) -> &[IndexPair] {
        &self.pairs
    }

    /// Unordered collection of unordered pairs; equal for schemes that group
    /// the same cells together regardless of pair order or orientation.
    pub fn canonical(&self) -> Vec<IndexPair> {
        let mut canonical: Vec<IndexPair> = self
            .pairs
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        canonical.sort_unstable();
        canonical
    }
}

/// `(order[2k], order[2k + 1])` for every k.
pub fn pair_consecutive(order: &[usize]) -> Vec<IndexPair> {
    order
        .chunks_exact(2)
        .map(|chunk| (chunk[0], chunk[1]))
        .collect()
}

/// Every scheme derived from the base orders, keyed by its stable name.
pub fn build_pairing_schemes(table: &AdjustmentTable) -> Result<BTreeMap<String, PairingScheme>> {
    let offsets: BTreeSet<usize> = ROTATION_OFFSETS
        .iter()
        .copied()
        .chain(table.indices())
        .map(|offset| offset % CELL_COUNT)
        .collect();

    let mut schemes = BTreeMap::new();
    for (base_name, order) in base_orders()? {
        let mut variants = VariantSet::default();

        for &offset in &offsets {
            let mut rotated = order.clone();
            rotated.rotate_left(offset);
            let name = if offset == 0 {
                base_name.to_owned()
            } else {
                format!("{base_name}_rot{offset}")
            };
            variants.offer(name, &rotated)?;
        }

        for index in table.indices() {
            let Some(position) = order.iter().position(|&cell| cell == index) else {
                continue;
            };
            if position + 1 < order.len() {
                let mut swapped = order.clone();
                swapped.swap(position, position + 1);
                variants.offer(format!("{base_name}_swap{index}_next"), &swapped)?;
            }
            if position > 0 {
                let mut swapped = order.clone();
                swapped.swap(position, position - 1);
                variants.offer(format!("{base_name}_swap{index}_prev"), &swapped)?;
            }
        }

        debug!(
            order = base_name,
            kept = variants.kept.len(),
            dropped = variants.dropped,
            "pairing variants generated"
        );
        for scheme in variants.kept {
            schemes.insert(scheme.name.clone(), scheme);
        }
    }
    Ok(schemes)
}

/// Variants of one base order, deduplicated by canonical pair set.
#[derive(Default)]
struct VariantSet {
    seen: HashSet<Vec<IndexPair>>,
    kept: Vec<PairingScheme>,
    dropped: usize,
}

impl VariantSet {
    fn offer(&mut self, name: String, order: &[usize]) -> Result<()> {
        let scheme = PairingScheme::new(name, pair_consecutive(order))?;
        if self.seen.insert(scheme.canonical()) {
            self.kept.push(scheme);
        } else {
            self.dropped += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::BASE_ORDERS;

    fn schemes() -> BTreeMap<String, PairingScheme> {
        build_pairing_schemes(&AdjustmentTable::tick_corrections()).expect("schemes build")
    }

    #[test]
    fn test_every_scheme_is_a_perfect_partition() {
        for (name, scheme) in &schemes() {
            assert_eq!(scheme.name(), name);
            assert_eq!(scheme.pairs().len(), PAIR_COUNT);
            let mut cells: Vec<usize> = scheme.pairs().iter().flat_map(|&(a, b)| [a, b]).collect();
            cells.sort_unstable();
            assert_eq!(cells, (0..CELL_COUNT).collect::<Vec<_>>(), "scheme {name}");
        }
    }

    #[test]
    fn test_base_schemes_present() {
        let schemes = schemes();
        for def in BASE_ORDERS {
            assert!(schemes.contains_key(def.name), "missing {}", def.name);
        }
        assert_eq!(schemes["row_major"].pairs()[..2], [(0, 1), (2, 3)]);
        assert_eq!(schemes["column_major"].pairs()[0], (0, 8));
    }

    #[test]
    fn test_row_major_variants_deduplicated_by_pair_set() {
        let schemes = schemes();
        let row_major: Vec<&str> = schemes
            .keys()
            .map(String::as_str)
            .filter(|name| name.starts_with("row_major"))
            .collect();
        assert_eq!(
            row_major,
            vec![
                "row_major",
                "row_major_rot1",
                "row_major_swap39_next",
                "row_major_swap52_prev",
            ]
        );
        assert_eq!(schemes["row_major_rot1"].pairs()[31], (63, 0));
        assert!(schemes["row_major_swap39_next"].pairs().contains(&(38, 40)));
        assert!(schemes["row_major_swap52_prev"].pairs().contains(&(51, 53)));
    }

    #[test]
    fn test_variants_unique_within_base_order() {
        let schemes = schemes();
        for def in BASE_ORDERS {
            let mut seen = HashSet::new();
            let derived_from_base = |name: &str| {
                name.strip_prefix(def.name).is_some_and(|rest| {
                    rest.is_empty() || rest.starts_with("_rot") || rest.starts_with("_swap")
                })
            };
            for scheme in schemes.values().filter(|s| derived_from_base(s.name())) {
                assert!(seen.insert(scheme.canonical()), "duplicate pair set {}", scheme.name());
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = schemes();
        let second = schemes();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_table_yields_rotations_only() {
        let schemes = build_pairing_schemes(&AdjustmentTable::new(Vec::new())).expect("build");
        assert!(schemes.keys().all(|name| !name.contains("_swap")));
        assert!(schemes.contains_key("spiral"));
    }

    #[test]
    fn test_scheme_rejects_broken_partitions() {
        let mut pairs = pair_consecutive(&(0..CELL_COUNT).collect::<Vec<_>>());
        pairs[3] = (0, 7);
        let err = PairingScheme::new("broken", pairs).expect_err("repeat");
        assert!(err.to_string().contains("more than once"));

        let pairs = pair_consecutive(&(0..62).collect::<Vec<_>>());
        assert!(PairingScheme::new("short", pairs).is_err());

        let mut pairs = pair_consecutive(&(0..CELL_COUNT).collect::<Vec<_>>());
        pairs[0] = (64, 1);
        let err = PairingScheme::new("outside", pairs).expect_err("outside");
        assert!(err.to_string().contains("outside the grid"));
    }
}
