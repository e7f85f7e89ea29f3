//! Resolution of a [`SearchConfig`] into the concrete combination list.

use std::collections::BTreeMap;
use std::ops::Range;

use gridkey_address::TargetAddress;
use gridkey_error::{GridKeyError, Result};
use gridkey_pairing::{PairingScheme, build_pairing_schemes};
use gridkey_types::{AdjustmentMode, AdjustmentTable, AreaSources, MeasurementGrid};
use tracing::debug;

use crate::config::SearchConfig;

/// One point of the search space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    /// Position in the full, unsliced combination list.
    pub index: usize,
    pub area: String,
    pub pre_tick: AdjustmentMode,
    pub pairing: String,
    pub post_tick: AdjustmentMode,
}

/// A validated run: catalogs, combination list and the slice to evaluate.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    sources: AreaSources,
    schemes: BTreeMap<String, PairingScheme>,
    table: AdjustmentTable,
    combinations: Vec<Combination>,
    range: Range<usize>,
    target: TargetAddress,
    transform_limit: Option<usize>,
    dedupe: bool,
    workers: usize,
    stop_on_match: bool,
}

impl SearchPlan {
    /// Validate the configuration against the grid. Every configuration
    /// error surfaces here, before any search work.
    pub fn resolve(config: &SearchConfig, grid: &MeasurementGrid) -> Result<Self> {
        if config.workers == 0 {
            return Err(GridKeyError::InvalidOption(
                "worker count must be at least 1".to_owned(),
            ));
        }
        if config.transform_limit == Some(0) {
            return Err(GridKeyError::InvalidOption(
                "transform limit must be at least 1".to_owned(),
            ));
        }
        let target = TargetAddress::parse(&config.target)?;

        let sources = AreaSources::from_grid(grid);
        let areas = config.areas.resolve("area metric", sources.names())?;

        let schemes = build_pairing_schemes(&config.table)?;
        let pairings = config
            .pairings
            .resolve("pairing scheme", schemes.keys().map(String::as_str))?;
        // Only the selected schemes are carried into the run.
        let schemes: BTreeMap<String, PairingScheme> = schemes
            .into_iter()
            .filter(|(name, _)| pairings.binary_search(name).is_ok())
            .collect();

        let pre_modes = unique_modes(&config.pre_modes);
        let post_modes = unique_modes(&config.post_modes);

        let mut combinations = Vec::with_capacity(
            areas.len() * pre_modes.len() * pairings.len() * post_modes.len(),
        );
        for area in &areas {
            for &pre_tick in &pre_modes {
                for pairing in &pairings {
                    for &post_tick in &post_modes {
                        combinations.push(Combination {
                            index: combinations.len(),
                            area: area.clone(),
                            pre_tick,
                            pairing: pairing.clone(),
                            post_tick,
                        });
                    }
                }
            }
        }
        if combinations.is_empty() {
            return Err(GridKeyError::EmptyCombinationSet);
        }

        let start = config.start_index;
        let end = config
            .end_index
            .map_or(combinations.len(), |end| end.min(combinations.len()));
        if start >= end {
            return Err(GridKeyError::InvalidRange { start, end });
        }

        debug!(
            areas = areas.len(),
            pairings = pairings.len(),
            pre_modes = pre_modes.len(),
            post_modes = post_modes.len(),
            combinations = combinations.len(),
            start,
            end,
            "search plan resolved"
        );

        Ok(Self {
            sources,
            schemes,
            table: config.table.clone(),
            combinations,
            range: start..end,
            target,
            transform_limit: config.transform_limit,
            dedupe: config.dedupe,
            workers: config.workers,
            stop_on_match: config.stop_on_match,
        })
    }

    pub fn sources(&self) -> &AreaSources {
        &self.sources
    }

    /// Selected pairing schemes, by name.
    pub fn schemes(&self) -> &BTreeMap<String, PairingScheme> {
        &self.schemes
    }

    pub fn table(&self) -> &AdjustmentTable {
        &self.table
    }

    /// The full combination list, including entries outside the range.
    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn selected(&self) -> &[Combination] {
        &self.combinations[self.range()]
    }

    pub fn target(&self) -> &TargetAddress {
        &self.target
    }

    pub fn transform_limit(&self) -> Option<usize> {
        self.transform_limit
    }

    pub fn dedupe(&self) -> bool {
        self.dedupe
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn stop_on_match(&self) -> bool {
        self.stop_on_match
    }

    /// Contiguous, non-empty sub-ranges of the selected range, at most one
    /// per worker.
    pub fn shards(&self) -> Vec<Range<usize>> {
        let len = self.range.len();
        let workers = self.workers.clamp(1, len.max(1));
        let chunk = len.div_ceil(workers);
        (0..workers)
            .map(|w| {
                let start = self.range.start + w * chunk;
                start..(start + chunk).min(self.range.end)
            })
            .filter(|shard| !shard.is_empty())
            .collect()
    }

    /// The post-adjusted 32-value vector for one combination.
    pub fn paired_vector(&self, combination: &Combination) -> Result<Vec<f64>> {
        let values = self.sources.get(&combination.area).ok_or_else(|| {
            GridKeyError::internal(format!("area `{}` missing from plan", combination.area))
        })?;
        let scheme = self.schemes.get(&combination.pairing).ok_or_else(|| {
            GridKeyError::internal(format!(
                "pairing `{}` missing from plan",
                combination.pairing
            ))
        })?;
        let adjusted = gridkey_types::apply_pre(values, &self.table, combination.pre_tick);
        let paired = gridkey_types::combine_pairs(&adjusted, scheme.pairs());
        Ok(gridkey_types::apply_post(
            &paired,
            scheme.pairs(),
            &self.table,
            combination.post_tick,
        ))
    }
}

fn unique_modes(modes: &[AdjustmentMode]) -> Vec<AdjustmentMode> {
    let mut unique = Vec::with_capacity(modes.len());
    for &mode in modes {
        if !unique.contains(&mode) {
            unique.push(mode);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkey_types::{CELL_COUNT, CellMeasurement, Selection};

    fn grid() -> MeasurementGrid {
        let cells = (0..CELL_COUNT)
            .map(|i| CellMeasurement::from_areas(i, 100.0 + i as f64, 40.0))
            .collect();
        MeasurementGrid::new(cells).expect("grid")
    }

    fn narrow_config() -> SearchConfig {
        SearchConfig {
            areas: Selection::parse("outer,inner"),
            pairings: Selection::parse("row_major,spiral"),
            pre_modes: vec![AdjustmentMode::None, AdjustmentMode::Add],
            post_modes: vec![AdjustmentMode::Multiply],
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_combination_order_is_area_pre_pairing_post() {
        let plan = SearchPlan::resolve(&narrow_config(), &grid()).expect("plan");
        let labels: Vec<String> = plan
            .combinations()
            .iter()
            .map(|c| format!("{}/{}/{}/{}", c.area, c.pre_tick, c.pairing, c.post_tick))
            .collect();
        assert_eq!(
            labels,
            vec![
                "inner/none/row_major/multiply",
                "inner/none/spiral/multiply",
                "inner/add/row_major/multiply",
                "inner/add/spiral/multiply",
                "outer/none/row_major/multiply",
                "outer/none/spiral/multiply",
                "outer/add/row_major/multiply",
                "outer/add/spiral/multiply",
            ]
        );
        assert!(plan.combinations().iter().enumerate().all(|(i, c)| c.index == i));
        assert_eq!(plan.range(), 0..8);
        assert_eq!(plan.schemes().len(), 2);
    }

    #[test]
    fn test_end_index_is_clamped() {
        let config = SearchConfig {
            start_index: 3,
            end_index: Some(1_000),
            ..narrow_config()
        };
        let plan = SearchPlan::resolve(&config, &grid()).expect("plan");
        assert_eq!(plan.range(), 3..8);
        assert_eq!(plan.selected().len(), 5);
        assert_eq!(plan.selected()[0].index, 3);
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        let grid = grid();
        let cases = [
            SearchConfig {
                areas: Selection::parse("outer,nonsense"),
                ..narrow_config()
            },
            SearchConfig {
                pairings: Selection::parse("zigzag"),
                ..narrow_config()
            },
            SearchConfig {
                post_modes: Vec::new(),
                ..narrow_config()
            },
            SearchConfig {
                start_index: 8,
                ..narrow_config()
            },
            SearchConfig {
                start_index: 2,
                end_index: Some(2),
                ..narrow_config()
            },
            SearchConfig {
                workers: 0,
                ..narrow_config()
            },
            SearchConfig {
                target: "not-an-address".to_owned(),
                ..narrow_config()
            },
        ];
        for config in &cases {
            let err = SearchPlan::resolve(config, &grid).expect_err("must fail");
            assert!(err.is_configuration(), "{err}");
        }

        let err = SearchPlan::resolve(&cases[0], &grid).expect_err("unknown");
        assert!(err.to_string().contains("nonsense"));
        assert!(matches!(
            SearchPlan::resolve(&cases[2], &grid),
            Err(GridKeyError::EmptyCombinationSet)
        ));
        assert!(matches!(
            SearchPlan::resolve(&cases[3], &grid),
            Err(GridKeyError::InvalidRange { start: 8, end: 8 })
        ));
    }

    #[test]
    fn test_repeated_modes_collapse() {
        let config = SearchConfig {
            pre_modes: vec![AdjustmentMode::Add, AdjustmentMode::None, AdjustmentMode::Add],
            ..narrow_config()
        };
        let plan = SearchPlan::resolve(&config, &grid()).expect("plan");
        assert_eq!(plan.combinations().len(), 8);
        assert_eq!(plan.combinations()[0].pre_tick, AdjustmentMode::Add);
    }

    #[test]
    fn test_shards_cover_range_contiguously() {
        for workers in 1..=10 {
            let config = SearchConfig {
                start_index: 1,
                workers,
                ..narrow_config()
            };
            let plan = SearchPlan::resolve(&config, &grid()).expect("plan");
            let shards = plan.shards();
            assert!(shards.len() <= workers);
            assert!(shards.iter().all(|shard| !shard.is_empty()));
            let flattened: Vec<usize> = shards.into_iter().flatten().collect();
            assert_eq!(flattened, (1..8).collect::<Vec<_>>(), "workers {workers}");
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_shards_partition_any_range(
            start in 0usize..8,
            span in 1usize..8,
            workers in 1usize..16,
        ) {
            let end = (start + span).min(8);
            proptest::prop_assume!(start < end);
            let config = SearchConfig {
                start_index: start,
                end_index: Some(end),
                workers,
                ..narrow_config()
            };
            let plan = SearchPlan::resolve(&config, &grid()).expect("plan");
            let shards = plan.shards();
            proptest::prop_assert!(shards.len() <= workers.min(end - start));
            let flattened: Vec<usize> = shards.into_iter().flatten().collect();
            proptest::prop_assert_eq!(flattened, (start..end).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_paired_vector_has_one_value_per_pair() {
        let plan = SearchPlan::resolve(&narrow_config(), &grid()).expect("plan");
        let combination = &plan.combinations()[4];
        let vector = plan.paired_vector(combination).expect("vector");
        assert_eq!(vector.len(), 32);
        // outer, none, row_major, multiply: (38,39) pair scaled by 17.
        assert_eq!(vector[0], 201.0);
        assert_eq!(vector[19], (138.0 + 139.0) * 17.0);
    }
}
