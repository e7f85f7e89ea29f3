use std::collections::{BTreeSet, HashSet};

use gridkey_address::{KeyDeriver, P2pkhDeriver, encode_hex};
use gridkey_error::{GridKeyError, Result};
use gridkey_search::{
    DEFAULT_TARGET, NullSink, SearchConfig, SearchPlan, StopHandle, run, run_until,
};
use gridkey_types::{AdjustmentMode, CELL_COUNT, CellMeasurement, MeasurementGrid, Selection};
use parking_lot::Mutex;

const RAMP_KEY: &str = "7705090d1115191d2125292d3135393d4145495e5155595d61656f6d7175797d";
const RAMP_COMPRESSED: &str = "178C7qzU4nrYzmwgSpZxTxvBzcoZhkS8CF";
const RAMP_UNCOMPRESSED: &str = "13FPd8Vz45Y976M6gyyXUrq5jZSWWbq81j";

/// `outer[i] = i`, except cell 1 which holds 0x77.
fn ramp_grid() -> MeasurementGrid {
    let cells = (0..CELL_COUNT)
        .map(|i| {
            let outer = if i == 1 { 119.0 } else { i as f64 };
            CellMeasurement::from_areas(i, outer, 0.0)
        })
        .collect();
    MeasurementGrid::new(cells).expect("grid")
}

fn ramp_config(target: &str) -> SearchConfig {
    SearchConfig {
        areas: Selection::parse("outer"),
        pairings: Selection::parse("row_major"),
        pre_modes: vec![AdjustmentMode::None, AdjustmentMode::Add],
        post_modes: vec![AdjustmentMode::None, AdjustmentMode::Add],
        transform_limit: Some(1),
        target: target.to_owned(),
        ..SearchConfig::default()
    }
}

/// Varied areas; row_major cells 0 and 1 sum to 0x77 in `outer`.
fn varied_grid() -> MeasurementGrid {
    let cells = (0..CELL_COUNT)
        .map(|i| {
            let outer = match i {
                0 => 50.0,
                1 => 69.0,
                _ => 10.0 + ((i * 7) % 23) as f64,
            };
            let inner = ((i * i) % 17) as f64 + 0.5;
            CellMeasurement::from_areas(i, outer + inner, inner)
        })
        .collect();
    MeasurementGrid::new(cells).expect("grid")
}

fn varied_config(dedupe: bool, workers: usize) -> SearchConfig {
    SearchConfig {
        areas: Selection::parse("shell,inner,outer_plus_inner"),
        pairings: Selection::parse("row_major,spiral,gray_code"),
        dedupe,
        workers,
        ..SearchConfig::default()
    }
}

/// Matches the default target whenever the key starts with the marker byte,
/// and records every key it is asked about.
#[derive(Default)]
struct RecordingDeriver {
    seen: Mutex<Vec<[u8; 32]>>,
}

impl KeyDeriver for RecordingDeriver {
    fn derive(&self, scalar: &[u8; 32], compressed: bool) -> Result<String> {
        if compressed {
            self.seen.lock().push(*scalar);
        }
        if compressed && scalar[0] == 0x77 {
            Ok(DEFAULT_TARGET.to_owned())
        } else {
            Ok(format!("fake-{}", encode_hex(scalar)))
        }
    }
}

struct RejectingDeriver;

impl KeyDeriver for RejectingDeriver {
    fn derive(&self, _scalar: &[u8; 32], _compressed: bool) -> Result<String> {
        Err(GridKeyError::InvalidScalar)
    }
}

#[test]
fn test_ramp_vector_reproduces_reference_key() {
    let plan = SearchPlan::resolve(&ramp_config(RAMP_COMPRESSED), &ramp_grid()).expect("plan");
    let outcome = run(&plan, &P2pkhDeriver, &NullSink).expect("run");

    // pre=add/post=none and pre=none/post=add build the same key; dedupe keeps one.
    assert_eq!(outcome.matches.len(), 1);
    let found = &outcome.matches[0];
    assert_eq!(found.combo_index, 1);
    assert_eq!(found.pre_tick, AdjustmentMode::None);
    assert_eq!(found.post_tick, AdjustmentMode::Add);
    assert_eq!(found.pairing, "row_major");
    assert_eq!(found.transform, "mod256");
    assert_eq!(found.format, "compressed");
    assert_eq!(found.hex_key, RAMP_KEY);
    assert_eq!(found.address, RAMP_COMPRESSED);

    assert_eq!(outcome.summaries.len(), 4);
    assert!(outcome.summaries.iter().all(|s| s.transforms_processed == 1));
    assert_eq!(outcome.summaries[2].candidates_processed, 0);
    assert_eq!(outcome.totals.matches_found, 1);
    assert_eq!(outcome.totals.combinations_processed, 4);
    assert!(!outcome.stopped_early);
}

#[test]
fn test_ramp_vector_uncompressed_without_dedupe() {
    let config = SearchConfig {
        dedupe: false,
        ..ramp_config(RAMP_UNCOMPRESSED)
    };
    let plan = SearchPlan::resolve(&config, &ramp_grid()).expect("plan");
    let outcome = run(&plan, &P2pkhDeriver, &NullSink).expect("run");

    let indices: Vec<usize> = outcome.matches.iter().map(|m| m.combo_index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert!(outcome.matches.iter().all(|m| m.format == "uncompressed"));
    assert!(outcome.matches.iter().all(|m| m.hex_key == RAMP_KEY));
}

#[test]
fn test_dedupe_never_derives_a_key_twice() {
    let plan = SearchPlan::resolve(&varied_config(true, 1), &varied_grid()).expect("plan");
    let deriver = RecordingDeriver::default();
    let outcome = run(&plan, &deriver, &NullSink).expect("run");

    let seen = deriver.seen.lock();
    let unique: HashSet<[u8; 32]> = seen.iter().copied().collect();
    assert!(!seen.is_empty());
    assert_eq!(unique.len(), seen.len());
    assert_eq!(outcome.totals.total_candidates, seen.len());
}

#[test]
fn test_dedupe_preserves_the_set_of_matching_keys() {
    let matching = |dedupe: bool| {
        let plan =
            SearchPlan::resolve(&varied_config(dedupe, 1), &varied_grid()).expect("plan");
        let outcome = run(&plan, &RecordingDeriver::default(), &NullSink).expect("run");
        let keys: BTreeSet<String> = outcome.matches.into_iter().map(|m| m.hex_key).collect();
        (keys, outcome.totals)
    };
    let (with_dedupe, deduped_totals) = matching(true);
    let (without_dedupe, full_totals) = matching(false);

    assert!(!with_dedupe.is_empty());
    assert_eq!(with_dedupe, without_dedupe);
    assert!(deduped_totals.total_candidates < full_totals.total_candidates);
    assert_eq!(deduped_totals.total_transforms, full_totals.total_transforms);
}

#[test]
fn test_parallel_run_matches_single_worker() {
    let single = SearchPlan::resolve(&varied_config(false, 1), &varied_grid()).expect("plan");
    let parallel = SearchPlan::resolve(&varied_config(false, 4), &varied_grid()).expect("plan");
    assert_eq!(parallel.shards().len(), 4);

    let deriver = RecordingDeriver::default();
    let expected = run(&single, &deriver, &NullSink).expect("single");
    let actual = run(&parallel, &deriver, &NullSink).expect("parallel");

    assert_eq!(actual.summaries, expected.summaries);
    assert_eq!(actual.matches, expected.matches);
    assert_eq!(actual.totals, expected.totals);
}

#[test]
fn test_stop_on_match_ends_single_worker_run() {
    let config = SearchConfig {
        stop_on_match: true,
        ..varied_config(true, 1)
    };
    let plan = SearchPlan::resolve(&config, &varied_grid()).expect("plan");
    let outcome = run(&plan, &RecordingDeriver::default(), &NullSink).expect("run");

    assert!(outcome.stopped_early);
    let last = outcome.summaries.last().expect("at least one combination");
    assert!(last.matches > 0);
    assert!(outcome.summaries[..outcome.summaries.len() - 1]
        .iter()
        .all(|s| s.matches == 0));
    assert!(outcome.totals.combinations_processed < plan.selected().len());
}

#[test]
fn test_stopped_handle_skips_everything() {
    let plan = SearchPlan::resolve(&varied_config(true, 3), &varied_grid()).expect("plan");
    let stop = StopHandle::new();
    stop.stop();
    let outcome = run_until(&plan, &RecordingDeriver::default(), &NullSink, &stop).expect("run");
    assert!(outcome.summaries.is_empty());
    assert!(outcome.stopped_early);
    assert_eq!(outcome.totals.combinations_processed, 0);
    assert_eq!(outcome.totals.end_index, plan.combinations().len());
}

#[test]
fn test_invalid_scalars_count_as_no_match() {
    let plan = SearchPlan::resolve(&varied_config(true, 2), &varied_grid()).expect("plan");
    let outcome = run(&plan, &RejectingDeriver, &NullSink).expect("run");
    assert!(outcome.matches.is_empty());
    assert!(outcome.totals.total_candidates > 0);
    assert_eq!(outcome.totals.combinations_processed, plan.selected().len());
}

#[test]
fn test_transform_limit_caps_every_combination() {
    let config = SearchConfig {
        transform_limit: Some(5),
        end_index: Some(10),
        ..varied_config(true, 1)
    };
    let plan = SearchPlan::resolve(&config, &varied_grid()).expect("plan");
    let outcome = run(&plan, &RecordingDeriver::default(), &NullSink).expect("run");
    assert_eq!(outcome.summaries.len(), 10);
    assert!(outcome.summaries.iter().all(|s| s.transforms_processed <= 5));
    assert!(outcome.summaries.iter().all(|s| s.unique_keys == s.candidates_processed));
}
