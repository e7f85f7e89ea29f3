//! The search loop, single- and multi-worker.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gridkey_address::{AddressFormat, KeyDeriver, encode_hex};
use gridkey_error::{GridKeyError, Result};
use gridkey_transform::TransformSet;
use tracing::{debug, info, trace, warn};

use crate::plan::{Combination, SearchPlan};
use crate::record::{ComboSummary, MatchRecord, RunSummary};
use crate::sink::RecordSink;
use crate::state::SearchState;

/// Candidate keys must contain this byte somewhere.
pub const MARKER_BYTE: u8 = 0x77;

/// Candidate key length in bytes.
pub const KEY_LEN: usize = 32;

/// Cooperative cancellation shared by every worker of a run. Checked
/// between combinations, never inside one.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub matches: Vec<MatchRecord>,
    /// Ordered by `combo_index`.
    pub summaries: Vec<ComboSummary>,
    pub totals: RunSummary,
    /// Some selected combinations were skipped because the run was stopped.
    pub stopped_early: bool,
}

/// Evaluate every selected combination of `plan`.
pub fn run<D, S>(plan: &SearchPlan, deriver: &D, sink: &S) -> Result<SearchOutcome>
where
    D: KeyDeriver + ?Sized,
    S: RecordSink + ?Sized,
{
    run_until(plan, deriver, sink, &StopHandle::new())
}

/// Like [`run`], but cancellable through `stop`.
pub fn run_until<D, S>(
    plan: &SearchPlan,
    deriver: &D,
    sink: &S,
    stop: &StopHandle,
) -> Result<SearchOutcome>
where
    D: KeyDeriver + ?Sized,
    S: RecordSink + ?Sized,
{
    let range = plan.range();
    let shards = plan.shards();
    info!(
        combinations_total = plan.combinations().len(),
        start = range.start,
        end = range.end,
        workers = shards.len(),
        dedupe = plan.dedupe(),
        target = %plan.target(),
        "search started"
    );

    let reports: Vec<Result<WorkerReport>> = if shards.len() == 1 {
        vec![run_shard(plan, 0, range.clone(), deriver, sink, stop)]
    } else {
        std::thread::scope(|scope| {
            let handles: Vec<_> = shards
                .iter()
                .enumerate()
                .map(|(worker, shard)| {
                    let shard = shard.clone();
                    scope.spawn(move || run_shard(plan, worker, shard, deriver, sink, stop))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(GridKeyError::internal("search worker panicked")))
                })
                .collect()
        })
    };

    let mut summaries = Vec::with_capacity(range.len());
    let mut matches = Vec::new();
    let (mut total_transforms, mut total_candidates) = (0, 0);
    for report in reports {
        let report = report?;
        total_transforms += report.transforms;
        total_candidates += report.candidates;
        summaries.extend(report.summaries);
        matches.extend(report.matches);
    }
    summaries.sort_by_key(|summary| summary.combo_index);
    matches.sort_by_key(|record| record.combo_index);

    let totals = RunSummary {
        combinations_total: plan.combinations().len(),
        combinations_processed: summaries.len(),
        start_index: range.start,
        end_index: range.end,
        total_transforms,
        total_candidates,
        matches_found: matches.len(),
    };
    sink.finish(&totals)?;

    let stopped_early = summaries.len() < range.len();
    info!(
        processed = totals.combinations_processed,
        transforms = totals.total_transforms,
        candidates = totals.total_candidates,
        matches = totals.matches_found,
        stopped_early,
        "search finished"
    );
    Ok(SearchOutcome {
        matches,
        summaries,
        totals,
        stopped_early,
    })
}

struct WorkerReport {
    summaries: Vec<ComboSummary>,
    matches: Vec<MatchRecord>,
    transforms: usize,
    candidates: usize,
}

fn run_shard<D, S>(
    plan: &SearchPlan,
    worker: usize,
    shard: Range<usize>,
    deriver: &D,
    sink: &S,
    stop: &StopHandle,
) -> Result<WorkerReport>
where
    D: KeyDeriver + ?Sized,
    S: RecordSink + ?Sized,
{
    let mut state = SearchState::new(plan.dedupe());
    let mut summaries = Vec::with_capacity(shard.len());

    for combination in &plan.combinations()[shard.clone()] {
        if stop.is_stopped() {
            warn!(
                worker,
                next = combination.index,
                remaining = shard.end - combination.index,
                "worker stopping early"
            );
            break;
        }
        let summary = match evaluate(plan, combination, deriver, sink, &mut state) {
            Ok(summary) => summary,
            Err(err) => {
                // Let the other workers wind down too.
                stop.stop();
                return Err(err);
            }
        };
        if summary.matches > 0 && plan.stop_on_match() {
            stop.stop();
        }
        summaries.push(summary);
    }

    debug!(
        worker,
        processed = summaries.len(),
        seen_keys = state.seen_len(),
        "worker finished"
    );
    Ok(WorkerReport {
        summaries,
        transforms: state.transforms(),
        candidates: state.candidates(),
        matches: state.into_matches(),
    })
}

/// Run one combination through transforms, filtering, deduplication and
/// derivation. Writes the combination summary and any matches to `sink`.
fn evaluate<D, S>(
    plan: &SearchPlan,
    combination: &Combination,
    deriver: &D,
    sink: &S,
    state: &mut SearchState,
) -> Result<ComboSummary>
where
    D: KeyDeriver + ?Sized,
    S: RecordSink + ?Sized,
{
    let vector = plan.paired_vector(combination)?;
    let transforms = TransformSet::new(&vector);
    let limit = plan.transform_limit().unwrap_or(usize::MAX);

    let mut summary = ComboSummary::empty(combination);
    let mut combination_keys: HashSet<[u8; KEY_LEN]> = HashSet::new();

    for output in transforms.iter().take(limit) {
        summary.transforms_processed += 1;

        let Ok(key) = <[u8; KEY_LEN]>::try_from(output.bytes.as_slice()) else {
            continue;
        };
        if !key.contains(&MARKER_BYTE) {
            continue;
        }
        if !state.first_sighting(&key) {
            continue;
        }
        if !combination_keys.insert(key) {
            continue;
        }
        summary.candidates_processed += 1;

        let addresses = match deriver.derive_all(&key) {
            Ok(addresses) => addresses,
            Err(err) => {
                trace!(
                    combo_index = combination.index,
                    transform = %output.id,
                    error = %err,
                    "candidate skipped"
                );
                continue;
            }
        };

        for (format, address) in AddressFormat::ALL.into_iter().zip(addresses) {
            if !plan.target().matches(&address) {
                continue;
            }
            let record = MatchRecord {
                combo_index: combination.index,
                area: combination.area.clone(),
                pre_tick: combination.pre_tick,
                post_tick: combination.post_tick,
                pairing: combination.pairing.clone(),
                transform: output.id.to_string(),
                format: format.as_str().to_owned(),
                hex_key: encode_hex(&key),
                address,
            };
            info!(
                combo_index = record.combo_index,
                transform = %record.transform,
                format = %record.format,
                hex_key = %record.hex_key,
                "target address matched"
            );
            sink.matched(&record)?;
            summary.matches += 1;
            state.push_match(record);
        }
    }

    summary.unique_keys = combination_keys.len();
    state.add_counts(summary.transforms_processed, summary.candidates_processed);
    sink.summary(&summary)?;

    debug!(
        combo_index = summary.combo_index,
        area = %summary.area,
        pre = %summary.pre_tick,
        pairing = %summary.pairing,
        post = %summary.post_tick,
        transforms = summary.transforms_processed,
        candidates = summary.candidates_processed,
        matches = summary.matches,
        "combination evaluated"
    );
    Ok(summary)
}
