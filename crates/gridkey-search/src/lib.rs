//! Search orchestration.
//!
//! A [`SearchPlan`] expands a [`SearchConfig`] into the ordered list of
//! `(area, pre_tick, pairing, post_tick)` combinations. [`run`] walks the
//! selected slice, turns each combination into a 32-value vector, feeds
//! every byte transform of it through the candidate filter and hands the
//! survivors to a [`KeyDeriver`](gridkey_address::KeyDeriver). Records go to
//! a [`RecordSink`] as they are produced.
//!
//! With more than one worker the slice is split into contiguous shards run
//! on scoped threads. Each worker owns its [`SearchState`], so deduplication
//! is per worker.

pub mod config;
pub mod plan;
pub mod record;
pub mod run;
pub mod sink;
pub mod state;

pub use config::{DEFAULT_TARGET, SearchConfig};
pub use plan::{Combination, SearchPlan};
pub use record::{ComboSummary, FinalRecord, MatchRecord, RunSummary};
pub use run::{KEY_LEN, MARKER_BYTE, SearchOutcome, StopHandle, run, run_until};
pub use sink::{JsonlSink, NullSink, RecordSink};
pub use state::SearchState;
