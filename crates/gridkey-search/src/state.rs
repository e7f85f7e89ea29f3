//! Mutable per-worker search state.

use std::collections::HashSet;

use crate::record::MatchRecord;

/// Seen keys and accumulated results of one worker. Created at worker start
/// and consumed when the worker finishes; never shared between threads.
#[derive(Debug, Default)]
pub struct SearchState {
    seen: Option<HashSet<[u8; 32]>>,
    matches: Vec<MatchRecord>,
    transforms: usize,
    candidates: usize,
}

impl SearchState {
    pub fn new(dedupe: bool) -> Self {
        Self {
            seen: dedupe.then(HashSet::new),
            ..Self::default()
        }
    }

    /// False when deduplication is on and the key was already offered.
    pub fn first_sighting(&mut self, key: &[u8; 32]) -> bool {
        self.seen.as_mut().is_none_or(|seen| seen.insert(*key))
    }

    pub fn seen_len(&self) -> usize {
        self.seen.as_ref().map_or(0, HashSet::len)
    }

    pub fn add_counts(&mut self, transforms: usize, candidates: usize) {
        self.transforms += transforms;
        self.candidates += candidates;
    }

    pub fn push_match(&mut self, record: MatchRecord) {
        self.matches.push(record);
    }

    pub fn transforms(&self) -> usize {
        self.transforms
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<MatchRecord> {
        self.matches
    }
}
