//! Per-role candidate collections.

use std::collections::HashMap;

use serde::Serialize;

use framelens_frame_model::{ResourceDescriptor, ResourceHandle};

use crate::config::BonusConfig;
use crate::scoring::adjust;

/// A handle competing to be the best answer for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub handle: ResourceHandle,
    pub descriptor: ResourceDescriptor,
    /// Structural score from the latest registration.
    pub base_score: f32,
    /// Base score plus recency and frequency bonuses.
    pub adjusted_score: f32,
    pub first_seen_frame: u64,
    pub last_seen_frame: u64,
    /// Number of frames this handle was observed in (saturating).
    pub seen_count: u32,
}

impl Candidate {
    /// Frames since the candidate was last registered.
    pub fn age(&self, frame: u64) -> u64 {
        frame.saturating_sub(self.last_seen_frame)
    }
}

/// Collection of candidates for one role, keyed by handle.
#[derive(Debug, Default)]
pub struct CandidateStore {
    entries: HashMap<ResourceHandle, Candidate>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, handle: ResourceHandle) -> Option<&Candidate> {
        self.entries.get(&handle)
    }

    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Record an observation, creating the entry on first sight.
    ///
    /// Returns the candidate's new adjusted score.
    pub fn observe(
        &mut self,
        handle: ResourceHandle,
        descriptor: ResourceDescriptor,
        base_score: f32,
        frame: u64,
        bonus: &BonusConfig,
    ) -> f32 {
        let entry = self.entries.entry(handle).or_insert_with(|| Candidate {
            handle,
            descriptor,
            base_score,
            adjusted_score: 0.0,
            first_seen_frame: frame,
            last_seen_frame: frame,
            seen_count: 0,
        });

        entry.descriptor = descriptor;
        entry.base_score = base_score;
        entry.last_seen_frame = frame;
        entry.seen_count = entry.seen_count.saturating_add(1);
        entry.adjusted_score = adjust(base_score, 0, entry.seen_count, bonus);
        entry.adjusted_score
    }

    /// Recompute adjusted scores for the current frame (recency decays).
    pub fn refresh(&mut self, frame: u64, bonus: &BonusConfig) {
        for candidate in self.entries.values_mut() {
            candidate.adjusted_score = adjust(
                candidate.base_score,
                candidate.age(frame),
                candidate.seen_count,
                bonus,
            );
        }
    }

    /// Drop candidates older than `stale_age`; handles in `protected` get
    /// `protected_age` instead. Returns the number removed.
    pub fn evict_stale(
        &mut self,
        frame: u64,
        stale_age: u64,
        protected: &[ResourceHandle],
        protected_age: u64,
    ) -> usize {
        let before = self.entries.len();
        self.entries.retain(|handle, candidate| {
            let limit = if protected.contains(handle) {
                protected_age
            } else {
                stale_age
            };
            candidate.age(frame) <= limit
        });
        before - self.entries.len()
    }

    /// Keep only the `retain` highest-scoring candidates. Returns the number removed.
    pub fn trim_to(&mut self, retain: usize) -> usize {
        if self.entries.len() <= retain {
            return 0;
        }
        let before = self.entries.len();
        let mut ranked: Vec<Candidate> = self.entries.drain().map(|(_, c)| c).collect();
        ranked.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));
        ranked.truncate(retain);
        self.entries = ranked.into_iter().map(|c| (c.handle, c)).collect();
        before - self.entries.len()
    }

    pub fn remove(&mut self, handle: ResourceHandle) -> Option<Candidate> {
        self.entries.remove(&handle)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.values()
    }

    /// The `n` highest adjusted scores, best first.
    pub fn top(&self, n: usize) -> Vec<&Candidate> {
        let mut ranked: Vec<&Candidate> = self.entries.values().collect();
        ranked.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));
        ranked.truncate(n);
        ranked
    }
}
