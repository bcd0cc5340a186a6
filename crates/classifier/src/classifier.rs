//! The resource classifier.
//!
//! Turns per-frame buffer registrations into a stable "best" handle per role.
//!
//! # Lifecycle
//!
//! 1. **Register**: score the descriptor per role; anything clearing
//!    `min_role_score` is upserted into that role's [`CandidateStore`].
//! 2. **Promote**: a candidate takes over a role only by beating the current
//!    best's adjusted score by more than `promote_margin`. Equal challengers
//!    never displace the incumbent, so ping-pong buffers do not flicker.
//! 3. **Tick**: once per frame, age everything. Stale candidates are evicted;
//!    best picks get a longer budget so they survive brief invisibility.
//!
//! Repeat registrations of the same handle and descriptor within one frame
//! are skipped via an explicit generation map.

use std::collections::HashMap;

use serde::Serialize;

use framelens_frame_model::{ResourceDescriptor, ResourceHandle, Role};

use crate::config::ClassifierConfig;
use crate::report::{ClassifierReport, ExposureReport, RoleReport};
use crate::scoring::{adjust, is_exposure_candidate, score_for, ScoringContext};
use crate::store::{Candidate, CandidateStore};

/// Number of candidates listed per role in reports.
const REPORT_TOP_N: usize = 8;

/// The current answer for one tracked role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestPick {
    pub handle: ResourceHandle,
    /// Adjusted score as of the last registration or tick.
    pub score: f32,
    pub base_score: f32,
    pub seen_count: u32,
    pub last_seen_frame: u64,
}

/// The current exposure texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExposurePick {
    pub handle: ResourceHandle,
    pub descriptor: ResourceDescriptor,
    pub last_seen_frame: u64,
}

/// What a registration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Not a well-formed 2D texture.
    Rejected,
    /// Already processed in this frame generation.
    Duplicate,
    /// Scored, but below the bar for every role.
    Unqualified,
    /// Tracked for at least one role.
    Tracked {
        roles: Vec<Role>,
        promoted: Vec<Role>,
    },
}

/// Running counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifierStats {
    pub registrations: u64,
    pub duplicates: u64,
    pub rejected: u64,
    pub trims: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, Copy)]
struct Generation {
    frame: u64,
    descriptor: ResourceDescriptor,
}

/// Scores and tracks color, depth, and motion-vector candidates.
#[derive(Debug)]
pub struct ResourceClassifier {
    config: ClassifierConfig,
    frame: u64,
    stores: [CandidateStore; 3],
    best: [Option<BestPick>; 3],
    exposure: Option<ExposurePick>,
    generations: HashMap<ResourceHandle, Generation>,
    expected_viewport: Option<(u32, u32)>,
    stats: ClassifierStats,
}

impl ResourceClassifier {
    /// Create a classifier with the given configuration.
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            frame: 0,
            stores: Default::default(),
            best: [None; 3],
            exposure: None,
            generations: HashMap::new(),
            expected_viewport: None,
            stats: ClassifierStats::default(),
        }
    }

    /// Create a classifier with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ClassifierConfig::default())
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Current frame generation.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Set (or forget) the output viewport used for ratio matching.
    pub fn set_expected_viewport(&mut self, viewport: Option<(u32, u32)>) {
        self.expected_viewport = viewport;
    }

    pub fn expected_viewport(&self) -> Option<(u32, u32)> {
        self.expected_viewport
    }

    /// Register one observation of a buffer for the current frame.
    pub fn register(
        &mut self,
        handle: ResourceHandle,
        descriptor: &ResourceDescriptor,
        hint: Option<Role>,
    ) -> RegisterOutcome {
        if !descriptor.is_well_formed_2d() {
            self.stats.rejected += 1;
            return RegisterOutcome::Rejected;
        }

        let mut changed = false;
        if let Some(generation) = self.generations.get(&handle) {
            if generation.descriptor == *descriptor {
                if generation.frame == self.frame {
                    self.stats.duplicates += 1;
                    return RegisterOutcome::Duplicate;
                }
            } else {
                changed = true;
            }
        }
        self.generations.insert(
            handle,
            Generation {
                frame: self.frame,
                descriptor: *descriptor,
            },
        );
        self.stats.registrations += 1;

        if is_exposure_candidate(descriptor) {
            for role in Role::TRACKED {
                self.disqualify(role, handle, descriptor, changed);
            }
            return if self.offer_exposure(handle, descriptor) {
                RegisterOutcome::Tracked {
                    roles: vec![Role::Exposure],
                    promoted: vec![Role::Exposure],
                }
            } else {
                RegisterOutcome::Unqualified
            };
        }

        let mut roles = Vec::new();
        let mut promoted = Vec::new();

        for role in Role::TRACKED {
            let base = self.base_score(role, descriptor, hint);
            if base < self.config.min_role_score {
                self.disqualify(role, handle, descriptor, changed);
                continue;
            }
            roles.push(role);
            if self.track(role, handle, descriptor, base) {
                promoted.push(role);
            }
        }

        if roles.is_empty() {
            RegisterOutcome::Unqualified
        } else {
            RegisterOutcome::Tracked { roles, promoted }
        }
    }

    /// Advance to the next frame and age every collection.
    pub fn tick(&mut self) {
        self.frame += 1;
        let frame = self.frame;

        let protected: Vec<ResourceHandle> = self.best.iter().flatten().map(|b| b.handle).collect();
        let stale_age = self.config.stale_age_frames;
        let best_age = self.config.best_stale_age();

        for store in &mut self.stores {
            let evicted = store.evict_stale(frame, stale_age, &protected, best_age);
            if evicted > 0 {
                self.stats.evictions += evicted as u64;
                tracing::trace!(evicted, frame, "Evicted stale candidates");
            }
            store.refresh(frame, &self.config.bonus);
        }

        for role in Role::TRACKED {
            self.refresh_best(role);
        }

        if let Some(exposure) = self.exposure {
            if frame.saturating_sub(exposure.last_seen_frame) > self.config.best_retention_frames {
                tracing::debug!(handle = %exposure.handle, "Exposure texture aged out");
                self.exposure = None;
            }
        }

        self.generations
            .retain(|_, g| frame.saturating_sub(g.frame) <= stale_age);
    }

    /// Drop all candidate entries, keeping best picks and exposure.
    pub fn clear(&mut self) {
        for store in &mut self.stores {
            store.clear();
        }
        self.generations.clear();
    }

    /// Drop everything, including best picks. The frame counter keeps running.
    pub fn reset(&mut self) {
        self.clear();
        self.best = [None; 3];
        self.exposure = None;
    }

    /// Best handle for a role.
    pub fn best(&self, role: Role) -> Option<ResourceHandle> {
        match role {
            Role::Exposure => self.exposure.map(|e| e.handle),
            _ => self.best_pick(role).map(|b| b.handle),
        }
    }

    pub fn best_pick(&self, role: Role) -> Option<BestPick> {
        role.tracked_index().and_then(|idx| self.best[idx])
    }

    pub fn exposure(&self) -> Option<ExposurePick> {
        self.exposure
    }

    pub fn candidate_count(&self, role: Role) -> usize {
        role.tracked_index()
            .map(|idx| self.stores[idx].len())
            .unwrap_or(0)
    }

    pub fn candidate(&self, role: Role, handle: ResourceHandle) -> Option<&Candidate> {
        role.tracked_index()
            .and_then(|idx| self.stores[idx].get(handle))
    }

    pub fn stats(&self) -> ClassifierStats {
        self.stats
    }

    /// Human-readable snapshot of every tracked candidate.
    pub fn report(&self) -> ClassifierReport {
        let frame = self.frame;
        let roles = Role::TRACKED
            .iter()
            .map(|&role| {
                let idx = role.tracked_index().unwrap_or_default();
                let store = &self.stores[idx];
                RoleReport {
                    role,
                    candidates: store.len(),
                    best: self.best[idx],
                    best_age: self.best[idx].map(|b| frame.saturating_sub(b.last_seen_frame)),
                    top: store.top(REPORT_TOP_N).into_iter().cloned().collect(),
                }
            })
            .collect();

        ClassifierReport {
            frame,
            expected_viewport: self.expected_viewport,
            roles,
            exposure: self.exposure.map(|e| ExposureReport {
                handle: e.handle,
                width: e.descriptor.width,
                height: e.descriptor.height,
                format: e.descriptor.format,
                age: frame.saturating_sub(e.last_seen_frame),
            }),
            stats: self.stats,
        }
    }

    fn base_score(&self, role: Role, descriptor: &ResourceDescriptor, hint: Option<Role>) -> f32 {
        let ctx = ScoringContext {
            min_dimension: self.config.min_dimension,
            expected_viewport: self.expected_viewport,
            viewport: &self.config.viewport,
        };
        let score = score_for(role, descriptor, &ctx);
        if score > 0.0 && hint == Some(role) {
            score + self.config.role_hint_bonus
        } else {
            score
        }
    }

    /// Upsert a candidate and run promotion. Returns true if it became best.
    fn track(
        &mut self,
        role: Role,
        handle: ResourceHandle,
        descriptor: &ResourceDescriptor,
        base: f32,
    ) -> bool {
        let Some(idx) = role.tracked_index() else {
            return false;
        };
        let frame = self.frame;
        let store = &mut self.stores[idx];
        let adjusted = store.observe(handle, *descriptor, base, frame, &self.config.bonus);
        let seen_count = store.get(handle).map(|c| c.seen_count).unwrap_or(1);

        if store.len() > self.config.hard_cap {
            let removed = store.trim_to(self.config.retain_after_trim);
            self.stats.trims += 1;
            tracing::debug!(role = %role, removed, "Candidate collection trimmed");
        }

        let pick = BestPick {
            handle,
            score: adjusted,
            base_score: base,
            seen_count,
            last_seen_frame: frame,
        };

        match self.best[idx] {
            Some(current) if current.handle == handle => {
                self.best[idx] = Some(pick);
                false
            }
            Some(current) if adjusted <= current.score + self.config.promote_margin => false,
            previous => {
                tracing::debug!(
                    role = %role,
                    handle = %handle,
                    score = adjusted,
                    previous = ?previous.map(|p| p.handle),
                    width = descriptor.width,
                    height = descriptor.height,
                    format = ?descriptor.format,
                    "Best candidate promoted"
                );
                self.best[idx] = Some(pick);
                true
            }
        }
    }

    /// Decay or expire the best pick for a role after a tick.
    fn refresh_best(&mut self, role: Role) {
        let Some(idx) = role.tracked_index() else {
            return;
        };
        let Some(mut pick) = self.best[idx] else {
            return;
        };

        let age = self.frame.saturating_sub(pick.last_seen_frame);
        if age > self.config.best_retention_frames {
            tracing::debug!(role = %role, handle = %pick.handle, age, "Best candidate aged out");
            self.stores[idx].remove(pick.handle);
            self.best[idx] = self.top_pick(idx);
            return;
        }

        pick.score = match self.stores[idx].get(pick.handle) {
            Some(candidate) => candidate.adjusted_score,
            None => adjust(pick.base_score, age, pick.seen_count, &self.config.bonus),
        };

        // Other candidates decay too; the best has to stay the maximum.
        let overtaken = self.top_pick(idx).filter(|top| {
            top.handle != pick.handle && top.score > pick.score + self.config.promote_margin
        });
        match overtaken {
            Some(top) => {
                tracing::debug!(
                    role = %role,
                    handle = %top.handle,
                    score = top.score,
                    previous = %pick.handle,
                    "Best candidate overtaken after decay"
                );
                self.best[idx] = Some(top);
            }
            None => self.best[idx] = Some(pick),
        }
    }

    /// Remove a handle from a role it no longer qualifies for.
    ///
    /// Only applies when the handle now carries a different descriptor; a
    /// best pick that was never re-described keeps its sticky slot.
    fn disqualify(
        &mut self,
        role: Role,
        handle: ResourceHandle,
        descriptor: &ResourceDescriptor,
        changed: bool,
    ) {
        let Some(idx) = role.tracked_index() else {
            return;
        };
        let redescribed = changed
            || self.stores[idx]
                .get(handle)
                .is_some_and(|c| c.descriptor != *descriptor);
        if !redescribed {
            return;
        }

        self.stores[idx].remove(handle);
        if self.best[idx].map(|b| b.handle) == Some(handle) {
            let next = self.top_pick(idx);
            tracing::debug!(
                role = %role,
                handle = %handle,
                next = ?next.map(|p| p.handle),
                "Best candidate no longer qualifies"
            );
            self.best[idx] = next;
        }
    }

    /// Highest-scoring tracked candidate of a role, as a best pick.
    fn top_pick(&self, idx: usize) -> Option<BestPick> {
        self.stores[idx].top(1).first().map(|c| BestPick {
            handle: c.handle,
            score: c.adjusted_score,
            base_score: c.base_score,
            seen_count: c.seen_count,
            last_seen_frame: c.last_seen_frame,
        })
    }

    /// Exposure is a singleton: an equal-or-smaller float texture replaces it,
    /// and a 1x1 always wins.
    fn offer_exposure(&mut self, handle: ResourceHandle, descriptor: &ResourceDescriptor) -> bool {
        let frame = self.frame;
        let replace = match &self.exposure {
            None => true,
            Some(current) if current.handle == handle => true,
            Some(current) => {
                let canonical = descriptor.width == 1 && descriptor.height == 1;
                let same_shape = (descriptor.width == descriptor.height)
                    == (current.descriptor.width == current.descriptor.height);
                canonical
                    || (same_shape && descriptor.pixel_count() <= current.descriptor.pixel_count())
            }
        };

        if replace {
            if self.exposure.map(|e| e.handle) != Some(handle) {
                tracing::debug!(
                    handle = %handle,
                    width = descriptor.width,
                    height = descriptor.height,
                    "Exposure texture selected"
                );
            }
            self.exposure = Some(ExposurePick {
                handle,
                descriptor: *descriptor,
                last_seen_frame: frame,
            });
        }
        replace
    }
}

impl Default for ResourceClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}
