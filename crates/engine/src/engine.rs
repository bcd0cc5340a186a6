//! The frame engine.
//!
//! One `FrameEngine` per process, constructed at startup and passed by
//! reference to whatever drives the frame loop. Every subsystem sits behind
//! its own ordered lock. Within the `Resources` level the engine always
//! acquires in the order classifier, camera, locator, jitter, and releases
//! the locator before touching the camera.

use std::sync::atomic::{AtomicU64, Ordering};

use framelens_camera::matrix_score::derive_jitter;
use framelens_camera::{
    CameraCache, CameraCandidate, CameraLocator, JitterEngine, JitterInput, JitterSample,
    MemorySource,
};
use framelens_classifier::{RegisterOutcome, ResourceClassifier};
use framelens_common::{FrameClock, LockLevel, OrderedMutex, OrderedRwLock, RateController};
use framelens_frame_model::{DiscoveryMethod, Mat4, ResourceDescriptor, ResourceHandle, Role};

use crate::config::EngineConfig;
use crate::report::EngineReport;

#[derive(Debug)]
struct Pacing {
    clock: FrameClock,
    summary: RateController,
}

/// Owned context bundling every FrameLens subsystem.
#[derive(Debug)]
pub struct FrameEngine {
    pacing: OrderedMutex<Pacing>,
    classifier: OrderedRwLock<ResourceClassifier>,
    camera: OrderedRwLock<CameraCache>,
    locator: OrderedMutex<CameraLocator>,
    jitter: OrderedMutex<JitterEngine>,
    config: OrderedRwLock<EngineConfig>,
    frame: AtomicU64,
}

impl FrameEngine {
    pub fn new(config: EngineConfig) -> Self {
        tracing::info!(
            hard_cap = config.classifier.hard_cap,
            stale_age = config.classifier.stale_age_frames,
            strides = ?config.camera.scan_strides,
            "Frame engine created"
        );
        Self {
            pacing: OrderedMutex::new(
                LockLevel::Submission,
                Pacing {
                    clock: FrameClock::start(),
                    summary: RateController::every_ms(config.report_interval_ms),
                },
            ),
            classifier: OrderedRwLock::new(
                LockLevel::Resources,
                ResourceClassifier::new(config.classifier.clone()),
            ),
            camera: OrderedRwLock::new(LockLevel::Resources, CameraCache::new(config.camera.clone())),
            locator: OrderedMutex::new(LockLevel::Resources, CameraLocator::new(&config.camera)),
            jitter: OrderedMutex::new(LockLevel::Resources, JitterEngine::new(config.jitter.clone())),
            config: OrderedRwLock::new(LockLevel::Config, config),
            frame: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Current frame index.
    pub fn frame(&self) -> u64 {
        self.frame.load(Ordering::Acquire)
    }

    /// Copy of the configuration the engine was built with.
    pub fn config(&self) -> EngineConfig {
        self.config.read().clone()
    }

    /// A buffer seen during the current frame.
    pub fn register_resource(
        &self,
        handle: ResourceHandle,
        descriptor: &ResourceDescriptor,
        hint: Option<Role>,
    ) -> RegisterOutcome {
        self.classifier.write().register(handle, descriptor, hint)
    }

    /// Look for the camera in a memory snapshot. Returns true if the cache accepted it.
    pub fn submit_memory(&self, region_id: u64, source: &dyn MemorySource) -> bool {
        let located = self.locator.lock().locate(region_id, source);
        match located {
            Some(located) => self.camera.write().update_located(&located, self.frame()),
            None => false,
        }
    }

    /// Evaluate a tagged constant buffer with the camera pair at `offset`.
    pub fn submit_tagged_buffer(&self, blob: &[u8], offset: usize) -> bool {
        let located = self.locator.lock().locate_tagged(blob, offset);
        match located {
            Some(located) => self.camera.write().update_located(&located, self.frame()),
            None => false,
        }
    }

    /// Matrices handed over directly. Jitter defaults to what the projection carries.
    pub fn submit_camera(
        &self,
        view: &Mat4,
        proj: &Mat4,
        jitter: Option<(f32, f32)>,
        method: DiscoveryMethod,
    ) -> bool {
        let (jx, jy) = jitter
            .or_else(|| derive_jitter(proj))
            .unwrap_or((0.0, 0.0));
        self.camera
            .write()
            .update(view, proj, jx, jy, method, self.frame())
    }

    /// Run the jitter engine for this frame.
    ///
    /// Without an explicit projection, the cached camera's projection is used
    /// if it was observed during the current frame.
    pub fn update_jitter(&self, pattern: Option<(f32, f32)>, projection: Option<Mat4>) -> JitterSample {
        let projection = projection.or_else(|| {
            let camera = self.camera.read().snapshot();
            (camera.valid && camera.frame == self.frame()).then_some(camera.proj)
        });
        self.jitter.lock().update(JitterInput {
            pattern,
            projection,
        })
    }

    /// End of a render submission.
    pub fn advance_frame(&self) -> u64 {
        let mut pacing = self.pacing.lock();
        let now_ns = pacing.clock.elapsed_ns();
        pacing.clock.mark_frame_at(now_ns);

        let frame = {
            let mut classifier = self.classifier.write();
            classifier.tick();
            classifier.frame()
        };
        self.frame.store(frame, Ordering::Release);

        if pacing.summary.should_tick(now_ns) {
            self.log_summary(frame, pacing.clock.frames_per_second());
        }
        frame
    }

    /// Output resolution changed: smoothing history and cached camera no longer apply.
    pub fn on_resolution_change(&self, width: u32, height: u32) {
        tracing::info!(width, height, "Resolution changed");
        self.classifier
            .write()
            .set_expected_viewport(Some((width, height)));
        self.camera.write().invalidate();
        self.locator.lock().clear();
        self.jitter.lock().reset();
    }

    /// Reclaim candidate memory, keeping best picks.
    pub fn clear_candidates(&self) {
        self.classifier.write().clear();
    }

    /// Forget everything learned so far (mode switch).
    pub fn reset(&self) {
        tracing::info!("Frame engine reset");
        self.classifier.write().reset();
        self.camera.write().invalidate();
        self.locator.lock().clear();
        self.jitter.lock().reset();
    }

    pub fn get_best(&self, role: Role) -> Option<ResourceHandle> {
        self.classifier.read().best(role)
    }

    pub fn camera_snapshot(&self) -> CameraCandidate {
        self.camera.read().snapshot()
    }

    /// Most recent jitter sample.
    pub fn jitter(&self) -> JitterSample {
        self.jitter.lock().last()
    }

    pub fn report(&self) -> EngineReport {
        let (started_at, fps) = {
            let pacing = self.pacing.lock();
            (pacing.clock.epoch_wall().to_string(), pacing.clock.frames_per_second())
        };
        let classifier = self.classifier.read().report();
        let (camera, camera_stats) = {
            let cache = self.camera.read();
            (cache.snapshot(), cache.stats())
        };
        let locator = self.locator.lock().stats();
        let (jitter, jitter_idle, jitter_outliers) = {
            let engine = self.jitter.lock();
            (engine.last(), engine.is_idle(), engine.outliers())
        };

        EngineReport {
            frame: self.frame(),
            started_at,
            frames_per_second: fps,
            classifier,
            camera,
            camera_stats,
            locator,
            jitter,
            jitter_idle,
            jitter_outliers,
        }
    }

    fn log_summary(&self, frame: u64, fps: Option<f64>) {
        let (color, depth, motion) = {
            let classifier = self.classifier.read();
            (
                classifier.best(Role::Color),
                classifier.best(Role::Depth),
                classifier.best(Role::MotionVectors),
            )
        };
        let camera = self.camera.read().stats();
        let jitter = self.jitter.lock().last();
        tracing::debug!(
            frame,
            fps = fps.unwrap_or(0.0),
            color = ?color,
            depth = ?depth,
            motion_vectors = ?motion,
            camera_score = camera.score,
            camera_updates = camera.updates,
            jitter_valid = jitter.valid,
            "Frame summary"
        );
    }
}

impl Default for FrameEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
