//! In-memory host doubles for scene tests
//!
//! Enabled for this crate's tests and, through the `test-utils` feature, for
//! downstream crates.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::error::{Result, SceneError};
use crate::gate::{CapabilityProbe, ConnectionHints, DeviceInfo};
use crate::generators::{build_river_scene, Drawable};
use crate::manager::SceneManager;
use crate::mount::{SceneFactory, SceneRequest};
use crate::resources::ResourceTracker;
use crate::surface::{FrameHandle, FrameScheduler, RenderFrame, RenderSurface, SurfaceOptions};

// =============================================================================
// Surface
// =============================================================================

/// Calls observed by a [`RecordingSurface`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceLog {
    /// Last size set
    pub size: Option<(u32, u32)>,
    /// Last pixel ratio set
    pub pixel_ratio: Option<f32>,
    /// Frames rendered
    pub frames: usize,
    /// Dispose calls
    pub disposed: usize,
    /// Drawable labels of the last frame
    pub last_drawables: Vec<String>,
}

/// Surface that records calls; clones share the log
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded calls
    pub fn log(&self) -> SurfaceLog {
        self.log.lock().clone()
    }
}

impl RenderSurface for RecordingSurface {
    fn set_size(&mut self, width: u32, height: u32) {
        self.log.lock().size = Some((width, height));
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.log.lock().pixel_ratio = Some(ratio);
    }

    fn render(&mut self, frame: &RenderFrame<'_>) {
        let labels = frame
            .drawables
            .iter()
            .map(|drawable| match drawable {
                Drawable::Mesh { label, .. } | Drawable::Points { label, .. } => label.to_string(),
            })
            .collect();

        let mut log = self.log.lock();
        log.frames += 1;
        log.last_drawables = labels;
    }

    fn dispose(&mut self) {
        self.log.lock().disposed += 1;
    }
}

// =============================================================================
// Scheduler
// =============================================================================

#[derive(Debug, Default)]
struct SchedulerState {
    next_id: u64,
    active: BTreeSet<FrameHandle>,
    requested: usize,
    cancelled: Vec<FrameHandle>,
}

/// Scheduler driven by the test; clones share state
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<SchedulerState>>,
}

impl ManualScheduler {
    /// Create a scheduler with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and not yet fired or cancelled
    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Total `request_frame` calls
    pub fn requested(&self) -> usize {
        self.state.lock().requested
    }

    /// Handles passed to `cancel_frame`, in order
    pub fn cancelled(&self) -> Vec<FrameHandle> {
        self.state.lock().cancelled.clone()
    }

    /// Fire the oldest pending frame, returning its handle
    pub fn fire_next(&self) -> Option<FrameHandle> {
        let mut state = self.state.lock();
        let handle = state.active.iter().next().copied()?;
        state.active.remove(&handle);
        Some(handle)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        state.requested += 1;
        let handle = FrameHandle(state.next_id);
        state.active.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.lock();
        state.active.remove(&handle);
        state.cancelled.push(handle);
    }
}

// =============================================================================
// Probe
// =============================================================================

/// Probe returning fixed capabilities
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    /// WebGL availability
    pub webgl: bool,
    /// Network hints
    pub connection: ConnectionHints,
    /// Device information
    pub device: DeviceInfo,
}

impl StaticProbe {
    /// WebGL available on a fast connection
    pub fn capable() -> Self {
        Self {
            webgl: true,
            ..Default::default()
        }
    }

    /// No WebGL
    pub fn without_webgl() -> Self {
        Self::default()
    }

    /// WebGL available but data saver enabled
    pub fn save_data() -> Self {
        Self {
            webgl: true,
            connection: ConnectionHints {
                effective_type: Some("4g".to_string()),
                save_data: true,
            },
            ..Default::default()
        }
    }
}

impl CapabilityProbe for StaticProbe {
    fn webgl_available(&self) -> bool {
        self.webgl
    }

    fn connection(&self) -> ConnectionHints {
        self.connection.clone()
    }

    fn device(&self) -> DeviceInfo {
        self.device.clone()
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Handles to one scene built by [`TestSceneFactory`]
#[derive(Debug, Clone)]
pub struct BuiltScene {
    /// The scene's surface
    pub surface: RecordingSurface,
    /// The scene's scheduler
    pub scheduler: ManualScheduler,
}

/// Factory building river scenes on recording doubles
///
/// With [`held`](Self::held), construction waits until
/// [`release`](Self::release) is called, which lets tests unmount while a
/// construction is in flight.
#[derive(Debug, Default)]
pub struct TestSceneFactory {
    tracker: ResourceTracker,
    hold: Option<Arc<Notify>>,
    fail: bool,
    calls: AtomicUsize,
    built: Mutex<Vec<BuiltScene>>,
}

impl TestSceneFactory {
    /// Factory that constructs immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose constructions wait for [`release`](Self::release)
    pub fn held() -> Self {
        Self {
            hold: Some(Arc::new(Notify::new())),
            ..Default::default()
        }
    }

    /// Factory whose constructions fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Let one held construction proceed
    pub fn release(&self) {
        if let Some(hold) = &self.hold {
            hold.notify_one();
        }
    }

    /// Tracker shared by every scene this factory builds
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// `create` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Scenes built so far
    pub fn built(&self) -> Vec<BuiltScene> {
        self.built.lock().clone()
    }
}

#[async_trait]
impl SceneFactory for TestSceneFactory {
    async fn create(&self, request: SceneRequest) -> Result<SceneManager> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        if self.fail {
            return Err(SceneError::Construction("context lost".to_string()));
        }

        let surface = RecordingSurface::new();
        let scheduler = ManualScheduler::new();
        let options = SurfaceOptions::new(1280, 720)
            .with_pixel_ratio_cap(request.quality.pixel_ratio_cap)
            .with_antialias(request.quality.antialias);

        let mut scene = SceneManager::construct(
            Box::new(surface.clone()),
            Box::new(scheduler.clone()),
            options,
            &self.tracker,
        );
        for generator in build_river_scene(&request.colors, &request.quality, &self.tracker) {
            scene.add_generator(generator)?;
        }

        self.built.lock().push(BuiltScene { surface, scheduler });
        Ok(scene)
    }
}
