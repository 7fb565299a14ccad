//! Scene lifecycle
//!
//! ```text
//! construct ──► Constructed ──start──► Running ◄──start/stop──► Paused
//!                    │                    │                       │
//!                    └──────────────── dispose ───────────────────┴──► Disposed
//! ```
//!
//! A scene has at most one scheduled frame. The host calls
//! [`SceneManager::on_frame`] with the handle it was given; stale handles
//! (from a frame cancelled by `stop`) are ignored.

use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::camera::Camera;
use crate::clock::{FrameClock, FrameTime};
use crate::error::{Result, SceneError};
use crate::generators::Generator;
use crate::resources::{ResourceKind, ResourceTracker, TrackedResource};
use crate::surface::{FrameHandle, FrameScheduler, RenderFrame, RenderSurface, SurfaceOptions};

/// Lifecycle state of a constructed scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Surface, camera and clock allocated; not yet started
    Constructed,
    /// Frame loop active
    Running,
    /// Frame loop cancelled; can be restarted
    Paused,
    /// Resources released; terminal
    Disposed,
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneState::Constructed => "constructed",
            SceneState::Running => "running",
            SceneState::Paused => "paused",
            SceneState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Callback run each frame before generators update
pub type UpdateCallback = Box<dyn FnMut(FrameTime) + Send>;

/// One live rendering session
pub struct SceneManager {
    state: SceneState,
    surface: Box<dyn RenderSurface>,
    surface_resource: TrackedResource,
    scheduler: Box<dyn FrameScheduler>,
    camera: Camera,
    clock: FrameClock,
    generators: Vec<Box<dyn Generator>>,
    on_update: Option<UpdateCallback>,
    pending_frame: Option<FrameHandle>,
    size: (u32, u32),
    pixel_ratio: f32,
}

impl SceneManager {
    /// Allocate surface settings, camera and clock
    pub fn construct(
        mut surface: Box<dyn RenderSurface>,
        scheduler: Box<dyn FrameScheduler>,
        options: SurfaceOptions,
        tracker: &ResourceTracker,
    ) -> Self {
        let pixel_ratio = options.effective_pixel_ratio();
        surface.set_pixel_ratio(pixel_ratio);
        surface.set_size(options.width, options.height);

        debug!(
            width = options.width,
            height = options.height,
            pixel_ratio,
            "Scene constructed"
        );

        Self {
            state: SceneState::Constructed,
            surface,
            surface_resource: tracker.allocate(ResourceKind::Surface, "surface"),
            scheduler,
            camera: Camera::for_viewport(options.width, options.height),
            clock: FrameClock::new(),
            generators: Vec::new(),
            on_update: None,
            pending_frame: None,
            size: (options.width, options.height),
            pixel_ratio,
        }
    }

    /// Current state
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Surface size in CSS pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Pixel ratio applied to the surface
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Scheduled frame, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Number of generators owned by the scene
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    /// Running seconds excluding pauses
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    /// Add a generator; updated after those already added
    ///
    /// A disposed scene disposes the generator immediately.
    pub fn add_generator(&mut self, mut generator: Box<dyn Generator>) -> Result<()> {
        if self.state == SceneState::Disposed {
            generator.dispose();
            return Err(SceneError::Disposed);
        }
        self.generators.push(generator);
        Ok(())
    }

    /// Set the callback run each frame before generators update
    pub fn set_update_callback<F>(&mut self, callback: F)
    where
        F: FnMut(FrameTime) + Send + 'static,
    {
        if self.state != SceneState::Disposed {
            self.on_update = Some(Box::new(callback));
        }
    }

    /// Begin or resume the frame loop; no-op when running or disposed
    pub fn start(&mut self) {
        match self.state {
            SceneState::Constructed | SceneState::Paused => {
                self.pending_frame = Some(self.scheduler.request_frame());
                self.state = SceneState::Running;
                debug!("Scene started");
            }
            SceneState::Running | SceneState::Disposed => {}
        }
    }

    /// Cancel the scheduled frame; no-op unless running
    pub fn stop(&mut self) {
        if self.state != SceneState::Running {
            return;
        }
        self.cancel_pending();
        self.clock.pause();
        self.state = SceneState::Paused;
        debug!("Scene paused");
    }

    /// Host frame callback
    ///
    /// Returns whether a frame was rendered.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) -> bool {
        if self.state != SceneState::Running || self.pending_frame != Some(handle) {
            return false;
        }
        self.pending_frame = None;

        let time = self.clock.tick(now);
        if let Some(callback) = self.on_update.as_mut() {
            callback(time);
        }
        for generator in self.generators.iter_mut() {
            generator.update(time.delta, time.elapsed);
        }

        let frame = RenderFrame {
            view_projection: self.camera.view_projection(),
            time,
            drawables: self.generators.iter().filter_map(|g| g.drawable()).collect(),
        };
        self.surface.render(&frame);
        drop(frame);

        for generator in self.generators.iter_mut() {
            generator.clear_dirty();
        }

        self.pending_frame = Some(self.scheduler.request_frame());
        true
    }

    /// Resize the surface and camera; run state is unchanged
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == SceneState::Disposed {
            return;
        }
        self.size = (width, height);
        self.camera.set_viewport(width, height);
        self.surface.set_size(width, height);
    }

    /// Stop and release every resource exactly once; later calls do nothing
    pub fn dispose(&mut self) {
        if self.state == SceneState::Disposed {
            return;
        }
        self.cancel_pending();
        for generator in self.generators.iter_mut() {
            generator.dispose();
        }
        self.generators.clear();
        self.on_update = None;
        self.surface.dispose();
        self.surface_resource.release();
        self.state = SceneState::Disposed;
        debug!("Scene disposed");
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }
}

impl fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneManager")
            .field("state", &self.state)
            .field("size", &self.size)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("generators", &self.generators.len())
            .field("pending_frame", &self.pending_frame)
            .finish()
    }
}
