//! Animated river background for Tideline
//!
//! A procedural scene drawn behind the site: a wave-deformed river surface
//! and three drifting particle streams, colored from the active palette.
//! Rendering is delegated to host-provided seams so the crate stays free of
//! any graphics API.
//!
//! # Modules
//!
//! - [`clock`] - Frame timing with pause-aware elapsed time
//! - [`camera`] - Perspective camera
//! - [`surface`] - Host rendering and frame scheduling seams
//! - [`resources`] - GPU resource accounting
//! - [`generators`] - River mesh and particle streams
//! - [`manager`] - Scene lifecycle
//! - [`gate`] - Visibility and capability gate
//! - [`mount`] - Gate-driven scene ownership
//!
//! # Example
//!
//! ```rust
//! use scene::{GateAction, GateConfig, MotionPreference, VisibilityGate};
//! # use scene::{CapabilityProbe, ConnectionHints, DeviceInfo};
//! # struct Host;
//! # impl CapabilityProbe for Host {
//! #     fn webgl_available(&self) -> bool { true }
//! #     fn connection(&self) -> ConnectionHints { ConnectionHints::default() }
//! #     fn device(&self) -> DeviceInfo { DeviceInfo::default() }
//! # }
//!
//! let mut gate = VisibilityGate::new(GateConfig::default(), &Host, MotionPreference::default());
//!
//! assert_eq!(gate.set_intersecting(true), GateAction::Initialize);
//! assert_eq!(gate.set_intersecting(false), GateAction::Stop);
//! assert_eq!(gate.set_intersecting(true), GateAction::Start);
//! assert_eq!(gate.unmount(), GateAction::Dispose);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod camera;
pub mod clock;
pub mod error;
pub mod gate;
pub mod generators;
pub mod manager;
pub mod mount;
pub mod resources;
pub mod surface;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use camera::Camera;
pub use clock::{FrameClock, FrameTime, MAX_FRAME_DELTA};
pub use error::{Result, SceneError};
pub use gate::{
    intersects_with_margin, Capabilities, CapabilityProbe, ConnectionHints, DeviceInfo, DeviceTier,
    GateAction, GateConfig, MotionPreference, Presentation, QualityProfile, Rect, VisibilityGate,
    DEFAULT_ROOT_MARGIN,
};
pub use generators::{
    build_river_scene, Drawable, Generator, ParticleConfig, ParticleStream, RiverMesh, Vertex,
};
pub use manager::{SceneManager, SceneState, UpdateCallback};
pub use mount::{MountStatus, SceneFactory, SceneMount, SceneRequest};
pub use resources::{ResourceKind, ResourceTracker, TrackedResource};
pub use surface::{FrameHandle, FrameScheduler, RenderFrame, RenderSurface, SurfaceOptions};
