//! Visibility and capability gate
//!
//! Decides whether the animated background may run. The verdict is
//!
//! ```text
//! intersecting && !reduced_motion && webgl_available && !slow_connection
//! ```
//!
//! Capabilities are probed once per mount. Intersection and motion signals
//! arrive as events; each event yields the [`GateAction`] the mount should
//! apply to its scene.

use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// Capabilities
// =============================================================================

/// Network hints reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionHints {
    /// Effective connection type ("slow-2g", "2g", "3g", "4g")
    pub effective_type: Option<String>,
    /// Data saver enabled
    #[serde(default)]
    pub save_data: bool,
}

impl ConnectionHints {
    /// Slow or metered connections skip the animated scene
    pub fn is_slow(&self) -> bool {
        self.save_data
            || matches!(
                self.effective_type.as_deref().map(str::to_ascii_lowercase).as_deref(),
                Some("slow-2g") | Some("2g")
            )
    }
}

/// Device information reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Logical CPU cores
    pub hardware_concurrency: Option<u32>,
    /// Approximate memory in GiB
    pub device_memory_gb: Option<f32>,
    /// Device pixel ratio
    pub device_pixel_ratio: f32,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            hardware_concurrency: None,
            device_memory_gb: None,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Host capability queries
///
/// Each method is called at most once per [`VisibilityGate`].
pub trait CapabilityProbe: Send + Sync {
    /// Whether a WebGL context can be created
    fn webgl_available(&self) -> bool;

    /// Current network hints
    fn connection(&self) -> ConnectionHints;

    /// Device information
    fn device(&self) -> DeviceInfo;
}

/// Result of probing the host once
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// WebGL context creation succeeded
    pub webgl: bool,
    /// Network hints
    pub connection: ConnectionHints,
    /// Device information
    pub device: DeviceInfo,
}

impl Capabilities {
    /// Query every capability once
    pub fn probe(probe: &dyn CapabilityProbe) -> Self {
        Self {
            webgl: probe.webgl_available(),
            connection: probe.connection(),
            device: probe.device(),
        }
    }

    /// Whether capabilities permit the animated scene
    pub fn supports_animation(&self) -> bool {
        self.webgl && !self.connection.is_slow()
    }
}

// =============================================================================
// Quality
// =============================================================================

/// Rough device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    /// Few cores or little memory
    Low,
    /// Typical laptop or recent phone
    Mid,
    /// Desktop-class hardware
    High,
}

impl DeviceTier {
    /// Classify a device; unknown values count as mid-range
    pub fn classify(device: &DeviceInfo) -> Self {
        let cores = device.hardware_concurrency.unwrap_or(4);
        let memory = device.device_memory_gb.unwrap_or(4.0);

        if cores <= 2 || memory < 2.0 {
            DeviceTier::Low
        } else if cores >= 8 && memory >= 8.0 {
            DeviceTier::High
        } else {
            DeviceTier::Mid
        }
    }

    /// Rendering quality for this tier
    pub fn quality(self) -> QualityProfile {
        match self {
            DeviceTier::Low => QualityProfile {
                tier: self,
                pixel_ratio_cap: 1.0,
                particle_density: 0.35,
                river_segments: 48,
                antialias: false,
            },
            DeviceTier::Mid => QualityProfile {
                tier: self,
                pixel_ratio_cap: 1.5,
                particle_density: 0.7,
                river_segments: 72,
                antialias: true,
            },
            DeviceTier::High => QualityProfile {
                tier: self,
                pixel_ratio_cap: 2.0,
                particle_density: 1.0,
                river_segments: 96,
                antialias: true,
            },
        }
    }
}

/// Rendering settings derived from the device tier
#[derive(Debug, Clone, PartialEq)]
pub struct QualityProfile {
    /// Tier this profile was derived from
    pub tier: DeviceTier,
    /// Upper bound on the drawing buffer pixel ratio
    pub pixel_ratio_cap: f32,
    /// Particle count multiplier (0.0 - 1.0)
    pub particle_density: f32,
    /// River grid cells along x
    pub river_segments: u32,
    /// Request an antialiased context
    pub antialias: bool,
}

impl Default for QualityProfile {
    fn default() -> Self {
        DeviceTier::Mid.quality()
    }
}

// =============================================================================
// Intersection
// =============================================================================

/// Axis-aligned rectangle in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow on every side by `margin`
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }

    fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Default lookahead around the viewport, in CSS pixels
pub const DEFAULT_ROOT_MARGIN: f32 = 200.0;

/// Whether `element` overlaps `viewport` grown by `margin`
///
/// Touching edges do not count; zero-sized elements never intersect.
pub fn intersects_with_margin(element: Rect, viewport: Rect, margin: f32) -> bool {
    if element.width <= 0.0 || element.height <= 0.0 {
        return false;
    }
    let root = viewport.expand(margin);
    element.x < root.right()
        && element.right() > root.x
        && element.y < root.bottom()
        && element.bottom() > root.y
}

// =============================================================================
// Motion
// =============================================================================

/// Reduced-motion inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionPreference {
    /// OS-level preference; `None` while unknown
    pub os_reduced: Option<bool>,
    /// Persisted manual choice; wins over the OS when present
    pub manual_override: Option<bool>,
}

impl MotionPreference {
    /// Effective preference; unknown counts as not reduced
    pub fn reduced(&self) -> bool {
        self.manual_override.or(self.os_reduced).unwrap_or(false)
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Gate configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Lookahead around the viewport in CSS pixels
    pub root_margin: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN,
        }
    }
}

impl GateConfig {
    /// Set the lookahead margin
    pub fn with_root_margin(mut self, margin: f32) -> Self {
        self.root_margin = margin.max(0.0);
        self
    }
}

/// What the mount should do to its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Nothing changes
    None,
    /// Construct and start the scene (first true verdict only)
    Initialize,
    /// Resume the paused scene
    Start,
    /// Pause the running scene
    Stop,
    /// Release the scene
    Dispose,
}

/// What the page shows in the scene's place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Presentation {
    /// The animated scene
    Animated,
    /// The static palette gradient
    StaticGradient,
}

/// Per-mount gate state
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    config: GateConfig,
    capabilities: Capabilities,
    quality: QualityProfile,
    motion: MotionPreference,
    intersecting: Option<bool>,
    initialized: bool,
    running: bool,
    unmounted: bool,
}

impl VisibilityGate {
    /// Create a gate, probing capabilities once
    pub fn new(config: GateConfig, probe: &dyn CapabilityProbe, motion: MotionPreference) -> Self {
        let capabilities = Capabilities::probe(probe);
        let quality = DeviceTier::classify(&capabilities.device).quality();
        debug!(
            webgl = capabilities.webgl,
            slow = capabilities.connection.is_slow(),
            tier = ?quality.tier,
            "Probed scene capabilities"
        );

        Self {
            config,
            capabilities,
            quality,
            motion,
            intersecting: None,
            initialized: false,
            running: false,
            unmounted: false,
        }
    }

    /// Gate configuration
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Capabilities probed at creation
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Quality profile for this device
    pub fn quality(&self) -> &QualityProfile {
        &self.quality
    }

    /// Current motion inputs
    pub fn motion(&self) -> MotionPreference {
        self.motion
    }

    /// Whether initialization has been requested
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the scene should currently be running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current verdict; unknown intersection counts as false
    pub fn verdict(&self) -> bool {
        !self.unmounted
            && self.intersecting.unwrap_or(false)
            && !self.motion.reduced()
            && self.capabilities.supports_animation()
    }

    /// Whether the page should show the animated scene or the gradient
    pub fn presentation(&self) -> Presentation {
        if self.capabilities.supports_animation() && !self.motion.reduced() {
            Presentation::Animated
        } else {
            Presentation::StaticGradient
        }
    }

    /// Intersection changed
    pub fn set_intersecting(&mut self, intersecting: bool) -> GateAction {
        self.intersecting = Some(intersecting);
        self.evaluate()
    }

    /// Element or viewport geometry changed
    pub fn observe_geometry(&mut self, element: Rect, viewport: Rect) -> GateAction {
        let intersecting = intersects_with_margin(element, viewport, self.config.root_margin);
        self.set_intersecting(intersecting)
    }

    /// OS reduced-motion preference changed
    pub fn set_os_reduced_motion(&mut self, reduced: Option<bool>) -> GateAction {
        self.motion.os_reduced = reduced;
        self.evaluate()
    }

    /// Manual reduced-motion override changed
    pub fn set_motion_override(&mut self, reduced: Option<bool>) -> GateAction {
        self.motion.manual_override = reduced;
        self.evaluate()
    }

    /// The mount is going away
    ///
    /// Returns [`GateAction::Dispose`] when a scene was requested, even if
    /// its construction has not finished.
    pub fn unmount(&mut self) -> GateAction {
        if self.unmounted {
            return GateAction::None;
        }
        self.unmounted = true;
        self.running = false;
        if self.initialized {
            GateAction::Dispose
        } else {
            GateAction::None
        }
    }

    fn evaluate(&mut self) -> GateAction {
        if self.unmounted {
            return GateAction::None;
        }

        let verdict = self.verdict();
        let action = match (self.initialized, self.running, verdict) {
            (false, _, true) => {
                self.initialized = true;
                self.running = true;
                GateAction::Initialize
            }
            (true, false, true) => {
                self.running = true;
                GateAction::Start
            }
            (true, true, false) => {
                self.running = false;
                GateAction::Stop
            }
            _ => GateAction::None,
        };

        if action != GateAction::None {
            debug!(?action, verdict, "Scene gate transition");
        }
        action
    }
}
