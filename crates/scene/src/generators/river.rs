//! River surface mesh
//!
//! A plane grid in the XZ plane displaced by a sum of travelling waves. Each
//! vertex is colored by blending two base colors on elevation and depth, with
//! a highlight band sweeping across the surface.
//!
//! Displacement and color are evaluated on the CPU each frame so the result
//! is identical on every backend. [`RIVER_WGSL`] evaluates the same field on
//! the GPU from [`RiverUniforms`] for surfaces that prefer it.

use glam::{Mat4, Vec2, Vec3};
use palette::color::int_to_unit_rgb;
use palette::{ColorSlot, NumericColorMap};

use super::{Drawable, Generator, Vertex};
use crate::resources::{ResourceKind, ResourceTracker, TrackedResource};

/// Waves carried to the GPU
pub const MAX_WAVES: usize = 4;

/// One travelling wave: `amplitude * sin(fx*x + t*speed + phase) * cos(fz*z + t*speed/2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    /// Peak displacement
    pub amplitude: f32,
    /// Spatial frequency along x and z
    pub frequency: Vec2,
    /// Temporal speed in radians per second
    pub speed: f32,
    /// Phase offset in radians
    pub phase: f32,
}

impl Wave {
    /// Create a wave
    pub const fn new(amplitude: f32, frequency: Vec2, speed: f32, phase: f32) -> Self {
        Self {
            amplitude,
            frequency,
            speed,
            phase,
        }
    }

    fn height(&self, x: f32, z: f32, t: f32) -> f32 {
        self.amplitude
            * (self.frequency.x * x + t * self.speed + self.phase).sin()
            * (self.frequency.y * z + t * self.speed * 0.5).cos()
    }
}

/// River mesh configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RiverConfig {
    /// Extent along x
    pub width: f32,
    /// Extent along z
    pub depth: f32,
    /// Grid cells along x
    pub segments_x: u32,
    /// Grid cells along z
    pub segments_z: u32,
    /// Waves summed for displacement (at most [`MAX_WAVES`] are used)
    pub waves: Vec<Wave>,
    /// Highlight sweeps per second, in UV units
    pub highlight_speed: f32,
    /// Highlight half-width in UV units
    pub highlight_width: f32,
    /// Highlight blend strength (0.0 - 1.0)
    pub highlight_strength: f32,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            depth: 20.0,
            segments_x: 96,
            segments_z: 64,
            waves: vec![
                Wave::new(0.35, Vec2::new(0.30, 0.20), 0.8, 0.0),
                Wave::new(0.18, Vec2::new(0.70, 0.45), 1.3, 1.7),
                Wave::new(0.08, Vec2::new(1.60, 1.10), 2.1, 4.2),
            ],
            highlight_speed: 0.08,
            highlight_width: 0.12,
            highlight_strength: 0.6,
        }
    }
}

impl RiverConfig {
    /// Set grid resolution (each at least 1)
    pub fn with_segments(mut self, segments_x: u32, segments_z: u32) -> Self {
        self.segments_x = segments_x.max(1);
        self.segments_z = segments_z.max(1);
        self
    }

    /// Set plane size
    pub fn with_size(mut self, width: f32, depth: f32) -> Self {
        self.width = width;
        self.depth = depth;
        self
    }

    /// Replace the wave set
    pub fn with_waves(mut self, waves: Vec<Wave>) -> Self {
        self.waves = waves;
        self
    }

    fn active_waves(&self) -> &[Wave] {
        &self.waves[..self.waves.len().min(MAX_WAVES)]
    }
}

/// The three palette colors a river uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiverColors {
    /// Color of troughs and the near bank
    pub low: u32,
    /// Color of crests and the far bank
    pub high: u32,
    /// Highlight band tint
    pub highlight: u32,
}

impl RiverColors {
    /// Background, first stream and accent colors of a palette
    pub fn from_numeric(colors: &NumericColorMap) -> Self {
        Self {
            low: *colors.get(ColorSlot::Background),
            high: *colors.get(ColorSlot::Stream1),
            highlight: *colors.get(ColorSlot::Accent),
        }
    }
}

/// Uniform block matching `RiverUniforms` in [`RIVER_WGSL`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiverUniforms {
    /// Camera projection * view
    pub view_proj: [[f32; 4]; 4],
    /// Low color (rgb, w unused)
    pub color_low: [f32; 4],
    /// High color
    pub color_high: [f32; 4],
    /// Highlight color
    pub color_highlight: [f32; 4],
    /// Elapsed seconds, highlight speed, highlight width, highlight strength
    pub params: [f32; 4],
    /// Per wave: amplitude, frequency x, frequency z, speed
    pub waves: [[f32; 4]; MAX_WAVES],
    /// Per wave phase
    pub phases: [f32; MAX_WAVES],
    /// Sum of wave amplitudes, plane depth, wave count, unused
    pub extent: [f32; 4],
}

/// Vertex and fragment shader for the river surface
pub const RIVER_WGSL: &str = r#"
struct RiverUniforms {
    view_proj: mat4x4<f32>,
    color_low: vec4<f32>,
    color_high: vec4<f32>,
    color_highlight: vec4<f32>,
    params: vec4<f32>,
    waves: array<vec4<f32>, 4>,
    phases: vec4<f32>,
    extent: vec4<f32>,
};

@group(0) @binding(0) var<uniform> u: RiverUniforms;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) height: f32,
};

@vertex
fn vs_main(in: VertexIn) -> VertexOut {
    let t = u.params.x;
    var h = 0.0;
    for (var i = 0u; i < u32(u.extent.z); i = i + 1u) {
        let w = u.waves[i];
        let along = sin(w.y * in.position.x + t * w.w + u.phases[i]);
        let across = cos(w.z * in.position.z + t * w.w * 0.5);
        h = h + w.x * along * across;
    }
    var out: VertexOut;
    out.clip = u.view_proj * vec4<f32>(in.position.x, h, in.position.z, 1.0);
    out.uv = in.uv;
    out.height = h;
    return out;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let elevation = clamp(in.height / max(u.extent.x, 0.0001) * 0.5 + 0.5, 0.0, 1.0);
    let blend = clamp(0.6 * elevation + 0.4 * in.uv.y, 0.0, 1.0);
    var color = mix(u.color_low.rgb, u.color_high.rgb, blend);
    let center = fract(u.params.x * u.params.y);
    var d = abs(in.uv.x - center);
    d = min(d, 1.0 - d);
    let band = 1.0 - smoothstep(0.0, u.params.z, d);
    color = mix(color, u.color_highlight.rgb, band * u.params.w);
    return vec4<f32>(color, 1.0);
}
"#;

/// Animated river surface
pub struct RiverMesh {
    config: RiverConfig,
    colors: RiverColors,
    low: Vec3,
    high: Vec3,
    highlight: Vec3,
    max_amplitude: f32,
    uvs: Vec<Vec2>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    geometry: TrackedResource,
    material: TrackedResource,
    dirty: bool,
    disposed: bool,
}

impl RiverMesh {
    /// Build the grid and evaluate it at time zero
    pub fn new(config: RiverConfig, colors: RiverColors, tracker: &ResourceTracker) -> Self {
        let (sx, sz) = (config.segments_x.max(1), config.segments_z.max(1));
        let vertex_count = ((sx + 1) * (sz + 1)) as usize;

        let mut uvs = Vec::with_capacity(vertex_count);
        for iz in 0..=sz {
            for ix in 0..=sx {
                uvs.push(Vec2::new(ix as f32 / sx as f32, iz as f32 / sz as f32));
            }
        }

        let mut indices = Vec::with_capacity((sx * sz * 6) as usize);
        let row = sx + 1;
        for iz in 0..sz {
            for ix in 0..sx {
                let a = iz * row + ix;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        let max_amplitude = config.active_waves().iter().map(|w| w.amplitude.abs()).sum();

        let mut mesh = Self {
            low: Vec3::from_array(int_to_unit_rgb(colors.low)),
            high: Vec3::from_array(int_to_unit_rgb(colors.high)),
            highlight: Vec3::from_array(int_to_unit_rgb(colors.highlight)),
            config,
            colors,
            max_amplitude,
            uvs,
            vertices: vec![Vertex::default(); vertex_count],
            indices,
            geometry: tracker.allocate(ResourceKind::Geometry, "river"),
            material: tracker.allocate(ResourceKind::Material, "river"),
            dirty: true,
            disposed: false,
        };
        mesh.evaluate(0.0);
        mesh
    }

    /// Colors captured at construction
    pub fn colors(&self) -> RiverColors {
        self.colors
    }

    /// Mesh configuration
    pub fn config(&self) -> &RiverConfig {
        &self.config
    }

    /// Current vertex buffer
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Per-vertex grid UVs, the second vertex attribute of [`RIVER_WGSL`]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Displacement at a world-space point
    pub fn height_at(&self, x: f32, z: f32, elapsed: f32) -> f32 {
        self.config.active_waves().iter().map(|w| w.height(x, z, elapsed)).sum()
    }

    /// Highlight band weight (0.0 - 1.0) at horizontal UV `u`
    pub fn highlight_at(&self, u: f32, elapsed: f32) -> f32 {
        let center = (elapsed * self.config.highlight_speed).rem_euclid(1.0);
        let mut d = (u - center).abs();
        d = d.min(1.0 - d);
        1.0 - smoothstep(0.0, self.config.highlight_width, d)
    }

    /// Uniforms for the GPU path
    pub fn uniforms(&self, view_proj: Mat4, elapsed: f32) -> RiverUniforms {
        let waves = self.config.active_waves();
        let mut packed = [[0.0; 4]; MAX_WAVES];
        let mut phases = [0.0; MAX_WAVES];
        for (i, w) in waves.iter().enumerate() {
            packed[i] = [w.amplitude, w.frequency.x, w.frequency.y, w.speed];
            phases[i] = w.phase;
        }

        RiverUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            color_low: self.low.extend(1.0).to_array(),
            color_high: self.high.extend(1.0).to_array(),
            color_highlight: self.highlight.extend(1.0).to_array(),
            params: [
                elapsed,
                self.config.highlight_speed,
                self.config.highlight_width,
                self.config.highlight_strength,
            ],
            waves: packed,
            phases,
            extent: [self.max_amplitude, self.config.depth, waves.len() as f32, 0.0],
        }
    }

    fn evaluate(&mut self, elapsed: f32) {
        let half_w = self.config.width * 0.5;
        let half_d = self.config.depth * 0.5;
        let inv_amp = if self.max_amplitude > 0.0 { 1.0 / self.max_amplitude } else { 0.0 };

        for i in 0..self.vertices.len() {
            let uv = self.uvs[i];
            let x = uv.x * self.config.width - half_w;
            let z = uv.y * self.config.depth - half_d;
            let h = self.height_at(x, z, elapsed);

            let elevation = (h * inv_amp * 0.5 + 0.5).clamp(0.0, 1.0);
            let blend = (0.6 * elevation + 0.4 * uv.y).clamp(0.0, 1.0);
            let base = self.low.lerp(self.high, blend);
            let band = self.highlight_at(uv.x, elapsed) * self.config.highlight_strength;
            let color = base.lerp(self.highlight, band).clamp(Vec3::ZERO, Vec3::ONE);

            self.vertices[i] = Vertex {
                position: [x, h, z],
                color: color.to_array(),
            };
        }
        self.dirty = true;
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl Generator for RiverMesh {
    fn name(&self) -> &str {
        "river"
    }

    fn update(&mut self, _delta: f32, elapsed: f32) {
        if self.disposed {
            return;
        }
        self.evaluate(elapsed);
    }

    fn drawable(&self) -> Option<Drawable<'_>> {
        if self.disposed {
            return None;
        }
        Some(Drawable::Mesh {
            label: "river",
            vertices: &self.vertices,
            indices: &self.indices,
            dirty: self.dirty,
        })
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.geometry.release();
        self.material.release();
        self.vertices = Vec::new();
        self.indices = Vec::new();
        self.uvs = Vec::new();
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> RiverColors {
        RiverColors {
            low: 0x000000,
            high: 0xFFFFFF,
            highlight: 0xFF0000,
        }
    }

    fn small_mesh(tracker: &ResourceTracker) -> RiverMesh {
        RiverMesh::new(RiverConfig::default().with_segments(8, 4), colors(), tracker)
    }

    #[test]
    fn test_grid_dimensions() {
        let tracker = ResourceTracker::new();
        let mesh = small_mesh(&tracker);
        assert_eq!(mesh.vertices().len(), 9 * 5);
        assert_eq!(mesh.indices().len(), 8 * 4 * 6);
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertices().len()));
    }

    #[test]
    fn test_colors_from_numeric_map() {
        let registry = palette::builtin_registry();
        let ctx = registry.context_for("synthwave");
        let colors = RiverColors::from_numeric(ctx.numeric());
        assert_eq!(colors.low, 0x1A1033);
        assert_eq!(colors.high, 0x784BA0);
        assert_eq!(colors.highlight, 0xFF3CAC);
    }

    #[test]
    fn test_displacement_bounded_by_amplitude_sum() {
        let tracker = ResourceTracker::new();
        let mut mesh = small_mesh(&tracker);
        let bound: f32 = mesh.config().waves.iter().map(|w| w.amplitude).sum();

        for step in 0..50 {
            mesh.update(0.016, step as f32 * 0.37);
            for v in mesh.vertices() {
                assert!(v.position[1].abs() <= bound + 1e-4);
            }
        }
    }

    #[test]
    fn test_surface_moves_over_time() {
        let tracker = ResourceTracker::new();
        let mut mesh = small_mesh(&tracker);
        let before: Vec<f32> = mesh.vertices().iter().map(|v| v.position[1]).collect();
        mesh.update(0.5, 0.5);
        let after: Vec<f32> = mesh.vertices().iter().map(|v| v.position[1]).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_vertex_colors_stay_in_palette_range() {
        let tracker = ResourceTracker::new();
        let mut mesh = small_mesh(&tracker);
        mesh.update(0.016, 3.0);
        for v in mesh.vertices() {
            for c in v.color {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_highlight_band_moves() {
        let tracker = ResourceTracker::new();
        let mesh = small_mesh(&tracker);
        let speed = mesh.config().highlight_speed;

        assert!((mesh.highlight_at(0.0, 0.0) - 1.0).abs() < 1e-6);
        assert_eq!(mesh.highlight_at(0.5, 0.0), 0.0);
        let t = 0.5 / speed;
        assert!((mesh.highlight_at(0.5, t) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_update_marks_dirty() {
        let tracker = ResourceTracker::new();
        let mut mesh = small_mesh(&tracker);
        mesh.clear_dirty();
        assert!(matches!(mesh.drawable(), Some(Drawable::Mesh { dirty: false, .. })));
        mesh.update(0.016, 0.016);
        assert!(matches!(mesh.drawable(), Some(Drawable::Mesh { dirty: true, .. })));
    }

    #[test]
    fn test_dispose_releases_once() {
        let tracker = ResourceTracker::new();
        let mut mesh = small_mesh(&tracker);

        mesh.dispose();
        mesh.dispose();
        mesh.update(0.016, 1.0);

        assert!(mesh.is_disposed());
        assert!(mesh.drawable().is_none());
        assert_eq!(tracker.released(ResourceKind::Geometry), 1);
        assert_eq!(tracker.released(ResourceKind::Material), 1);
    }

    #[test]
    fn test_uniforms_match_mesh() {
        let tracker = ResourceTracker::new();
        let mesh = small_mesh(&tracker);
        let u = mesh.uniforms(Mat4::IDENTITY, 2.0);

        assert_eq!(u.color_high, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.color_highlight, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(u.params[0], 2.0);
        assert_eq!(u.extent[2], 3.0);
        assert_eq!(u.waves[3], [0.0; 4]);
        assert!(RIVER_WGSL.contains("struct RiverUniforms"));
        assert!(RIVER_WGSL.contains("phases: vec4<f32>"));
    }
}
