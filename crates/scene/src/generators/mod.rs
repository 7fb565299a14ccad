//! Procedural visual generators
//!
//! Generators own their geometry buffers exclusively. `update` mutates them
//! in place and marks them dirty; the surface uploads dirty buffers when it
//! draws the frame.

pub mod particles;
pub mod river;

use glam::Vec3;
use palette::{ColorSlot, NumericColorMap};

use crate::gate::QualityProfile;
use crate::resources::ResourceTracker;

pub use particles::{ParticleConfig, ParticleStream};
pub use river::{RiverColors, RiverConfig, RiverMesh, RiverUniforms, Wave, RIVER_WGSL};

/// Interleaved mesh vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Linear RGB color
    pub color: [f32; 3],
}

/// Borrowed view of a generator's buffers for one frame
#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    /// Indexed triangle mesh
    Mesh {
        /// Debug label
        label: &'a str,
        /// Vertex buffer
        vertices: &'a [Vertex],
        /// Triangle list indices
        indices: &'a [u32],
        /// Vertex buffer changed since the last upload
        dirty: bool,
    },
    /// Point sprites with per-point alpha
    Points {
        /// Debug label
        label: &'a str,
        /// Point positions
        positions: &'a [Vec3],
        /// Point alpha values
        alphas: &'a [f32],
        /// Shared point color (linear RGB)
        color: [f32; 3],
        /// Point size in world units
        size: f32,
        /// Buffers changed since the last upload
        dirty: bool,
    },
}

/// A visual owned by a scene
pub trait Generator: Send {
    /// Debug name
    fn name(&self) -> &str;

    /// Advance by `delta` seconds; `elapsed` is the scene's running time
    fn update(&mut self, delta: f32, elapsed: f32);

    /// Buffers to draw, or `None` once disposed
    fn drawable(&self) -> Option<Drawable<'_>>;

    /// Called after the surface uploaded this frame's buffers
    fn clear_dirty(&mut self) {}

    /// Release geometry and material; later calls do nothing
    fn dispose(&mut self);

    /// Whether [`dispose`](Self::dispose) has run
    fn is_disposed(&self) -> bool;
}

/// Particles per stream at full density
const BASE_PARTICLES_PER_STREAM: usize = 360;

/// Build the standard background: a river surface and three particle streams
///
/// Colors are read from `colors` once; a palette change needs a new scene.
pub fn build_river_scene(
    colors: &NumericColorMap,
    quality: &QualityProfile,
    tracker: &ResourceTracker,
) -> Vec<Box<dyn Generator>> {
    let mut generators: Vec<Box<dyn Generator>> = Vec::with_capacity(4);

    let river = RiverConfig::default()
        .with_segments(quality.river_segments, quality.river_segments * 2 / 3);
    generators.push(Box::new(RiverMesh::new(river, RiverColors::from_numeric(colors), tracker)));

    let count = ((BASE_PARTICLES_PER_STREAM as f32) * quality.particle_density)
        .round()
        .max(1.0) as usize;
    let streams = [
        (ColorSlot::Stream1, 0.6, 1.0),
        (ColorSlot::Stream2, 1.4, 0.8),
        (ColorSlot::Stream3, 2.2, 0.6),
    ];

    for (i, (slot, height, speed)) in streams.into_iter().enumerate() {
        let config = ParticleConfig::default()
            .with_count(count)
            .with_center(Vec3::new(0.0, height, 0.0))
            .with_speed(speed)
            .with_color(*colors.get(slot))
            .with_seed(i as u64 + 1);
        generators.push(Box::new(ParticleStream::new(slot.key(), config, tracker)));
    }

    tracing::debug!(particles_per_stream = count, "Built river scene");
    generators
}
