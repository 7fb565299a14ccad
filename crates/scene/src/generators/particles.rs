//! Particle streams drifting over the river
//!
//! A stream owns fixed-size position, velocity and alpha buffers. Particles
//! that leave the bounding volume are moved back to the upstream spawn slab
//! in the same update, so no particle is ever drawn outside the volume.

use glam::Vec3;
use palette::color::int_to_unit_rgb;

use super::{Drawable, Generator};
use crate::resources::{ResourceKind, ResourceTracker, TrackedResource};

/// Particle stream configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    /// Number of particles (fixed for the stream's lifetime)
    pub count: usize,
    /// Center of the bounding volume
    pub center: Vec3,
    /// Half extents of the bounding volume
    pub spread: Vec3,
    /// Mean velocity in units per second
    pub velocity: Vec3,
    /// Random per-axis velocity variation
    pub velocity_jitter: Vec3,
    /// Velocity multiplier
    pub speed: f32,
    /// Fraction of the x extent used as the spawn slab (0.0 - 1.0)
    pub spawn_depth: f32,
    /// Mean alpha
    pub base_alpha: f32,
    /// Alpha oscillation amplitude
    pub pulse_amplitude: f32,
    /// Alpha oscillation speed in radians per second
    pub pulse_speed: f32,
    /// Point size in world units
    pub size: f32,
    /// 24-bit particle color
    pub color: u32,
    /// RNG seed (0 is replaced with a fixed non-zero seed)
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 360,
            center: Vec3::new(0.0, 1.0, 0.0),
            spread: Vec3::new(15.0, 1.5, 9.0),
            velocity: Vec3::new(1.2, 0.0, 0.0),
            velocity_jitter: Vec3::new(0.4, 0.08, 0.15),
            speed: 1.0,
            spawn_depth: 0.1,
            base_alpha: 0.55,
            pulse_amplitude: 0.35,
            pulse_speed: 2.2,
            size: 0.06,
            color: 0xFFFFFF,
            seed: 1,
        }
    }
}

impl ParticleConfig {
    /// Set the particle count
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set the volume center
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    /// Set the volume half extents
    pub fn with_spread(mut self, spread: Vec3) -> Self {
        self.spread = spread.abs();
        self
    }

    /// Set the mean velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the velocity multiplier
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the particle color
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Lower corner of the bounding volume
    pub fn min_bound(&self) -> Vec3 {
        self.center - self.spread
    }

    /// Upper corner of the bounding volume
    pub fn max_bound(&self) -> Vec3 {
        self.center + self.spread
    }

    /// Whether `p` lies inside the bounding volume
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min_bound()).all() && p.cmple(self.max_bound()).all()
    }
}

/// xorshift64 generator
#[derive(Debug, Clone)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        // Seed 0 is a fixed point of xorshift
        Self { state: if seed == 0 { 0x5DEECE66D } else { seed } }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in [0, 1)
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in [-1, 1)
    fn next_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }
}

/// A stream of drifting, pulsing particles
pub struct ParticleStream {
    name: String,
    config: ParticleConfig,
    color: [f32; 3],
    rng: Rng,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    alphas: Vec<f32>,
    phases: Vec<f32>,
    recycled: u64,
    geometry: TrackedResource,
    material: TrackedResource,
    dirty: bool,
    disposed: bool,
}

impl ParticleStream {
    /// Fill the volume with `config.count` particles
    pub fn new(name: impl Into<String>, config: ParticleConfig, tracker: &ResourceTracker) -> Self {
        let name = name.into();
        let mut rng = Rng::new(config.seed);
        let count = config.count;

        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        let mut phases = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(random_in_volume(&mut rng, &config));
            velocities.push(random_velocity(&mut rng, &config));
            phases.push(rng.next_f32() * std::f32::consts::TAU);
        }

        let alphas = phases
            .iter()
            .map(|&phase| pulse_alpha(&config, 0.0, phase))
            .collect();

        Self {
            color: int_to_unit_rgb(config.color),
            geometry: tracker.allocate(ResourceKind::Geometry, name.clone()),
            material: tracker.allocate(ResourceKind::Material, name.clone()),
            name,
            config,
            rng,
            positions,
            velocities,
            alphas,
            phases,
            recycled: 0,
            dirty: true,
            disposed: false,
        }
    }

    /// Stream configuration
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Current particle positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Current particle velocities (before the speed multiplier)
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Current particle alpha values
    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    /// Total particles moved back to the spawn slab
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    fn respawn_position(&mut self) -> Vec3 {
        let min = self.config.min_bound();
        let slab = (self.config.spread.x * 2.0 * self.config.spawn_depth.clamp(0.0, 1.0)).max(0.0);
        let mut p = random_in_volume(&mut self.rng, &self.config);
        p.x = min.x + self.rng.next_f32() * slab;
        p
    }
}

fn random_in_volume(rng: &mut Rng, config: &ParticleConfig) -> Vec3 {
    config.center
        + Vec3::new(rng.next_signed(), rng.next_signed(), rng.next_signed()) * config.spread
}

fn random_velocity(rng: &mut Rng, config: &ParticleConfig) -> Vec3 {
    let jitter = Vec3::new(rng.next_signed(), rng.next_signed(), rng.next_signed());
    config.velocity + jitter * config.velocity_jitter
}

fn pulse_alpha(config: &ParticleConfig, elapsed: f32, phase: f32) -> f32 {
    let pulse = (elapsed * config.pulse_speed + phase).sin();
    (config.base_alpha + config.pulse_amplitude * pulse).clamp(0.0, 1.0)
}

impl Generator for ParticleStream {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, delta: f32, elapsed: f32) {
        if self.disposed {
            return;
        }

        let step = self.config.speed * delta;
        for i in 0..self.positions.len() {
            let mut next = self.positions[i] + self.velocities[i] * step;
            if !self.config.contains(next) {
                self.recycled += 1;
                next = self.respawn_position();
            }
            self.positions[i] = next;
            self.alphas[i] = pulse_alpha(&self.config, elapsed, self.phases[i]);
        }
        self.dirty = true;
    }

    fn drawable(&self) -> Option<Drawable<'_>> {
        if self.disposed {
            return None;
        }
        Some(Drawable::Points {
            label: &self.name,
            positions: &self.positions,
            alphas: &self.alphas,
            color: self.color,
            size: self.config.size,
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
        self.positions = Vec::new();
        self.velocities = Vec::new();
        self.alphas = Vec::new();
        self.phases = Vec::new();
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(config: ParticleConfig) -> (ParticleStream, ResourceTracker) {
        let tracker = ResourceTracker::new();
        (ParticleStream::new("test", config, &tracker), tracker)
    }

    #[test]
    fn test_buffers_have_fixed_size() {
        let (mut s, _) = stream(ParticleConfig::default().with_count(50));
        assert_eq!(s.positions().len(), 50);
        for i in 0..100 {
            s.update(0.016, i as f32 * 0.016);
        }
        assert_eq!(s.positions().len(), 50);
        assert_eq!(s.velocities().len(), 50);
        assert_eq!(s.alphas().len(), 50);
    }

    #[test]
    fn test_initial_positions_inside_volume() {
        let (s, _) = stream(ParticleConfig::default().with_count(500));
        assert!(s.positions().iter().all(|&p| s.config().contains(p)));
    }

    #[test]
    fn test_particles_stay_in_bounds() {
        let config = ParticleConfig::default()
            .with_count(200)
            .with_spread(Vec3::new(2.0, 0.5, 1.0))
            .with_velocity(Vec3::new(3.0, 0.4, -0.6))
            .with_speed(1.5);
        let (mut s, _) = stream(config);

        let delta = 1.0 / 60.0;
        for frame in 0..600 {
            s.update(delta, frame as f32 * delta);
            for &p in s.positions() {
                assert!(s.config().contains(p), "frame {} escaped at {:?}", frame, p);
            }
        }
        assert!(s.recycled() > 0);
    }

    #[test]
    fn test_recycled_particles_enter_spawn_slab() {
        let config = ParticleConfig::default()
            .with_count(1)
            .with_spread(Vec3::new(1.0, 1.0, 1.0))
            .with_velocity(Vec3::new(100.0, 0.0, 0.0));
        let (mut s, _) = stream(config);

        s.update(0.1, 0.1);
        assert_eq!(s.recycled(), 1);
        let min_x = s.config().min_bound().x;
        let slab = s.config().spread.x * 2.0 * s.config().spawn_depth;
        let x = s.positions()[0].x;
        assert!(x >= min_x && x <= min_x + slab);
    }

    #[test]
    fn test_movement_scales_with_speed_and_delta() {
        let config = ParticleConfig::default()
            .with_count(1)
            .with_spread(Vec3::splat(1000.0))
            .with_speed(2.0);
        let (mut s, _) = stream(config);

        let start = s.positions()[0];
        let velocity = s.velocities()[0];
        s.update(0.05, 0.05);
        let moved = s.positions()[0] - start;
        assert!((moved - velocity * 0.1).length() < 1e-4);
    }

    #[test]
    fn test_alpha_pulses_within_range() {
        let (mut s, _) = stream(ParticleConfig::default().with_count(20));
        let first: Vec<f32> = s.alphas().to_vec();
        s.update(0.016, 0.7);
        assert_ne!(first, s.alphas());
        assert!(s.alphas().iter().all(|a| (0.0..=1.0).contains(a)));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (a, _) = stream(ParticleConfig::default().with_seed(42).with_count(10));
        let (b, _) = stream(ParticleConfig::default().with_seed(42).with_count(10));
        let (c, _) = stream(ParticleConfig::default().with_seed(43).with_count(10));
        assert_eq!(a.positions(), b.positions());
        assert_ne!(a.positions(), c.positions());
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let (s, _) = stream(ParticleConfig::default().with_seed(0).with_count(10));
        let distinct = s.positions().windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(distinct, 9);
    }

    #[test]
    fn test_dispose_releases_once() {
        let (mut s, tracker) = stream(ParticleConfig::default().with_count(10));
        s.dispose();
        s.dispose();
        s.update(0.016, 1.0);

        assert!(s.drawable().is_none());
        assert_eq!(tracker.released(ResourceKind::Geometry), 1);
        assert_eq!(tracker.released(ResourceKind::Material), 1);
        assert_eq!(tracker.live(), 0);
    }
}
