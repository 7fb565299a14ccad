//! Host rendering seams
//!
//! The scene does not talk to a graphics API directly. The host supplies a
//! [`RenderSurface`] that draws [`RenderFrame`]s and a [`FrameScheduler`]
//! that calls back once per display frame.

use glam::Mat4;

use crate::clock::FrameTime;
use crate::generators::Drawable;

/// Opaque id of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Schedules per-frame callbacks
///
/// The host calls [`SceneManager::on_frame`](crate::SceneManager::on_frame)
/// with the returned handle when the frame fires.
pub trait FrameScheduler: Send {
    /// Request one callback on the next display frame
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending callback
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Drawing target owned by one scene
pub trait RenderSurface: Send {
    /// Resize the drawing buffer (CSS pixels)
    fn set_size(&mut self, width: u32, height: u32);

    /// Set the device pixel ratio used for the drawing buffer
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Draw one frame
    fn render(&mut self, frame: &RenderFrame<'_>);

    /// Release the context and its GPU memory
    fn dispose(&mut self);
}

/// Everything needed to draw one frame
#[derive(Debug)]
pub struct RenderFrame<'a> {
    /// Camera projection * view
    pub view_projection: Mat4,
    /// Frame timing
    pub time: FrameTime,
    /// Generator output in update order
    pub drawables: Vec<Drawable<'a>>,
}

/// Surface creation options
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
    /// Device pixel ratio reported by the host
    pub device_pixel_ratio: f32,
    /// Upper bound on the pixel ratio actually used
    pub pixel_ratio_cap: f32,
    /// Request an antialiased context
    pub antialias: bool,
    /// Request a transparent drawing buffer
    pub alpha: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
            pixel_ratio_cap: 2.0,
            antialias: true,
            alpha: true,
        }
    }
}

impl SurfaceOptions {
    /// Options for a surface of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the device pixel ratio
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Set the pixel ratio cap
    pub fn with_pixel_ratio_cap(mut self, cap: f32) -> Self {
        self.pixel_ratio_cap = cap;
        self
    }

    /// Enable or disable antialiasing
    pub fn with_antialias(mut self, enabled: bool) -> Self {
        self.antialias = enabled;
        self
    }

    /// Device pixel ratio after applying the cap
    pub fn effective_pixel_ratio(&self) -> f32 {
        let ratio = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        ratio.min(self.pixel_ratio_cap.max(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_capped() {
        let opts = SurfaceOptions::new(800, 600)
            .with_device_pixel_ratio(3.0)
            .with_pixel_ratio_cap(1.5);
        assert_eq!(opts.effective_pixel_ratio(), 1.5);
    }

    #[test]
    fn test_pixel_ratio_below_cap_kept() {
        let opts = SurfaceOptions::new(800, 600).with_device_pixel_ratio(1.25);
        assert_eq!(opts.effective_pixel_ratio(), 1.25);
    }

    #[test]
    fn test_invalid_pixel_ratio_defaults_to_one() {
        let opts = SurfaceOptions::new(800, 600).with_device_pixel_ratio(f32::NAN);
        assert_eq!(opts.effective_pixel_ratio(), 1.0);
    }
}
