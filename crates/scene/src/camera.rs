//! Perspective camera for the background scene

use glam::{Mat4, Vec3};

/// Perspective camera looking at a fixed target
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Viewport width divided by height
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Eye position
    pub position: Vec3,
    /// Look-at target
    pub target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 3.0, 10.0),
            target: Vec3::ZERO,
        }
    }
}

impl Camera {
    /// Camera for a surface of the given size
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(width, height);
        camera
    }

    /// Update the aspect ratio; zero-height viewports keep the previous ratio
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// View matrix
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Projection matrix
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_sets_aspect() {
        let camera = Camera::for_viewport(1200, 600);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_zero_height_keeps_aspect() {
        let mut camera = Camera::for_viewport(800, 400);
        camera.set_viewport(800, 0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_projection_changes_with_aspect() {
        let mut camera = Camera::default();
        let before = camera.projection();
        camera.set_viewport(400, 800);
        assert_ne!(before, camera.projection());
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::for_viewport(1920, 1080);
        let clip = camera.view_projection() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
    }
}
