//! Scene-side state types shared by the renderers.
//!
//! Nothing here touches platform APIs, so both the web and native front-ends
//! build their camera matrices from the same values.

use glam::{Mat4, Vec3};

use crate::constants::{
    CAMERA_FOVY_DEGREES, CAMERA_Z, CAMERA_ZFAR, CAMERA_ZNEAR, ORBIT_DAMPING, ORBIT_PITCH_LIMIT,
    ORBIT_ROTATE_SPEED,
};

/// Surface size in physical pixels; never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Damped drag-to-rotate around the camera target.
///
/// Drags add to a pending rotation; each frame applies `damping` of what is
/// pending and keeps the rest, so motion eases out after release and the
/// total turn equals the drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    /// Radians about +Y; 0 looks down -Z.
    pub yaw: f32,
    /// Elevation in radians, clamped short of the poles.
    pub pitch: f32,
    pub distance: f32,
    pub damping: f32,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl Orbit {
    pub fn new(distance: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance,
            damping: ORBIT_DAMPING,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    /// Queues a drag of `dx`, `dy` pixels on a surface `height` pixels tall.
    /// Dragging right swings the eye left; dragging down raises it.
    pub fn drag(&mut self, dx: f32, dy: f32, height: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let per_px = std::f32::consts::TAU * ORBIT_ROTATE_SPEED / height.max(1.0);
        self.pending_yaw -= dx * per_px;
        self.pending_pitch += dy * per_px;
    }

    /// Applies one frame of damped motion.
    pub fn step(&mut self) {
        let d = self.damping.clamp(0.0, 1.0);
        self.yaw += self.pending_yaw * d;
        self.pitch =
            (self.pitch + self.pending_pitch * d).clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
        self.pending_yaw *= 1.0 - d;
        self.pending_pitch *= 1.0 - d;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < 1e-5 && self.pending_pitch.abs() < 1e-5
    }

    pub fn eye(&self, target: Vec3) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    pub orbit: Orbit,
}

impl Camera {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: viewport.aspect(),
            fovy_radians: CAMERA_FOVY_DEGREES.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
            orbit: Orbit::new(CAMERA_Z),
        }
    }

    /// Advances the orbit one frame and moves the eye to match.
    pub fn update_orbit(&mut self) {
        self.orbit.step();
        self.eye = self.orbit.eye(self.target);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
