//! CPU-side packing of a composed frame into GPU instance/vertex data.
//!
//! Everything is transformed to world space here so a single camera uniform
//! serves every pipeline.

use audiofield_core::layers::{EffectLayer, LayerStack};
use audiofield_core::{Camera, VisualizationContext};
use glam::Vec3;

use audiofield_core::constants::PARTICLE_SIZE;

/// Fragment shapes understood by `fs_sprite`.
pub const SHAPE_DOT: f32 = 0.0;
pub const SHAPE_SPHERE: f32 = 1.0;
pub const SHAPE_STREAK: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    /// xyz world position, w half-width.
    pub pos_size: [f32; 4],
    pub color: [f32; 4],
    /// x shape, y vertical stretch.
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl CameraUniforms {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
        }
    }
}

fn sprite(pos: Vec3, half: f32, color: [f32; 4], shape: f32, stretch: f32) -> SpriteInstance {
    SpriteInstance {
        pos_size: [pos.x, pos.y, pos.z, half],
        color,
        params: [shape, stretch, 0.0, 0.0],
    }
}

/// Sprites in back-to-front draw order: halftone, cloud, particles, drips.
///
/// Returns how many leading sprites belong behind the wave mesh.
pub fn collect_sprites(ctx: &VisualizationContext, out: &mut Vec<SpriteInstance>) -> usize {
    let (layers, particles) = (&ctx.layers, &ctx.particles);
    out.clear();

    if layers.halftone.is_visible() {
        let m = layers.halftone.model_matrix();
        let [r, g, b] = layers.halftone.color();
        out.extend(layers.halftone.dots().iter().filter(|d| d.size > 0.0).map(|d| {
            sprite(m.transform_point3(d.position), d.size, [r, g, b, 1.0], SHAPE_DOT, 1.0)
        }));
    }
    let backdrop = out.len();

    if layers.cloud.is_visible() {
        let cloud = &layers.cloud;
        let center = cloud.model_matrix().transform_point3(Vec3::ZERO);
        let [r, g, b] = cloud.color();
        let s = cloud.scale;
        out.push(sprite(
            center,
            cloud.radius() * s.x,
            [r, g, b, 1.0],
            SHAPE_SPHERE,
            s.y / s.x,
        ));
        // Without a depth buffer, eyes turned away from the camera are skipped.
        let to_camera = ctx.camera.eye - center;
        for (pos, radius, [r, g, b]) in cloud.eyes() {
            if (pos - center).dot(to_camera) < 0.0 {
                continue;
            }
            out.push(sprite(pos, radius * s.x, [r, g, b, 1.0], SHAPE_SPHERE, 1.0));
        }
    }

    let m = particles.model_matrix();
    out.extend(particles.points().iter().map(|p| {
        let [r, g, b] = p.color;
        sprite(
            m.transform_point3(p.current),
            PARTICLE_SIZE * 0.5,
            [r, g, b, 0.8],
            SHAPE_DOT,
            1.0,
        )
    }));

    if layers.drips.is_visible() {
        // Unit cylinder scaled to (radius, length, radius) and hung below its top.
        out.extend(layers.drips.drips().iter().map(|d| {
            let m = d.model_matrix();
            let center = m.transform_point3(Vec3::ZERO);
            let half_len = m.y_axis.y * 0.5;
            sprite(center, d.radius, d.color.rgba(), SHAPE_STREAK, half_len / d.radius)
        }));
    }
    backdrop
}

/// World-space wave vertices; empty while the layer is hidden.
pub fn collect_wave_vertices(layers: &LayerStack, out: &mut Vec<MeshVertex>) {
    out.clear();
    if !layers.wave.is_visible() {
        return;
    }
    let m = layers.wave.model_matrix();
    out.extend(layers.wave.vertices().iter().map(|v| MeshVertex {
        position: m.transform_point3(v.position).to_array(),
        color: v.color,
    }));
}
