use audiofield_core::layers::EffectLayer;
use audiofield_core::{Renderer, VisualizationContext, Viewport};

use super::helpers;
use super::pack::{self, CameraUniforms, MeshVertex, SpriteInstance};
use super::post::{
    self, PostBindGroups, PostResources, PostUniforms, SLOT_BLUR_H, SLOT_BLUR_V, SLOT_BRIGHT,
    SLOT_COMPOSITE,
};
use super::scene::{self, ScenePipelines};
use super::targets::RenderTargets;

const INITIAL_SPRITES: u64 = 8192;
const SPRITE_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::VERTEX;

/// wgpu renderer for a composed frame: scene into HDR, bloom chain, noisy composite.
pub struct GpuRenderer<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    post: PostResources,
    post_groups: PostBindGroups,
    scene: ScenePipelines,
    sprite_buffer: wgpu::Buffer,
    wave_vertex_buffer: wgpu::Buffer,
    wave_index_buffer: wgpu::Buffer,
    wave_index_count: u32,
    sprites: Vec<SpriteInstance>,
    wave_vertices: Vec<MeshVertex>,
    clear_color: wgpu::Color,
}

impl<'a> GpuRenderer<'a> {
    /// Builds device, pipelines and targets for a surface the front-end created.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'a>,
        viewport: Viewport,
        wave_indices: &[u32],
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // WebGL2 limits so the same build runs on the web fallback
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {e:?}"))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "[render] surface {}x{} format {:?}",
            config.width,
            config.height,
            format
        );

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_wgsl"),
            source: wgpu::ShaderSource::Wgsl(crate::SCENE_WGSL.into()),
        });
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_wgsl"),
            source: wgpu::ShaderSource::Wgsl(crate::POST_WGSL.into()),
        });

        let targets = RenderTargets::new(&device, config.width, config.height);
        let post = post::create_post_resources(&device, &post_shader, format);
        let post_groups = post.bind_groups(&device, &targets);
        let scene = scene::create_scene_pipelines(&device, &scene_shader);

        let sprite_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_instances"),
            size: INITIAL_SPRITES * std::mem::size_of::<SpriteInstance>() as u64,
            usage: SPRITE_USAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let wave_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_vertices"),
            size: 4,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let wave_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave_indices"),
            size: (std::mem::size_of_val(wave_indices) as u64).max(4),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&wave_index_buffer, 0, bytemuck::cast_slice(wave_indices));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            post,
            post_groups,
            scene,
            sprite_buffer,
            wave_vertex_buffer,
            wave_index_buffer,
            wave_index_count: wave_indices.len() as u32,
            sprites: Vec::new(),
            wave_vertices: Vec::new(),
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
        })
    }

    fn upload(&mut self, ctx: &VisualizationContext) -> usize {
        let backdrop = pack::collect_sprites(ctx, &mut self.sprites);
        pack::collect_wave_vertices(&ctx.layers, &mut self.wave_vertices);

        self.queue.write_buffer(
            &self.scene.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniforms::from_camera(&ctx.camera)),
        );
        if !self.sprites.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(&self.sprites);
            helpers::ensure_capacity(
                &self.device,
                &mut self.sprite_buffer,
                "sprite_instances",
                SPRITE_USAGE,
                bytes.len() as u64,
            );
            self.queue.write_buffer(&self.sprite_buffer, 0, bytes);
        }
        if !self.wave_vertices.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(&self.wave_vertices);
            helpers::ensure_capacity(
                &self.device,
                &mut self.wave_vertex_buffer,
                "wave_vertices",
                wgpu::BufferUsages::VERTEX,
                bytes.len() as u64,
            );
            self.queue.write_buffer(&self.wave_vertex_buffer, 0, bytes);
        }
        backdrop
    }

    fn write_post_slots(&self, ctx: &VisualizationContext) {
        let enabled = ctx.layers.post.is_visible();
        let (sw, sh) = self.targets.scene_extent();
        let (bw, bh) = self.targets.bloom_extent();
        let full = PostUniforms::from_layer(&ctx.layers.post, enabled, [sw as f32, sh as f32]);
        let half = PostUniforms {
            resolution: [bw as f32, bh as f32],
            ..full
        };
        self.post.write_slot(&self.queue, SLOT_BRIGHT, &half);
        self.post.write_slot(
            &self.queue,
            SLOT_BLUR_H,
            &PostUniforms {
                blur_dir: [1.0, 0.0],
                ..half
            },
        );
        self.post.write_slot(
            &self.queue,
            SLOT_BLUR_V,
            &PostUniforms {
                blur_dir: [0.0, 1.0],
                ..half
            },
        );
        self.post.write_slot(&self.queue, SLOT_COMPOSITE, &full);
    }
}

impl Renderer for GpuRenderer<'_> {
    fn resize(&mut self, viewport: Viewport) {
        if viewport.width == self.config.width && viewport.height == self.config.height {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.targets
            .recreate(&self.device, viewport.width, viewport.height);
        self.post_groups = self.post.bind_groups(&self.device, &self.targets);
        log::debug!("[render] resized to {}x{}", viewport.width, viewport.height);
    }

    fn render(&mut self, ctx: &VisualizationContext) -> anyhow::Result<()> {
        let backdrop = self.upload(ctx) as u32;
        self.write_post_slots(ctx);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(anyhow::anyhow!("surface error: {e}")),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.scene.camera_bg, &[]);
            let total = self.sprites.len() as u32;

            // halftone backdrop
            if backdrop > 0 {
                rpass.set_pipeline(&self.scene.sprite_pipeline);
                rpass.set_vertex_buffer(0, self.sprite_buffer.slice(..));
                rpass.draw(0..6, 0..backdrop);
            }
            if !self.wave_vertices.is_empty() {
                rpass.set_pipeline(&self.scene.mesh_pipeline);
                rpass.set_vertex_buffer(0, self.wave_vertex_buffer.slice(..));
                rpass.set_index_buffer(self.wave_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..self.wave_index_count, 0, 0..1);
            }
            // cloud, particles, drips
            if total > backdrop {
                rpass.set_pipeline(&self.scene.sprite_pipeline);
                rpass.set_vertex_buffer(0, self.sprite_buffer.slice(..));
                rpass.draw(0..6, backdrop..total);
            }
        }

        let g = &self.post_groups;
        post::blit(
            &mut encoder,
            "bright_pass",
            &self.targets.bloom_a_view,
            &self.post.bright_pipeline,
            &g.hdr,
            SLOT_BRIGHT,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_h",
            &self.targets.bloom_b_view,
            &self.post.blur_pipeline,
            &g.from_bloom_a,
            SLOT_BLUR_H,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_v",
            &self.targets.bloom_a_view,
            &self.post.blur_pipeline,
            &g.from_bloom_b,
            SLOT_BLUR_V,
            None,
        );
        post::blit(
            &mut encoder,
            "composite",
            &view,
            &self.post.composite_pipeline,
            &g.hdr,
            SLOT_COMPOSITE,
            Some(&g.bloom_a_only),
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
