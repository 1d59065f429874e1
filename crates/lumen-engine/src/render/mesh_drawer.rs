use anyhow::Result;
use image::{DynamicImage, RgbaImage};
use wgpu::util::DeviceExt;

use crate::mesh::Mesh;
use crate::render::{RenderCtx, RenderTarget};
use crate::shading::{DrawUniforms, Light, ShadingConfig};
use crate::transform::{Mat3, Mat4};

use super::common::{depth_less_write, mesh_ubo_min_binding_size, mesh_vertex_layouts, MeshUniform};
use super::texture::{repeat_trilinear_sampler, MeshTexture};

/// Draws one triangle-list mesh with an optional texture and Phong-style
/// lighting.
///
/// Vertex data lives in three GPU buffers (positions, UVs, normals) that
/// `set_mesh` replaces wholesale. Flags and light are plain CPU state folded
/// into a uniform block on every `draw`.
pub struct MeshDrawer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    bind_group_generation: u64,
    mesh_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    texture: Option<MeshTexture>,
    texture_generation: u64,

    positions_vbo: Option<wgpu::Buffer>,
    uvs_vbo: Option<wgpu::Buffer>,
    normals_vbo: Option<wgpu::Buffer>,
    vertex_count: u32,
    lighting: bool,

    swap_yz: bool,
    show_texture: bool,
    light: Light,
    shininess: f32,

    warned_no_mesh: bool,
}

impl Default for MeshDrawer {
    fn default() -> Self {
        Self::with_config(ShadingConfig::default())
    }
}

impl MeshDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ShadingConfig) -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            bind_group_generation: u64::MAX,
            mesh_ubo: None,
            sampler: None,
            texture: None,
            texture_generation: 0,
            positions_vbo: None,
            uvs_vbo: None,
            normals_vbo: None,
            vertex_count: 0,
            lighting: false,
            swap_yz: config.swap_yz,
            show_texture: config.show_texture,
            light: config.light,
            shininess: config.shininess,
            warned_no_mesh: false,
        }
    }

    // ── state ─────────────────────────────────────────────────────────────

    /// Replaces all vertex data. Meshes without normals draw unlit.
    pub fn set_mesh(&mut self, ctx: &RenderCtx<'_>, mesh: &Mesh) {
        // Trailing vertices that form no triangle are not drawn.
        self.vertex_count = (mesh.triangle_count() * 3) as u32;
        self.lighting = mesh.has_normals();
        self.warned_no_mesh = false;

        if mesh.triangle_count() == 0 {
            log::warn!("MeshDrawer: mesh has no triangles; nothing will be drawn");
            self.positions_vbo = None;
            self.uvs_vbo = None;
            self.normals_vbo = None;
            return;
        }

        let vbo = |label: &str, data: &[f32]| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        // Unlit meshes still bind a normal stream; the shader ignores it.
        let zero_normals;
        let normals = match mesh.normals() {
            Some(n) => n,
            None => {
                zero_normals = vec![0.0f32; mesh.vertex_count() * 3];
                &zero_normals
            }
        };

        self.positions_vbo = Some(vbo("lumen mesh positions vbo", mesh.positions()));
        self.uvs_vbo = Some(vbo("lumen mesh uvs vbo", mesh.tex_coords()));
        self.normals_vbo = Some(vbo("lumen mesh normals vbo", normals));

        log::debug!(
            "MeshDrawer: uploaded {} vertices ({} triangles, {})",
            mesh.vertex_count(),
            mesh.triangle_count(),
            if self.lighting { "lit" } else { "unlit" },
        );
    }

    /// Swaps Y and Z of positions and normals before use.
    pub fn set_swap_yz(&mut self, swap: bool) {
        self.swap_yz = swap;
    }

    pub fn swap_yz(&self) -> bool {
        self.swap_yz
    }

    /// Samples the texture (true) or shows the `(u, v, 0)` gradient (false).
    pub fn set_show_texture(&mut self, show: bool) {
        self.show_texture = show;
    }

    pub fn show_texture(&self) -> bool {
        self.show_texture
    }

    /// View-space light travelling along `(x, y, z)`.
    ///
    /// Stored negated, as the direction toward the light. Replaces any world
    /// light.
    pub fn set_light_dir(&mut self, x: f32, y: f32, z: f32) {
        self.light = Light::from_travel_direction(x, y, z);
    }

    /// World-space direction toward the light, re-derived from the model
    /// view on every draw. Replaces any view light.
    pub fn set_world_light(&mut self, x: f32, y: f32, z: f32) {
        self.light = Light::world(x, y, z);
    }

    pub fn light(&self) -> Light {
        self.light
    }

    /// Specular exponent. Not validated.
    pub fn set_shininess(&mut self, shininess: f32) {
        self.shininess = shininess;
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Uploads `image` (any pixel format) as the mesh texture.
    pub fn set_texture(&mut self, ctx: &RenderCtx<'_>, image: &DynamicImage) -> Result<()> {
        self.set_texture_rgba(ctx, &image.to_rgba8())
    }

    /// Uploads an RGBA8 image with its mip chain. The previous texture is
    /// kept if the upload is rejected.
    pub fn set_texture_rgba(&mut self, ctx: &RenderCtx<'_>, image: &RgbaImage) -> Result<()> {
        let texture = MeshTexture::upload(ctx.device, ctx.queue, image, "lumen mesh texture")?;
        self.texture = Some(texture);
        self.texture_generation += 1;
        Ok(())
    }

    /// Uniform block `draw` would upload for these matrices.
    ///
    /// A world light is rotated into view space here, so the result tracks
    /// `model_view` on every call.
    pub fn uniforms(&self, mvp: &Mat4, model_view: &Mat4, normal_matrix: &Mat3) -> DrawUniforms {
        DrawUniforms {
            mvp: *mvp,
            normal_matrix: *normal_matrix,
            light_dir: self.light.view_direction(model_view),
            shininess: self.shininess,
            swap_yz: self.swap_yz,
            show_texture: self.show_texture,
            lighting: self.lighting,
        }
    }

    // ── draw ──────────────────────────────────────────────────────────────

    /// Draws the current mesh into `target`, loading existing color and
    /// depth contents.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mvp: &Mat4,
        model_view: &Mat4,
        normal_matrix: &Mat3,
    ) -> Result<()> {
        if self.vertex_count == 0 || self.positions_vbo.is_none() {
            if !self.warned_no_mesh {
                log::debug!("MeshDrawer: draw without a mesh; skipped");
                self.warned_no_mesh = true;
            }
            return Ok(());
        }

        self.ensure_pipeline(ctx);
        self.ensure_texture(ctx)?;
        self.ensure_bindings(ctx);

        let uniforms = MeshUniform::from(&self.uniforms(mvp, model_view, normal_matrix));
        let Some(ubo) = self.mesh_ubo.as_ref() else { return Ok(()) };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(bind_group) = self.bind_group.as_ref() else { return Ok(()) };
        let Some(positions) = self.positions_vbo.as_ref() else { return Ok(()) };
        let Some(uvs) = self.uvs_vbo.as_ref() else { return Ok(()) };
        let Some(normals) = self.normals_vbo.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, positions.slice(..));
        rpass.set_vertex_buffer(1, uvs.slice(..));
        rpass.set_vertex_buffer(2, normals.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);

        Ok(())
    }

    // ── lazy-init helpers ─────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.color_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen mesh bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(mesh_ubo_min_binding_size()),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen mesh pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen mesh pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &mesh_vertex_layouts(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(depth_less_write()),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.color_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
        self.mesh_ubo = None;
        self.bind_group_generation = u64::MAX;
    }

    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.sampler.is_none() {
            self.sampler = Some(repeat_trilinear_sampler(ctx.device));
        }
        if self.texture.is_none() {
            self.texture = Some(MeshTexture::white(ctx.device, ctx.queue)?);
            self.texture_generation += 1;
        }
        Ok(())
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_generation == self.texture_generation
            && self.bind_group.is_some()
            && self.mesh_ubo.is_some()
        {
            return;
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(texture) = self.texture.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        let mesh_ubo = match self.mesh_ubo.take() {
            Some(ubo) => ubo,
            None => ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("lumen mesh ubo"),
                size: std::mem::size_of::<MeshUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen mesh bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: mesh_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.mesh_ubo = Some(mesh_ubo);
        self.bind_group = Some(bind_group);
        self.bind_group_generation = self.texture_generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, Vec3};
    use crate::mesh::primitives;
    use crate::transform::{build_model_view, normal_matrix};

    fn frame(rx: f32, ry: f32) -> (Mat4, Mat4, Mat3) {
        let mv = build_model_view(Vec3::new(0.0, 0.0, 3.0), rx, ry);
        (mv, mv, normal_matrix(&mv))
    }

    #[test]
    fn defaults_follow_config() {
        let config = ShadingConfig {
            shininess: 7.0,
            light: Light::world(0.0, 1.0, 0.0),
            swap_yz: true,
            show_texture: true,
        };
        let drawer = MeshDrawer::with_config(config);
        assert_eq!(drawer.shininess(), 7.0);
        assert_eq!(drawer.light(), Light::world(0.0, 1.0, 0.0));
        assert!(drawer.swap_yz() && drawer.show_texture());
    }

    #[test]
    fn light_dir_is_stored_negated() {
        let mut drawer = MeshDrawer::new();
        drawer.set_light_dir(0.5, -1.0, 2.0);
        let (mvp, mv, nm) = frame(0.3, 0.9);
        assert_eq!(drawer.uniforms(&mvp, &mv, &nm).light_dir, Vec3::new(-0.5, 1.0, -2.0));
    }

    #[test]
    fn world_light_is_rederived_per_call() {
        let mut drawer = MeshDrawer::new();
        drawer.set_world_light(0.0, 0.0, 1.0);

        let (mvp, mv, nm) = frame(0.0, 0.0);
        let a = drawer.uniforms(&mvp, &mv, &nm).light_dir;
        assert!((a.z - 1.0).abs() < 1e-6);

        let (mvp, mv, nm) = frame(0.0, std::f32::consts::FRAC_PI_2);
        let b = drawer.uniforms(&mvp, &mv, &nm).light_dir;
        assert!((b.x - 1.0).abs() < 1e-6 && b.z.abs() < 1e-6);
        assert!((b.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn last_light_setter_wins() {
        let mut drawer = MeshDrawer::new();
        let (mvp, mv, nm) = frame(0.0, std::f32::consts::FRAC_PI_2);

        drawer.set_world_light(0.0, 0.0, 1.0);
        drawer.set_light_dir(0.0, 0.0, 1.0);
        assert_eq!(drawer.uniforms(&mvp, &mv, &nm).light_dir, Vec3::new(0.0, 0.0, -1.0));

        drawer.set_world_light(0.0, 0.0, 1.0);
        assert!((drawer.uniforms(&mvp, &mv, &nm).light_dir.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flags_and_shininess_flow_into_uniforms() {
        let mut drawer = MeshDrawer::new();
        drawer.set_swap_yz(true);
        drawer.set_show_texture(true);
        drawer.set_shininess(-3.0);

        let (mvp, mv, nm) = frame(0.1, 0.2);
        let u = drawer.uniforms(&mvp, &mv, &nm);
        assert!(u.swap_yz && u.show_texture);
        assert_eq!(u.shininess, -3.0);
        assert_eq!(u.mvp, mvp);
        assert_eq!(u.normal_matrix, nm);
    }

    #[test]
    fn swap_on_then_off_restores_output() {
        let mesh = primitives::cube(0.5);
        let (mvp, mv, nm) = frame(0.4, -0.8);
        let texel = ColorRgba::new(0.2, 0.6, 0.4, 1.0);

        let untouched = MeshDrawer::new();
        let mut toggled = MeshDrawer::new();

        toggled.set_swap_yz(true);
        let swapped = toggled.uniforms(&mvp, &mv, &nm);
        toggled.set_swap_yz(false);

        let before = untouched.uniforms(&mvp, &mv, &nm);
        let after = toggled.uniforms(&mvp, &mv, &nm);
        assert_eq!(before, after);

        let mut differed = false;
        for lighting in [false, true] {
            let before = DrawUniforms { lighting, ..before };
            let after = DrawUniforms { lighting, ..after };
            let swapped = DrawUniforms { lighting, ..swapped };

            for v in 0..mesh.vertex_count() {
                let p = mesh.position(v).unwrap();
                let uv = mesh.tex_coord(v).unwrap();
                let n = mesh.normal(v).unwrap();

                let a = before.vertex_stage(p, uv, n);
                let b = after.vertex_stage(p, uv, n);
                assert_eq!(a, b, "vertex {v}");
                assert_eq!(before.fragment_stage(&a, texel), after.fragment_stage(&b, texel));

                differed |= swapped.vertex_stage(p, uv, n) != a;
            }
        }
        assert!(differed);
    }

    #[test]
    fn no_mesh_means_unlit() {
        let drawer = MeshDrawer::new();
        let (mvp, mv, nm) = frame(0.0, 0.0);
        assert!(!drawer.uniforms(&mvp, &mv, &nm).lighting);
    }
}
