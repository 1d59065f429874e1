//! Shared GPU types and utilities of the renderers.

use bytemuck::{Pod, Zeroable};

use crate::shading::DrawUniforms;
use crate::transform::Mat3;

/// Depth attachment format of every pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── depth ─────────────────────────────────────────────────────────────────

pub(super) fn depth_less_write() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Creates a depth texture + view sized for a `width × height` target.
pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    label: &str,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Records a pass that clears `color_view` to `clear` and depth to 1.0.
pub(crate) fn clear_color_depth(
    encoder: &mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    clear: wgpu::Color,
) {
    let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("lumen clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

// ── mesh uniform ──────────────────────────────────────────────────────────

/// GPU layout of `shading::DrawUniforms` (matches `MeshUniform` in mesh.wgsl).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MeshUniform {
    pub mvp: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3], // mat3x3 columns are vec4-aligned
    pub light_dir: [f32; 3],
    pub shininess: f32,
    pub swap_yz: u32,
    pub show_texture: u32,
    pub lighting: u32,
    pub _pad: u32,
}

impl From<&DrawUniforms> for MeshUniform {
    fn from(u: &DrawUniforms) -> Self {
        Self {
            mvp: u.mvp.to_cols_array_2d(),
            normal_matrix: padded_cols(&u.normal_matrix),
            light_dir: u.light_dir.to_array(),
            shininess: u.shininess,
            swap_yz: u.swap_yz as u32,
            show_texture: u.show_texture as u32,
            lighting: u.lighting as u32,
            _pad: 0,
        }
    }
}

/// Columns padded to `vec4`, the layout of a WGSL `mat3x3<f32>` uniform.
fn padded_cols(m: &Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

/// Returns the `wgpu` minimum binding size for the mesh uniform buffer.
///
/// `MeshUniform` is a fixed 144-byte struct, so its size is always non-zero.
pub(super) fn mesh_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<MeshUniform>() as u64)
        .expect("MeshUniform has non-zero size by construction")
}

// ── vertex streams ────────────────────────────────────────────────────────

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const UV_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];
const NORMAL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// One tightly packed buffer per attribute: positions, UVs, normals.
pub(super) fn mesh_vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    let stream = |floats: u64, attributes: &'static [wgpu::VertexAttribute]| {
        wgpu::VertexBufferLayout {
            array_stride: floats * std::mem::size_of::<f32>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    };
    [
        stream(3, &POSITION_ATTRS),
        stream(2, &UV_ATTRS),
        stream(3, &NORMAL_ATTRS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec3;
    use crate::transform::Mat4;

    #[test]
    fn mesh_uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<MeshUniform>(), 144);
        assert_eq!(std::mem::offset_of!(MeshUniform, normal_matrix), 64);
        assert_eq!(std::mem::offset_of!(MeshUniform, light_dir), 112);
        assert_eq!(std::mem::offset_of!(MeshUniform, shininess), 124);
        assert_eq!(std::mem::offset_of!(MeshUniform, swap_yz), 128);
    }

    #[test]
    fn flags_pack_as_u32() {
        let draw = DrawUniforms {
            mvp: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            light_dir: Vec3::new(1.0, 2.0, 3.0),
            shininess: 5.0,
            swap_yz: true,
            show_texture: false,
            lighting: true,
        };
        let gpu = MeshUniform::from(&draw);
        assert_eq!((gpu.swap_yz, gpu.show_texture, gpu.lighting), (1, 0, 1));
        assert_eq!(gpu.light_dir, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.normal_matrix[2], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(gpu.mvp[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn vertex_streams_use_distinct_locations() {
        let layouts = mesh_vertex_layouts();
        let locations: Vec<u32> = layouts
            .iter()
            .map(|l| l.attributes[0].shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2]);
        assert_eq!(layouts[0].array_stride, 12);
        assert_eq!(layouts[1].array_stride, 8);
    }
}
