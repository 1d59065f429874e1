/// Represents a single acquired frame.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// frame. The depth attachment is owned by `Gpu` and borrowed per frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
