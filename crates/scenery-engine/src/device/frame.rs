/// A single acquired frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    /// Depth attachment matching the surface size.
    pub depth_view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
