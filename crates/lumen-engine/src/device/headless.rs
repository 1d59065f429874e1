use std::sync::mpsc;

use anyhow::{anyhow, ensure, Context, Result};
use image::RgbaImage;

use crate::coords::{ColorRgba, Viewport};
use crate::render::{clear_color_depth, create_depth_texture, RenderCtx, RenderTarget};

use super::init::device_descriptor;
use super::GpuInit;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BYTES_PER_PIXEL: u32 = 4;

/// Offscreen GPU context: a fixed-size RGBA8 color target plus depth,
/// readable back to the CPU. Shader output is stored without sRGB encoding.
///
/// Used for snapshots and for tests that need real GPU output.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,

    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    width: u32,
    height: u32,
}

impl HeadlessGpu {
    /// Creates a device without a surface and allocates `width × height`
    /// targets.
    pub async fn new(width: u32, height: u32, init: GpuInit) -> Result<Self> {
        ensure!(width > 0 && height > 0, "offscreen target has zero size ({width}x{height})");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        log::info!("GPU adapter (headless): {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&device_descriptor(&init))
            .await
            .context("failed to create wgpu device/queue")?;

        let max = device.limits().max_texture_dimension_2d;
        ensure!(
            width <= max && height <= max,
            "offscreen target {width}x{height} exceeds the device limit of {max}"
        );

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen offscreen color"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (depth_texture, depth_view) =
            create_depth_texture(&device, width, height, "lumen offscreen depth");

        Ok(Self {
            device,
            queue,
            color_texture,
            color_view,
            _depth_texture: depth_texture,
            depth_view,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        COLOR_FORMAT
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Context for uploads (meshes, textures) outside of `render`.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            &self.device,
            &self.queue,
            COLOR_FORMAT,
            Viewport::new(self.width as f32, self.height as f32),
        )
    }

    /// Clears color to `clear` and depth to 1.0, runs `draw`, then submits.
    pub fn render<F>(&self, clear: ColorRgba, draw: F) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> Result<()>,
    {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen offscreen encoder"),
            });

        clear_color_depth(&mut encoder, &self.color_view, &self.depth_view, clear.to_wgpu());

        let rctx = self.render_ctx();
        {
            let mut target = RenderTarget::new(&mut encoder, &self.color_view, &self.depth_view);
            draw(&rctx, &mut target)?;
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Copies the color target back to the CPU (blocking).
    pub fn read_rgba(&self) -> Result<RgbaImage> {
        let unpadded = self.width * BYTES_PER_PIXEL;
        let padded = padded_bytes_per_row(self.width);

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen readback buffer"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("failed to poll wgpu device")?;
        receiver
            .recv()
            .map_err(|_| anyhow!("readback map callback was dropped"))?
            .context("failed to map readback buffer")?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            copy_tight_rows(&mapped, unpadded, padded, self.height)?
        };
        readback.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .context("readback size does not match the target")
    }
}

fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

fn copy_tight_rows(mapped: &[u8], unpadded: u32, padded: u32, height: u32) -> Result<Vec<u8>> {
    let (unpadded, padded) = (unpadded as usize, padded as usize);
    let required = padded * height as usize;
    ensure!(
        mapped.len() >= required,
        "mapped readback too small: expected at least {required} bytes, got {}",
        mapped.len()
    );

    let mut out = Vec::with_capacity(unpadded * height as usize);
    for row in mapped.chunks_exact(padded).take(height as usize) {
        out.extend_from_slice(&row[..unpadded]);
    }
    Ok(out)
}
