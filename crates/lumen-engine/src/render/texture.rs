//! Mesh texture upload: RGBA8 (no sRGB decode, shading runs on the stored
//! byte values), full mip chain built on the CPU.

use anyhow::{ensure, Result};
use image::imageops::FilterType;
use image::RgbaImage;

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Number of levels in a full mip chain down to 1×1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Downsampled levels `1..` of `base`, each half the previous (floored,
/// at least 1 texel). Level 0 is `base` itself and is not included.
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut out: Vec<RgbaImage> = Vec::with_capacity(levels.saturating_sub(1) as usize);

    for _ in 1..levels {
        let prev = out.last().unwrap_or(base);
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, w, h, FilterType::Triangle);
        out.push(next);
    }
    out
}

/// A sampled 2D texture with its default view.
pub(super) struct MeshTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl MeshTexture {
    /// Uploads `image` and all its mip levels.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Result<Self> {
        let (width, height) = image.dimensions();
        ensure!(width > 0 && height > 0, "texture has zero size ({width}x{height})");

        let max = device.limits().max_texture_dimension_2d;
        ensure!(
            width <= max && height <= max,
            "texture {width}x{height} exceeds the device limit of {max}"
        );

        let mip_level_count = mip_level_count(width, height);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        write_level(queue, &texture, 0, image);
        for (level, mip) in mip_chain(image).iter().enumerate() {
            write_level(queue, &texture, level as u32 + 1, mip);
        }

        log::debug!("texture upload: {width}x{height}, {mip_level_count} mip levels");

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            _texture: texture,
            view,
        })
    }

    /// 1×1 opaque white, bound until a real texture is set.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self> {
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::upload(device, queue, &white, "lumen mesh default texture")
    }
}

fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, mip_level: u32, level: &RgbaImage) {
    let (w, h) = level.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        level.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
}

/// Wrap-repeat sampler: bilinear magnification, trilinear minification.
pub(super) fn repeat_trilinear_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("lumen mesh sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 17), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn chain_halves_down_to_one() {
        let base = RgbaImage::new(8, 3);
        let sizes: Vec<(u32, u32)> = mip_chain(&base).iter().map(|m| m.dimensions()).collect();
        assert_eq!(sizes, vec![(4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn single_texel_has_no_extra_levels() {
        assert!(mip_chain(&RgbaImage::new(1, 1)).is_empty());
    }

    #[test]
    fn uniform_colour_survives_downsampling() {
        let base = RgbaImage::from_pixel(16, 16, image::Rgba([10, 200, 30, 255]));
        let last = mip_chain(&base).pop().unwrap_or(base.clone());
        assert_eq!(last.dimensions(), (1, 1));
        let px = last.get_pixel(0, 0).0;
        for (got, want) in px.iter().zip([10u8, 200, 30, 255]) {
            assert!(got.abs_diff(want) <= 1, "{px:?}");
        }
    }
}
