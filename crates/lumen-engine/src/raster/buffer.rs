use anyhow::{Context, Result};

/// Owned RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wraps an existing RGBA8 buffer.
    ///
    /// Fails when `data.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height)
            .context("image dimensions overflow the address space")?;
        anyhow::ensure!(
            data.len() == expected,
            "RGBA buffer for {width}x{height} must be {expected} bytes, got {}",
            data.len()
        );
        Ok(Self { width, height, data })
    }

    /// Image of the given size filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(pixels * Self::BYTES_PER_PIXEL).collect();
        Self { width, height, data }
    }

    fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(Self::BYTES_PER_PIXEL)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of pixel `(x, y)`. Caller guarantees bounds.
    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        let px = &self.data[i..i + Self::BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Overwrites pixel `(x, y)`; ignored outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i..i + Self::BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }
}

impl From<image::RgbaImage> for RasterImage {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height, data: img.into_raw() }
    }
}

impl From<&image::DynamicImage> for RasterImage {
    fn from(img: &image::DynamicImage) -> Self {
        img.to_rgba8().into()
    }
}

impl TryFrom<RasterImage> for image::RgbaImage {
    type Error = anyhow::Error;

    fn try_from(img: RasterImage) -> Result<Self> {
        image::RgbaImage::from_raw(img.width, img.height, img.data)
            .context("RGBA buffer does not match image dimensions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_exact_length() {
        let img = RasterImage::new(2, 3, vec![0; 24]).unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
    }

    #[test]
    fn new_rejects_short_buffer() {
        let err = RasterImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("must be 16 bytes"));
    }

    #[test]
    fn empty_image_is_valid() {
        assert!(RasterImage::new(0, 5, Vec::new()).is_ok());
    }

    #[test]
    fn pixel_access_is_row_major() {
        let mut img = RasterImage::filled(3, 2, [0, 0, 0, 255]);
        img.set_pixel(2, 1, [1, 2, 3, 4]);
        assert_eq!(&img.data()[20..24], &[1, 2, 3, 4]);
        assert_eq!(img.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn converts_through_image_crate() {
        let img = RasterImage::filled(4, 1, [9, 8, 7, 6]);
        let rgba: image::RgbaImage = img.clone().try_into().unwrap();
        assert_eq!(rgba.get_pixel(3, 0).0, [9, 8, 7, 6]);
        assert_eq!(RasterImage::from(rgba), img);
    }
}
