//! Heightmap loading and sampling

use std::path::Path;

use image::DynamicImage;
use talus_core::{Result, TalusError};

/// A grayscale heightmap decoded from an 8-bit image
#[derive(Debug)]
pub struct Heightmap {
    /// Row-major height values normalized to [0..1]
    samples: Vec<f32>,
    /// Width in pixels
    pub width: u32,
    /// Height (depth along Z) in pixels
    pub height: u32,
}

impl Heightmap {
    /// Load a heightmap from an image file.
    ///
    /// Only the first channel of each pixel is read, normalized from
    /// 0..255 to [0..1]. Fails with `AssetLoad` if the file cannot be
    /// opened or decoded; the terrain cannot exist without it.
    pub fn from_image(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .map_err(|e| TalusError::asset_load(path.display().to_string(), e))?;
        Self::from_decoded(img, &path.display().to_string())
    }

    /// Build a heightmap from an already-decoded image.
    ///
    /// `source` names the image in error messages.
    pub fn from_decoded(img: DynamicImage, source: &str) -> Result<Self> {
        let width = img.width();
        let height = img.height();
        if width == 0 || height == 0 {
            return Err(TalusError::InvalidFormat(format!(
                "heightmap '{}' has zero size ({}x{})",
                source, width, height
            )));
        }
        if img.color().channel_count() == 0 {
            return Err(TalusError::InvalidFormat(format!(
                "heightmap '{}' has no color channels",
                source
            )));
        }

        // First channel only: red for color images, gray for grayscale
        let rgba = img.to_rgba8();
        let samples: Vec<f32> = rgba.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

        Ok(Self {
            samples,
            width,
            height,
        })
    }

    /// Create a heightmap from raw normalized data (for testing)
    pub fn from_raw(samples: Vec<f32>, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0);
        assert_eq!(samples.len(), (width * height) as usize);
        Self {
            samples,
            width,
            height,
        }
    }

    /// Height sample at exact grid coordinates, in [0..1]
    pub fn get(&self, x: u32, z: u32) -> f32 {
        self.samples[(z * self.width + x) as usize]
    }

    /// The raw sample array, row-major
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn decodes_first_channel_normalized() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, image::Luma([0]));
        img.put_pixel(1, 0, image::Luma([255]));

        let hm = Heightmap::from_decoded(DynamicImage::ImageLuma8(img), "test").unwrap();
        assert_eq!(hm.width, 2);
        assert_eq!(hm.height, 1);
        assert!((hm.get(0, 0) - 0.0).abs() < 1e-6);
        assert!((hm.get(1, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn color_images_use_red_channel() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgb([51, 200, 10]));

        let hm = Heightmap::from_decoded(DynamicImage::ImageRgb8(img), "test").unwrap();
        assert!((hm.get(0, 0) - 51.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = Heightmap::from_decoded(img, "empty").unwrap_err();
        assert!(matches!(err, TalusError::InvalidFormat(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Heightmap::from_image(Path::new("does/not/exist.png")).unwrap_err();
        match err {
            TalusError::AssetLoad { path, .. } => assert!(path.contains("exist.png")),
            other => panic!("expected AssetLoad, got {other:?}"),
        }
    }
}
