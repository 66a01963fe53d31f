// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page preprocessor: grayscale, contrast and sharpness enhancement, median
// denoise, and automatic contrast stretch ahead of OCR. Operates on in-memory
// images using the `image` and `imageproc` crates.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use kurdocx_core::error::ConvertError;
use tracing::{debug, instrument};

/// Blur radius used as the "smooth" reference for sharpening.
const SHARPEN_SIGMA: f32 = 1.0;
/// Median filter radius (1 = 3x3 kernel).
const DENOISE_RADIUS: u32 = 1;

/// Enhancement factors for [`PagePreprocessor::prepare_for_ocr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhanceFactors {
    /// 1.0 leaves contrast unchanged.
    pub contrast: f32,
    /// 1.0 leaves sharpness unchanged.
    pub sharpness: f32,
}

impl Default for EnhanceFactors {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            sharpness: 1.0,
        }
    }
}

/// Grayscale normalisation pipeline for one rasterized page.
///
/// Each method consumes `self` and returns a new `PagePreprocessor` wrapping
/// the transformed image, enabling method chaining:
///
/// ```ignore
/// let ready = PagePreprocessor::grayscale(page)
///     .enhance_contrast(1.5)
///     .enhance_sharpness(1.5)
///     .denoise()
///     .auto_contrast();
/// ```
pub struct PagePreprocessor {
    /// 8-bit luma working image.
    image: GrayImage,
}

impl PagePreprocessor {
    // -- Construction ---------------------------------------------------------

    /// First step of the chain: convert a decoded page to 8-bit luma.
    pub fn grayscale(image: DynamicImage) -> Self {
        debug!(color = ?image.color(), "Converting to grayscale");
        Self {
            image: image.to_luma8(),
        }
    }

    /// Run the full normalisation used before every OCR call.
    #[instrument(skip(image))]
    pub fn prepare_for_ocr(image: DynamicImage, factors: EnhanceFactors) -> Self {
        Self::grayscale(image)
            .enhance_contrast(factors.contrast)
            .enhance_sharpness(factors.sharpness)
            .denoise()
            .auto_contrast()
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the preprocessor and return the working image.
    pub fn into_gray(self) -> GrayImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Scale each pixel's distance from the mean gray level by `factor`.
    ///
    /// 1.0 is a no-op, 0.0 gives a flat mean-gray image.
    #[instrument(skip(self))]
    pub fn enhance_contrast(self, factor: f32) -> Self {
        let mean = mean_level(&self.image);
        debug!(mean, "Adjusting contrast");

        let contrasted = GrayImage::from_fn(self.image.width(), self.image.height(), |x, y| {
            let value = self.image.get_pixel(x, y).0[0] as f32;
            Luma([clamp_u8(mean + factor * (value - mean))])
        });
        Self { image: contrasted }
    }

    /// Blend away from (factor > 1) or towards (factor < 1) a blurred copy.
    #[instrument(skip(self))]
    pub fn enhance_sharpness(self, factor: f32) -> Self {
        let blurred = gaussian_blur_f32(&self.image, SHARPEN_SIGMA);

        let sharpened = GrayImage::from_fn(self.image.width(), self.image.height(), |x, y| {
            let original = self.image.get_pixel(x, y).0[0] as f32;
            let smooth = blurred.get_pixel(x, y).0[0] as f32;
            Luma([clamp_u8(smooth + factor * (original - smooth))])
        });
        Self { image: sharpened }
    }

    /// 3x3 median filter to remove salt-and-pepper scan noise.
    #[instrument(skip(self))]
    pub fn denoise(self) -> Self {
        Self {
            image: median_filter(&self.image, DENOISE_RADIUS, DENOISE_RADIUS),
        }
    }

    /// Stretch the darkest pixel to 0 and the brightest to 255.
    ///
    /// A uniform image is returned unchanged.
    #[instrument(skip(self))]
    pub fn auto_contrast(self) -> Self {
        let (low, high) = level_bounds(&self.image);
        if high <= low {
            debug!(low, "Uniform image, skipping contrast stretch");
            return self;
        }

        let scale = 255.0 / (high - low) as f32;
        let mut lut = [0u8; 256];
        for (level, slot) in lut.iter_mut().enumerate() {
            let shifted = level as f32 - low as f32;
            *slot = clamp_u8(shifted * scale);
        }

        let mut image = self.image;
        for pixel in image.pixels_mut() {
            pixel.0[0] = lut[pixel.0[0] as usize];
        }
        debug!(low, high, "Contrast stretched");
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConvertError> {
        self.image.save(path.as_ref()).map_err(|err| {
            ConvertError::Image(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn mean_level(image: &GrayImage) -> f32 {
    let count = (image.width() as u64 * image.height() as u64).max(1);
    let sum: u64 = image.pixels().map(|p| p.0[0] as u64).sum();
    sum as f32 / count as f32
}

fn level_bounds(image: &GrayImage) -> (u8, u8) {
    image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(low, high), p| {
            (low.min(p.0[0]), high.max(p.0[0]))
        })
}
