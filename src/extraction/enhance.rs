//! Deterministic image enhancement chain tuned for OCR accuracy.
//!
//! In `Processed` mode the chain is fixed and order-sensitive:
//! grayscale → Otsu binarization → despeckle opening → RGB →
//! contrast ×2.0 → sharpness ×2.0 → brightness ×1.2 → saturation ×1.5
//! (image inputs only; PDF pages skip the saturation step).
//! Identical input and mode always produce byte-identical output.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;

use super::types::ExtractionMode;

const CONTRAST_FACTOR: f32 = 2.0;
const SHARPNESS_FACTOR: f32 = 2.0;
const BRIGHTNESS_FACTOR: f32 = 1.2;
const SATURATION_FACTOR: f32 = 1.5;

/// Radius of the despeckle structuring element. 0 keeps the element at a
/// single pixel (1×1), the minimal opening the recognizer is tuned for.
const OPENING_RADIUS: u8 = 0;

/// Composes the enhancement steps for one input class.
pub struct EnhancementPipeline {
    apply_saturation: bool,
}

impl EnhancementPipeline {
    /// Chain for standalone image files: includes the saturation step.
    pub fn for_image() -> Self {
        Self {
            apply_saturation: true,
        }
    }

    /// Chain for rendered PDF pages: no saturation step.
    pub fn for_pdf_page() -> Self {
        Self {
            apply_saturation: false,
        }
    }

    /// Run the chain. `Original` mode is the identity transform.
    pub fn run(&self, image: &RgbImage, mode: ExtractionMode) -> RgbImage {
        match mode {
            ExtractionMode::Original => image.clone(),
            ExtractionMode::Processed => self.process(image),
        }
    }

    fn process(&self, image: &RgbImage) -> RgbImage {
        let gray = image::imageops::grayscale(image);
        let binary = binarize(&gray, otsu_level(&gray));
        let opened = open(&binary, Norm::LInf, OPENING_RADIUS);
        let rgb = gray_to_rgb(&opened);

        let rgb = adjust_contrast(&rgb, CONTRAST_FACTOR);
        let rgb = adjust_sharpness(&rgb, SHARPNESS_FACTOR);
        let rgb = adjust_brightness(&rgb, BRIGHTNESS_FACTOR);
        if self.apply_saturation {
            adjust_saturation(&rgb, SATURATION_FACTOR)
        } else {
            rgb
        }
    }
}

/// Global binary threshold: pixels above `level` become white, the rest
/// black.
fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > level { 255 } else { 0 };
    }
    out
}

fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    let mut out = RgbImage::new(gray.width(), gray.height());
    for (dst, src) in out.pixels_mut().zip(gray.pixels()) {
        let v = src.0[0];
        dst.0 = [v, v, v];
    }
    out
}

/// Linear interpolation between a degenerate image and the input:
/// `out = base + (image - base) * factor`, per channel, clamped.
/// Factor 1.0 returns the input; factors above 1.0 amplify the difference.
fn interpolate(base: &RgbImage, image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (dst, (b, s)) in out
        .pixels_mut()
        .zip(base.pixels().zip(image.pixels()))
    {
        for c in 0..3 {
            let v = b.0[c] as f32 + (s.0[c] as f32 - b.0[c] as f32) * factor;
            dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Contrast: interpolate against a solid gray image at the input's mean
/// luminance.
fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let gray = image::imageops::grayscale(image);
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let mean = ((sum as f64 / count as f64) + 0.5) as u8;
    let base = RgbImage::from_pixel(image.width(), image.height(), Rgb([mean, mean, mean]));
    interpolate(&base, image, factor)
}

/// Sharpness: interpolate against a 3×3 smoothed copy of the input.
fn adjust_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let base = smooth(image);
    interpolate(&base, image, factor)
}

/// Brightness: interpolate against black.
fn adjust_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let base = RgbImage::new(image.width(), image.height());
    interpolate(&base, image, factor)
}

/// Saturation: interpolate against the grayscale version of the input.
fn adjust_saturation(image: &RgbImage, factor: f32) -> RgbImage {
    let base = gray_to_rgb(&image::imageops::grayscale(image));
    interpolate(&base, image, factor)
}

/// 3×3 smoothing kernel (center-weighted), edge pixels sampled with
/// clamping.
fn smooth(image: &RgbImage) -> RgbImage {
    const KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];
    const DIVISOR: f32 = 13.0;

    let (w, h) = image.dimensions();
    let mut out = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for ky in 0..3i64 {
                for kx in 0..3i64 {
                    let sx = (x as i64 + kx - 1).clamp(0, w as i64 - 1) as u32;
                    let sy = (y as i64 + ky - 1).clamp(0, h as i64 - 1) as u32;
                    let px = image.get_pixel(sx, sy);
                    let weight = KERNEL[(ky * 3 + kx) as usize];
                    for c in 0..3 {
                        acc[c] += px.0[c] as f32 * weight;
                    }
                }
            }
            let dst = out.get_pixel_mut(x, y);
            for c in 0..3 {
                dst.0[c] = (acc[c] / DIVISOR).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}
