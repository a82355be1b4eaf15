//! Unsharp-mask sharpening.
//!
//! `out = orig + amount × (orig − blur(orig))` per channel, applied only where
//! `|orig − blur(orig)| ≥ threshold`. The blur is a Gaussian with σ = radius.

use image::{DynamicImage, ImageBuffer, Pixel};
use imageproc::filter::gaussian_blur_f32;

const RADIUS: f32 = 0.5;
const AMOUNT: f32 = 1.5;
const THRESHOLD: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    pub radius: f32,
    pub amount: f32,
    pub threshold: u8,
}

impl Default for UnsharpMask {
    /// Radius 0.5, amount 150 %, threshold 3.
    fn default() -> Self {
        Self {
            radius: RADIUS,
            amount: AMOUNT,
            threshold: THRESHOLD,
        }
    }
}

impl UnsharpMask {
    pub fn apply<P>(&self, image: &ImageBuffer<P, Vec<u8>>) -> ImageBuffer<P, Vec<u8>>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        let blurred = gaussian_blur_f32(image, self.radius);
        let mut sharpened = image.clone();

        for (pixel, blurred_pixel) in sharpened.pixels_mut().zip(blurred.pixels()) {
            *pixel = pixel.map2(blurred_pixel, |original, blur| {
                self.sharpen_channel(original, blur)
            });
        }

        sharpened
    }

    /// Sharpen an 8-bit grey or RGB image. Other layouts are converted to RGB first.
    pub fn apply_dynamic(&self, image: &DynamicImage) -> DynamicImage {
        match image {
            DynamicImage::ImageLuma8(buffer) => DynamicImage::ImageLuma8(self.apply(buffer)),
            DynamicImage::ImageRgb8(buffer) => DynamicImage::ImageRgb8(self.apply(buffer)),
            other => DynamicImage::ImageRgb8(self.apply(&other.to_rgb8())),
        }
    }

    fn sharpen_channel(&self, original: u8, blurred: u8) -> u8 {
        let diff = original as i16 - blurred as i16;
        if diff.unsigned_abs() < self.threshold as u16 {
            return original;
        }

        (original as f32 + diff as f32 * self.amount)
            .round()
            .clamp(0.0, 255.0) as u8
    }
}
