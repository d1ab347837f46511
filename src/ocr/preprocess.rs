//! Image normalization ahead of OCR
//!
//! Grayscale conversion followed by a fixed contrast boost around the mean
//! luminance of the image.

use image::{DynamicImage, GrayImage, Luma};

/// Contrast multiplier applied after grayscale conversion
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Normalize an image for text recognition
///
/// Always returns a single-channel 8-bit luminance image.
#[must_use]
pub fn preprocess(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    DynamicImage::ImageLuma8(enhance_contrast(&gray, CONTRAST_FACTOR))
}

/// Scale every pixel's distance from the mean luminance by `factor`
#[must_use]
pub fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let pivot = mean_luminance(gray);

    let mut out = gray.clone();
    for Luma([p]) in out.pixels_mut() {
        let v = (f32::from(*p) - pivot).mul_add(factor, pivot);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            *p = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Mean pixel value rounded to the nearest integer level
fn mean_luminance(gray: &GrayImage) -> f32 {
    let count = u64::from(gray.width()) * u64::from(gray.height());
    if count == 0 {
        return 0.0;
    }

    let sum: u64 = gray.pixels().map(|Luma([p])| u64::from(*p)).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / count as f64;

    #[allow(clippy::cast_possible_truncation)]
    {
        mean.round() as f32
    }
}

#[cfg(test)]
mod tests {
    use image::{ColorType, Rgb, RgbImage};

    use super::*;

    fn two_tone() -> DynamicImage {
        // Left half dark gray, right half light gray
        let img = RgbImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([100, 100, 100])
            } else {
                Rgb([150, 150, 150])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn converts_to_luminance() {
        let out = preprocess(&two_tone());
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!((out.width(), out.height()), (4, 2));
    }

    #[test]
    fn second_pass_keeps_mode() {
        let once = preprocess(&two_tone());
        let twice = preprocess(&once);
        assert_eq!(twice.color(), ColorType::L8);
    }

    #[test]
    fn contrast_spreads_around_mean() {
        let gray = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([100]) } else { Luma([150]) });
        let out = enhance_contrast(&gray, 2.0);
        // mean = 125: 125 + 2 * (100 - 125) = 75, 125 + 2 * (150 - 125) = 175
        assert_eq!(out.get_pixel(0, 0), &Luma([75]));
        assert_eq!(out.get_pixel(1, 0), &Luma([175]));
    }

    #[test]
    fn contrast_saturates() {
        let gray = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([0]) } else { Luma([255]) });
        let out = enhance_contrast(&gray, 2.0);
        assert_eq!(out.get_pixel(0, 0), &Luma([0]));
        assert_eq!(out.get_pixel(1, 0), &Luma([255]));
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let gray = GrayImage::from_pixel(3, 3, Luma([42]));
        assert_eq!(enhance_contrast(&gray, 2.0), gray);
    }

    #[test]
    fn empty_image_is_fine() {
        let gray = GrayImage::new(0, 0);
        assert_eq!(enhance_contrast(&gray, 2.0).dimensions(), (0, 0));
    }
}
