//! Average-color sampling for background suggestions.

use image::RgbaImage;

use crate::color::{DEFAULT_SOFTEN_AMOUNT, RgbColor, blend_over_backdrop, soften};

/// Reduces an image to a single representative opaque color.
///
/// All pixels are area-averaged into one premultiplied sample, the same value
/// a 1x1 smooth downscale produces. A fully transparent sample yields
/// `fallback` untouched; otherwise the averaged color is composited over white
/// using the averaged alpha.
pub fn sample_average_color(image: &RgbaImage, fallback: RgbColor) -> RgbColor {
    let mut total_r: u64 = 0;
    let mut total_g: u64 = 0;
    let mut total_b: u64 = 0;
    let mut total_a: u64 = 0;

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u64;
        total_r += r as u64 * a;
        total_g += g as u64 * a;
        total_b += b as u64 * a;
        total_a += a;
    }

    let count = image.width() as u64 * image.height() as u64;
    if count == 0 || total_a == 0 {
        return fallback;
    }

    let average = |total: u64| ((total as f64 / total_a as f64).round()).min(255.0) as u8;
    let sampled = RgbColor::new(average(total_r), average(total_g), average(total_b));
    let alpha = total_a as f64 / (count as f64 * 255.0);

    log::trace!("sampled {sampled:?} at alpha {alpha:.3}");
    blend_over_backdrop(sampled, alpha, RgbColor::WHITE)
}

/// Suggests a background for an image: its softened average color.
pub fn suggest_background(image: &RgbaImage, fallback: RgbColor) -> RgbColor {
    soften(sample_average_color(image, fallback), DEFAULT_SOFTEN_AMOUNT)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const FALLBACK: RgbColor = RgbColor::new(240, 240, 240);

    #[test]
    fn transparent_image_returns_fallback() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 0]));
        assert_eq!(sample_average_color(&img, FALLBACK), FALLBACK);
        assert_eq!(sample_average_color(&img, RgbColor::WHITE), RgbColor::WHITE);
    }

    #[test]
    fn empty_image_returns_fallback() {
        let img = RgbaImage::new(0, 0);
        assert_eq!(sample_average_color(&img, FALLBACK), FALLBACK);
    }

    #[test]
    fn opaque_image_averages_channels() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        assert_eq!(sample_average_color(&img, FALLBACK), RgbColor::new(100, 50, 25));
    }

    #[test]
    fn transparent_pixels_lighten_toward_white() {
        // Half the pixels are transparent: the black half is composited at 50%.
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([90, 90, 90, 0]));
        assert_eq!(sample_average_color(&img, FALLBACK), RgbColor::new(128, 128, 128));
    }

    #[test]
    fn suggestion_is_softened() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        assert_eq!(suggest_background(&img, FALLBACK), RgbColor::new(38, 38, 38));
    }
}
