//! Alpha-mask detection and encoding
//!
//! An alpha mask is a companion texture that encodes per-pixel alpha in a
//! specific RGB pattern: red near zero, blue near max, green carrying the
//! alpha value itself. Detecting one is part of format auto-detection
//! (§4.C priority 4, tried before the generic has-alpha-channel check);
//! encoding one is a small, pure, file-I/O-free helper useful to anything
//! building an icon or mask generator on top of this crate.

use image::{GrayImage, Rgb, RgbImage, RgbaImage};

/// Red channel ceiling and blue channel floor that identify an alpha-mask
/// image when sampled at its centre pixel.
const ALPHA_MASK_RED_CEILING: u8 = 50;
const ALPHA_MASK_BLUE_FLOOR: u8 = 200;

/// Sample `image`'s centre pixel and report whether it matches the
/// alpha-mask pattern (red < 50, blue > 200).
pub fn is_alpha_mask(image: &RgbaImage) -> bool {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return false;
    }
    let pixel = image.get_pixel(width / 2, height / 2);
    pixel[0] < ALPHA_MASK_RED_CEILING && pixel[2] > ALPHA_MASK_BLUE_FLOOR
}

/// Encode a grayscale alpha channel into the alpha-mask RGB pattern:
/// red = 0, green = the alpha value, blue = 255.
pub fn encode_alpha_mask(alpha: &GrayImage) -> RgbImage {
    let (width, height) = alpha.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let value = alpha.get_pixel(x, y)[0];
        Rgb([0, value, 255])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn recognizes_alpha_mask_pattern_at_centre() {
        let mut image = RgbaImage::new(4, 4);
        for pixel in image.pixels_mut() {
            *pixel = Rgba([10, 128, 250, 255]);
        }
        assert!(is_alpha_mask(&image));
    }

    #[test]
    fn rejects_ordinary_opaque_image() {
        let mut image = RgbaImage::new(4, 4);
        for pixel in image.pixels_mut() {
            *pixel = Rgba([200, 150, 100, 255]);
        }
        assert!(!is_alpha_mask(&image));
    }

    #[test]
    fn empty_image_is_never_an_alpha_mask() {
        let image = RgbaImage::new(0, 0);
        assert!(!is_alpha_mask(&image));
    }

    #[test]
    fn encode_maps_alpha_into_green_channel() {
        let alpha = GrayImage::from_fn(2, 2, |x, _y| image::Luma([if x == 0 { 0 } else { 255 }]));
        let encoded = encode_alpha_mask(&alpha);
        assert_eq!(*encoded.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*encoded.get_pixel(1, 0), Rgb([0, 255, 255]));
    }
}
