//! Fixed 3x3 Gaussian smoothing applied after resizing.
//!
//! The kernel is the binomial [1, 2, 1] / 4 per axis, the smallest
//! Gaussian approximation. It runs as two separable passes with a
//! single rounding step at the end, and mirrors pixels at the borders
//! (the edge pixel itself is not repeated).

use image::GrayImage;

const KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

/// Mirror an out-of-range index back into [0, len), skipping the edge
/// sample itself: -1 maps to 1, len maps to len - 2.
fn mirror(index: i64, len: i64) -> usize {
    let reflected = if index < 0 {
        -index
    } else if index >= len {
        2 * len - 2 - index
    } else {
        index
    };
    reflected.clamp(0, len - 1) as usize
}

/// Smooth a grayscale image with the fixed 3x3 Gaussian kernel.
pub fn gaussian_3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let w = width as usize;
    let h = height as usize;
    let src = image.as_raw();

    // Horizontal pass kept in f32 so rounding happens only once
    let mut horizontal = vec![0f32; w * h];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = 0f32;
            for (k, weight) in KERNEL.iter().enumerate() {
                let sx = mirror(x as i64 + k as i64 - 1, width as i64);
                acc += weight * f32::from(src[row + sx]);
            }
            horizontal[row + x] = acc;
        }
    }

    // Vertical pass writes straight into the output buffer
    let mut out = GrayImage::new(width, height);
    let out_data: &mut [u8] = &mut out;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (k, weight) in KERNEL.iter().enumerate() {
                let sy = mirror(y as i64 + k as i64 - 1, height as i64);
                acc += weight * horizontal[sy * w + x];
            }
            out_data[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn impulse(width: u32, height: u32, x: u32, y: u32) -> GrayImage {
        let mut image = GrayImage::new(width, height);
        image.put_pixel(x, y, Luma([255]));
        image
    }

    #[test]
    fn preserves_dimensions() {
        let smoothed = gaussian_3x3(&GrayImage::new(64, 64));
        assert_eq!(smoothed.dimensions(), (64, 64));
    }

    #[test]
    fn solid_image_is_unchanged() {
        let solid = GrayImage::from_pixel(16, 16, Luma([200]));
        let smoothed = gaussian_3x3(&solid);
        assert!(smoothed.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn interior_impulse_spreads_with_binomial_weights() {
        let smoothed = gaussian_3x3(&impulse(5, 5, 2, 2));

        // 255 * [4, 2, 1] / 16, rounded to nearest
        assert_eq!(smoothed.get_pixel(2, 2)[0], 64);
        assert_eq!(smoothed.get_pixel(1, 2)[0], 32);
        assert_eq!(smoothed.get_pixel(3, 2)[0], 32);
        assert_eq!(smoothed.get_pixel(2, 1)[0], 32);
        assert_eq!(smoothed.get_pixel(2, 3)[0], 32);
        assert_eq!(smoothed.get_pixel(1, 1)[0], 16);
        assert_eq!(smoothed.get_pixel(3, 3)[0], 16);

        // Kernel radius is 1, nothing reaches two pixels away
        assert_eq!(smoothed.get_pixel(0, 2)[0], 0);
        assert_eq!(smoothed.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn corner_impulse_mirrors_at_the_border() {
        let smoothed = gaussian_3x3(&impulse(4, 4, 0, 0));

        // Mirrored neighbors are zero, so the corner keeps the same
        // spread as an interior pixel
        assert_eq!(smoothed.get_pixel(0, 0)[0], 64);
        assert_eq!(smoothed.get_pixel(1, 0)[0], 32);
        assert_eq!(smoothed.get_pixel(0, 1)[0], 32);
        assert_eq!(smoothed.get_pixel(1, 1)[0], 16);
    }

    #[test]
    fn smoothing_is_deterministic() {
        let image = GrayImage::from_fn(32, 32, |x, y| Luma([((x * 7 + y * 13) % 251) as u8]));
        assert_eq!(gaussian_3x3(&image).as_raw(), gaussian_3x3(&image).as_raw());
    }
}
