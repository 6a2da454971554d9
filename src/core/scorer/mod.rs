//! Similarity scoring between normalized rasters.
//!
//! The score is the normalized cross-correlation coefficient: subtract
//! each raster's mean, sum the element-wise products, and divide by the
//! square root of the product of the two sums of squares. The result is
//! invariant to uniform brightness and contrast shifts and always lies
//! in [-1, 1].
//!
//! Degenerate cases are pinned down rather than left to float
//! arithmetic:
//!
//! - two identical rasters score exactly 1.0
//! - an all-constant raster (zero variance) scores exactly 0.0 against
//!   anything else, never NaN

use crate::core::normalizer::IconRaster;
use crate::error::ScoreError;

/// Correlate two rasters of identical dimensions.
///
/// Accumulates in f64 regardless of raster size. Mismatched dimensions
/// are a programming error, not a data error, and fail immediately.
pub fn score(a: &IconRaster, b: &IconRaster) -> Result<f64, ScoreError> {
    if a.dimensions() != b.dimensions() {
        return Err(ScoreError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }

    if a.pixels() == b.pixels() {
        return Ok(1.0);
    }

    let pa = a.pixels();
    let pb = b.pixels();
    let count = pa.len() as f64;

    let mean_a = pa.iter().map(|&v| f64::from(v)).sum::<f64>() / count;
    let mean_b = pb.iter().map(|&v| f64::from(v)).sum::<f64>() / count;

    let mut cross = 0.0f64;
    let mut sum_sq_a = 0.0f64;
    let mut sum_sq_b = 0.0f64;
    for (&va, &vb) in pa.iter().zip(pb) {
        let da = f64::from(va) - mean_a;
        let db = f64::from(vb) - mean_b;
        cross += da * db;
        sum_sq_a += da * da;
        sum_sq_b += db * db;
    }

    if sum_sq_a == 0.0 || sum_sq_b == 0.0 {
        return Ok(0.0);
    }

    Ok((cross / (sum_sq_a * sum_sq_b).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> IconRaster {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        IconRaster::from_raw(width, height, pixels).unwrap()
    }

    fn gradient() -> IconRaster {
        raster(8, 8, |x, y| (x * 16 + y * 2) as u8)
    }

    #[test]
    fn identical_rasters_score_one() {
        let a = gradient();
        let b = a.clone();
        assert_eq!(score(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn inverted_raster_scores_minus_one() {
        let a = gradient();
        let b = raster(8, 8, |x, y| 255 - (x * 16 + y * 2) as u8);
        let s = score(&a, &b).unwrap();
        assert!((s + 1.0).abs() < 1e-9, "expected -1.0, got {}", s);
    }

    #[test]
    fn score_is_symmetric() {
        let a = gradient();
        let b = raster(8, 8, |x, y| ((x ^ y) * 31) as u8);
        assert_eq!(score(&a, &b).unwrap(), score(&b, &a).unwrap());
    }

    #[test]
    fn score_stays_within_bounds() {
        let patterns: Vec<IconRaster> = vec![
            gradient(),
            raster(8, 8, |x, y| if (x + y) % 2 == 0 { 255 } else { 0 }),
            raster(8, 8, |x, _| if x < 4 { 10 } else { 240 }),
            raster(8, 8, |x, y| ((x * 37 + y * 11) % 256) as u8),
        ];

        for a in &patterns {
            for b in &patterns {
                let s = score(a, b).unwrap();
                assert!((-1.0..=1.0).contains(&s), "score out of range: {}", s);
            }
        }
    }

    #[test]
    fn constant_raster_scores_zero_against_different_raster() {
        let white = raster(8, 8, |_, _| 255);
        let black = raster(8, 8, |_, _| 0);
        let textured = gradient();

        assert_eq!(score(&white, &black).unwrap(), 0.0);
        assert_eq!(score(&white, &textured).unwrap(), 0.0);
        assert_eq!(score(&textured, &black).unwrap(), 0.0);
    }

    #[test]
    fn identical_constant_rasters_still_score_one() {
        let white = raster(8, 8, |_, _| 255);
        assert_eq!(score(&white, &white.clone()).unwrap(), 1.0);
    }

    #[test]
    fn brightness_offset_does_not_change_the_score() {
        let a = raster(8, 8, |x, y| (x * 10 + y * 5) as u8);
        let brighter = raster(8, 8, |x, y| (x * 10 + y * 5) as u8 + 100);
        let s = score(&a, &brighter).unwrap();
        assert!((s - 1.0).abs() < 1e-9, "expected 1.0, got {}", s);
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let a = raster(8, 8, |_, _| 7);
        let b = raster(4, 4, |_, _| 7);
        match score(&a, &b) {
            Err(ScoreError::DimensionMismatch { left, right }) => {
                assert_eq!(left, (8, 8));
                assert_eq!(right, (4, 4));
            }
            other => panic!("Expected dimension mismatch, got {:?}", other),
        }
    }
}
