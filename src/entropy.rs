use crate::crop::Rect;
use crate::histogram::{histogram, LayoutTag};
use crate::source::ImageSource;

/// Shannon entropy, in bits, of the pixel values inside `rect`
///
/// Alpha is ignored for packed RGBA images and only luma is scored for planar
/// YCbCr images; every other layout scores all of its channels. A region with
/// no samples (empty rectangle or unsupported layout) scores `0.0`.
///
/// # Example
/// ```rust
/// use entropy_crop::{entropy, Rect};
/// use image::GrayImage;
///
/// let flat = GrayImage::new(8, 8);
/// assert_eq!(entropy(&flat, Rect::new(0, 0, 8, 8)), 0.0);
///
/// let ramp = GrayImage::from_fn(256, 1, |x, _| image::Luma([x as u8]));
/// assert!((entropy(&ramp, Rect::new(0, 0, 256, 1)) - 8.0).abs() < 1e-9);
/// ```
pub fn entropy<I: ImageSource + ?Sized>(image: &I, rect: Rect) -> f64 {
    let (hist, tag) = histogram(image, rect);
    entropy_of_counts(scored_buckets(&hist, tag))
}

fn scored_buckets(hist: &[u64], tag: LayoutTag) -> &[u64] {
    let keep = match tag {
        LayoutTag::Rgba => 3 * 256,
        LayoutTag::YCbCr => 256,
        _ => hist.len(),
    };
    &hist[..keep.min(hist.len())]
}

/// Shannon entropy of raw bucket counts
///
/// Empty buckets contribute nothing. All-zero (or empty) input returns `0.0`.
pub fn entropy_of_counts(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let sum: f64 = counts
        .iter()
        .filter(|&&c| c != 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * p.log2()
        })
        .sum();

    -sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChromaSubsampling, PlanarYCbCr};
    use image::{GrayImage, Rgba, RgbaImage};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_uniform_region_is_zero() {
        let img = GrayImage::from_pixel(10, 10, image::Luma([77]));
        assert_eq!(entropy(&img, Rect::new(0, 0, 10, 10)), 0.0);
    }

    #[test]
    fn test_two_values_is_one_bit() {
        let img = GrayImage::from_fn(10, 4, |x, _| image::Luma([if x < 5 { 0 } else { 255 }]));
        assert!((entropy(&img, Rect::new(0, 0, 10, 4)) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        assert_eq!(entropy_of_counts(&[]), 0.0);
        assert_eq!(entropy_of_counts(&[0; 256]), 0.0);

        let img = GrayImage::from_fn(4, 4, |x, y| image::Luma([(x + y) as u8]));
        let score = entropy(&img, Rect::new(2, 2, 2, 4));
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
    }

    #[test]
    fn test_counts_past_u32_range() {
        let big = u32::MAX as u64 + 1;
        assert!((entropy_of_counts(&[big, big]) - 1.0).abs() < EPS);
        assert!((entropy_of_counts(&[big, 0, big, big, big]) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_alpha_does_not_change_score() {
        let opaque =
            RgbaImage::from_fn(16, 16, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]));
        let mut translucent = opaque.clone();
        for (x, y, px) in translucent.enumerate_pixels_mut() {
            px.0[3] = (x * 16 + y) as u8;
        }

        let rect = Rect::new(0, 0, 16, 16);
        assert_eq!(entropy(&opaque, rect), entropy(&translucent, rect));
    }

    #[test]
    fn test_rgba_bound() {
        // Every value once per colour channel, bounded by log2(768)
        let img = RgbaImage::from_fn(256, 1, |x, _| Rgba([x as u8, x as u8, x as u8, 0]));
        let score = entropy(&img, Rect::new(0, 0, 256, 1));
        assert!((score - 768f64.log2()).abs() < EPS);
    }

    #[test]
    fn test_planar_scores_luma_only() {
        let y = [0, 0, 255, 255];
        let flat = [128u8; 4];
        let busy = [0u8, 60, 120, 240];
        let rect = Rect::new(0, 0, 4, 1);

        let a = PlanarYCbCr::new(&y, &flat, &flat, 4, 4, 4, 1, ChromaSubsampling::Yuv444).unwrap();
        let b = PlanarYCbCr::new(&y, &busy, &busy, 4, 4, 4, 1, ChromaSubsampling::Yuv444).unwrap();

        assert!((entropy(&a, rect) - 1.0).abs() < EPS);
        assert_eq!(entropy(&a, rect), entropy(&b, rect));
    }
}
