use crate::crop::Rect;
use crate::source::{
    ycbcr_to_rgb, ColorLookup, ImageSource, Layout, PackedChannels, PackedFormat, PlanarYCbCr,
};

/// Which path built a histogram, and therefore how its channels are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutTag {
    /// Packed R, G, B, A
    Rgba,
    /// Packed luma
    Gray,
    /// Planar Y, Cb, Cr
    YCbCr,
    /// Generic per-pixel lookup, R, G, B
    Rgb,
    /// No pixel access, empty histogram
    Other,
}

impl LayoutTag {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutTag::Rgba => "rgba",
            LayoutTag::Gray => "gray",
            LayoutTag::YCbCr => "ycbcr",
            LayoutTag::Rgb => "rgb",
            LayoutTag::Other => "other",
        }
    }
}

impl std::fmt::Display for LayoutTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour space of a planar histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistogramSpace {
    /// Count the stored Y, Cb and Cr samples
    #[default]
    YCbCr,
    /// Convert every pixel to RGB before counting
    Rgb,
}

/// Counts the 8-bit channel values inside `rect`
///
/// Bucket `v + c * 256` holds the number of samples of channel `c` with value
/// `v`. Counts are `u64`, so no bucket can overflow for any image the `u32`
/// dimensions can describe. The rectangle is clipped to the image first.
/// Packed and planar images take a fast path over their buffers; planar images with a subsampling mode
/// that has no fast path, and every generic image, go through per-pixel lookup.
///
/// # Example
/// ```rust
/// use entropy_crop::{histogram, LayoutTag, Rect};
/// use image::GrayImage;
///
/// let img = GrayImage::from_fn(4, 4, |x, _| image::Luma([x as u8]));
/// let (hist, tag) = histogram(&img, Rect::new(0, 0, 2, 4));
/// assert_eq!(tag, LayoutTag::Gray);
/// assert_eq!(hist[0], 4);
/// assert_eq!(hist[1], 4);
/// assert_eq!(hist[2], 0);
/// ```
pub fn histogram<I: ImageSource + ?Sized>(image: &I, rect: Rect) -> (Vec<u64>, LayoutTag) {
    let (width, height) = image.size();
    let rect = rect.clip(width, height);

    match image.layout() {
        Layout::Packed(view) => {
            let tag = match view.format() {
                PackedFormat::Gray => LayoutTag::Gray,
                PackedFormat::Rgba => LayoutTag::Rgba,
            };
            (packed_histogram(&view, rect), tag)
        }
        Layout::Planar(view) => match ycbcr_histogram(&view, rect, HistogramSpace::YCbCr) {
            Some(hist) => (hist, LayoutTag::YCbCr),
            None => (generic_histogram(&view, rect), LayoutTag::Rgb),
        },
        Layout::Generic(lookup) => (generic_histogram(lookup, rect), LayoutTag::Rgb),
        Layout::Unsupported => (Vec::new(), LayoutTag::Other),
    }
}

fn packed_histogram(view: &PackedChannels<'_>, rect: Rect) -> Vec<u64> {
    let rect = rect.clip(view.width(), view.height());
    let n = view.format().channels();
    let mut hist = vec![0u64; n * 256];

    let start = rect.min_x as usize * n;
    let end = rect.max_x as usize * n;
    for y in rect.min_y..rect.max_y {
        for pixel in view.row(y)[start..end].chunks_exact(n) {
            for (channel, &value) in pixel.iter().enumerate() {
                hist[value as usize + channel * 256] += 1;
            }
        }
    }

    hist
}

/// Histogram of a planar YCbCr region, channel order Y, Cb, Cr (or R, G, B)
///
/// Returns `None` when the subsampling mode has no fast path, so the caller
/// can fall back to per-pixel lookup.
pub fn ycbcr_histogram(
    view: &PlanarYCbCr<'_>,
    rect: Rect,
    space: HistogramSpace,
) -> Option<Vec<u64>> {
    if !view.subsampling().has_fast_path() {
        return None;
    }

    let (h, v) = view.subsampling().factors();
    let rect = rect.clip(view.width(), view.height());
    let mut hist = vec![0u64; 3 * 256];

    for y in rect.min_y..rect.max_y {
        let luma = view.luma_row(y);
        let (cb, cr) = view.chroma_rows(y / v);
        for x in rect.min_x..rect.max_x {
            let ci = (x / h) as usize;
            let [c0, c1, c2] = match space {
                HistogramSpace::YCbCr => [luma[x as usize], cb[ci], cr[ci]],
                HistogramSpace::Rgb => ycbcr_to_rgb(luma[x as usize], cb[ci], cr[ci]),
            };
            hist[c0 as usize] += 1;
            hist[c1 as usize + 256] += 1;
            hist[c2 as usize + 512] += 1;
        }
    }

    Some(hist)
}

fn generic_histogram<L: ColorLookup + ?Sized>(lookup: &L, rect: Rect) -> Vec<u64> {
    let mut hist = vec![0u64; 3 * 256];

    for y in rect.min_y..rect.max_y {
        for x in rect.min_x..rect.max_x {
            let [r, g, b, _] = lookup.rgba16(x, y);
            hist[(r >> 8) as usize] += 1;
            hist[(g >> 8) as usize + 256] += 1;
            hist[(b >> 8) as usize + 512] += 1;
        }
    }

    hist
}
