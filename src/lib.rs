//! Content-aware cropping by information entropy
//!
//! Before an image is resized to a different aspect ratio, the crate looks for
//! the crop window whose pixel values are the most diverse, so the resize drops
//! the least interesting part of the picture instead of cutting blindly around
//! the centre.

mod config;
mod crop;
mod entropy;
mod error;
mod histogram;
mod resize;
mod source;
mod window;

use image::RgbaImage;

pub use config::{Config, Strategy, DEFAULT_ASPECT_TOLERANCE, DEFAULT_GRANULARITY};
pub use crop::{CropWindow, Rect};
pub use entropy::{entropy, entropy_of_counts};
pub use error::{Error, Result};
pub use histogram::{histogram, ycbcr_histogram, HistogramSpace, LayoutTag};
pub use resize::{FilterResize, Resize};
pub use source::{
    ycbcr_to_rgb, ChromaSubsampling, ColorLookup, ImageSource, Layout, PackedChannels, PackedFormat,
    PlanarYCbCr,
};
pub use window::{select_accurate, select_stripes, select_tail, select_window};

/// Crops to the highest-entropy window found by sliding it across the image, then resizes
///
/// Every `granularity`-th position is scored, plus the position flush with the
/// far edge. Ties keep the leftmost (or topmost) window.
///
/// # Parameters
/// * `image: &I` - The source image
/// * `width: u32` - The width of the output image
/// * `height: u32` - The height of the output image
/// * `granularity: i32` - Step in pixels between candidate windows
/// * `resizer: &R` - Produces the output from the chosen rectangle
///
/// # Returns
/// * `Option<R::Output>` - The resized crop, or `None` if `granularity <= 0` or a size is zero
///
/// # Example
/// ```rust
/// use entropy_crop::{smart_resize_accurate, FilterResize};
/// use image::GrayImage;
///
/// let img = GrayImage::from_fn(200, 100, |x, y| image::Luma([(x * y) as u8]));
/// let thumbnail = smart_resize_accurate(&img, 64, 64, 10, &FilterResize::default()).unwrap();
/// assert_eq!(thumbnail.dimensions(), (64, 64));
/// ```
pub fn smart_resize_accurate<I, R>(
    image: &I,
    width: u32,
    height: u32,
    granularity: i32,
    resizer: &R,
) -> Option<R::Output>
where
    I: ImageSource + ?Sized,
    R: Resize<I>,
{
    let window = select_accurate(image, width, height, granularity)?;
    Some(resizer.resize(image, window.rect, width, height))
}

/// Crops to the run of strips with the largest summed entropy, then resizes
///
/// The free axis is cut into `granularity`-wide strips, centred in the image;
/// each strip is scored once and a running sum covers as many strips as fit in
/// the window. Faster than [`smart_resize_accurate`] but approximate.
///
/// # Parameters
/// * `image: &I` - The source image
/// * `width: u32` - The width of the output image
/// * `height: u32` - The height of the output image
/// * `granularity: i32` - Width of each strip in pixels
/// * `resizer: &R` - Produces the output from the chosen rectangle
///
/// # Returns
/// * `Option<R::Output>` - The resized crop, or `None` if `granularity <= 0` or a size is zero
pub fn smart_resize_stripes<I, R>(
    image: &I,
    width: u32,
    height: u32,
    granularity: i32,
    resizer: &R,
) -> Option<R::Output>
where
    I: ImageSource + ?Sized,
    R: Resize<I>,
{
    let window = select_stripes(image, width, height, granularity)?;
    Some(resizer.resize(image, window.rect, width, height))
}

/// Trims whichever end of the image carries less entropy until the crop fits, then resizes
///
/// At most `granularity` pixels are removed per step. Cheapest of the three
/// searches, but greedy: an exact tie trims the right (or bottom) end.
///
/// # Parameters
/// * `image: &I` - The source image
/// * `width: u32` - The width of the output image
/// * `height: u32` - The height of the output image
/// * `granularity: i32` - Largest slice trimmed per step
/// * `resizer: &R` - Produces the output from the chosen rectangle
///
/// # Returns
/// * `Option<R::Output>` - The resized crop, or `None` if `granularity <= 0` or a size is zero
pub fn smart_resize_tail<I, R>(
    image: &I,
    width: u32,
    height: u32,
    granularity: i32,
    resizer: &R,
) -> Option<R::Output>
where
    I: ImageSource + ?Sized,
    R: Resize<I>,
{
    let window = select_tail(image, width, height, granularity)?;
    Some(resizer.resize(image, window.rect, width, height))
}

/// Crops and resizes with the strategy, step, tolerance and filter in `config`
///
/// # Parameters
/// * `image: &I` - The source image
/// * `width: u32` - The width of the output image
/// * `height: u32` - The height of the output image
/// * `config: &Config` - Search and resize settings
///
/// # Returns
/// * `Option<RgbaImage>` - The resized crop, or `None` if the granularity is not positive
///   or a size is zero
///
/// # Example
/// ```rust
/// use entropy_crop::{smart_resize_with_config, Config, Strategy};
/// use image::imageops::FilterType;
/// use image::RgbaImage;
///
/// let img = RgbaImage::from_fn(90, 300, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
/// let config = Config::new()
///     .set_strategy(Strategy::Stripes)
///     .set_granularity(5)
///     .set_filter(FilterType::Nearest);
///
/// let thumbnail = smart_resize_with_config(&img, 30, 30, &config).unwrap();
/// assert_eq!(thumbnail.dimensions(), (30, 30));
/// ```
pub fn smart_resize_with_config<I: ImageSource + ?Sized>(
    image: &I,
    width: u32,
    height: u32,
    config: &Config,
) -> Option<RgbaImage> {
    let window = select_window(image, width, height, config)?;
    Some(FilterResize::new(config.filter).resize(image, window.rect, width, height))
}
