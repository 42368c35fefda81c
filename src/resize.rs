use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::warn;

use crate::crop::Rect;
use crate::source::{ImageSource, Layout};

/// Produces the output image once a crop window has been chosen
///
/// Any `Fn(&I, Rect, u32, u32) -> O` closure is a resizer, so callers can plug
/// in their own resampling.
pub trait Resize<I: ?Sized> {
    type Output;

    /// Scales the `source` rectangle of `image` to exactly `width` x `height`
    fn resize(&self, image: &I, source: Rect, width: u32, height: u32) -> Self::Output;
}

impl<I, O, F> Resize<I> for F
where
    I: ?Sized,
    F: Fn(&I, Rect, u32, u32) -> O,
{
    type Output = O;

    fn resize(&self, image: &I, source: Rect, width: u32, height: u32) -> O {
        self(image, source, width, height)
    }
}

/// Crops to RGBA and resamples with one of the `image` crate filters
#[derive(Debug, Clone, Copy)]
pub struct FilterResize {
    pub filter: FilterType,
}

impl FilterResize {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for FilterResize {
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl<I: ImageSource + ?Sized> Resize<I> for FilterResize {
    type Output = RgbaImage;

    fn resize(&self, image: &I, source: Rect, width: u32, height: u32) -> RgbaImage {
        let (img_width, img_height) = image.size();
        let source = source.clip(img_width, img_height);
        let layout = image.layout();

        if matches!(layout, Layout::Unsupported) {
            warn!("image layout has no pixel access, producing a blank {}x{} image", width, height);
            return RgbaImage::new(width, height);
        }
        if source.is_empty() {
            return RgbaImage::new(width, height);
        }

        let cropped = RgbaImage::from_fn(source.width(), source.height(), |x, y| {
            Rgba(layout.rgba8_at(source.min_x + x, source.min_y + y).unwrap_or([0; 4]))
        });

        imageops::resize(&cropped, width, height, self.filter)
    }
}
