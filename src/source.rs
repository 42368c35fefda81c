use image::{DynamicImage, GenericImageView, GrayImage, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Channel arrangement of a packed 8-bit buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackedFormat {
    /// One luma byte per pixel
    Gray,
    /// Four interleaved bytes per pixel, alpha last
    Rgba,
}

impl PackedFormat {
    pub fn channels(self) -> usize {
        match self {
            PackedFormat::Gray => 1,
            PackedFormat::Rgba => 4,
        }
    }
}

/// Borrowed view over an interleaved 8-bit pixel buffer whose rows may be padded
///
/// `stride` is the byte distance between the starts of consecutive rows and
/// can exceed `width * channels`. Trailing padding bytes are never read.
#[derive(Debug, Clone, Copy)]
pub struct PackedChannels<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: PackedFormat,
    stride: usize,
}

impl<'a> PackedChannels<'a> {
    /// Wraps a raw buffer, checking that every row fits inside `data`
    ///
    /// # Example
    /// ```rust
    /// use entropy_crop::{PackedChannels, PackedFormat};
    ///
    /// // Two gray rows of three pixels, each padded to four bytes
    /// let data = [1, 2, 3, 0, 4, 5, 6, 0];
    /// let view = PackedChannels::new(&data, 3, 2, PackedFormat::Gray, 4).unwrap();
    /// assert_eq!(view.row(1), &[4, 5, 6]);
    /// ```
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        format: PackedFormat,
        stride: usize,
    ) -> Result<Self> {
        let row_len = width as usize * format.channels();
        if stride < row_len {
            return Err(Error::InvalidStride { stride, min: row_len });
        }
        let needed = plane_len(stride, row_len, height as usize);
        if data.len() < needed {
            return Err(Error::BufferTooSmall { needed, actual: data.len() });
        }

        Ok(Self { data, width, height, format, stride })
    }

    pub fn from_gray(img: &'a GrayImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width(),
            height: img.height(),
            format: PackedFormat::Gray,
            stride: img.width() as usize,
        }
    }

    pub fn from_rgba(img: &'a RgbaImage) -> Self {
        Self {
            data: img.as_raw(),
            width: img.width(),
            height: img.height(),
            format: PackedFormat::Rgba,
            stride: img.width() as usize * 4,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PackedFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes of row `y`, without the row padding
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * self.format.channels()]
    }

    /// Channel bytes of a single pixel, or `None` outside the view
    pub fn pixel(&self, x: u32, y: u32) -> Option<&'a [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let n = self.format.channels();
        let start = x as usize * n;
        Some(&self.row(y)[start..start + n])
    }
}

/// Chroma subsampling of a planar YCbCr image
///
/// Only 4:4:4, 4:2:2 and 4:2:0 have a dedicated histogram path; the other
/// modes are still readable pixel by pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaSubsampling {
    Yuv444,
    Yuv422,
    Yuv420,
    Yuv440,
    Yuv411,
    Yuv410,
}

impl ChromaSubsampling {
    /// Horizontal and vertical chroma factors
    pub fn factors(self) -> (u32, u32) {
        match self {
            ChromaSubsampling::Yuv444 => (1, 1),
            ChromaSubsampling::Yuv422 => (2, 1),
            ChromaSubsampling::Yuv420 => (2, 2),
            ChromaSubsampling::Yuv440 => (1, 2),
            ChromaSubsampling::Yuv411 => (4, 1),
            ChromaSubsampling::Yuv410 => (4, 2),
        }
    }

    pub fn has_fast_path(self) -> bool {
        matches!(
            self,
            ChromaSubsampling::Yuv444 | ChromaSubsampling::Yuv422 | ChromaSubsampling::Yuv420
        )
    }
}

/// Borrowed view over three YCbCr planes
///
/// The luma plane has one sample per pixel. Each chroma plane has one sample
/// per `factors()` block, rounded up at the right and bottom edges. Both chroma
/// planes share `c_stride`.
#[derive(Debug, Clone, Copy)]
pub struct PlanarYCbCr<'a> {
    y: &'a [u8],
    cb: &'a [u8],
    cr: &'a [u8],
    y_stride: usize,
    c_stride: usize,
    width: u32,
    height: u32,
    subsampling: ChromaSubsampling,
}

impl<'a> PlanarYCbCr<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        y: &'a [u8],
        cb: &'a [u8],
        cr: &'a [u8],
        y_stride: usize,
        c_stride: usize,
        width: u32,
        height: u32,
        subsampling: ChromaSubsampling,
    ) -> Result<Self> {
        let (h, v) = subsampling.factors();
        let chroma_width = width.div_ceil(h) as usize;
        let chroma_height = height.div_ceil(v) as usize;

        if y_stride < width as usize {
            return Err(Error::InvalidStride { stride: y_stride, min: width as usize });
        }
        if c_stride < chroma_width {
            return Err(Error::InvalidStride { stride: c_stride, min: chroma_width });
        }

        let needed = plane_len(y_stride, width as usize, height as usize);
        if y.len() < needed {
            return Err(Error::BufferTooSmall { needed, actual: y.len() });
        }
        let needed = plane_len(c_stride, chroma_width, chroma_height);
        for plane in [cb, cr] {
            if plane.len() < needed {
                return Err(Error::BufferTooSmall { needed, actual: plane.len() });
            }
        }

        Ok(Self { y, cb, cr, y_stride, c_stride, width, height, subsampling })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn subsampling(&self) -> ChromaSubsampling {
        self.subsampling
    }

    fn chroma_width(&self) -> usize {
        self.width.div_ceil(self.subsampling.factors().0) as usize
    }

    /// Luma samples of image row `y`
    pub fn luma_row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.y_stride;
        &self.y[start..start + self.width as usize]
    }

    /// Cb and Cr samples of chroma row `cy` (already divided by the vertical factor)
    pub fn chroma_rows(&self, cy: u32) -> (&'a [u8], &'a [u8]) {
        let start = cy as usize * self.c_stride;
        let end = start + self.chroma_width();
        (&self.cb[start..end], &self.cr[start..end])
    }

    /// `(Y, Cb, Cr)` of the pixel at `(x, y)`, or `None` outside the view
    pub fn sample(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let (h, v) = self.subsampling.factors();
        let (cb, cr) = self.chroma_rows(y / v);
        let ci = (x / h) as usize;
        Some((self.luma_row(y)[x as usize], cb[ci], cr[ci]))
    }
}

fn plane_len(stride: usize, row_len: usize, rows: usize) -> usize {
    if rows == 0 {
        0
    } else {
        stride * (rows - 1) + row_len
    }
}

/// Converts a full-range (JFIF) YCbCr triple to RGB
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;

    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;

    [clamp_u8(r), clamp_u8(g), clamp_u8(b)]
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Per-pixel colour access, the slow path every image can offer
pub trait ColorLookup {
    /// Colour of the pixel at `(x, y)` as 16-bit RGBA
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4];
}

/// How an image stores its pixels, as seen by the histogram builder
pub enum Layout<'a> {
    Packed(PackedChannels<'a>),
    Planar(PlanarYCbCr<'a>),
    Generic(&'a dyn ColorLookup),
    Unsupported,
}

impl Layout<'_> {
    /// 8-bit RGBA of the pixel at `(x, y)`
    ///
    /// Returns `None` outside the image and for unsupported layouts.
    pub fn rgba8_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        match self {
            Layout::Packed(view) => {
                let px = view.pixel(x, y)?;
                Some(match view.format() {
                    PackedFormat::Gray => [px[0], px[0], px[0], u8::MAX],
                    PackedFormat::Rgba => [px[0], px[1], px[2], px[3]],
                })
            }
            Layout::Planar(view) => {
                let (l, cb, cr) = view.sample(x, y)?;
                let [r, g, b] = ycbcr_to_rgb(l, cb, cr);
                Some([r, g, b, u8::MAX])
            }
            Layout::Generic(lookup) => Some(lookup.rgba16(x, y).map(|c| (c >> 8) as u8)),
            Layout::Unsupported => None,
        }
    }
}

/// An image the crop search can score
///
/// Implementors report their size and hand out the fastest layout they can.
/// Types that have neither a packed nor a planar buffer should return
/// `Layout::Generic`; `Layout::Unsupported` scores as zero information.
pub trait ImageSource {
    fn size(&self) -> (u32, u32);
    fn layout(&self) -> Layout<'_>;
}

fn widen(c: u8) -> u16 {
    c as u16 * 257
}

fn unit_to_u16(c: f32) -> u16 {
    (c.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

impl ColorLookup for PackedChannels<'_> {
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        Layout::Packed(*self).rgba8_at(x, y).unwrap_or([0; 4]).map(widen)
    }
}

impl ColorLookup for PlanarYCbCr<'_> {
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        Layout::Planar(*self).rgba8_at(x, y).unwrap_or([0; 4]).map(widen)
    }
}

impl ColorLookup for RgbImage {
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        let [r, g, b] = self.get_pixel(x, y).0;
        [widen(r), widen(g), widen(b), u16::MAX]
    }
}

impl ColorLookup for DynamicImage {
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        match self {
            DynamicImage::ImageLuma16(img) => {
                let [l] = img.get_pixel(x, y).0;
                [l, l, l, u16::MAX]
            }
            DynamicImage::ImageLumaA16(img) => {
                let [l, a] = img.get_pixel(x, y).0;
                [l, l, l, a]
            }
            DynamicImage::ImageRgb16(img) => {
                let [r, g, b] = img.get_pixel(x, y).0;
                [r, g, b, u16::MAX]
            }
            DynamicImage::ImageRgba16(img) => img.get_pixel(x, y).0,
            DynamicImage::ImageRgb32F(img) => {
                let [r, g, b] = img.get_pixel(x, y).0;
                [unit_to_u16(r), unit_to_u16(g), unit_to_u16(b), u16::MAX]
            }
            DynamicImage::ImageRgba32F(img) => img.get_pixel(x, y).0.map(unit_to_u16),
            other => GenericImageView::get_pixel(other, x, y).0.map(widen),
        }
    }
}

impl ImageSource for PackedChannels<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Packed(*self)
    }
}

impl ImageSource for PlanarYCbCr<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Planar(*self)
    }
}

impl ImageSource for GrayImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Packed(PackedChannels::from_gray(self))
    }
}

impl ImageSource for RgbaImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Packed(PackedChannels::from_rgba(self))
    }
}

impl ImageSource for RgbImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Generic(self)
    }
}

impl ImageSource for DynamicImage {
    fn size(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    fn layout(&self) -> Layout<'_> {
        match self {
            DynamicImage::ImageLuma8(img) => Layout::Packed(PackedChannels::from_gray(img)),
            DynamicImage::ImageRgba8(img) => Layout::Packed(PackedChannels::from_rgba(img)),
            other => Layout::Generic(other),
        }
    }
}
