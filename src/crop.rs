/// A half-open rectangle of pixels, `[min_x, max_x) x [min_y, max_y)`
///
/// The origin (0,0) is the top-left corner of the image. Constructors keep
/// `min_x <= max_x` and `min_y <= max_y`, so width and height never underflow.
///
/// # Example
/// ```rust
/// use entropy_crop::Rect;
///
/// // Columns 100..900 and rows 50..650
/// let rect = Rect::new(100, 50, 900, 650);
/// assert_eq!(rect.width(), 800);
/// assert_eq!(rect.height(), 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Rect {
    /// Builds a rectangle from two corners, swapping coordinates if they are given out of order.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// The rectangle covering a whole `width` x `height` image.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.min_x == self.max_x || self.min_y == self.max_y
    }

    /// Clips the rectangle to an image of the given size. The result may be empty.
    pub fn clip(&self, width: u32, height: u32) -> Self {
        let max_x = self.max_x.min(width);
        let max_y = self.max_y.min(height);
        Self {
            min_x: self.min_x.min(max_x),
            min_y: self.min_y.min(max_y),
            max_x,
            max_y,
        }
    }
}

/// A candidate crop considered during window search
///
/// `score` is the entropy the strategy used to rank the window. It is `None`
/// when no candidate was compared, e.g. when the image already had the
/// requested aspect ratio or the greedy tail search produced the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    pub rect: Rect,
    pub score: Option<f64>,
}

impl CropWindow {
    pub fn new(rect: Rect, score: Option<f64>) -> Self {
        Self { rect, score }
    }
}
