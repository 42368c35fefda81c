use log::{debug, trace};

use crate::config::{Config, Strategy, DEFAULT_ASPECT_TOLERANCE};
use crate::crop::{CropWindow, Rect};
use crate::entropy::entropy;
use crate::source::ImageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// A window of `window_len` pixels moving along one axis of the image
#[derive(Debug, Clone, Copy)]
struct Search {
    axis: Axis,
    width: u32,
    height: u32,
    axis_len: u32,
    window_len: u32,
}

impl Search {
    /// The full-height (or full-width) slice covering `[start, end)` of the free axis
    fn slice(&self, start: u32, end: u32) -> Rect {
        match self.axis {
            Axis::Horizontal => Rect::new(start, 0, end, self.height),
            Axis::Vertical => Rect::new(0, start, self.width, end),
        }
    }

    fn window_at(&self, start: u32) -> Rect {
        self.slice(start, start + self.window_len)
    }

    fn limit(&self) -> u32 {
        self.axis_len - self.window_len
    }
}

enum Plan {
    /// The image already has the target aspect ratio
    Whole(Rect),
    Search(Search, u32),
}

fn plan(
    (img_width, img_height): (u32, u32),
    target_width: u32,
    target_height: u32,
    granularity: i32,
    tolerance: f64,
) -> Option<Plan> {
    if granularity <= 0 {
        debug!("granularity {} is not positive, no crop window", granularity);
        return None;
    }
    if target_width == 0 || target_height == 0 || img_width == 0 || img_height == 0 {
        debug!(
            "empty size (image {}x{}, target {}x{}), no crop window",
            img_width, img_height, target_width, target_height
        );
        return None;
    }

    let image_ratio = img_width as f64 / img_height as f64;
    let size_ratio = target_width as f64 / target_height as f64;
    let ratio =
        (img_width as f64 * target_height as f64) / (img_height as f64 * target_width as f64);
    let abs_ratio = if ratio < 1.0 { 1.0 / ratio } else { ratio };

    if abs_ratio < 1.0 + tolerance {
        debug!(
            "image {}x{} already matches {}x{}",
            img_width, img_height, target_width, target_height
        );
        return Some(Plan::Whole(Rect::from_dimensions(img_width, img_height)));
    }

    let search = if size_ratio < image_ratio {
        let window_len = ((img_height as f64 * size_ratio) as u32).clamp(1, img_width);
        Search {
            axis: Axis::Horizontal,
            width: img_width,
            height: img_height,
            axis_len: img_width,
            window_len,
        }
    } else {
        let window_len = ((img_width as f64 / size_ratio) as u32).clamp(1, img_height);
        Search {
            axis: Axis::Vertical,
            width: img_width,
            height: img_height,
            axis_len: img_height,
            window_len,
        }
    };

    debug!(
        "searching {:?} axis: window {} of {} px, step {}",
        search.axis, search.window_len, search.axis_len, granularity
    );
    Some(Plan::Search(search, granularity as u32))
}

/// Picks the crop window for `strategy` without resizing anything
pub(crate) fn select<I: ImageSource + ?Sized>(
    image: &I,
    target_width: u32,
    target_height: u32,
    granularity: i32,
    tolerance: f64,
    strategy: Strategy,
) -> Option<CropWindow> {
    let window = match plan(image.size(), target_width, target_height, granularity, tolerance)? {
        Plan::Whole(rect) => CropWindow::new(rect, None),
        Plan::Search(search, step) => match strategy {
            Strategy::Accurate => accurate(image, &search, step),
            Strategy::Stripes => stripes(image, &search, step),
            Strategy::Tail => tail(image, &search, step),
        },
    };

    debug!("{:?} picked {:?} (score {:?})", strategy, window.rect, window.score);
    Some(window)
}

/// Best window under the exhaustive sliding search
///
/// Returns `None` when `granularity <= 0` or either size is zero.
pub fn select_accurate<I: ImageSource + ?Sized>(
    image: &I,
    width: u32,
    height: u32,
    granularity: i32,
) -> Option<CropWindow> {
    select(image, width, height, granularity, DEFAULT_ASPECT_TOLERANCE, Strategy::Accurate)
}

/// Best window under the strip-sum search
pub fn select_stripes<I: ImageSource + ?Sized>(
    image: &I,
    width: u32,
    height: u32,
    granularity: i32,
) -> Option<CropWindow> {
    select(image, width, height, granularity, DEFAULT_ASPECT_TOLERANCE, Strategy::Stripes)
}

/// Window left after greedily trimming both ends
pub fn select_tail<I: ImageSource + ?Sized>(
    image: &I,
    width: u32,
    height: u32,
    granularity: i32,
) -> Option<CropWindow> {
    select(image, width, height, granularity, DEFAULT_ASPECT_TOLERANCE, Strategy::Tail)
}

/// Window chosen by the strategy, step and tolerance in `config`
pub fn select_window<I: ImageSource + ?Sized>(
    image: &I,
    width: u32,
    height: u32,
    config: &Config,
) -> Option<CropWindow> {
    select(image, width, height, config.granularity, config.aspect_tolerance, config.strategy)
}

fn accurate<I: ImageSource + ?Sized>(image: &I, search: &Search, step: u32) -> CropWindow {
    let limit = search.limit();

    let mut best_start = 0;
    let mut best_score = entropy(image, search.window_at(0));
    trace!("window at 0: {}", best_score);

    // The last step is pulled back flush with the far edge
    let mut start = 0;
    while start < limit {
        start = start.saturating_add(step).min(limit);
        let score = entropy(image, search.window_at(start));
        trace!("window at {}: {}", start, score);
        if score > best_score {
            best_start = start;
            best_score = score;
        }
    }

    CropWindow::new(search.window_at(best_start), Some(best_score))
}

fn stripes<I: ImageSource + ?Sized>(image: &I, search: &Search, step: u32) -> CropWindow {
    let parts = (search.window_len / step).max(1);
    // Entropies of the last `parts` strips, indexed modulo `parts`
    let mut ring = vec![0.0f64; parts as usize];
    let mut best: Option<(u32, f64)> = None;

    let mut start = (search.axis_len % step) / 2;
    let mut index = 0usize;
    while search.axis_len - start >= step {
        let score = entropy(image, search.slice(start, start + step));
        trace!("strip at {}: {}", start, score);

        let ring_len = ring.len();
        ring[index % ring_len] = score;

        if index + 1 >= ring.len() {
            // Summed oldest strip first, so equal runs of strips give equal totals
            let sum: f64 = (0..ring.len()).map(|k| ring[(index + 1 + k) % ring.len()]).sum();
            let window_start = start + step - parts * step;
            if best.map_or(true, |(_, best_sum)| sum > best_sum) {
                best = Some((window_start, sum));
            }
        }

        start += step;
        index += 1;
    }

    match best {
        Some((window_start, score)) => {
            CropWindow::new(search.window_at(window_start.min(search.limit())), Some(score))
        }
        None => CropWindow::new(search.window_at(0), None),
    }
}

fn tail<I: ImageSource + ?Sized>(image: &I, search: &Search, step: u32) -> CropWindow {
    let mut low = 0;
    let mut high = search.axis_len;
    // Scores stay cached until their side moves
    let mut low_score: Option<f64> = None;
    let mut high_score: Option<f64> = None;

    loop {
        let excess = high - low - search.window_len;
        if excess == 0 {
            break;
        }
        let cut = excess.min(step);

        let l = *low_score.get_or_insert_with(|| entropy(image, search.slice(low, low + cut)));
        let h = *high_score.get_or_insert_with(|| entropy(image, search.slice(high - cut, high)));
        trace!("edges {}..{}: low {} high {}", low, high, l, h);

        if l < h {
            low += cut;
            low_score = None;
        } else {
            high -= cut;
            high_score = None;
        }
    }

    CropWindow::new(search.slice(low, high), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    /// 100x50, left half black, right half one distinct value per column
    fn half_black() -> GrayImage {
        GrayImage::from_fn(100, 50, |x, _| image::Luma([if x < 50 { 0 } else { (x - 50) as u8 }]))
    }

    /// 50x100, top half black, bottom half one distinct value per row
    fn bottom_busy() -> GrayImage {
        GrayImage::from_fn(50, 100, |_, y| image::Luma([if y < 50 { 0 } else { (y - 50) as u8 }]))
    }

    /// Strips of 10 columns cycling through three patterns, each with its own entropy
    fn repeating_strips(kinds: [u32; 3]) -> GrayImage {
        GrayImage::from_fn(60, 20, |x, _| {
            let kind = kinds[(x / 10 % 3) as usize];
            image::Luma([(x % 10 % kind) as u8])
        })
    }

    #[test]
    fn test_plan_rejects_bad_input() {
        assert!(plan((100, 50), 50, 50, 0, DEFAULT_ASPECT_TOLERANCE).is_none());
        assert!(plan((100, 50), 50, 50, -4, DEFAULT_ASPECT_TOLERANCE).is_none());
        assert!(plan((100, 50), 0, 50, 1, DEFAULT_ASPECT_TOLERANCE).is_none());
        assert!(plan((0, 50), 50, 50, 1, DEFAULT_ASPECT_TOLERANCE).is_none());
    }

    #[test]
    fn test_plan_axes() {
        match plan((100, 50), 50, 50, 1, DEFAULT_ASPECT_TOLERANCE) {
            Some(Plan::Search(search, 1)) => {
                assert_eq!(search.axis, Axis::Horizontal);
                assert_eq!((search.axis_len, search.window_len), (100, 50));
            }
            _ => panic!("expected a horizontal search"),
        }

        match plan((30, 90), 30, 60, 5, DEFAULT_ASPECT_TOLERANCE) {
            Some(Plan::Search(search, 5)) => {
                assert_eq!(search.axis, Axis::Vertical);
                assert_eq!((search.axis_len, search.window_len), (90, 60));
            }
            _ => panic!("expected a vertical search"),
        }
    }

    #[test]
    fn test_plan_within_tolerance() {
        // 2000x1001 is within 0.1% of 2:1, 1000x501 is not
        assert!(matches!(plan((1000, 500), 20, 10, 1, 0.001), Some(Plan::Whole(_))));
        assert!(matches!(plan((2000, 1001), 20, 10, 1, 0.001), Some(Plan::Whole(_))));
        assert!(matches!(plan((1000, 501), 20, 10, 1, 0.001), Some(Plan::Search(..))));
    }

    #[test]
    fn test_accurate_picks_busy_half() {
        let window = select_accurate(&half_black(), 50, 50, 1).unwrap();
        assert_eq!(window.rect, Rect::new(50, 0, 100, 50));
        assert!((window.score.unwrap() - 50f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_accurate_reaches_far_edge() {
        // Steps of 30 land on 0 and 30; the flush position 50 must still be scored
        let window = select_accurate(&half_black(), 50, 50, 30).unwrap();
        assert_eq!(window.rect, Rect::new(50, 0, 100, 50));
    }

    #[test]
    fn test_accurate_ties_keep_first() {
        let flat = GrayImage::new(100, 50);
        let window = select_accurate(&flat, 50, 50, 7).unwrap();
        assert_eq!(window.rect, Rect::new(0, 0, 50, 50));
    }

    #[test]
    fn test_accurate_vertical() {
        // Busy rows at the bottom
        let img = GrayImage::from_fn(20, 60, |x, y| {
            image::Luma([if y < 40 { 9 } else { (x + y) as u8 }])
        });
        let window = select_accurate(&img, 20, 20, 4).unwrap();
        assert_eq!(window.rect, Rect::new(0, 40, 20, 60));
    }

    #[test]
    fn test_stripes_sums_strips() {
        let window = select_stripes(&half_black(), 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(50, 0, 100, 50));
        assert!((window.score.unwrap() - 5.0 * 10f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_stripes_running_sum_spans_window() {
        // Strip 1 is the single busiest strip, but strips 6..9 together
        // carry more entropy than any run of three that includes strip 1.
        let img = GrayImage::from_fn(100, 20, |x, _| {
            image::Luma([match x {
                10..=19 => x as u8,
                60..=89 => (x % 4 + 100) as u8,
                _ => 0,
            }])
        });
        let window = select_stripes(&img, 30, 20, 10).unwrap();
        assert_eq!(window.rect, Rect::new(60, 0, 90, 20));
    }

    #[test]
    fn test_stripes_repeated_run_keeps_first() {
        // Strips A B C A B C; the run B C at x 10 repeats at x 40
        let window = select_stripes(&repeating_strips([3, 5, 6]), 20, 20, 10).unwrap();
        assert_eq!(window.rect, Rect::new(10, 0, 30, 20));

        // Every run starting at 30 or later repeats one that starts earlier
        for a in [2, 3, 5, 7] {
            for b in [2, 3, 5, 7] {
                for c in [2, 3, 5, 7] {
                    let window = select_stripes(&repeating_strips([a, b, c]), 20, 20, 10).unwrap();
                    assert!(window.rect.min_x < 30, "{:?} picked {:?}", [a, b, c], window.rect);
                }
            }
        }
    }

    #[test]
    fn test_stripes_vertical() {
        let window = select_stripes(&bottom_busy(), 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(0, 50, 50, 100));
        assert!((window.score.unwrap() - 5.0 * 10f64.log2()).abs() < 1e-9);

        let flat = GrayImage::new(50, 100);
        let window = select_stripes(&flat, 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(0, 0, 50, 50));
    }

    #[test]
    fn test_stripes_centers_strips() {
        // 105 wide with step 10 leaves 5 spare pixels, two on the left
        let flat = GrayImage::new(105, 50);
        let window = select_stripes(&flat, 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(2, 0, 52, 50));
    }

    #[test]
    fn test_tail_trims_dull_side() {
        let window = select_tail(&half_black(), 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(50, 0, 100, 50));
        assert!(window.score.is_none());
    }

    #[test]
    fn test_tail_ties_trim_far_side() {
        let flat = GrayImage::new(100, 50);
        let window = select_tail(&flat, 50, 50, 7).unwrap();
        assert_eq!(window.rect, Rect::new(0, 0, 50, 50));
    }

    #[test]
    fn test_tail_last_step_is_partial() {
        // Excess 45 with step 10 ends on a 5 pixel cut
        let img = GrayImage::from_fn(95, 50, |x, y| {
            image::Luma([if x < 45 { 0 } else { (x * y) as u8 }])
        });
        let window = select_tail(&img, 50, 50, 10).unwrap();
        assert_eq!(window.rect.width(), 50);
        assert_eq!(window.rect, Rect::new(45, 0, 95, 50));
    }

    #[test]
    fn test_tail_vertical() {
        let window = select_tail(&bottom_busy(), 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(0, 50, 50, 100));

        // Busy rows on top: the bottom is trimmed
        let top_busy =
            GrayImage::from_fn(50, 100, |_, y| image::Luma([if y < 50 { y as u8 } else { 0 }]));
        let window = select_tail(&top_busy, 50, 50, 10).unwrap();
        assert_eq!(window.rect, Rect::new(0, 0, 50, 50));
    }

    #[test]
    fn test_tail_vertical_ties_trim_bottom() {
        // Seven cuts of 7 rows then one of 1, all from the bottom
        let flat = GrayImage::new(50, 100);
        let window = select_tail(&flat, 50, 50, 7).unwrap();
        assert_eq!(window.rect, Rect::new(0, 0, 50, 50));
    }

    #[test]
    fn test_select_window_uses_config() {
        let config = Config::new().set_strategy(Strategy::Tail).set_granularity(10);
        let window = select_window(&half_black(), 50, 50, &config).unwrap();
        assert_eq!(window.rect, Rect::new(50, 0, 100, 50));

        let config = config.set_granularity(0);
        assert!(select_window(&half_black(), 50, 50, &config).is_none());
    }
}
