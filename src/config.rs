use image::imageops::FilterType;

/// Step size used when no granularity is configured
pub const DEFAULT_GRANULARITY: i32 = 8;

/// Relative aspect difference under which an image is resized without searching
pub const DEFAULT_ASPECT_TOLERANCE: f64 = 0.001;

/// Window search strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Slide a full-size window and score every position
    ///
    /// Most accurate and most expensive.
    #[default]
    Accurate,
    /// Score disjoint strips once and keep the run with the largest sum
    Stripes,
    /// Trim the less interesting end of the image until the window fits
    ///
    /// Cheapest, but greedy.
    Tail,
}

/// Configuration options for the crop search
///
/// This struct encapsulates the parameters that trade search speed against
/// accuracy, plus the resampling filter used for the final resize.
#[derive(Clone, Debug)]
pub struct Config {
    /// Which search strategy picks the crop window
    pub strategy: Strategy,

    /// Step size in pixels between candidate positions or strips
    ///
    /// Larger values are faster but coarser. Values `<= 0` make every search
    /// return no result.
    pub granularity: i32,

    /// Relative aspect difference below which the whole image is kept
    ///
    /// With the default of 0.001, an image whose aspect ratio is within 0.1%
    /// of the target is resized directly.
    pub aspect_tolerance: f64,

    /// Resampling filter for the final resize
    pub filter: FilterType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::Accurate,
            granularity: DEFAULT_GRANULARITY,
            aspect_tolerance: DEFAULT_ASPECT_TOLERANCE,
            filter: FilterType::Triangle,
        }
    }
}

impl Config {
    // Create a new instance
    pub fn new() -> Self {
        Self::default()
    }

    // Set search strategy
    pub fn set_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    // Set step size
    pub fn set_granularity(mut self, granularity: i32) -> Self {
        self.granularity = granularity;
        self
    }

    // Set aspect tolerance
    pub fn set_aspect_tolerance(mut self, tolerance: f64) -> Self {
        self.aspect_tolerance = tolerance;
        self
    }

    // Set resize filter
    pub fn set_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.strategy, Strategy::Accurate);
        assert_eq!(config.granularity, 8);
        assert!((config.aspect_tolerance - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.filter, FilterType::Triangle);
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::new()
            .set_strategy(Strategy::Tail)
            .set_granularity(3)
            .set_aspect_tolerance(0.05)
            .set_filter(FilterType::Nearest);

        assert_eq!(config.strategy, Strategy::Tail);
        assert_eq!(config.granularity, 3);
        assert!((config.aspect_tolerance - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.filter, FilterType::Nearest);
    }
}
