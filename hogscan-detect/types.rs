use hogscan_core::{Image, ResponseMap, ScanError, ScanResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Height and width of a detection window, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowSize {
    pub height: usize,
    pub width: usize,
}

impl WindowSize {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    pub fn square(side: usize) -> Self {
        Self::new(side, side)
    }

    /// Window matching the shape of `image`
    pub fn of(image: &Image) -> Self {
        let (height, width) = image.shape();
        Self { height, width }
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.height == 0 || self.width == 0 {
            return Err(ScanError::InvalidWindow {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// One level of an image pyramid
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidLevel {
    /// 0 for the input image, counting up as the image shrinks
    pub index: usize,
    /// Size of this level relative to the input, `factor^index`
    pub scale: f32,
    pub image: Image,
}

/// Outcome of scanning a single image with a sliding window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowScan {
    pub score: f32,
    /// Top-left corner of the best window; negative when the window hangs
    /// over the zero padding at the top or left edge
    pub row: isize,
    pub col: isize,
    /// Window scores resized to the scanned image's shape
    pub response_map: ResponseMap,
}

/// Best match found across all pyramid levels.
///
/// `row`/`col` are in the coordinate frame of the pyramid level the match
/// was found at; [`DetectionResult::original_position`] maps them back to
/// the input image.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub score: f32,
    pub row: isize,
    pub col: isize,
    pub scale: f32,
    pub response_map: ResponseMap,
}

impl DetectionResult {
    /// Result reported when no window scores above zero
    pub(crate) fn baseline(height: usize, width: usize) -> Self {
        Self {
            score: 0.0,
            row: 0,
            col: 0,
            scale: 1.0,
            response_map: Image::new(width, height),
        }
    }

    /// Top-left corner of the match in input-image pixels, (row, col)
    pub fn original_position(&self) -> (f32, f32) {
        (self.row as f32 / self.scale, self.col as f32 / self.scale)
    }

    /// Window extent in input-image pixels, (height, width)
    pub fn original_window(&self, window: WindowSize) -> (f32, f32) {
        (window.height as f32 / self.scale, window.width as f32 / self.scale)
    }

    pub fn from_scan(scan: WindowScan, scale: f32) -> Self {
        Self {
            score: scan.score,
            row: scan.row,
            col: scan.col,
            scale,
            response_map: scan.response_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_validation() {
        assert!(WindowSize::new(10, 8).validate().is_ok());
        assert!(matches!(
            WindowSize::new(0, 8).validate(),
            Err(ScanError::InvalidWindow { width: 8, height: 0 })
        ));
        assert_eq!(WindowSize::of(&Image::new(7, 3)), WindowSize::new(3, 7));
    }

    #[test]
    fn test_original_position_divides_by_scale() {
        let result = DetectionResult {
            score: 1.0,
            row: 45,
            col: -9,
            scale: 0.9,
            response_map: Image::new(4, 4),
        };
        let (r, c) = result.original_position();
        assert_relative_eq!(r, 50.0, epsilon = 1e-4);
        assert_relative_eq!(c, -10.0, epsilon = 1e-4);
        let (h, w) = result.original_window(WindowSize::new(18, 9));
        assert_relative_eq!(h, 20.0, epsilon = 1e-4);
        assert_relative_eq!(w, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_baseline_is_zero_everywhere() {
        let base = DetectionResult::baseline(6, 9);
        assert_eq!(base.score, 0.0);
        assert_eq!((base.row, base.col), (0, 0));
        assert_eq!(base.scale, 1.0);
        assert_eq!(base.response_map.shape(), (6, 9));
        assert_eq!(base.response_map.sum(), 0.0);
    }
}
