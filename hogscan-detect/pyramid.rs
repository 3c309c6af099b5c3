use hogscan_core::{Image, ScanError, ScanResult};
use log::trace;

use crate::types::{PyramidLevel, WindowSize};

/// Smallest level (height, width) accepted by default
pub const DEFAULT_MIN_SIZE: WindowSize = WindowSize { height: 200, width: 100 };

/// Lazily generated image pyramid.
///
/// Level 0 is the input image at scale 1.0; each further level is the
/// previous one rescaled by `factor`. A level is produced only if it fits
/// `min_size`: generation stops once shrinking the last level again would
/// take its height or width below the minimum. The input image itself is
/// always produced, whatever its size.
///
/// Each level is computed when the previous one is handed out, so at most
/// two levels are held at once.
#[derive(Debug)]
pub struct Pyramid {
    pending: Option<ScanResult<PyramidLevel>>,
    factor: f32,
    min_size: WindowSize,
}

impl Pyramid {
    pub fn new(image: &Image, factor: f32, min_size: WindowSize) -> ScanResult<Self> {
        if factor.is_nan() || factor <= 0.0 || factor >= 1.0 {
            return Err(ScanError::InvalidScale(factor));
        }
        if min_size.height == 0 || min_size.width == 0 {
            return Err(ScanError::InvalidMinSize {
                height: min_size.height,
                width: min_size.width,
            });
        }
        image.ensure_non_empty()?;

        Ok(Self {
            pending: Some(Ok(PyramidLevel {
                index: 0,
                scale: 1.0,
                image: image.clone(),
            })),
            factor,
            min_size,
        })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    fn has_next(&self, level: &PyramidLevel) -> bool {
        let (h, w) = level.image.shape();
        h as f32 * self.factor >= self.min_size.height as f32 && w as f32 * self.factor >= self.min_size.width as f32
    }
}

impl Iterator for Pyramid {
    type Item = ScanResult<PyramidLevel>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.pending.take()?;
        if let Ok(level) = &item {
            if self.has_next(level) {
                let index = level.index + 1;
                let scale = level.scale * self.factor;
                self.pending = Some(level.image.rescale(self.factor).map(|image| {
                    trace!("pyramid level {}: {}x{} at scale {:.3}", index, image.width(), image.height(), scale);
                    PyramidLevel { index, scale, image }
                }));
            }
        }
        Some(item)
    }
}

/// Pyramid of `image` shrinking by `factor` while levels stay at least
/// `min_size`
pub fn pyramid(image: &Image, factor: f32, min_size: WindowSize) -> ScanResult<Pyramid> {
    Pyramid::new(image, factor, min_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn levels(image: &Image, factor: f32, min_size: WindowSize) -> Vec<PyramidLevel> {
        pyramid(image, factor, min_size)
            .unwrap()
            .collect::<ScanResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_stops_before_going_under_min_size() {
        // 220 * 0.9 = 198 < 200
        let img = Image::new(150, 220);
        let levels = levels(&img, 0.9, DEFAULT_MIN_SIZE);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].scale, 1.0);
        assert_eq!(levels[0].image, img);
    }

    #[test]
    fn test_level_sizes() {
        let img = Image::new(256, 256);
        let sizes: Vec<(usize, usize)> = levels(&img, 0.9, DEFAULT_MIN_SIZE)
            .iter()
            .map(|l| l.image.shape())
            .collect();
        assert_eq!(sizes, vec![(256, 256), (230, 230), (207, 207)]);
    }

    #[test]
    fn test_scales_are_powers_of_factor() {
        let img = Image::from_fn(300, 400, |x, y| (x + y) as f32);
        let levels = levels(&img, 0.8, WindowSize::new(50, 50));
        assert!(levels.len() > 3);
        for (i, level) in levels.iter().enumerate() {
            assert_eq!(level.index, i);
            assert_relative_eq!(level.scale, 0.8f32.powi(i as i32), epsilon = 1e-5);
        }
        for pair in levels.windows(2) {
            assert!(pair[1].scale < pair[0].scale);
            assert!(pair[1].image.height() < pair[0].image.height());
        }
        let last = levels.last().unwrap();
        assert!(last.image.height() >= 50 && last.image.width() >= 50);
    }

    #[test]
    fn test_width_limit_also_stops() {
        let img = Image::new(105, 1000);
        assert_eq!(levels(&img, 0.9, DEFAULT_MIN_SIZE).len(), 1);
    }

    #[test]
    fn test_small_input_still_yields_itself() {
        let img = Image::new(10, 10);
        assert_eq!(levels(&img, 0.5, DEFAULT_MIN_SIZE).len(), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        let img = Image::new(10, 10);
        assert!(matches!(pyramid(&img, 1.0, DEFAULT_MIN_SIZE), Err(ScanError::InvalidScale(_))));
        assert!(matches!(pyramid(&img, 0.0, DEFAULT_MIN_SIZE), Err(ScanError::InvalidScale(_))));
        assert!(matches!(pyramid(&img, f32::NAN, DEFAULT_MIN_SIZE), Err(ScanError::InvalidScale(_))));
        assert!(matches!(
            pyramid(&img, 0.5, WindowSize::new(0, 4)),
            Err(ScanError::InvalidMinSize { .. })
        ));
        assert!(pyramid(&Image::new(0, 0), 0.5, DEFAULT_MIN_SIZE).is_err());
    }
}
