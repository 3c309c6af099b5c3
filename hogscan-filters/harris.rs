use hogscan_core::{Image, ResponseMap, ScanError, ScanResult};
use rayon::prelude::*;

use crate::gradient::sobel_gradients;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Harris cornerness scoring.
///
/// Builds the second-moment matrix `M = sum [[dx^2, dx dy], [dx dy, dy^2]]`
/// over a box window around every pixel and scores it as
/// `det(M) - k * trace(M)^2`. Positive values indicate corners, negative
/// values edges, values near zero flat regions. No thresholding happens here;
/// see [`crate::peaks`] for turning the map into points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarrisDetector {
    /// Side of the box window summing the derivative products
    pub window_size: usize,
    /// Sensitivity constant; typical range 0.04-0.06
    pub k: f32,
}

impl Default for HarrisDetector {
    fn default() -> Self {
        Self {
            window_size: 3,
            k: 0.04,
        }
    }
}

impl HarrisDetector {
    pub fn new(window_size: usize, k: f32) -> ScanResult<Self> {
        let detector = Self { window_size, k };
        detector.validate()?;
        Ok(detector)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.window_size == 0 {
            return Err(ScanError::InvalidWindow {
                width: self.window_size,
                height: self.window_size,
            });
        }
        if !self.k.is_finite() {
            return Err(ScanError::InvalidParameter { name: "harris k", value: self.k });
        }
        Ok(())
    }

    /// Per-pixel cornerness map, same shape as `image`
    pub fn response(&self, image: &Image) -> ScanResult<ResponseMap> {
        self.validate()?;
        let (w, h) = image.dimensions();
        if image.is_empty() {
            return Ok(Image::new(w, h));
        }

        let (dx, dy) = sobel_gradients(image)?;
        let ixx = dx.zip_map(&dx, |a, b| a * b)?;
        let iyy = dy.zip_map(&dy, |a, b| a * b)?;
        let ixy = dx.zip_map(&dy, |a, b| a * b)?;

        let win = self.window_size as isize;
        let half = win / 2;
        let k = self.k;

        let mut out = Image::new(w, h);
        out.as_mut_slice()
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
                    for ty in 0..win {
                        let sy = y as isize + half - ty;
                        if sy < 0 || sy >= h as isize {
                            continue;
                        }
                        for tx in 0..win {
                            let sx = x as isize + half - tx;
                            if sx < 0 || sx >= w as isize {
                                continue;
                            }
                            let (sx, sy) = (sx as usize, sy as usize);
                            a += ixx.get(sx, sy);
                            b += iyy.get(sx, sy);
                            c += ixy.get(sx, sy);
                        }
                    }
                    let det = a * b - c * c;
                    let trace = a + b;
                    *px = det - k * trace * trace;
                }
            });

        Ok(out)
    }
}

/// Harris response with an explicit window size and sensitivity
pub fn harris_response(image: &Image, window_size: usize, k: f32) -> ScanResult<ResponseMap> {
    HarrisDetector::new(window_size, k)?.response(image)
}
