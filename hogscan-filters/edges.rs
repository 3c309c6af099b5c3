use hogscan_core::{GradientField, Image, ResponseMap, ScanResult};
use log::debug;

use crate::convolution::convolve;
use crate::gradient::gradient;
use crate::kernels::gaussian_kernel;
use crate::nms::non_maximum_suppression;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smoothing, gradient and non-maximum suppression chained into thin edges
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeDetector {
    /// Side of the Gaussian smoothing kernel
    pub kernel_size: usize,
    pub sigma: f32,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            sigma: 1.4,
        }
    }
}

impl EdgeDetector {
    pub fn new(kernel_size: usize, sigma: f32) -> ScanResult<Self> {
        gaussian_kernel(kernel_size, sigma)?;
        Ok(Self { kernel_size, sigma })
    }

    /// Gaussian-smoothed copy of `image` (kernel as built, not renormalized)
    pub fn smooth(&self, image: &Image) -> ScanResult<Image> {
        let kernel = gaussian_kernel(self.kernel_size, self.sigma)?;
        convolve(image, &kernel)
    }

    /// Gradient field of the smoothed image
    pub fn gradient(&self, image: &Image) -> ScanResult<GradientField> {
        gradient(&self.smooth(image)?)
    }

    /// Thinned gradient magnitude: zero except on ridge pixels
    pub fn detect(&self, image: &Image) -> ScanResult<ResponseMap> {
        let field = self.gradient(image)?;
        let edges = non_maximum_suppression(&field)?;
        debug!(
            "edge map {}x{}: {} ridge pixels",
            edges.width(),
            edges.height(),
            edges.as_slice().iter().filter(|&&v| v > 0.0).count()
        );
        Ok(edges)
    }
}
