pub mod error;
pub mod image;

pub use crate::error::{ErrorKind, ScanError, ScanResult};
pub use crate::image::Image;

/// 2D array of filter weights; odd sides give it a well-defined center
pub type Kernel = Image;

/// Per-pixel score map (cornerness, window match score, thinned edges)
pub type ResponseMap = Image;

/// Gradient magnitude and direction (degrees in [0, 360)) of the same shape
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    pub magnitude: Image,
    pub direction: Image,
}

impl GradientField {
    pub fn new(magnitude: Image, direction: Image) -> ScanResult<Self> {
        magnitude.ensure_same_shape(&direction)?;
        Ok(Self { magnitude, direction })
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        self.magnitude.shape()
    }
}

/// Number of worker threads to use when none is configured
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
