//! Image-array transforms: convolution, derivative kernels, gradient fields,
//! non-maximum suppression and Harris cornerness.

pub mod convolution;
pub mod edges;
pub mod gradient;
pub mod harris;
pub mod kernels;
pub mod nms;
pub mod peaks;

pub use convolution::convolve;
pub use edges::EdgeDetector;
pub use gradient::{gradient, partial_x, partial_y, sobel_gradients};
pub use harris::{harris_response, HarrisDetector};
pub use kernels::{gaussian_kernel, normalize_kernel};
pub use nms::non_maximum_suppression;
pub use peaks::{corner_peaks, CornerPoint};
