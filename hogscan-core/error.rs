/// Broad class of a [`ScanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed array, kernel or window geometry.
    Shape,
    /// Out-of-range tuning parameter.
    Config,
    /// The feature extractor rejected a patch.
    Extractor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    InvalidImageSize { width: usize, height: usize },
    InvalidImageData { expected_len: usize, actual_len: usize },
    RaggedRows { row: usize, expected_len: usize, actual_len: usize },
    InvalidKernel { width: usize, height: usize },
    InvalidWindow { width: usize, height: usize },
    ShapeMismatch { expected: (usize, usize), actual: (usize, usize) },
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
    InvalidScale(f32),
    InvalidMinSize { height: usize, width: usize },
    InvalidStep(usize),
    InvalidSigma(f32),
    InvalidParameter { name: &'static str, value: f32 },
    ThreadPool(String),
    Extractor(String),
    FeatureLength { expected: usize, actual: usize },
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::InvalidImageSize { .. }
            | ScanError::InvalidImageData { .. }
            | ScanError::RaggedRows { .. }
            | ScanError::InvalidKernel { .. }
            | ScanError::InvalidWindow { .. }
            | ScanError::ShapeMismatch { .. }
            | ScanError::OutOfBounds { .. } => ErrorKind::Shape,
            ScanError::InvalidScale(_)
            | ScanError::InvalidMinSize { .. }
            | ScanError::InvalidStep(_)
            | ScanError::InvalidSigma(_)
            | ScanError::InvalidParameter { .. }
            | ScanError::ThreadPool(_) => ErrorKind::Config,
            ScanError::Extractor(_) | ScanError::FeatureLength { .. } => ErrorKind::Extractor,
        }
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            ScanError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            ScanError::RaggedRows { row, expected_len, actual_len } => {
                write!(f, "Row {} has {} samples, expected {} (input is not 2-dimensional)", row, actual_len, expected_len)
            }
            ScanError::InvalidKernel { width, height } => {
                write!(f, "Invalid kernel dimensions: {}x{} (must have non-zero area)", width, height)
            }
            ScanError::InvalidWindow { width, height } => {
                write!(f, "Invalid window dimensions: {}x{} (must have non-zero area)", width, height)
            }
            ScanError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)
            }
            ScanError::OutOfBounds { x, y, width, height } => {
                write!(f, "Region at ({}, {}) of size {}x{} exceeds image bounds", x, y, width, height)
            }
            ScanError::InvalidScale(s) => {
                write!(f, "Invalid pyramid scale: {} (must be in (0, 1))", s)
            }
            ScanError::InvalidMinSize { height, width } => {
                write!(f, "Invalid minimum size: {}x{} (must be > 0)", height, width)
            }
            ScanError::InvalidStep(s) => {
                write!(f, "Invalid step size: {} (must be > 0)", s)
            }
            ScanError::InvalidSigma(s) => {
                write!(f, "Invalid sigma: {} (must be finite and > 0)", s)
            }
            ScanError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
            ScanError::ThreadPool(msg) => {
                write!(f, "Thread pool error: {}", msg)
            }
            ScanError::Extractor(msg) => {
                write!(f, "Feature extractor rejected patch: {}", msg)
            }
            ScanError::FeatureLength { expected, actual } => {
                write!(f, "Feature length mismatch: reference has {}, window produced {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for ScanError {}

pub type ScanResult<T> = Result<T, ScanError>;
