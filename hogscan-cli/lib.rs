use std::path::Path;

use hogscan_core::{Image, ScanError};
use hogscan_detect::{DetectionResult, DetectorConfig, PyramidDetector, WindowSize};
use hogscan_filters::{corner_peaks, CornerPoint, EdgeDetector, HarrisDetector};
use image::{DynamicImage, GrayImage, ImageReader, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use log::info;

pub use hogscan_core::{self, Image as ScanImage};
pub use hogscan_detect::{self, DetectorBuilder};
pub use hogscan_filters;

#[derive(Debug)]
pub enum HogScanError {
    Scan(ScanError),
    Image(image::ImageError),
    Io(std::io::Error),
    Config(String),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for HogScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HogScanError::Scan(e) => write!(f, "Scan error: {}", e),
            HogScanError::Image(e) => write!(f, "Image error: {}", e),
            HogScanError::Io(e) => write!(f, "I/O error: {}", e),
            HogScanError::Config(msg) => write!(f, "Configuration error: {}", msg),
            HogScanError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for HogScanError {}

impl From<ScanError> for HogScanError {
    fn from(err: ScanError) -> Self {
        HogScanError::Scan(err)
    }
}

impl From<image::ImageError> for HogScanError {
    fn from(err: image::ImageError) -> Self {
        HogScanError::Image(err)
    }
}

impl From<std::io::Error> for HogScanError {
    fn from(err: std::io::Error) -> Self {
        HogScanError::Io(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for HogScanError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        HogScanError::ThreadPool(err)
    }
}

pub type HogScanResult<T> = Result<T, HogScanError>;

/// Decode any supported image file into grayscale with values in [0, 1]
pub fn load_gray<P: AsRef<Path>>(path: P) -> HogScanResult<Image> {
    let gray = ImageReader::open(path)?.decode()?.to_luma32f();
    let (w, h) = gray.dimensions();
    Ok(Image::from_vec(w as usize, h as usize, gray.into_raw())?)
}

/// Stretch `image` to the full 8-bit range; constant images map to black
pub fn to_gray8(image: &Image) -> GrayImage {
    let (lo, hi) = image.min_max().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    GrayImage::from_fn(image.width() as u32, image.height() as u32, |x, y| {
        let v = image.get(x as usize, y as usize);
        let t = if span > 0.0 { (v - lo) / span } else { 0.0 };
        Luma([(t * 255.0).round().clamp(0.0, 255.0) as u8])
    })
}

/// Save a response map as a contrast-stretched grayscale image
pub fn save_map<P: AsRef<Path>>(map: &Image, path: P) -> HogScanResult<()> {
    to_gray8(map).save(path)?;
    Ok(())
}

/// Load a detector configuration; `.toml` files are read as TOML, anything
/// else as JSON
pub fn load_config<P: AsRef<Path>>(path: P) -> HogScanResult<DetectorConfig> {
    let path = path.as_ref();
    let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let loaded = if is_toml {
        DetectorConfig::load_toml(path)
    } else {
        DetectorConfig::load_json(path)
    };
    loaded.map_err(|e| HogScanError::Config(format!("{}: {}", path.display(), e)))
}

/// Grayscale `image` as RGB, ready for colored overlays
pub fn to_rgb(image: &Image) -> RgbImage {
    DynamicImage::ImageLuma8(to_gray8(image)).to_rgb8()
}

/// Outline the detected window, mapped back to input-image pixels
pub fn draw_detection(canvas: &mut RgbImage, result: &DetectionResult, window: WindowSize) {
    let (row, col) = result.original_position();
    let (h, w) = result.original_window(window);
    let rect = Rect::at(col.round() as i32, row.round() as i32).of_size((w.round() as u32).max(1), (h.round() as u32).max(1));
    draw_hollow_rect_mut(canvas, rect, Rgb([255, 0, 0]));
    draw_cross_mut(
        canvas,
        Rgb([255, 0, 0]),
        (col + w / 2.0).round() as i32,
        (row + h / 2.0).round() as i32,
    );
}

/// Circle every corner
pub fn draw_corners(canvas: &mut RgbImage, corners: &[CornerPoint]) {
    for corner in corners {
        draw_hollow_circle_mut(canvas, (corner.col as i32, corner.row as i32), 3, Rgb([255, 0, 0]));
    }
}

/// High-level pipeline: template search plus the edge and corner maps
pub struct HogScan {
    detector: PyramidDetector,
    edges: EdgeDetector,
    harris: HarrisDetector,
}

impl HogScan {
    pub fn new(config: DetectorConfig) -> HogScanResult<Self> {
        Ok(Self {
            detector: PyramidDetector::new(config)?,
            edges: EdgeDetector::default(),
            harris: HarrisDetector::default(),
        })
    }

    pub fn with_edge_detector(mut self, edges: EdgeDetector) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_harris_detector(mut self, harris: HarrisDetector) -> Self {
        self.harris = harris;
        self
    }

    pub fn detector(&self) -> &PyramidDetector {
        &self.detector
    }

    /// Find `template` in `scene`; the template is resized to the detector's
    /// window when their sizes differ
    pub fn detect(&self, scene: &Image, template: &Image) -> HogScanResult<DetectionResult> {
        let window = self.detector.window();
        let template = if WindowSize::of(template) == window {
            template.clone()
        } else {
            info!(
                "resizing {}x{} template to {}x{} window",
                template.width(),
                template.height(),
                window.width,
                window.height
            );
            template.resize(window.width, window.height)?
        };
        let reference = self.detector.reference_feature(&template)?;
        Ok(self.detector.detect(scene, &reference)?)
    }

    /// Thinned edge magnitudes
    pub fn edges(&self, image: &Image) -> HogScanResult<Image> {
        Ok(self.edges.detect(image)?)
    }

    /// Harris corners at least `min_distance` apart
    pub fn corners(&self, image: &Image, min_distance: usize, threshold_rel: f32) -> HogScanResult<Vec<CornerPoint>> {
        let response = self.harris.response(image)?;
        Ok(corner_peaks(&response, min_distance, threshold_rel)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hogscan_detect::BlockNorm;

    fn scene() -> Image {
        Image::from_fn(240, 220, |x, y| {
            if (102..122).contains(&x) && (90..110).contains(&y) {
                1.0
            } else {
                0.3
            }
        })
    }

    #[test]
    fn test_error_conversions() {
        let err: HogScanError = ScanError::InvalidStep(0).into();
        assert!(matches!(err, HogScanError::Scan(_)));
        assert!(err.to_string().starts_with("Scan error"));

        let err: HogScanError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_to_gray8_stretches_range() {
        let img = Image::from_fn(3, 1, |x, _| x as f32 * 10.0 - 5.0);
        let gray = to_gray8(&img);
        assert_eq!(gray.as_raw(), &vec![0, 128, 255]);
        assert!(to_gray8(&Image::filled(2, 2, 4.0)).as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_load_gray_round_trip() {
        let path = std::env::temp_dir().join(format!("hogscan-cli-test-{}.png", std::process::id()));
        let img = Image::from_fn(8, 4, |x, _| x as f32);
        save_map(&img, &path).unwrap();
        let loaded = load_gray(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.dimensions(), (8, 4));
        let (lo, hi) = loaded.min_max().unwrap();
        assert!(lo >= 0.0 && hi <= 1.0);
        assert!(loaded.get(7, 0) > loaded.get(0, 0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_gray("/definitely/not/here.png");
        assert!(matches!(result, Err(HogScanError::Io(_))));
    }

    #[test]
    fn test_bad_config_file() {
        let path = std::env::temp_dir().join(format!("hogscan-cli-test-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(HogScanError::Config(_))));
    }

    #[test]
    fn test_pipeline_finds_square() {
        let scene = scene();
        let mut config = DetectorConfig::fine_preset(WindowSize::square(40));
        config.hog.block_norm = BlockNorm::L2;
        let pipeline = HogScan::new(config).unwrap();
        let template = scene.crop(92, 80, 40, 40).unwrap();
        let result = pipeline.detect(&scene, &template).unwrap();
        assert_eq!(result.scale, 1.0);
        assert_eq!((result.row, result.col), (80, 92));

        // A differently sized template is resized to the window
        let big = scene.crop(82, 70, 60, 60).unwrap();
        assert!(pipeline.detect(&scene, &big).is_ok());
    }

    #[test]
    fn test_edges_and_corners() {
        let scene = scene();
        let pipeline = HogScan::new(DetectorConfig::new(WindowSize::square(32))).unwrap();
        let edges = pipeline.edges(&scene).unwrap();
        assert_eq!(edges.shape(), scene.shape());
        let corners = pipeline.corners(&scene, 5, 0.1).unwrap();
        assert_eq!(corners.len(), 4, "{:?}", corners);
    }

    #[test]
    fn test_drawing_clips_at_border() {
        let mut canvas = to_rgb(&scene());
        let result = DetectionResult {
            score: 1.0,
            row: -8,
            col: -8,
            scale: 0.9,
            response_map: Image::new(240, 220),
        };
        draw_detection(&mut canvas, &result, WindowSize::square(32));
        draw_corners(&mut canvas, &[CornerPoint { row: 0, col: 239, response: 1.0 }]);
        assert_eq!(canvas.dimensions(), (240, 220));
    }
}
