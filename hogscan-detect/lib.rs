//! Multi-scale sliding-window template search.
//!
//! Windows of an image are described by a [`FeatureExtractor`] (HOG by
//! default) and scored by dot product against a reference descriptor. The
//! search runs at every level of a lazily built image pyramid and reports the
//! single best window.
//!
//! ```no_run
//! use hogscan_core::Image;
//! use hogscan_detect::DetectorBuilder;
//!
//! # fn main() -> hogscan_core::ScanResult<()> {
//! let scene = Image::filled(320, 240, 0.5);
//! let template = scene.crop(100, 80, 64, 64)?;
//! let detector = DetectorBuilder::new(64, 64).preset_fine().build()?;
//! let reference = detector.reference_feature(&template)?;
//! let found = detector.detect(&scene, &reference)?;
//! println!("score {} at {:?}", found.score, found.original_position());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod detector;
pub mod hog;
pub mod pyramid;
pub mod sliding_window;
pub mod types;

pub use builder::DetectorBuilder;
pub use config::DetectorConfig;
pub use detector::{pyramid_score, PyramidDetector};
pub use hog::{BlockNorm, FeatureExtractor, HogExtractor};
pub use pyramid::{pyramid, Pyramid, DEFAULT_MIN_SIZE};
pub use sliding_window::{dot, slide_window};
pub use types::{DetectionResult, PyramidLevel, WindowScan, WindowSize};
