use std::sync::Arc;

use hogscan_core::{Image, ScanError, ScanResult};
use log::{debug, info};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::DetectorConfig;
use crate::hog::{FeatureExtractor, HogExtractor};
use crate::pyramid::{Pyramid, DEFAULT_MIN_SIZE};
use crate::sliding_window::slide_window;
use crate::types::{DetectionResult, WindowSize};

/// Best-scoring window over all pyramid levels of `image`.
///
/// Levels use the default minimum size of 200x100. The result starts as a
/// zero-score match at (0, 0), scale 1.0, with an all-zero response map of
/// the image's shape, and is replaced only by a level whose best window
/// scores strictly higher. Levels are visited from the largest down, so on
/// ties the larger scale wins.
pub fn pyramid_score<E>(
    image: &Image,
    reference: &[f32],
    extractor: &E,
    window: WindowSize,
    step: usize,
    scale: f32,
) -> ScanResult<DetectionResult>
where
    E: FeatureExtractor + ?Sized,
{
    let levels = Pyramid::new(image, scale, DEFAULT_MIN_SIZE)?;
    scan_levels(image, levels, reference, extractor, window, step)
}

fn scan_levels<E>(
    image: &Image,
    levels: Pyramid,
    reference: &[f32],
    extractor: &E,
    window: WindowSize,
    step: usize,
) -> ScanResult<DetectionResult>
where
    E: FeatureExtractor + ?Sized,
{
    let (h, w) = image.shape();
    let mut best = DetectionResult::baseline(h, w);

    for level in levels {
        let level = level?;
        let scan = slide_window(&level.image, reference, extractor, step, window)?;
        debug!(
            "level {} ({}x{}, scale {:.3}): best {:.4} at ({}, {})",
            level.index,
            level.image.width(),
            level.image.height(),
            level.scale,
            scan.score,
            scan.row,
            scan.col
        );
        if scan.score > best.score {
            best = DetectionResult::from_scan(scan, level.scale);
        }
    }

    Ok(best)
}

/// Multi-scale template detector with HOG features.
///
/// Window scoring runs on a pool of `config.n_threads` workers owned by the
/// detector, so the setting holds whatever the global rayon pool looks like.
#[derive(Debug, Clone)]
pub struct PyramidDetector {
    config: DetectorConfig,
    extractor: HogExtractor,
    pool: Arc<ThreadPool>,
}

impl PyramidDetector {
    pub fn new(config: DetectorConfig) -> ScanResult<Self> {
        config.validate()?;
        let extractor = config.hog;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.n_threads)
            .thread_name(|i| format!("hogscan-worker-{}", i))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;
        Ok(Self {
            config,
            extractor,
            pool: Arc::new(pool),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn extractor(&self) -> &HogExtractor {
        &self.extractor
    }

    pub fn window(&self) -> WindowSize {
        self.config.window
    }

    /// Worker threads used for window scoring
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Reference descriptor of a template; the template must have the
    /// detector's window size
    pub fn reference_feature(&self, template: &Image) -> ScanResult<Vec<f32>> {
        let window = self.config.window;
        if WindowSize::of(template) != window {
            return Err(ScanError::ShapeMismatch {
                expected: (window.height, window.width),
                actual: template.shape(),
            });
        }
        self.extractor.extract(template)
    }

    /// Mean descriptor of several same-sized templates
    pub fn mean_reference_feature(&self, templates: &[Image]) -> ScanResult<Vec<f32>> {
        let len = self.extractor.descriptor_len(self.config.window)?;
        if templates.is_empty() {
            return Err(ScanError::Extractor("no templates to average".into()));
        }
        let mut mean = vec![0.0f32; len];
        for template in templates {
            for (m, v) in mean.iter_mut().zip(self.reference_feature(template)?) {
                *m += v;
            }
        }
        let n = templates.len() as f32;
        mean.iter_mut().for_each(|m| *m /= n);
        Ok(mean)
    }

    /// Pyramid levels of `image` under this configuration
    pub fn levels(&self, image: &Image) -> ScanResult<Pyramid> {
        Pyramid::new(image, self.config.scale, self.config.min_size)
    }

    /// Best window over all pyramid levels
    pub fn detect(&self, image: &Image, reference: &[f32]) -> ScanResult<DetectionResult> {
        let levels = self.levels(image)?;
        let result = self.pool.install(|| {
            scan_levels(image, levels, reference, &self.extractor, self.config.window, self.config.step_size)
        })?;
        let (row, col) = result.original_position();
        info!(
            "detection score {:.4} at scale {:.3} (input frame row {:.1}, col {:.1})",
            result.score, result.scale, row, col
        );
        Ok(result)
    }

    /// Best window in `image` at its own scale only
    pub fn detect_single_scale(&self, image: &Image, reference: &[f32]) -> ScanResult<DetectionResult> {
        let scan = self.pool.install(|| {
            slide_window(image, reference, &self.extractor, self.config.step_size, self.config.window)
        })?;
        Ok(DetectionResult::from_scan(scan, 1.0))
    }
}
