use hogscan_core::ScanResult;

use crate::config::DetectorConfig;
use crate::detector::PyramidDetector;
use crate::hog::BlockNorm;
use crate::types::WindowSize;

/// Fluent API builder for detector configuration
#[derive(Debug, Clone)]
pub struct DetectorBuilder {
    config: DetectorConfig,
}

impl DetectorBuilder {
    /// Create new builder with default settings for a `height` x `width` window
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            config: DetectorConfig::new(WindowSize::new(height, width)),
        }
    }

    /// Set pixels between window positions
    pub fn step_size(mut self, step_size: usize) -> Self {
        self.config.step_size = step_size;
        self
    }

    /// Set pyramid shrink factor per level
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    /// Set the smallest pyramid level kept
    pub fn min_size(mut self, height: usize, width: usize) -> Self {
        self.config.min_size = WindowSize::new(height, width);
        self
    }

    /// Set HOG cell side in pixels
    pub fn cell_size(mut self, cell_size: usize) -> Self {
        self.config.hog.cell_size = cell_size;
        self
    }

    /// Set number of orientation bins
    pub fn orientations(mut self, orientations: usize) -> Self {
        self.config.hog.orientations = orientations;
        self
    }

    /// Set block side in cells
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.hog.block_size = block_size;
        self
    }

    pub fn block_norm(mut self, block_norm: BlockNorm) -> Self {
        self.config.hog.block_norm = block_norm;
        self
    }

    /// Set number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Apply coarse preset (wide steps, steep pyramid)
    pub fn preset_coarse(mut self) -> Self {
        self.config.step_size = 20;
        self.config.scale = 0.8;
        self
    }

    /// Apply fine preset (dense steps)
    pub fn preset_fine(mut self) -> Self {
        self.config.step_size = 4;
        self.config.scale = 0.9;
        self
    }

    /// Apply exhaustive preset (every pixel offset)
    pub fn preset_exhaustive(mut self) -> Self {
        self.config.step_size = 1;
        self.config.scale = 0.9;
        self
    }

    /// Build configured detector
    pub fn build(self) -> ScanResult<PyramidDetector> {
        PyramidDetector::new(self.config)
    }

    /// Generate summary of current configuration
    pub fn summary(&self) -> String {
        format!("DetectorBuilder: {}", self.config.summary())
    }

    /// Create builder from existing configuration
    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Convert builder to configuration
    pub fn to_config(self) -> DetectorConfig {
        self.config
    }

    pub fn window(&self) -> WindowSize {
        self.config.window
    }
}
