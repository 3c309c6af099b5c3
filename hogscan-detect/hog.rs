use hogscan_core::{Image, ScanError, ScanResult};
use imageproc::drawing::BresenhamLineIter;

use crate::types::WindowSize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NORM_EPS: f32 = 1e-5;
const L2HYS_CLIP: f32 = 0.2;

/// Turns an image patch into a fixed-length descriptor.
///
/// Implementations must be deterministic and return descriptors of the same
/// length for every patch of a given shape; window scores are dot products
/// against a reference descriptor built by the same extractor. The sliding
/// window calls `extract` from several threads at once.
pub trait FeatureExtractor: Send + Sync {
    /// Side of the square cells the descriptor is pooled over
    fn cell_size(&self) -> usize;

    fn extract(&self, patch: &Image) -> ScanResult<Vec<f32>>;

    /// Descriptor plus a renderable picture of it, same shape as `patch`
    fn extract_with_visualization(&self, patch: &Image) -> ScanResult<(Vec<f32>, Image)> {
        let features = self.extract(patch)?;
        Ok((features, Image::new(patch.width(), patch.height())))
    }
}

/// Normalization applied to each block of cell histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlockNorm {
    /// `v / (sum|v| + eps)`
    #[default]
    L1,
    /// Square root of the L1-normalized block
    L1Sqrt,
    /// `v / sqrt(sum v^2 + eps^2)`
    L2,
    /// L2, clipped at 0.2, then L2 again
    L2Hys,
}

impl BlockNorm {
    fn apply(self, block: &mut [f32]) {
        match self {
            BlockNorm::L1 => scale_l1(block),
            BlockNorm::L1Sqrt => {
                scale_l1(block);
                block.iter_mut().for_each(|v| *v = v.sqrt());
            }
            BlockNorm::L2 => scale_l2(block),
            BlockNorm::L2Hys => {
                scale_l2(block);
                block.iter_mut().for_each(|v| *v = v.min(L2HYS_CLIP));
                scale_l2(block);
            }
        }
    }
}

fn scale_l1(block: &mut [f32]) {
    let norm = block.iter().map(|v| v.abs()).sum::<f32>() + NORM_EPS;
    block.iter_mut().for_each(|v| *v /= norm);
}

fn scale_l2(block: &mut [f32]) {
    let norm = (block.iter().map(|v| v * v).sum::<f32>() + NORM_EPS * NORM_EPS).sqrt();
    block.iter_mut().for_each(|v| *v /= norm);
}

/// Histogram of oriented gradients.
///
/// Gradients are centered differences (zero on the patch border) binned by
/// unsigned orientation over [0, 180) degrees and weighted by magnitude.
/// Each `cell_size` x `cell_size` cell yields one histogram, averaged over the
/// cell area. Overlapping `block_size` x `block_size` groups of cells, one
/// per cell position, are normalized and concatenated row by row. Pixels
/// past the last whole cell are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HogExtractor {
    pub cell_size: usize,
    pub orientations: usize,
    /// Block side, in cells
    pub block_size: usize,
    pub block_norm: BlockNorm,
}

impl Default for HogExtractor {
    fn default() -> Self {
        Self {
            cell_size: 8,
            orientations: 9,
            block_size: 3,
            block_norm: BlockNorm::L1,
        }
    }
}

/// Per-cell orientation histograms, row-major over cells
struct CellGrid {
    rows: usize,
    cols: usize,
    bins: usize,
    hist: Vec<f32>,
}

impl CellGrid {
    fn cell(&self, row: usize, col: usize) -> &[f32] {
        let start = (row * self.cols + col) * self.bins;
        &self.hist[start..start + self.bins]
    }
}

impl HogExtractor {
    pub fn new(cell_size: usize) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    pub fn with_orientations(mut self, orientations: usize) -> Self {
        self.orientations = orientations;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_block_norm(mut self, block_norm: BlockNorm) -> Self {
        self.block_norm = block_norm;
        self
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.cell_size == 0 {
            return Err(ScanError::Extractor("cell size must be at least 1 pixel".into()));
        }
        if self.orientations == 0 {
            return Err(ScanError::Extractor("at least one orientation bin is required".into()));
        }
        if self.block_size == 0 {
            return Err(ScanError::Extractor("block size must be at least 1 cell".into()));
        }
        Ok(())
    }

    /// Descriptor length for patches of the given size
    pub fn descriptor_len(&self, window: WindowSize) -> ScanResult<usize> {
        let (rows, cols) = self.cell_counts(window.width, window.height)?;
        let blocks = (rows - self.block_size + 1) * (cols - self.block_size + 1);
        Ok(blocks * self.block_size * self.block_size * self.orientations)
    }

    fn cell_counts(&self, width: usize, height: usize) -> ScanResult<(usize, usize)> {
        self.validate()?;
        let rows = height / self.cell_size;
        let cols = width / self.cell_size;
        if rows < self.block_size || cols < self.block_size {
            return Err(ScanError::Extractor(format!(
                "{}x{} patch holds {}x{} cells of {} px, fewer than one {}x{} block",
                width, height, cols, rows, self.cell_size, self.block_size, self.block_size
            )));
        }
        Ok((rows, cols))
    }

    fn cell_grid(&self, patch: &Image) -> ScanResult<CellGrid> {
        let (w, h) = patch.dimensions();
        let (rows, cols) = self.cell_counts(w, h)?;
        let cs = self.cell_size;
        let bins = self.orientations;
        let bin_width = 180.0 / bins as f32;

        let mut hist = vec![0.0f32; rows * cols * bins];
        for y in 0..rows * cs {
            for x in 0..cols * cs {
                let gx = if x > 0 && x + 1 < w { patch.get(x + 1, y) - patch.get(x - 1, y) } else { 0.0 };
                let gy = if y > 0 && y + 1 < h { patch.get(x, y + 1) - patch.get(x, y - 1) } else { 0.0 };
                let magnitude = (gx * gx + gy * gy).sqrt();
                if magnitude == 0.0 {
                    continue;
                }
                let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);
                let bin = ((angle / bin_width) as usize).min(bins - 1);
                let cell = (y / cs) * cols + x / cs;
                hist[cell * bins + bin] += magnitude;
            }
        }

        let area = (cs * cs) as f32;
        hist.iter_mut().for_each(|v| *v /= area);
        Ok(CellGrid { rows, cols, bins, hist })
    }

    fn normalize_blocks(&self, grid: &CellGrid) -> Vec<f32> {
        let b = self.block_size;
        let block_len = b * b * grid.bins;
        let n_blocks = (grid.rows - b + 1) * (grid.cols - b + 1);
        let mut features = Vec::with_capacity(n_blocks * block_len);

        for br in 0..=grid.rows - b {
            for bc in 0..=grid.cols - b {
                let start = features.len();
                for r in br..br + b {
                    for c in bc..bc + b {
                        features.extend_from_slice(grid.cell(r, c));
                    }
                }
                self.block_norm.apply(&mut features[start..]);
            }
        }
        features
    }

    /// Star glyph per cell: one line per orientation bin, perpendicular to the
    /// gradient it stands for, brightness proportional to the bin value.
    fn render(&self, grid: &CellGrid, width: usize, height: usize) -> Image {
        let mut out = Image::new(width, height);
        let cs = self.cell_size;
        let radius = ((cs / 2) as f32 - 1.0).max(0.0);

        for bin in 0..grid.bins {
            let angle = std::f32::consts::PI * (bin as f32 + 0.5) / grid.bins as f32;
            let dr = radius * angle.sin();
            let dc = radius * angle.cos();
            for r in 0..grid.rows {
                for c in 0..grid.cols {
                    let value = grid.cell(r, c)[bin];
                    if value == 0.0 {
                        continue;
                    }
                    let cy = (r * cs + cs / 2) as f32;
                    let cx = (c * cs + cs / 2) as f32;
                    for (x, y) in BresenhamLineIter::new((cx + dr, cy - dc), (cx - dr, cy + dc)) {
                        if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                            let (x, y) = (x as usize, y as usize);
                            out.set(x, y, out.get(x, y) + value);
                        }
                    }
                }
            }
        }
        out
    }
}

impl FeatureExtractor for HogExtractor {
    fn cell_size(&self) -> usize {
        self.cell_size
    }

    fn extract(&self, patch: &Image) -> ScanResult<Vec<f32>> {
        let grid = self.cell_grid(patch)?;
        Ok(self.normalize_blocks(&grid))
    }

    fn extract_with_visualization(&self, patch: &Image) -> ScanResult<(Vec<f32>, Image)> {
        let grid = self.cell_grid(patch)?;
        let visual = self.render(&grid, patch.width(), patch.height());
        Ok((self.normalize_blocks(&grid), visual))
    }
}
