use hogscan_core::{Image, ScanError, ScanResult};
use log::{debug, trace};
use rayon::prelude::*;

use crate::hog::FeatureExtractor;
use crate::types::{WindowScan, WindowSize};

/// Score every window position of `image` against `reference`.
///
/// The image is zero padded by half a window above and to the left (the
/// rest below and to the right) and a window is placed at every `step`
/// pixels over the padded grid. Positions starting at or beyond the image's
/// height or width are skipped and leave zero in the score grid. A window's
/// score is the dot product of its descriptor with `reference`.
///
/// The best window is the first in row-major order with the strictly highest
/// score; with no score above zero it stays at (0, 0) with score 0. The
/// reported row/col are the window's top-left corner in image coordinates,
/// i.e. the grid position minus the padding, and may be negative.
///
/// Windows are scored in parallel by rows; the best window is picked
/// afterwards in scan order, so the result does not depend on scheduling.
///
/// A window must hold at least one of the extractor's cells in each
/// direction.
pub fn slide_window<E>(
    image: &Image,
    reference: &[f32],
    extractor: &E,
    step: usize,
    window: WindowSize,
) -> ScanResult<WindowScan>
where
    E: FeatureExtractor + ?Sized,
{
    if step == 0 {
        return Err(ScanError::InvalidStep(step));
    }
    window.validate()?;
    let cell = extractor.cell_size();
    if cell == 0 || window.height < cell || window.width < cell {
        return Err(ScanError::Extractor(format!(
            "{}x{} window cannot hold a {}px cell",
            window.width, window.height, cell
        )));
    }
    image.ensure_non_empty()?;

    let (h, w) = image.shape();
    let (win_h, win_w) = (window.height, window.width);
    let (pad_top, pad_left) = (win_h / 2, win_w / 2);
    let padded = image.pad_zero(pad_top, win_h - pad_top, pad_left, win_w - pad_left);

    let grid_rows = h.div_ceil(step) + 1;
    let grid_cols = w.div_ceil(step) + 1;
    debug!(
        "scanning {}x{} image with {}x{} window, step {}: {}x{} grid",
        w, h, win_w, win_h, step, grid_cols, grid_rows
    );

    let rows: Vec<Vec<Option<f32>>> = (0..grid_rows)
        .into_par_iter()
        .map(|i| {
            let y = i * step;
            (0..grid_cols)
                .map(|j| {
                    let x = j * step;
                    if y >= h || x >= w {
                        return Ok(None);
                    }
                    let patch = padded.crop(x, y, win_w, win_h)?;
                    let features = extractor.extract(&patch)?;
                    Ok(Some(dot(&features, reference)?))
                })
                .collect::<ScanResult<Vec<_>>>()
        })
        .collect::<ScanResult<Vec<_>>>()?;

    let mut grid = Image::new(grid_cols, grid_rows);
    let (mut best_score, mut best_row, mut best_col) = (0.0f32, 0isize, 0isize);
    for (i, row) in rows.iter().enumerate() {
        for (j, score) in row.iter().enumerate() {
            let Some(score) = *score else { continue };
            grid.set(j, i, score);
            if score > best_score {
                best_score = score;
                best_row = (i * step) as isize - pad_top as isize;
                best_col = (j * step) as isize - pad_left as isize;
                trace!("new best {:.4} at ({}, {})", best_score, best_row, best_col);
            }
        }
    }

    Ok(WindowScan {
        score: best_score,
        row: best_row,
        col: best_col,
        response_map: grid.resize(w, h)?,
    })
}

/// Dot product of a window descriptor with the reference descriptor
pub fn dot(features: &[f32], reference: &[f32]) -> ScanResult<f32> {
    if features.len() != reference.len() {
        return Err(ScanError::FeatureLength {
            expected: reference.len(),
            actual: features.len(),
        });
    }
    Ok(features.iter().zip(reference).map(|(a, b)| a * b).sum())
}
