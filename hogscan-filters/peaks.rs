use hogscan_core::{ResponseMap, ScanError, ScanResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Local maximum of a response map
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerPoint {
    pub row: usize,
    pub col: usize,
    pub response: f32,
}

/// Pick isolated peaks out of a response map.
///
/// A pixel is a candidate when it is strictly above
/// `threshold_rel * max(response)` (and above zero) and no pixel within
/// `min_distance` (Chebyshev) exceeds it. Candidates are then visited from the
/// strongest down, and any candidate closer than `min_distance` (Euclidean) to
/// an accepted one is dropped. Equal responses keep row-major order.
pub fn corner_peaks(response: &ResponseMap, min_distance: usize, threshold_rel: f32) -> ScanResult<Vec<CornerPoint>> {
    if !(0.0..=1.0).contains(&threshold_rel) {
        return Err(ScanError::InvalidParameter { name: "threshold_rel", value: threshold_rel });
    }
    let Some((_, max)) = response.min_max() else {
        return Ok(Vec::new());
    };
    let threshold = (threshold_rel * max).max(0.0);

    let (w, h) = response.dimensions();
    let radius = min_distance as isize;
    let mut candidates = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let v = response.get(x, y);
            if v <= threshold {
                continue;
            }
            let mut is_local_max = true;
            'window: for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if let Some(n) = response.try_get(x as isize + dx, y as isize + dy) {
                        if n > v {
                            is_local_max = false;
                            break 'window;
                        }
                    }
                }
            }
            if is_local_max {
                candidates.push(CornerPoint { row: y, col: x, response: v });
            }
        }
    }

    Ok(suppress_close_peaks(candidates, min_distance as f32))
}

/// Greedy distance-based suppression, strongest first
fn suppress_close_peaks(mut candidates: Vec<CornerPoint>, min_distance: f32) -> Vec<CornerPoint> {
    candidates.sort_by(|a, b| b.response.partial_cmp(&a.response).unwrap_or(std::cmp::Ordering::Equal));

    let min_distance_sq = min_distance * min_distance;
    let mut accepted: Vec<CornerPoint> = Vec::new();
    for candidate in candidates {
        let too_close = accepted.iter().any(|p| {
            let dr = candidate.row as f32 - p.row as f32;
            let dc = candidate.col as f32 - p.col as f32;
            dr * dr + dc * dc < min_distance_sq
        });
        if !too_close {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harris::HarrisDetector;
    use hogscan_core::Image;

    #[test]
    fn test_isolated_peaks_found() {
        let mut r = Image::new(20, 20);
        r.set(5, 5, 10.0);
        r.set(15, 12, 8.0);
        r.set(6, 5, 9.0);
        let peaks = corner_peaks(&r, 2, 0.1).unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!((peaks[0].row, peaks[0].col), (5, 5));
        assert_eq!((peaks[1].row, peaks[1].col), (12, 15));
    }

    #[test]
    fn test_relative_threshold() {
        let mut r = Image::new(10, 10);
        r.set(2, 2, 100.0);
        r.set(7, 7, 5.0);
        assert_eq!(corner_peaks(&r, 1, 0.1).unwrap().len(), 1);
        assert_eq!(corner_peaks(&r, 1, 0.01).unwrap().len(), 2);
        assert!(corner_peaks(&r, 1, 1.5).is_err());
    }

    #[test]
    fn test_plateau_keeps_first_in_scan_order() {
        let mut r = Image::new(10, 10);
        r.set(4, 4, 1.0);
        r.set(5, 4, 1.0);
        let peaks = corner_peaks(&r, 2, 0.0).unwrap();
        assert_eq!(peaks.len(), 1);
        assert_eq!((peaks[0].row, peaks[0].col), (4, 4));
    }

    #[test]
    fn test_square_has_four_corners() {
        let img = Image::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) { 1.0 } else { 0.0 }
        });
        let response = HarrisDetector::default().response(&img).unwrap();
        let peaks = corner_peaks(&response, 5, 0.1).unwrap();
        assert_eq!(peaks.len(), 4, "{:?}", peaks);
    }
}
