use hogscan_core::{GradientField, Image, ResponseMap, ScanResult};

/// Neighbor offsets (row, column) for a direction quantized to 0/45/90/135
#[inline]
fn neighbor_offsets(quantized: i32) -> ((isize, isize), (isize, isize)) {
    match quantized.rem_euclid(180) {
        0 => ((0, 1), (0, -1)),
        45 => ((1, 1), (-1, -1)),
        90 => ((1, 0), (-1, 0)),
        _ => ((1, -1), (-1, 1)),
    }
}

/// Round a direction in degrees down to a multiple of 45 after a half-bin shift
#[inline]
pub fn quantize_direction(direction: f32) -> i32 {
    ((direction + 22.5) / 45.0).floor() as i32 * 45
}

/// Thin a gradient magnitude field to its ridges.
///
/// A pixel keeps its magnitude when it is at least as large as both
/// neighbors along its quantized gradient direction, and becomes 0 otherwise.
/// Neighbors outside the image count as the pixel's own magnitude, so border
/// pixels are never suppressed only for lack of a neighbor.
pub fn non_maximum_suppression(field: &GradientField) -> ScanResult<ResponseMap> {
    let magnitude = &field.magnitude;
    magnitude.ensure_same_shape(&field.direction)?;

    let (w, h) = magnitude.dimensions();
    let mut out = Image::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let m = magnitude.get(x, y);
            let (fwd, bwd) = neighbor_offsets(quantize_direction(field.direction.get(x, y)));
            let sample = |(dr, dc): (isize, isize)| {
                magnitude
                    .try_get(x as isize + dc, y as isize + dr)
                    .unwrap_or(m)
            };
            if m >= sample(fwd) && m >= sample(bwd) {
                out.set(x, y, m);
            }
        }
    }
    Ok(out)
}
