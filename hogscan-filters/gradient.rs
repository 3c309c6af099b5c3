use hogscan_core::{GradientField, Image, ScanResult};

use crate::convolution::convolve;
use crate::kernels::{central_difference_x, central_difference_y, sobel_x, sobel_y};

/// Horizontal derivative, `(I[x+1] - I[x-1]) / 2` with replicated borders
pub fn partial_x(image: &Image) -> ScanResult<Image> {
    convolve(image, &central_difference_x())
}

/// Vertical derivative, `(I[y+1] - I[y-1]) / 2` with replicated borders
pub fn partial_y(image: &Image) -> ScanResult<Image> {
    convolve(image, &central_difference_y())
}

/// Gradient magnitude and direction.
///
/// Direction is `atan2(gy, gx)` in degrees, folded into [0, 360). Rows grow
/// downwards, so 90 degrees points to the next row.
pub fn gradient(image: &Image) -> ScanResult<GradientField> {
    let gx = partial_x(image)?;
    let gy = partial_y(image)?;

    let magnitude = gx.zip_map(&gy, |x, y| (x * x + y * y).sqrt())?;
    let direction = gx.zip_map(&gy, |x, y| direction_degrees(y, x))?;
    GradientField::new(magnitude, direction)
}

/// Sobel derivatives (dx, dy), the operator used for corner scoring
pub fn sobel_gradients(image: &Image) -> ScanResult<(Image, Image)> {
    Ok((convolve(image, &sobel_x())?, convolve(image, &sobel_y())?))
}

#[inline]
fn direction_degrees(gy: f32, gx: f32) -> f32 {
    let mut d = gy.atan2(gx).to_degrees();
    if d < 0.0 {
        d += 360.0;
    }
    // tiny negative angles round up to exactly 360 in f32
    if d >= 360.0 {
        d -= 360.0;
    }
    d + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_partials_on_ramp() {
        let img = Image::from_fn(6, 5, |x, y| 2.0 * x as f32 + 5.0 * y as f32);
        let gx = partial_x(&img).unwrap();
        let gy = partial_y(&img).unwrap();
        // interior: exact slope
        assert_relative_eq!(gx.get(2, 2), 2.0);
        assert_relative_eq!(gy.get(2, 2), 5.0);
        // border: replicated sample halves the difference
        assert_relative_eq!(gx.get(0, 2), 1.0);
        assert_relative_eq!(gy.get(3, 4), 2.5);
    }

    #[test]
    fn test_gradient_directions() {
        let right = Image::from_fn(5, 5, |x, _| x as f32);
        let g = gradient(&right).unwrap();
        assert_relative_eq!(g.direction.get(2, 2), 0.0);
        assert_relative_eq!(g.magnitude.get(2, 2), 1.0);

        let left = right.map(|v| -v);
        assert_relative_eq!(gradient(&left).unwrap().direction.get(2, 2), 180.0);

        let down = Image::from_fn(5, 5, |_, y| y as f32);
        assert_relative_eq!(gradient(&down).unwrap().direction.get(2, 2), 90.0);

        let up = down.map(|v| -v);
        assert_relative_eq!(gradient(&up).unwrap().direction.get(2, 2), 270.0);

        let diag = Image::from_fn(5, 5, |x, y| (x + y) as f32);
        assert_relative_eq!(gradient(&diag).unwrap().direction.get(2, 2), 45.0, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_gradient_direction_is_zero() {
        let flat = Image::filled(4, 4, 3.0);
        let g = gradient(&flat).unwrap();
        assert!(g.magnitude.as_slice().iter().all(|&m| m == 0.0));
        assert!(g.direction.as_slice().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_direction_wraps_below_360() {
        assert_eq!(direction_degrees(-1e-9, 1.0), 0.0);
        assert_eq!(direction_degrees(-0.0, 1.0), 0.0);
        assert_relative_eq!(direction_degrees(-0.0, -1.0), 180.0);
    }

    #[test]
    fn test_sobel_gradients_sign() {
        let img = Image::from_fn(5, 5, |x, y| x as f32 - 2.0 * y as f32);
        let (dx, dy) = sobel_gradients(&img).unwrap();
        assert_relative_eq!(dx.get(2, 2), 2.0, epsilon = 1e-5);
        assert_relative_eq!(dy.get(2, 2), -4.0, epsilon = 1e-5);
    }

    proptest! {
        #[test]
        fn prop_direction_in_range(
            data in prop::collection::vec(-1000.0f32..1000.0, 64),
        ) {
            let img = Image::from_vec(8, 8, data).unwrap();
            let g = gradient(&img).unwrap();
            for &d in g.direction.as_slice() {
                prop_assert!((0.0..360.0).contains(&d), "direction {} out of range", d);
            }
            for &m in g.magnitude.as_slice() {
                prop_assert!(m >= 0.0);
            }
        }
    }
}
