use hogscan_core::{Image, Kernel, ScanError, ScanResult};

/// `size` x `size` Gaussian kernel.
///
/// Entry (i, j) is `exp(-((i-c)^2 + (j-c)^2) / (2 sigma^2)) / (2 pi sigma^2)`
/// with `c = (size - 1) / 2`. The result is *not* renormalized: for small
/// sizes or large sigmas it sums to less than one. Use [`normalize_kernel`]
/// when unit mass is needed.
pub fn gaussian_kernel(size: usize, sigma: f32) -> ScanResult<Kernel> {
    if size == 0 {
        return Err(ScanError::InvalidKernel { width: size, height: size });
    }
    if sigma <= 0.0 || !sigma.is_finite() {
        return Err(ScanError::InvalidSigma(sigma));
    }

    let c = (size as f32 - 1.0) / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let norm = std::f32::consts::PI * two_sigma_sq;
    Ok(Image::from_fn(size, size, |j, i| {
        let di = i as f32 - c;
        let dj = j as f32 - c;
        (-(di * di + dj * dj) / two_sigma_sq).exp() / norm
    }))
}

/// Scale a kernel so its weights sum to one
pub fn normalize_kernel(kernel: &Kernel) -> ScanResult<Kernel> {
    let (w, h) = kernel.dimensions();
    if w == 0 || h == 0 {
        return Err(ScanError::InvalidKernel { width: w, height: h });
    }
    let sum = kernel.sum();
    if sum == 0.0 || !sum.is_finite() {
        return Err(ScanError::InvalidParameter { name: "kernel sum", value: sum });
    }
    Ok(kernel.map(|v| v / sum))
}

/// Horizontal centered difference `[1/2, 0, -1/2]`
pub fn central_difference_x() -> Kernel {
    Image::from_fn(3, 1, |x, _| [0.5, 0.0, -0.5][x])
}

/// Vertical centered difference, the transpose of [`central_difference_x`]
pub fn central_difference_y() -> Kernel {
    Image::from_fn(1, 3, |_, y| [0.5, 0.0, -0.5][y])
}

const SOBEL: [[f32; 3]; 3] = [[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]];

/// Sobel kernel responding to horizontal intensity change, scaled by 1/4
pub fn sobel_x() -> Kernel {
    Image::from_fn(3, 3, |x, y| SOBEL[y][x] / 4.0)
}

/// Sobel kernel responding to vertical intensity change, scaled by 1/4
pub fn sobel_y() -> Kernel {
    Image::from_fn(3, 3, |x, y| SOBEL[x][y] / 4.0)
}
