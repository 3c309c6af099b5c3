use hogscan_core::{Image, Kernel, ScanError, ScanResult};
use rayon::prelude::*;

/// 2D convolution with edge-replicate borders.
///
/// The kernel is flipped on both axes (true convolution, not correlation) and
/// the image is extended by `kh / 2` rows and `kw / 2` columns of replicated
/// border samples, so the output has the shape of `image`. Output rows are
/// computed in parallel.
pub fn convolve(image: &Image, kernel: &Kernel) -> ScanResult<Image> {
    let (kw, kh) = kernel.dimensions();
    if kw == 0 || kh == 0 {
        return Err(ScanError::InvalidKernel { width: kw, height: kh });
    }

    let (w, h) = image.dimensions();
    if image.is_empty() {
        return Ok(Image::new(w, h));
    }

    // Reversing the row-major buffer flips both axes at once
    let flipped: Vec<f32> = kernel.as_slice().iter().rev().copied().collect();
    let pad_y = (kh / 2) as isize;
    let pad_x = (kw / 2) as isize;

    let mut out = Image::new(w, h);
    out.as_mut_slice()
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (ky, krow) in flipped.chunks_exact(kw).enumerate() {
                    let sy = y as isize + ky as isize - pad_y;
                    for (kx, &kv) in krow.iter().enumerate() {
                        let sx = x as isize + kx as isize - pad_x;
                        acc += image.get_clamped(sx, sy) * kv;
                    }
                }
                *px = acc;
            }
        });

    if out.shape() != image.shape() {
        return Err(ScanError::ShapeMismatch {
            expected: image.shape(),
            actual: out.shape(),
        });
    }
    Ok(out)
}
