use crate::error::{ScanError, ScanResult};
use ::image::imageops::{self, FilterType};
use ::image::{ImageBuffer, Luma};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major grid of `f32` samples with no required value range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawImage"))]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

/// Unchecked wire form; deserialized images go through `Image::from_vec`
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawImage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawImage> for Image {
    type Error = ScanError;

    fn try_from(raw: RawImage) -> ScanResult<Self> {
        Image::from_vec(raw.width, raw.height, raw.data)
    }
}

impl Image {
    /// Zero-filled image
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build an image by evaluating `f(x, y)` at every pixel
    pub fn from_fn<F: FnMut(usize, usize) -> f32>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Wrap a row-major buffer, validating its length
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> ScanResult<Self> {
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(ScanError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Build an image from a list of rows. Every row must have the same length.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> ScanResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(width * height);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != width {
                return Err(ScanError::RaggedRows {
                    row,
                    expected_len: width,
                    actual_len: r.len(),
                });
            }
            data.extend_from_slice(r);
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// (height, width), the row-major shape
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fails with `InvalidImageSize` for images without pixels
    pub fn ensure_non_empty(&self) -> ScanResult<()> {
        if self.is_empty() {
            return Err(ScanError::InvalidImageSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Fails with `ShapeMismatch` unless `other` has the same shape
    pub fn ensure_same_shape(&self, other: &Image) -> ScanResult<()> {
        if self.shape() != other.shape() {
            return Err(ScanError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Sample with edge replication for out-of-range coordinates.
    /// The image must not be empty.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f32 {
        let xx = x.clamp(0, self.width as isize - 1) as usize;
        let yy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[yy * self.width + xx]
    }

    /// Sample returning `None` outside the image
    #[inline]
    pub fn try_get(&self, x: isize, y: isize) -> Option<f32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(self.data[y as usize * self.width + x as usize])
        }
    }

    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Image {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two same-shape images sample by sample
    pub fn zip_map<F: Fn(f32, f32) -> f32>(&self, other: &Image, f: F) -> ScanResult<Image> {
        self.ensure_same_shape(other)?;
        Ok(Image {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Smallest and largest sample, `None` for an empty image
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Copy out the `width` x `height` region whose top-left corner is (`x`, `y`)
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> ScanResult<Image> {
        if x + width > self.width || y + height > self.height {
            return Err(ScanError::OutOfBounds { x, y, width, height });
        }
        let mut data = Vec::with_capacity(width * height);
        for yy in y..y + height {
            let start = yy * self.width + x;
            data.extend_from_slice(&self.data[start..start + width]);
        }
        Ok(Image { width, height, data })
    }

    /// Surround the image with zeros: `top`/`bottom` rows, `left`/`right` columns
    pub fn pad_zero(&self, top: usize, bottom: usize, left: usize, right: usize) -> Image {
        let width = self.width + left + right;
        let height = self.height + top + bottom;
        let mut out = Image::new(width, height);
        for y in 0..self.height {
            let dst = (y + top) * width + left;
            out.data[dst..dst + self.width].copy_from_slice(self.row(y));
        }
        out
    }

    /// Interpolated resize to `width` x `height`.
    ///
    /// Uses the triangle filter of the `image` crate, which is bilinear when
    /// enlarging and anti-aliased when shrinking. That filter clamps float
    /// samples to [0, 1], so values are mapped into the unit range first and
    /// restored afterwards; the filter is linear, so this is exact.
    pub fn resize(&self, width: usize, height: usize) -> ScanResult<Image> {
        self.ensure_non_empty()?;
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidImageSize { width, height });
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }

        let (lo, hi) = self.min_max().unwrap_or((0.0, 0.0));
        let span = hi - lo;
        if span <= 0.0 || !span.is_finite() {
            return Ok(Image::filled(width, height, lo));
        }

        let unit: Vec<f32> = self.data.iter().map(|&v| (v - lo) / span).collect();
        let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_raw(self.width as u32, self.height as u32, unit).ok_or(
                ScanError::InvalidImageData {
                    expected_len: self.width * self.height,
                    actual_len: self.data.len(),
                },
            )?;
        let resized = imageops::resize(&buffer, width as u32, height as u32, FilterType::Triangle);

        Ok(Image {
            width,
            height,
            data: resized.into_raw().into_iter().map(|v| lo + v * span).collect(),
        })
    }

    /// Resize by a factor, rounding each dimension to the nearest pixel (at least one)
    pub fn rescale(&self, factor: f32) -> ScanResult<Image> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(ScanError::InvalidParameter { name: "rescale factor", value: factor });
        }
        let width = ((self.width as f32 * factor).round() as usize).max(1);
        let height = ((self.height as f32 * factor).round() as usize).max(1);
        self.resize(width, height)
    }
}

impl std::ops::Add for &Image {
    type Output = ScanResult<Image>;

    fn add(self, rhs: &Image) -> ScanResult<Image> {
        self.zip_map(rhs, |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_vec_validates_length() {
        assert!(Image::from_vec(3, 2, vec![0.0; 6]).is_ok());
        let result = Image::from_vec(3, 2, vec![0.0; 5]);
        assert!(matches!(result, Err(ScanError::InvalidImageData { expected_len: 6, actual_len: 5 })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_length() {
        let img = Image::from_fn(3, 2, |x, y| (x + y) as f32);
        let json = serde_json::to_string(&img).unwrap();
        let back: Image = serde_json::from_str(&json).unwrap();
        assert_eq!(back, img);

        let short = r#"{"width":3,"height":2,"data":[0.0,1.0,2.0,3.0,4.0]}"#;
        let err = serde_json::from_str::<Image>(short).unwrap_err();
        assert!(err.to_string().contains("expected 6"), "{}", err);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let result = Image::from_rows(&rows);
        assert!(matches!(result, Err(ScanError::RaggedRows { row: 1, .. })));
    }

    #[test]
    fn test_from_rows_layout() {
        let img = Image::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(img.shape(), (2, 3));
        assert_eq!(img.get(2, 0), 3.0);
        assert_eq!(img.get(0, 1), 4.0);
        assert_eq!(img.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_clamped_access() {
        let img = Image::from_fn(4, 3, |x, y| (y * 4 + x) as f32);
        assert_eq!(img.get_clamped(-5, 0), 0.0);
        assert_eq!(img.get_clamped(10, 2), 11.0);
        assert_eq!(img.try_get(4, 0), None);
        assert_eq!(img.try_get(3, 2), Some(11.0));
    }

    #[test]
    fn test_crop_and_bounds() {
        let img = Image::from_fn(5, 5, |x, y| (y * 5 + x) as f32);
        let patch = img.crop(1, 2, 3, 2).unwrap();
        assert_eq!(patch.as_slice(), &[11.0, 12.0, 13.0, 16.0, 17.0, 18.0]);
        assert!(matches!(img.crop(3, 3, 3, 1), Err(ScanError::OutOfBounds { .. })));
    }

    #[test]
    fn test_pad_zero() {
        let img = Image::filled(2, 2, 1.0);
        let padded = img.pad_zero(1, 2, 0, 1);
        assert_eq!(padded.dimensions(), (3, 5));
        assert_eq!(padded.sum(), 4.0);
        assert_eq!(padded.get(0, 0), 0.0);
        assert_eq!(padded.get(1, 2), 1.0);
        assert_eq!(padded.get(2, 1), 0.0);
    }

    #[test]
    fn test_resize_keeps_constant_and_range() {
        let img = Image::filled(10, 8, 42.5);
        let out = img.resize(5, 4).unwrap();
        assert_eq!(out.dimensions(), (5, 4));
        assert!(out.as_slice().iter().all(|&v| v == 42.5));

        let ramp = Image::from_fn(16, 16, |x, _| x as f32 * 100.0 - 300.0);
        let up = ramp.resize(32, 32).unwrap();
        let (lo, hi) = up.min_max().unwrap();
        assert!(lo >= -300.0 - 1e-2);
        assert!(hi <= 1200.0 + 1e-2);
        // values outside [0, 1] survive the round trip through the filter
        assert!(hi > 1.0 && lo < 0.0);
    }

    #[test]
    fn test_rescale_rounds_dimensions() {
        let img = Image::new(256, 220);
        let out = img.rescale(0.9).unwrap();
        assert_eq!(out.dimensions(), (230, 198));
        assert!(img.rescale(0.0).is_err());
    }

    #[test]
    fn test_add_requires_same_shape() {
        let a = Image::filled(3, 3, 1.0);
        let b = Image::filled(3, 3, 2.5);
        let c = (&a + &b).unwrap();
        assert_relative_eq!(c.sum(), 31.5);
        assert!((&a + &Image::new(2, 3)).is_err());
    }
}
