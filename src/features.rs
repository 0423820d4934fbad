//! Pixel buffers and the normalized feature test.
//!
//! The detector scores patches with pairwise pixel comparisons. Each
//! comparison is described by four signed bytes `(dy_a, dx_a, dy_b, dx_b)`
//! giving sample positions normalized to the current patch: a byte of 0
//! addresses the patch center and ±128 reaches roughly the patch edges, so
//! the same test applies unchanged at every search scale.

use crate::error::{Error, Result};

/// A borrowed single-channel 8-bit pixel buffer with an explicit row stride.
///
/// The stride may exceed the width to support padded rows. The view is
/// read-only; the detector never writes pixels.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: u32,
}

impl<'a> ImageView<'a> {
    /// Wrap a luminance buffer. Fails with [`Error::BufferShape`] if the
    /// stride is smaller than the width, a dimension is zero, or `data` is
    /// too short to cover the last row.
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: u32) -> Result<Self> {
        let shape_err = |reason| Error::BufferShape {
            width,
            height,
            stride,
            reason,
        };

        if width == 0 || height == 0 {
            return Err(shape_err("empty image"));
        }
        if stride < width {
            return Err(shape_err("stride smaller than width"));
        }
        let needed = stride as usize * (height as usize - 1) + width as usize;
        if data.len() < needed {
            return Err(shape_err("buffer shorter than stride * height"));
        }

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Luminance at (row, col). Callers keep coordinates in bounds; the
    /// sliding-window search only builds fully contained patches.
    #[inline]
    pub(crate) fn at(&self, row: i32, col: i32) -> u8 {
        self.data[row as usize * self.stride as usize + col as usize]
    }
}

/// An owned grayscale image with stride equal to width.
pub struct GrayImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> u8,
    {
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the image as a detection input.
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

/// Convert a 4-channel RGBA buffer to luminance with the integer weighting
/// `(2R + 5G + B) / 8`, truncating. Alpha is ignored.
pub fn luma_from_rgba(rgba: &[u8], width: u32, height: u32) -> GrayImage {
    debug_assert_eq!(rgba.len(), (width * height * 4) as usize);

    let data = rgba
        .chunks_exact(4)
        .map(|px| {
            let r = px[0] as u16;
            let g = px[1] as u16;
            let b = px[2] as u16;
            ((2 * r + 5 * g + b) >> 3) as u8
        })
        .collect();

    GrayImage::new(data, width, height)
}

/// Offset of a normalized sample coordinate within a patch dimension:
/// `floor(dim * (0.5 + d/256))`, computed in integer arithmetic as
/// `(dim * 128 + d * dim) / 256`. The numerator is never negative because
/// `d >= -128`, so truncation and floor agree.
#[inline]
pub(crate) fn sample_offset(d: i8, dim: i32) -> i32 {
    (dim * 128 + d as i32 * dim) / 256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_byte_samples_patch_center() {
        assert_eq!(sample_offset(0, 100), 50);
        assert_eq!(sample_offset(0, 51), 25);
        assert_eq!(sample_offset(0, 1), 0);
    }

    #[test]
    fn extreme_bytes_reach_patch_edges() {
        // -128 maps to the top/left edge, 127 just short of the far edge.
        assert_eq!(sample_offset(-128, 100), 0);
        assert_eq!(sample_offset(127, 100), 99);
        assert_eq!(sample_offset(-128, 7), 0);
        assert_eq!(sample_offset(127, 7), 6);
    }

    #[test]
    fn offsets_truncate_toward_zero() {
        // floor(33 * (0.5 + 10/256)) = floor(17.789) = 17
        assert_eq!(sample_offset(10, 33), 17);
        // floor(33 * (0.5 - 10/256)) = floor(15.210) = 15
        assert_eq!(sample_offset(-10, 33), 15);
    }

    #[test]
    fn view_rejects_bad_shapes() {
        let data = vec![0u8; 100];
        assert!(ImageView::new(&data, 10, 10, 10).is_ok());
        assert!(matches!(
            ImageView::new(&data, 10, 10, 9),
            Err(Error::BufferShape { .. })
        ));
        assert!(matches!(
            ImageView::new(&data, 0, 10, 10),
            Err(Error::BufferShape { .. })
        ));
        assert!(matches!(
            ImageView::new(&data, 10, 11, 10),
            Err(Error::BufferShape { .. })
        ));
    }

    #[test]
    fn view_supports_padded_rows() {
        // 4x3 image in a stride-6 buffer; padding bytes are 0xFF sentinels.
        let mut data = vec![0xFFu8; 6 * 3];
        for row in 0..3 {
            for col in 0..4 {
                data[row * 6 + col] = (row * 4 + col) as u8;
            }
        }
        // Last row only needs width bytes, not a full stride.
        let view = ImageView::new(&data[..6 * 2 + 4], 4, 3, 6).unwrap();

        assert_eq!(view.at(0, 0), 0);
        assert_eq!(view.at(1, 3), 7);
        assert_eq!(view.at(2, 2), 10);
    }

    #[test]
    fn rgba_conversion_uses_integer_weights() {
        // (2*8 + 5*16 + 24) / 8 = 15
        let gray = luma_from_rgba(&[8, 16, 24, 255], 1, 1);
        assert_eq!(gray.as_raw(), &[15]);

        // White stays white, black stays black, alpha is ignored.
        let gray = luma_from_rgba(&[255, 255, 255, 0, 0, 0, 0, 255], 2, 1);
        assert_eq!(gray.as_raw(), &[255, 0]);

        // Truncation: (2*1 + 5*1 + 1) / 8 = 1
        let gray = luma_from_rgba(&[1, 1, 1, 255], 1, 1);
        assert_eq!(gray.as_raw(), &[1]);
    }

    #[test]
    fn gray_image_from_fn_is_row_major() {
        let img = GrayImage::from_fn(3, 2, |x, y| (y * 3 + x) as u8);
        assert_eq!(img.as_raw(), &[0, 1, 2, 3, 4, 5]);

        let view = img.view();
        assert_eq!(view.stride(), 3);
        assert_eq!(view.at(1, 2), 5);
    }
}
