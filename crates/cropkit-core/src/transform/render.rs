//! Drawing an image into another through an affine transform.
//!
//! # Algorithm
//!
//! Rendering uses inverse mapping: the centre of every destination pixel is
//! mapped through the inverted transform into source space and the source is
//! sampled there. Destination pixels whose centre falls outside the source are
//! left untouched, which clips the drawing to the overlap of both images.
//!
//! Sample coordinates are pixel-centred: source pixel `(i, j)` covers
//! `[i, i + 1) x [j, j + 1)` and its value sits at `(i + 0.5, j + 0.5)`.
//! Transforms that map pixel centres onto pixel centres (integer offsets,
//! quarter turns) therefore copy pixels exactly with every filter.

use serde::{Deserialize, Serialize};

use super::Matrix;
use crate::decode::DecodedImage;

/// Interpolation filter for transformed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest neighbor - no filtering.
    Nearest,
    /// Bilinear interpolation - fast, smooth scaling.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}

/// Draw `src` into `dst` through `matrix` (source space -> destination space).
///
/// Nothing is drawn if `matrix` is singular.
pub fn draw_transformed(
    src: &DecodedImage,
    dst: &mut DecodedImage,
    matrix: &Matrix,
    filter: InterpolationFilter,
) {
    if src.is_empty() || dst.is_empty() {
        return;
    }
    let Some(inverse) = matrix.invert() else {
        return;
    };

    let (src_w, src_h) = (src.width as f64, src.height as f64);
    let dst_w = dst.width as usize;

    for dst_y in 0..dst.height {
        for dst_x in 0..dst.width {
            let (sx, sy) = inverse.map_point(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
            if sx < 0.0 || sx >= src_w || sy < 0.0 || sy >= src_h {
                continue;
            }

            let pixel = match filter {
                InterpolationFilter::Nearest => src.pixel(sx as u32, sy as u32),
                InterpolationFilter::Bilinear => sample_bilinear(src, sx - 0.5, sy - 0.5),
                InterpolationFilter::Lanczos3 => sample_lanczos3(src, sx - 0.5, sy - 0.5),
            };

            let idx = (dst_y as usize * dst_w + dst_x as usize) * 3;
            dst.pixels[idx..idx + 3].copy_from_slice(&pixel);
        }
    }
}

/// Get a pixel as [f64; 3], clamping coordinates to the image edges.
#[inline]
fn get_pixel_clamped(image: &DecodedImage, px: i64, py: i64) -> [f64; 3] {
    let x = px.clamp(0, image.width as i64 - 1) as u32;
    let y = py.clamp(0, image.height as i64 - 1) as u32;
    let [r, g, b] = image.pixel(x, y);
    [r as f64, g as f64, b as f64]
}

/// Sample a pixel using bilinear interpolation.
///
/// `x`/`y` are in pixel-index space (pixel centres at integers). The 4
/// nearest pixels are weighted by distance; edges are clamped.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let x0 = x.floor();
    let y0 = y.floor();

    // Fractional distances
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = get_pixel_clamped(image, x0, y0);
    let p10 = get_pixel_clamped(image, x0 + 1, y0);
    let p01 = get_pixel_clamped(image, x0, y0 + 1);
    let p11 = get_pixel_clamped(image, x0 + 1, y0 + 1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

const LANCZOS_RADIUS: f64 = 3.0;

/// Normalized sinc, `sin(pi t) / (pi t)`.
fn sinc(t: f64) -> f64 {
    if t == 0.0 {
        return 1.0;
    }
    let pt = std::f64::consts::PI * t;
    pt.sin() / pt
}

/// Lanczos3 over the 6x6 window around `(x, y)`, with separable weights.
///
/// Near the border the window would leave the image, so bilinear is used
/// there instead.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as i64, image.height as i64);
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let (x0, y0) = (x.floor() as i64, y.floor() as i64);
    let taps = |origin: i64, at: f64| -> [f64; 6] {
        std::array::from_fn(|i| {
            let d = at - (origin + i as i64 - 2) as f64;
            if d.abs() >= LANCZOS_RADIUS {
                0.0
            } else {
                sinc(d) * sinc(d / LANCZOS_RADIUS)
            }
        })
    };
    let (wx, wy) = (taps(x0, x), taps(y0, y));

    let mut acc = [0.0f64; 3];
    let mut total = 0.0;
    for (j, row_weight) in wy.iter().enumerate() {
        for (i, col_weight) in wx.iter().enumerate() {
            let weight = row_weight * col_weight;
            let p = get_pixel_clamped(image, x0 + i as i64 - 2, y0 + j as i64 - 2);
            for (a, v) in acc.iter_mut().zip(p) {
                *a += v * weight;
            }
            total += weight;
        }
    }

    if total <= 0.0 {
        return [0; 3];
    }
    acc.map(|v| (v / total).clamp(0.0, 255.0).round() as u8)
}
