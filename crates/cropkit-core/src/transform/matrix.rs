//! 2D affine transforms.
//!
//! A [`Matrix`] maps a point `(x, y)` to
//!
//! ```text
//! x' = sx * x + kx * y + tx
//! y' = ky * x + sy * y + ty
//! ```
//!
//! `pre_*` operations apply the new transform before the existing one,
//! `post_*` operations apply it after.

use super::RectF;

/// Values closer to zero than this are treated as exactly zero when
/// computing sin/cos, so quarter turns map integer rectangles exactly.
const SNAP_EPSILON: f64 = 1e-12;

/// How [`Matrix::rect_to_rect`] fits the source rectangle into the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleToFit {
    /// Scale each axis independently so the source exactly fills the destination.
    Fill,
}

/// 2x3 affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub sx: f64,
    pub kx: f64,
    pub tx: f64,
    pub ky: f64,
    pub sy: f64,
    pub ty: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

fn snap(v: f64) -> f64 {
    if v.abs() < SNAP_EPSILON {
        0.0
    } else {
        v
    }
}

fn sin_cos(degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (snap(sin), snap(cos))
}

impl Matrix {
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy: 1.0,
            ty: 0.0,
        }
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            sx,
            sy,
            ..Self::identity()
        }
    }

    /// Rotation about the origin; positive degrees turn clockwise on screen.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = sin_cos(degrees);
        Self {
            sx: cos,
            kx: -sin,
            tx: 0.0,
            ky: sin,
            sy: cos,
            ty: 0.0,
        }
    }

    /// Transform mapping `src` onto `dst`.
    ///
    /// An empty `src` yields the identity.
    pub fn rect_to_rect(src: RectF, dst: RectF, fit: ScaleToFit) -> Self {
        if src.is_empty() {
            return Self::identity();
        }
        match fit {
            ScaleToFit::Fill => {
                let sx = dst.width() / src.width();
                let sy = dst.height() / src.height();
                Self {
                    sx,
                    kx: 0.0,
                    tx: dst.left - src.left * sx,
                    ky: 0.0,
                    sy,
                    ty: dst.top - src.top * sy,
                }
            }
        }
    }

    /// Composition `self ∘ other`: `other` is applied first.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            sx: self.sx * other.sx + self.kx * other.ky,
            kx: self.sx * other.kx + self.kx * other.sy,
            tx: self.sx * other.tx + self.kx * other.ty + self.tx,
            ky: self.ky * other.sx + self.sy * other.ky,
            sy: self.ky * other.kx + self.sy * other.sy,
            ty: self.ky * other.tx + self.sy * other.ty + self.ty,
        }
    }

    /// Apply `other` before this transform.
    pub fn pre_concat(&mut self, other: &Matrix) {
        *self = self.concat(other);
    }

    /// Apply `other` after this transform.
    pub fn post_concat(&mut self, other: &Matrix) {
        *self = other.concat(self);
    }

    pub fn pre_translate(&mut self, dx: f64, dy: f64) {
        self.pre_concat(&Matrix::translate(dx, dy));
    }

    pub fn post_translate(&mut self, dx: f64, dy: f64) {
        self.post_concat(&Matrix::translate(dx, dy));
    }

    pub fn post_scale(&mut self, sx: f64, sy: f64) {
        self.post_concat(&Matrix::scale(sx, sy));
    }

    pub fn post_rotate(&mut self, degrees: f64) {
        self.post_concat(&Matrix::rotate(degrees));
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.sx * x + self.kx * y + self.tx,
            self.ky * x + self.sy * y + self.ty,
        )
    }

    /// Bounding box of the four mapped corners of `rect`.
    pub fn map_rect(&self, rect: RectF) -> RectF {
        let corners = [
            self.map_point(rect.left, rect.top),
            self.map_point(rect.right, rect.top),
            self.map_point(rect.left, rect.bottom),
            self.map_point(rect.right, rect.bottom),
        ];

        let mut out = RectF::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (x, y) in corners {
            out.left = out.left.min(x);
            out.top = out.top.min(y);
            out.right = out.right.max(x);
            out.bottom = out.bottom.max(y);
        }
        out
    }

    /// Inverse transform, or `None` if the matrix is singular.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.sx * self.sy - self.kx * self.ky;
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Matrix {
            sx: self.sy / det,
            kx: -self.kx / det,
            tx: (self.kx * self.ty - self.sy * self.tx) / det,
            ky: -self.ky / det,
            sy: self.sx / det,
            ty: (self.ky * self.tx - self.sx * self.ty) / det,
        })
    }
}
