//! Affine frame transforms
//!
//! Every augmentation goes through [`AffineTransform::apply`], which hands a 2x3 matrix to
//! `imageproc`'s projective warp. Rotation and translation only differ in the matrix
//! they build. The matrix maps source coordinates to destination coordinates, following
//! the usual `warpAffine` convention: positive rotation angles turn the picture
//! counter-clockwise as displayed.

use crate::error::{AugmentError, Result};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};
use std::fmt;

/// Fill value for pixels whose pre-image falls outside the source frame
const BORDER: Rgb<u8> = Rgb([0, 0, 0]);

/// A 2x3 affine matrix `[[a, b, tx], [c, d, ty]]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: [[f64; 3]; 2],
}

impl AffineTransform {
    /// Build a transform from its row-major 2x3 matrix
    pub fn from_matrix(matrix: [[f64; 3]; 2]) -> Self {
        Self { matrix }
    }

    /// Rotation about `center` by `degrees` with uniform `scale`
    pub fn rotation(center: (f64, f64), degrees: f64, scale: f64) -> Self {
        let (cx, cy) = center;
        let radians = degrees.to_radians();
        let alpha = scale * radians.cos();
        let beta = scale * radians.sin();

        Self::from_matrix([
            [alpha, beta, (1.0 - alpha) * cx - beta * cy],
            [-beta, alpha, beta * cx + (1.0 - alpha) * cy],
        ])
    }

    /// Shift by a fixed pixel offset
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::from_matrix([[1.0, 0.0, dx], [0.0, 1.0, dy]])
    }

    pub fn matrix(&self) -> [[f64; 3]; 2] {
        self.matrix
    }

    /// Map a source point to its destination
    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        let [[a, b, tx], [c, d, ty]] = self.matrix;
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    /// True when the transform only moves pixels by whole-pixel offsets
    fn is_integer_translation(&self) -> bool {
        let [[a, b, tx], [c, d, ty]] = self.matrix;
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0 && tx.fract() == 0.0 && ty.fract() == 0.0
    }

    fn interpolation(&self) -> Interpolation {
        // Whole-pixel shifts copy pixels exactly; anything else is resampled.
        if self.is_integer_translation() {
            Interpolation::Nearest
        } else {
            Interpolation::Bilinear
        }
    }

    fn projection(&self) -> Result<Projection> {
        let [[a, b, tx], [c, d, ty]] = self.matrix;
        Projection::from_matrix([
            a as f32, b as f32, tx as f32, c as f32, d as f32, ty as f32, 0.0, 0.0, 1.0,
        ])
        .ok_or_else(|| {
            AugmentError::invalid_config(format!("Affine matrix is not invertible: {:?}", self.matrix))
        })
    }

    /// Warp one frame. The output has the input's dimensions; content moved outside the
    /// canvas is clipped and uncovered pixels are black.
    pub fn apply(&self, frame: &RgbImage) -> Result<RgbImage> {
        let projection = self.projection()?;
        // Nothing to sample; the warp cannot split an empty buffer into rows
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(frame.clone());
        }
        Ok(warp(frame, &projection, self.interpolation(), BORDER))
    }
}

/// The geometric augmentations applied to a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformVariant {
    /// Rotate about the frame center; 330 stands for -30
    Rotate { degrees: i32 },
    /// Shift by `(dx, dy)` pixels
    Translate { dx: i32, dy: i32 },
}

/// The four variants generated for every under-represented clip, in generation order
pub const AUGMENTATION_VARIANTS: [TransformVariant; 4] = [
    TransformVariant::Rotate { degrees: 30 },
    TransformVariant::Rotate { degrees: 330 },
    TransformVariant::Translate { dx: 32, dy: 0 },
    TransformVariant::Translate { dx: -32, dy: 0 },
];

impl TransformVariant {
    /// Suffix appended to the video id, e.g. `rotate_30` or `translate_-32_0`
    pub fn suffix(&self) -> String {
        self.to_string()
    }

    /// Identifier of the derived clip
    pub fn derived_id(&self, video_id: &str) -> String {
        format!("{}_{}", video_id, self.suffix())
    }

    /// Transform for frames of the given size
    pub fn affine(&self, width: u32, height: u32) -> AffineTransform {
        match *self {
            Self::Rotate { degrees } => AffineTransform::rotation(
                (f64::from(width) / 2.0, f64::from(height) / 2.0),
                f64::from(degrees),
                1.0,
            ),
            Self::Translate { dx, dy } => AffineTransform::translation(f64::from(dx), f64::from(dy)),
        }
    }

    /// Short name of the transform kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rotate { .. } => "rotate",
            Self::Translate { .. } => "translate",
        }
    }
}

impl fmt::Display for TransformVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotate { degrees } => write!(f, "rotate_{degrees}"),
            Self::Translate { dx, dy } => write!(f, "translate_{dx}_{dy}"),
        }
    }
}
