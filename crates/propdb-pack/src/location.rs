//! Fragment placement types.

use serde::{Deserialize, Serialize};

/// Spatial placement of one scene element: the fragment translation plus an
/// axis-aligned bounding box.
///
/// All nine components are IEEE-754 32-bit floats, exactly as stored in the
/// pack buffer; no further rounding or quantization is applied. For records
/// with format version > 3 the bounding box is in world space (offset by the
/// translation), otherwise it is the fragment-local box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentLocation {
    /// Translation x.
    pub x: f32,
    /// Translation y.
    pub y: f32,
    /// Translation z.
    pub z: f32,
    /// Bounding box minimum x.
    pub min_x: f32,
    /// Bounding box minimum y.
    pub min_y: f32,
    /// Bounding box minimum z.
    pub min_z: f32,
    /// Bounding box maximum x.
    pub max_x: f32,
    /// Bounding box maximum y.
    pub max_y: f32,
    /// Bounding box maximum z.
    pub max_z: f32,
}

impl FragmentLocation {
    /// Translation component as an array.
    pub fn translation(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Bounding box as (min, max) corner arrays.
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        (
            [self.min_x, self.min_y, self.min_z],
            [self.max_x, self.max_y, self.max_z],
        )
    }
}

/// A fragment transform as stored in the pack buffer.
///
/// Decoding retains the full transform per record, but only the translation
/// component is carried into [`FragmentLocation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Pure translation.
    Translation([f32; 3]),
    /// Quaternion rotation followed by translation.
    RotationTranslation {
        /// Rotation quaternion (x, y, z, w).
        rotation: [f32; 4],
        /// Translation vector.
        translation: [f32; 3],
    },
    /// Uniform scale, quaternion rotation, then translation.
    ScaleRotationTranslation {
        /// Uniform scale factor.
        scale: f32,
        /// Rotation quaternion (x, y, z, w).
        rotation: [f32; 4],
        /// Translation vector.
        translation: [f32; 3],
    },
    /// Full 4x3 affine matrix, column-major; the last column is the
    /// translation.
    Matrix([f32; 12]),
}

impl Transform {
    /// The translation component of this transform.
    pub fn translation(&self) -> [f32; 3] {
        match self {
            Transform::Translation(t) => *t,
            Transform::RotationTranslation { translation, .. } => *translation,
            Transform::ScaleRotationTranslation { translation, .. } => *translation,
            Transform::Matrix(m) => [m[9], m[10], m[11]],
        }
    }
}

// Transform kind tags on the wire.
pub(crate) const KIND_NONE: u8 = 0;
pub(crate) const KIND_TRANSLATION: u8 = 1;
pub(crate) const KIND_ROTATION_TRANSLATION: u8 = 2;
pub(crate) const KIND_SCALE_ROTATION_TRANSLATION: u8 = 3;
pub(crate) const KIND_MATRIX: u8 = 4;
