use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Pinhole camera intrinsics described by field-of-view angles and resolution.
///
/// The focal lengths in pixels are derived from the angles as
/// `kx = (width / 2) / tan(h_fov / 2)` and `ky = (height / 2) / tan(v_fov / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovIntrinsics {
    /// Horizontal field of view in radians.
    pub h_fov: f64,
    /// Vertical field of view in radians.
    pub v_fov: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl FovIntrinsics {
    /// Create intrinsics from field-of-view angles in degrees and the image size.
    pub fn from_degrees(h_fov_deg: f64, v_fov_deg: f64, width: u32, height: u32) -> Self {
        Self {
            h_fov: h_fov_deg.to_radians(),
            v_fov: v_fov_deg.to_radians(),
            width,
            height,
        }
    }

    /// Intrinsics of the first generation Kinect depth sensor (57 x 43 degrees, 640x480).
    pub fn kinect_v1() -> Self {
        Self::from_degrees(57.0, 43.0, 640, 480)
    }

    /// Horizontal focal length in pixels.
    #[inline]
    pub fn kx(&self) -> f64 {
        (self.width as f64 / 2.0) / (self.h_fov / 2.0).tan()
    }

    /// Vertical focal length in pixels.
    #[inline]
    pub fn ky(&self) -> f64 {
        (self.height as f64 / 2.0) / (self.v_fov / 2.0).tan()
    }
}

/// Conversion from a depth pixel and its depth reading to a 3d world point.
///
/// This is the seam to a hardware driver's own conversion routine: anything
/// that can map `(px, py, depth)` to world coordinates can feed the estimators.
pub trait DepthToWorld {
    /// Convert a depth pixel and its depth reading into world coordinates.
    fn depth_to_world(&self, px: f64, py: f64, depth: f64) -> Result<[f64; 3], GeometryError>;
}

impl DepthToWorld for FovIntrinsics {
    fn depth_to_world(&self, px: f64, py: f64, depth: f64) -> Result<[f64; 3], GeometryError> {
        unproject_point(self, px, py, depth)
    }
}

/// Unproject a depth pixel into a 3d world point.
///
/// # Arguments
///
/// * `intrinsics` - The camera intrinsics.
/// * `px` - The pixel column. Must be non-zero and finite.
/// * `py` - The pixel row. Must be non-zero and finite.
/// * `depth` - The raw depth reading. Must be non-zero and finite.
///
/// # Returns
///
/// The world point `[x, y, z]` with
/// `x = dz / sqrt((kx / px)^2 + 1)`, `y = dz / sqrt((ky / py)^2 + 1)` and
/// `z = sqrt(dz^2 - x^2)`.
///
/// Example:
///
/// ```
/// use depthrig_3d::camera::{unproject_point, FovIntrinsics};
///
/// let intrinsics = FovIntrinsics::kinect_v1();
/// let p = unproject_point(&intrinsics, 320.0, 240.0, 1000.0).unwrap();
/// assert!(p[0] > 0.0 && p[0] < 1000.0);
/// ```
pub fn unproject_point(
    intrinsics: &FovIntrinsics,
    px: f64,
    py: f64,
    depth: f64,
) -> Result<[f64; 3], GeometryError> {
    if px == 0.0 || py == 0.0 || !px.is_finite() || !py.is_finite() {
        return Err(GeometryError::Domain(format!(
            "cannot unproject pixel ({px}, {py}) with a zero or non-finite coordinate"
        )));
    }

    if depth == 0.0 || !depth.is_finite() {
        return Err(GeometryError::Domain(format!(
            "cannot unproject invalid depth {depth}"
        )));
    }

    let x = depth / ((intrinsics.kx() / px).powi(2) + 1.0).sqrt();
    let y = depth / ((intrinsics.ky() / py).powi(2) + 1.0).sqrt();
    let z = (depth * depth - x * x).max(0.0).sqrt();

    Ok([x, y, z])
}

/// Unproject a batch of `[px, py, depth]` samples.
///
/// Fails on the first sample that cannot be unprojected.
pub fn unproject_points(
    intrinsics: &FovIntrinsics,
    samples: &[[f64; 3]],
) -> Result<Vec<[f64; 3]>, GeometryError> {
    samples
        .iter()
        .map(|s| unproject_point(intrinsics, s[0], s[1], s[2]))
        .collect()
}
