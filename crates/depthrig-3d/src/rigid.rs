use crate::{error::GeometryError, linalg, utils};

/// A proper rigid transformation `p' = R * p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// Rotation matrix with determinant +1.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector.
    pub translation: [f64; 3],
}

impl RigidTransform {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// Transform a single point.
    pub fn apply(&self, p: &[f64; 3]) -> [f64; 3] {
        let rp = linalg::mat33_mul_vec3(&self.rotation, p);
        [
            rp[0] + self.translation[0],
            rp[1] + self.translation[1],
            rp[2] + self.translation[2],
        ]
    }

    /// Transform a set of points.
    pub fn apply_all(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    /// The inverse transformation `p = R^T * p' - R^T * t`.
    pub fn inverse(&self) -> Self {
        let rotation = linalg::transpose_mat33(&self.rotation);
        let t = linalg::mat33_mul_vec3(&rotation, &self.translation);
        Self {
            rotation,
            translation: [-t[0], -t[1], -t[2]],
        }
    }

    /// Root mean square distance between the transformed `src` points and `dst`.
    pub fn rmse(&self, src: &[[f64; 3]], dst: &[[f64; 3]]) -> Result<f64, GeometryError> {
        check_correspondences(src, dst)?;
        let sum_sq = src
            .iter()
            .zip(dst.iter())
            .map(|(s, d)| {
                let p = self.apply(s);
                (p[0] - d[0]).powi(2) + (p[1] - d[1]).powi(2) + (p[2] - d[2]).powi(2)
            })
            .sum::<f64>();
        Ok((sum_sq / src.len() as f64).sqrt())
    }
}

fn check_correspondences(src: &[[f64; 3]], dst: &[[f64; 3]]) -> Result<(), GeometryError> {
    if src.len() != dst.len() {
        return Err(GeometryError::DimensionMismatch {
            expected: src.len(),
            actual: dst.len(),
        });
    }
    if src.is_empty() {
        return Err(GeometryError::DimensionMismatch {
            expected: 1,
            actual: 0,
        });
    }
    Ok(())
}

/// Compute the centroid of a set of points.
///
/// PRECONDITION: `points` is not empty.
pub fn compute_centroid(points: &[[f64; 3]]) -> [f64; 3] {
    let n = points.len() as f64;
    let sum = points.iter().fold([0.0; 3], |acc, p| {
        [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]
    });
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

/// Compute the optimal rigid transformation between two corresponding point sets.
///
/// This implements the Kabsch/Horn closed form solution, which minimizes
/// `sum ||dst_i - (R * src_i + t)||^2` over the given correspondences:
///
/// 1. Compute the centroids of both sets.
/// 2. Center both sets by subtracting their centroids.
/// 3. Compute the cross-covariance `H = AA^T * BB`.
/// 4. Factor `H = U * S * V^T` with a singular value decomposition.
/// 5. Compute `R = V * U^T`. If `det(R) < 0` the last row of `V^T` is
///    negated and `R` recomputed, so a reflection is never returned.
/// 6. Compute `t = -R * ctr_src + ctr_dst`.
///
/// # Arguments
///
/// * `points_src` - Source points, at least 3 and not all collinear.
/// * `points_dst` - Destination points in the same order as `points_src`.
///
/// # Returns
///
/// The transformation mapping `points_src` onto `points_dst`.
///
/// Example:
///
/// ```
/// use depthrig_3d::rigid::fit_rigid_transform;
///
/// let src = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let dst = src.map(|p| [p[0] + 1.0, p[1] - 2.0, p[2] + 0.5]);
/// let transform = fit_rigid_transform(&src, &dst).unwrap();
/// assert!((transform.translation[0] - 1.0).abs() < 1e-9);
/// ```
pub fn fit_rigid_transform(
    points_src: &[[f64; 3]],
    points_dst: &[[f64; 3]],
) -> Result<RigidTransform, GeometryError> {
    check_correspondences(points_src, points_dst)?;
    if points_src.len() < 3 {
        return Err(GeometryError::DimensionMismatch {
            expected: 3,
            actual: points_src.len(),
        });
    }

    let n = points_src.len();
    let ctr_src = compute_centroid(points_src);
    let ctr_dst = compute_centroid(points_dst);

    // centered Nx3 point matrices
    let aa = faer::Mat::<f64>::from_fn(n, 3, |i, j| points_src[i][j] - ctr_src[j]);
    let bb = faer::Mat::<f64>::from_fn(n, 3, |i, j| points_dst[i][j] - ctr_dst[j]);

    // cross-covariance H = AA^T * BB
    let h = aa.transpose() * bb.as_ref();

    let svd = h.svd();
    let u = svd.u();
    let mut vt = svd.v().transpose().to_owned();

    let mut r = vt.transpose() * u.transpose();
    let mut rotation = utils::faer_mat33_to_array33(r.as_ref());

    if linalg::det_mat33(&rotation) < 0.0 {
        log::debug!("correcting reflection in the estimated rotation");
        for j in 0..3 {
            vt[(2, j)] = -vt[(2, j)];
        }
        r = vt.transpose() * u.transpose();
        rotation = utils::faer_mat33_to_array33(r.as_ref());
    }

    let r_ctr = linalg::mat33_mul_vec3(&rotation, &ctr_src);
    let translation = [
        ctr_dst[0] - r_ctr[0],
        ctr_dst[1] - r_ctr[1],
        ctr_dst[2] - r_ctr[2],
    ];

    if rotation.iter().flatten().chain(translation.iter()).any(|v| !v.is_finite()) {
        return Err(GeometryError::SingularSystem(
            "rigid transform estimation produced non-finite values",
        ));
    }

    Ok(RigidTransform {
        rotation,
        translation,
    })
}
