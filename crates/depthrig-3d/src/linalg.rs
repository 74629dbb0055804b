use crate::{error::GeometryError, utils};

/// Compute the determinant of a 3x3 matrix.
pub fn det_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Largest absolute entry of a 3x3 matrix.
pub(crate) fn max_abs_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m.iter().flatten().fold(0.0f64, |acc, v| acc.max(v.abs()))
}

/// Check whether three 2d points are numerically collinear.
///
/// The cross product of the edges from `p0` is compared against the product
/// of their lengths, so translating or scaling the points does not change
/// the outcome.
pub(crate) fn is_collinear2(p0: &[f64; 2], p1: &[f64; 2], p2: &[f64; 2]) -> bool {
    let e0 = [p1[0] - p0[0], p1[1] - p0[1]];
    let e1 = [p2[0] - p0[0], p2[1] - p0[1]];
    let cross = e0[0] * e1[1] - e0[1] * e1[0];
    let scale = (e0[0] * e0[0] + e0[1] * e0[1]) * (e1[0] * e1[0] + e1[1] * e1[1]);
    cross * cross <= 1e-24 * scale || !cross.is_finite()
}

/// Transpose a 3x3 matrix.
pub fn transpose_mat33(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in m.iter().enumerate() {
        for (j, val) in row.iter().enumerate() {
            out[j][i] = *val;
        }
    }
    out
}

/// Multiply two 3x3 matrices as `a * b`.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Multiply a 3x3 matrix by a 3d column vector.
pub fn mat33_mul_vec3(m: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Transform a set of points using a rotation and translation.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A rotation matrix.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated slice to store the transformed points.
///
/// Example:
///
/// ```
/// use depthrig_3d::linalg::transform_points;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [1.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points(&src_points, &rotation, &translation, &mut dst_points).unwrap();
/// assert_eq!(dst_points[0], [3.0, 2.0, 2.0]);
/// ```
pub fn transform_points(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) -> Result<(), GeometryError> {
    if src_points.len() != dst_points.len() {
        return Err(GeometryError::DimensionMismatch {
            expected: src_points.len(),
            actual: dst_points.len(),
        });
    }

    let dst_r_src_mat = utils::array33_to_faer_mat33(dst_r_src);

    // Nx3 view over the source points, read as 3xN through the transpose
    let points_in_src =
        faer::mat::from_row_major_slice(src_points.as_flattened(), src_points.len(), 3);

    {
        // each column of the 3xN destination view is one output point
        let n = dst_points.len();
        let mut points_in_dst =
            faer::mat::from_column_major_slice_mut(dst_points.as_flattened_mut(), 3, n);

        faer::linalg::matmul::matmul(
            &mut points_in_dst,
            dst_r_src_mat.as_ref(),
            points_in_src.transpose(),
            None,
            1.0,
            faer::Parallelism::None,
        );
    }

    for point in dst_points.iter_mut() {
        point[0] += dst_t_src[0];
        point[1] += dst_t_src[1];
        point[2] += dst_t_src[2];
    }

    Ok(())
}

/// Convert homogeneous 2d points `(x, y, w)` to Euclidean `(x / w, y / w)`.
///
/// Fails if any point lies at infinity (`w` close to zero).
pub fn homogeneous_to_euclidean2(points: &[[f64; 3]]) -> Result<Vec<[f64; 2]>, GeometryError> {
    points
        .iter()
        .map(|p| {
            if p[2].abs() < f64::EPSILON {
                return Err(GeometryError::Domain(format!(
                    "homogeneous point {p:?} lies at infinity"
                )));
            }
            Ok([p[0] / p[2], p[1] / p[2]])
        })
        .collect()
}

/// Convert homogeneous 3d points `(x, y, z, w)` to Euclidean `(x / w, y / w, z / w)`.
///
/// Fails if any point lies at infinity (`w` close to zero).
pub fn homogeneous_to_euclidean3(points: &[[f64; 4]]) -> Result<Vec<[f64; 3]>, GeometryError> {
    points
        .iter()
        .map(|p| {
            if p[3].abs() < f64::EPSILON {
                return Err(GeometryError::Domain(format!(
                    "homogeneous point {p:?} lies at infinity"
                )));
            }
            Ok([p[0] / p[3], p[1] / p[3], p[2] / p[3]])
        })
        .collect()
}
