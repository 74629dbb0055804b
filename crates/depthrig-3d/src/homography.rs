use faer::prelude::SpSolver;

use crate::{error::GeometryError, linalg, utils};

/// Number of correspondences needed to define a homography.
const NUM_POINTS: usize = 4;

/// Build the canonical basis matrix of four 2d points.
///
/// The fourth point, in homogeneous coordinates, is written as a linear
/// combination of the first three. Each of the first three homogeneous points
/// is scaled by its coefficient and stored as a column of the returned matrix,
/// which therefore maps the canonical projective basis onto the four points.
///
/// # Arguments
///
/// * `points` - Exactly four 2d points. The first three must not be collinear
///   and the fourth must not lie on a line through two of the first three.
pub fn canonical_basis(points: &[[f64; 2]]) -> Result<[[f64; 3]; 3], GeometryError> {
    if points.len() != NUM_POINTS {
        return Err(GeometryError::DimensionMismatch {
            expected: NUM_POINTS,
            actual: points.len(),
        });
    }

    // columns are the first three points in homogeneous coordinates
    let basis = [
        [points[0][0], points[1][0], points[2][0]],
        [points[0][1], points[1][1], points[2][1]],
        [1.0, 1.0, 1.0],
    ];

    if linalg::is_collinear2(&points[0], &points[1], &points[2]) {
        return Err(GeometryError::SingularSystem(
            "the first three points are collinear",
        ));
    }

    let rhs = utils::array3_to_faer_col_mat(&[points[3][0], points[3][1], 1.0]);
    let coeffs = utils::array33_to_faer_mat33(&basis)
        .partial_piv_lu()
        .solve(rhs);
    let coeffs = [coeffs[(0, 0)], coeffs[(1, 0)], coeffs[(2, 0)]];

    // a vanishing coefficient puts the fourth point on a line through the other two
    let scale = coeffs.iter().fold(0.0f64, |acc, c| acc.max(c.abs()));
    if coeffs.iter().any(|c| c.abs() <= 1e-10 * scale) || !scale.is_finite() {
        return Err(GeometryError::DegenerateGeometry(
            "the fourth point is collinear with two of the first three",
        ));
    }

    let mut scaled = basis;
    for row in scaled.iter_mut() {
        for (val, c) in row.iter_mut().zip(coeffs.iter()) {
            *val *= c;
        }
    }

    Ok(scaled)
}

/// Compute the homography between two sets of four corresponding 2d points.
///
/// Both point sets are expressed in their canonical basis `M` (source) and
/// `M'` (destination), and the homography is `H = M' * M^-1`. The result is
/// scaled so that `H[2][2] == 1` whenever that entry is not close to zero.
///
/// # Arguments
///
/// * `src` - The four source 2d points.
/// * `dst` - The four destination 2d points.
///
/// # Returns
///
/// The homography mapping `src` onto `dst` in homogeneous coordinates.
///
/// Example:
///
/// ```
/// use depthrig_3d::homography::{apply_homography, homography_4pt};
///
/// let src = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
/// let dst = [[2.0, 1.0], [4.0, 1.0], [2.0, 3.0], [4.0, 3.0]];
/// let h = homography_4pt(&src, &dst).unwrap();
/// let mapped = apply_homography(&h, &src).unwrap();
/// assert!((mapped[3][0] - 4.0).abs() < 1e-9 && (mapped[3][1] - 3.0).abs() < 1e-9);
/// ```
pub fn homography_4pt(src: &[[f64; 2]], dst: &[[f64; 2]]) -> Result<[[f64; 3]; 3], GeometryError> {
    let m_src = canonical_basis(src)?;
    let m_dst = canonical_basis(dst)?;

    let identity = faer::Mat::<f64>::from_fn(3, 3, |i, j| if i == j { 1.0 } else { 0.0 });
    let m_src_inv = utils::array33_to_faer_mat33(&m_src)
        .partial_piv_lu()
        .solve(identity);

    let h = utils::array33_to_faer_mat33(&m_dst) * m_src_inv;
    let mut homo = utils::faer_mat33_to_array33(h.as_ref());

    let h22 = homo[2][2];
    if h22.abs() > f64::EPSILON * linalg::max_abs_mat33(&homo) {
        for val in homo.iter_mut().flatten() {
            *val /= h22;
        }
    }

    if homo.iter().flatten().any(|v| !v.is_finite()) {
        return Err(GeometryError::SingularSystem(
            "homography estimation produced non-finite values",
        ));
    }

    log::debug!("homography: {homo:?}");

    Ok(homo)
}

/// Map 2d points through a homography.
///
/// Fails if a point is sent to infinity.
pub fn apply_homography(
    homo: &[[f64; 3]; 3],
    points: &[[f64; 2]],
) -> Result<Vec<[f64; 2]>, GeometryError> {
    let mapped = points
        .iter()
        .map(|p| linalg::mat33_mul_vec3(homo, &[p[0], p[1], 1.0]))
        .collect::<Vec<_>>();
    linalg::homogeneous_to_euclidean2(&mapped)
}
