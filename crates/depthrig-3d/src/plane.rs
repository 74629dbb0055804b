use faer::prelude::SpSolver;

use crate::{error::GeometryError, rigid, vector};

/// A plane `{p : a*x + b*y + c*z + d = 0}`.
///
/// The normal `(a, b, c)` is never the zero vector but is not necessarily of
/// unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Plane {
    /// Create a plane from its general form coefficients.
    ///
    /// Fails if the normal `(a, b, c)` is the zero vector.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self, GeometryError> {
        if vector::squared_magnitude(&[a, b, c]) == 0.0 {
            return Err(GeometryError::DegenerateGeometry(
                "plane normal is the zero vector",
            ));
        }
        Ok(Self { a, b, c, d })
    }

    /// The coefficients `[a, b, c, d]`.
    pub fn coefficients(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// The normal vector `(a, b, c)`.
    pub fn normal(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    /// The algebraic residual `a*x + b*y + c*z + d` of a point.
    #[inline]
    pub fn residual(&self, p: &[f64; 3]) -> f64 {
        self.a * p[0] + self.b * p[1] + self.c * p[2] + self.d
    }

    /// The signed Euclidean distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, p: &[f64; 3]) -> f64 {
        self.residual(p) / vector::magnitude(&self.normal())
    }

    /// Mean signed distance of a set of points to the plane.
    ///
    /// Returns `0.0` for an empty set.
    pub fn mean_signed_distance(&self, points: &[[f64; 3]]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        points.iter().map(|p| self.signed_distance(p)).sum::<f64>() / points.len() as f64
    }

    /// Mean absolute distance of a set of points to the plane.
    ///
    /// Returns `0.0` for an empty set.
    pub fn mean_abs_distance(&self, points: &[[f64; 3]]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        points
            .iter()
            .map(|p| self.signed_distance(p).abs())
            .sum::<f64>()
            / points.len() as f64
    }

    /// The same plane with a unit length normal.
    pub fn normalized(&self) -> Self {
        let mag = vector::magnitude(&self.normal());
        Self {
            a: self.a / mag,
            b: self.b / mag,
            c: self.c / mag,
            d: self.d / mag,
        }
    }
}

/// Fit a plane to a set of points with linear least squares.
///
/// The plane is modelled as `z = A*x + B*y + C`. The normal equations are
/// built from the point coordinates centered on their centroid and solved for
/// `(A, B)`, then `C` places the centroid on the plane.
/// The result is returned in general form `(A, B, -1, C)`.
///
/// # Arguments
///
/// * `points` - At least 3 points, not all collinear.
///
/// # Returns
///
/// The plane of best fit, or an error if there are fewer than 3 points or
/// the normal equations are singular.
///
/// Example:
///
/// ```
/// use depthrig_3d::plane::fit_plane;
///
/// let points = [[0.0, 0.0, 1.0], [1.0, 0.0, 3.0], [0.0, 1.0, 4.0], [1.0, 1.0, 6.0]];
/// let plane = fit_plane(&points).unwrap();
/// let [a, b, c, d] = plane.coefficients();
/// assert!((a - 2.0).abs() < 1e-9 && (b - 3.0).abs() < 1e-9);
/// assert!((c + 1.0).abs() < 1e-9 && (d - 1.0).abs() < 1e-9);
/// ```
pub fn fit_plane(points: &[[f64; 3]]) -> Result<Plane, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::DimensionMismatch {
            expected: 3,
            actual: points.len(),
        });
    }

    let centroid = rigid::compute_centroid(points);

    // sums over centered coordinates, so the intercept drops out of the system
    let (mut sxx, mut sxy, mut syy, mut sxz, mut syz) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points.iter() {
        let (x, y, z) = (p[0] - centroid[0], p[1] - centroid[1], p[2] - centroid[2]);
        sxx += x * x;
        sxy += x * y;
        syy += y * y;
        sxz += x * z;
        syz += y * z;
    }

    // the scatter determinant vanishes relative to its squared trace when
    // the (x, y) projections are collinear
    let trace = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    if det <= 1e-12 * trace * trace || !det.is_finite() {
        return Err(GeometryError::SingularSystem(
            "plane normal equations are singular, points may be collinear",
        ));
    }

    let mat_a = faer::mat![[sxx, sxy], [sxy, syy]];
    let rhs = faer::mat![[sxz], [syz]];
    let sol = mat_a.partial_piv_lu().solve(rhs);

    let (a, b) = (sol[(0, 0)], sol[(1, 0)]);
    let c = centroid[2] - a * centroid[0] - b * centroid[1];
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return Err(GeometryError::SingularSystem(
            "plane normal equations produced a non-finite solution",
        ));
    }

    log::debug!("least squares plane z = {a} * x + {b} * y + {c}");

    Plane::new(a, b, -1.0, c)
}

/// Compute the plane passing exactly through three points.
///
/// The normal is the cross product of the edges from the third point to the
/// first and second points, and `d` places the third point on the plane.
///
/// # Arguments
///
/// * `points` - Three non-collinear points.
///
/// # Returns
///
/// The plane through the three points, or an error if they are collinear.
pub fn plane_from_points(points: &[[f64; 3]; 3]) -> Result<Plane, GeometryError> {
    let [p0, p1, p2] = points;
    let e0 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
    let e1 = [p2[0] - p1[0], p2[1] - p1[1], p2[2] - p1[2]];
    let n = vector::cross(&e0, &e1);

    // |e0 x e1|^2 = |e0|^2 |e1|^2 sin^2(theta)
    let scale = vector::squared_magnitude(&e0) * vector::squared_magnitude(&e1);
    if vector::squared_magnitude(&n) <= 1e-12 * scale || scale == 0.0 {
        return Err(GeometryError::DegenerateGeometry(
            "three points are collinear",
        ));
    }

    let d = -vector::dot(&n, p2);
    Plane::new(n[0], n[1], n[2], d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_plane_new_zero_normal() {
        assert!(Plane::new(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(Plane::new(0.0, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_plane_distances() -> Result<(), GeometryError> {
        let plane = Plane::new(0.0, 0.0, 2.0, -4.0)?; // z = 2
        assert_relative_eq!(plane.residual(&[5.0, 1.0, 3.0]), 2.0);
        assert_relative_eq!(plane.signed_distance(&[5.0, 1.0, 3.0]), 1.0);
        assert_relative_eq!(plane.signed_distance(&[0.0, 0.0, 0.0]), -2.0);
        assert_relative_eq!(
            plane.mean_signed_distance(&[[0.0, 0.0, 1.0], [0.0, 0.0, 3.0]]),
            0.0
        );
        assert_relative_eq!(
            plane.mean_abs_distance(&[[0.0, 0.0, 1.0], [0.0, 0.0, 3.0]]),
            1.0
        );
        assert_eq!(plane.normalized().coefficients(), [0.0, 0.0, 1.0, -2.0]);
        Ok(())
    }

    #[test]
    fn test_plane_from_points_zero_residual() -> Result<(), GeometryError> {
        let points = [[1.0, 2.0, 3.0], [-4.0, 0.5, 2.0], [0.0, -3.0, 7.5]];
        let plane = plane_from_points(&points)?;
        for p in points.iter() {
            assert_relative_eq!(plane.residual(p), 0.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_plane_from_points_collinear() {
        let points = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]];
        assert!(matches!(
            plane_from_points(&points),
            Err(GeometryError::DegenerateGeometry(_))
        ));

        let points = [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [2.0, 0.0, 2.0]];
        assert!(plane_from_points(&points).is_err());
    }

    #[test]
    fn test_fit_plane_exact() -> Result<(), GeometryError> {
        // z = 0.5 x - 2 y + 3
        let points = (0..5)
            .flat_map(|i| (0..5).map(move |j| (i as f64, j as f64)))
            .map(|(x, y)| [x, y, 0.5 * x - 2.0 * y + 3.0])
            .collect::<Vec<_>>();

        let plane = fit_plane(&points)?;
        let [a, b, c, d] = plane.coefficients();
        assert_relative_eq!(a, 0.5, epsilon = 1e-9);
        assert_relative_eq!(b, -2.0, epsilon = 1e-9);
        assert_eq!(c, -1.0);
        assert_relative_eq!(d, 3.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_fit_plane_noisy() -> Result<(), GeometryError> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let points = (0..200)
            .map(|_| {
                let x = rng.random_range(-10.0..10.0);
                let y = rng.random_range(-10.0..10.0);
                let noise = rng.random_range(-0.01..0.01);
                [x, y, -0.3 * x + 1.2 * y + 5.0 + noise]
            })
            .collect::<Vec<_>>();

        let plane = fit_plane(&points)?;
        let [a, b, _, d] = plane.coefficients();
        assert_relative_eq!(a, -0.3, epsilon = 1e-2);
        assert_relative_eq!(b, 1.2, epsilon = 1e-2);
        assert_relative_eq!(d, 5.0, epsilon = 1e-2);
        assert_relative_eq!(plane.mean_signed_distance(&points), 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_fit_plane_off_origin_patch() -> Result<(), GeometryError> {
        // small patches far from the origin, in millimeters
        for (offset, size) in [(1000.0, 100.0), (1000.0, 20.0), (2000.0, 50.0), (1e4, 5.0)] {
            let points = [
                [offset, offset],
                [offset + size, offset],
                [offset, offset + size],
                [offset + size, offset + size],
            ]
            .map(|[x, y]| [x, y, 0.5 * x + 0.2 * y + 3.0]);

            let plane = fit_plane(&points)?;
            let [a, b, c, d] = plane.coefficients();
            assert_relative_eq!(a, 0.5, epsilon = 1e-9);
            assert_relative_eq!(b, 0.2, epsilon = 1e-9);
            assert_eq!(c, -1.0);
            assert_relative_eq!(d, 3.0, epsilon = 1e-6);
            for p in points.iter() {
                assert_relative_eq!(plane.residual(p), 0.0, epsilon = 1e-6);
            }
        }
        Ok(())
    }

    #[test]
    fn test_fit_plane_collinear() {
        let points = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0], [3.0, 3.0, 3.0]];
        assert!(matches!(
            fit_plane(&points),
            Err(GeometryError::SingularSystem(_))
        ));

        // collinear far from the origin
        let points = [1000.0, 1010.0, 1020.0].map(|t| [t, 2.0 * t, 5.0]);
        assert!(matches!(
            fit_plane(&points),
            Err(GeometryError::SingularSystem(_))
        ));
    }

    #[test]
    fn test_fit_plane_too_few_points() {
        assert_eq!(
            fit_plane(&[[0.0; 3], [1.0, 0.0, 0.0]]),
            Err(GeometryError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
