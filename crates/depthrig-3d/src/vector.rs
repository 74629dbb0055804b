use crate::error::GeometryError;

/// Compute the dot product of two vectors of the same length.
///
/// PRECONDITION: `a` and `b` have the same length.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Compute the squared magnitude of a vector.
///
/// Example:
///
/// ```
/// use depthrig_3d::vector::squared_magnitude;
///
/// assert_eq!(squared_magnitude(&[1.0, 2.0, 2.0]), 9.0);
/// ```
#[inline]
pub fn squared_magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Compute the Euclidean magnitude of a vector.
///
/// Example:
///
/// ```
/// use depthrig_3d::vector::magnitude;
///
/// assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
/// ```
#[inline]
pub fn magnitude(v: &[f64]) -> f64 {
    squared_magnitude(v).sqrt()
}

/// Return the unit vector pointing in the direction of `v`.
///
/// # Arguments
///
/// * `v` - A vector of any dimension.
///
/// # Returns
///
/// The normalized vector, or an error if `v` has zero magnitude.
pub fn normalized(v: &[f64]) -> Result<Vec<f64>, GeometryError> {
    let mag = magnitude(v);
    if mag < f64::EPSILON || !mag.is_finite() {
        return Err(GeometryError::Domain(
            "cannot normalize a zero or non-finite vector".to_string(),
        ));
    }
    Ok(v.iter().map(|x| x / mag).collect())
}

/// Compute the cross product of two 3d vectors.
#[inline]
pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Compute the skew-symmetric cross product matrix of a 3d vector.
///
/// The returned matrix `[v]x` satisfies `[v]x * u = v x u` for any `u`.
///
/// Example:
///
/// ```
/// use depthrig_3d::vector::skew_symmetric;
///
/// let m = skew_symmetric(&[1.0, 2.0, 3.0]);
/// assert_eq!(m, [[0.0, -3.0, 2.0], [3.0, 0.0, -1.0], [-2.0, 1.0, 0.0]]);
/// ```
pub fn skew_symmetric(v: &[f64; 3]) -> [[f64; 3]; 3] {
    [[0.0, -v[2], v[1]], [v[2], 0.0, -v[0]], [-v[1], v[0], 0.0]]
}

/// Compute the angle in radians between two vectors.
///
/// The cosine is clamped to `[-1, 1]` so that nearly parallel vectors do not
/// produce NaN.
///
/// # Arguments
///
/// * `a` - The first vector.
/// * `b` - The second vector, with the same length as `a`.
///
/// # Returns
///
/// The angle in `[0, pi]`, or an error if either vector has zero magnitude or
/// the lengths differ.
pub fn angle_between(a: &[f64], b: &[f64]) -> Result<f64, GeometryError> {
    if a.len() != b.len() {
        return Err(GeometryError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let denom = magnitude(a) * magnitude(b);
    if denom < f64::EPSILON {
        return Err(GeometryError::Domain(
            "angle is undefined for a zero vector".to_string(),
        ));
    }

    Ok((dot(a, b) / denom).clamp(-1.0, 1.0).acos())
}
