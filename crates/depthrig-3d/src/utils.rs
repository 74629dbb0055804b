/// Utility function to convert a 3x3 array to a faer matrix 3x3.
///
/// # Arguments
///
/// * `array` - A 3x3 array in row-major order.
///
/// # Returns
///
/// An owned faer matrix 3x3.
pub fn array33_to_faer_mat33(array: &[[f64; 3]; 3]) -> faer::Mat<f64> {
    faer::Mat::<f64>::from_fn(3, 3, |i, j| array[i][j])
}

/// Utility function to convert a faer matrix 3x3 back to a row-major 3x3 array.
///
/// PRECONDITION: `mat` has shape (3, 3).
pub fn faer_mat33_to_array33(mat: faer::MatRef<'_, f64>) -> [[f64; 3]; 3] {
    debug_assert_eq!((mat.nrows(), mat.ncols()), (3, 3));
    let mut array = [[0.0; 3]; 3];
    for (i, row) in array.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = mat[(i, j)];
        }
    }
    array
}

/// Utility function to convert a 3d array to a faer matrix 3x1.
pub fn array3_to_faer_col_mat(array: &[f64; 3]) -> faer::Mat<f64> {
    faer::Mat::<f64>::from_fn(3, 1, |i, _| array[i])
}
