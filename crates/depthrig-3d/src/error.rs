/// An error type for the geometric estimators.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A linear system or basis-change matrix is not invertible.
    #[error("Singular linear system: {0}")]
    SingularSystem(&'static str),

    /// The input points are collinear where non-collinearity is required.
    #[error("Degenerate point configuration: {0}")]
    DegenerateGeometry(&'static str),

    /// Corresponding inputs do not have the required number of elements.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected number of elements.
        expected: usize,
        /// The actual number of elements.
        actual: usize,
    },

    /// Every aggregated depth reading was the invalid sentinel.
    #[error("No valid depth sample")]
    NoValidSample,

    /// An input lies outside the domain of the operation.
    #[error("Domain error: {0}")]
    Domain(String),
}
