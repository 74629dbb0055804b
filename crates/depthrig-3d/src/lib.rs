#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole unprojection from field-of-view intrinsics.
pub mod camera;

/// Cross-modal pixel correspondence search.
pub mod correspondence;

/// Depth frames and temporal median aggregation.
pub mod depth;

/// Error types for the estimators.
pub mod error;

/// Four-point homography estimation.
pub mod homography;

/// Linear algebra utilities.
pub mod linalg;

/// Least-squares and three-point plane fitting.
pub mod plane;

/// Online stochastic plane regression.
pub mod regressor;

/// Kabsch/Horn rigid transform estimation.
pub mod rigid;

/// Conversions between fixed-size arrays and faer matrices.
pub mod utils;

/// Vector utilities.
pub mod vector;

pub use error::GeometryError;
