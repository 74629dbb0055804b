use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{error::GeometryError, plane::Plane, vector};

/// Initial value of every weight component.
pub const INITIAL_WEIGHT: f64 = 0.1;

/// Learning-rate schedule used during training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LearningRate {
    /// The same rate at every iteration.
    Constant(f64),
    /// Exponentially decaying rate `initial * exp(-decay * i)`.
    Decaying {
        /// Rate at iteration zero.
        initial: f64,
        /// Decay constant per iteration.
        decay: f64,
    },
}

impl LearningRate {
    /// The learning rate at `iteration`.
    #[inline]
    pub fn rate(&self, iteration: usize) -> f64 {
        match *self {
            LearningRate::Constant(rate) => rate,
            LearningRate::Decaying { initial, decay } => {
                initial * (-decay * iteration as f64).exp()
            }
        }
    }
}

/// Weight vector of the plane regressor.
///
/// Training drives `w . x` towards zero for every sample, so `w` converges
/// to the common homogeneous normal of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorState {
    weights: Vec<f64>,
}

impl RegressorState {
    /// Create a state of dimension `dim` with every weight set to [`INITIAL_WEIGHT`].
    pub fn new(dim: usize) -> Self {
        Self {
            weights: vec![INITIAL_WEIGHT; dim],
        }
    }

    /// Create a state from explicit weights.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// The current weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The dimension of the weight vector.
    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    /// The residual `w . x` of a sample.
    ///
    /// Fails if `sample` does not have the dimension of the state.
    #[inline]
    pub fn residual(&self, sample: &[f64]) -> Result<f64, GeometryError> {
        if sample.len() != self.weights.len() {
            return Err(GeometryError::DimensionMismatch {
                expected: self.weights.len(),
                actual: sample.len(),
            });
        }
        Ok(vector::dot(&self.weights, sample))
    }

    /// Apply one training step on `sample` with learning rate `rate`.
    ///
    /// Returns the updated state `w + rate * -(w . x) * x / |x|`. A zero
    /// length sample carries no direction and leaves the state unchanged.
    /// Fails if `sample` does not have the dimension of the state.
    pub fn step(&self, sample: &[f64], rate: f64) -> Result<Self, GeometryError> {
        let e = self.residual(sample)?;

        let Ok(direction) = vector::normalized(sample) else {
            return Ok(self.clone());
        };

        let weights = self
            .weights
            .iter()
            .zip(direction.iter())
            .map(|(w, x)| w + rate * -e * x)
            .collect();

        Ok(Self { weights })
    }

    /// Mean absolute residual `|w . x|` over a validation set.
    ///
    /// Fails if the set is empty or a sample has the wrong dimension.
    pub fn mean_abs_error<S: AsRef<[f64]>>(&self, validation: &[S]) -> Result<f64, GeometryError> {
        if validation.is_empty() {
            return Err(GeometryError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        let total = validation
            .iter()
            .map(|s| self.residual(s.as_ref()).map(f64::abs))
            .sum::<Result<f64, _>>()?;

        Ok(total / validation.len() as f64)
    }

    /// Interpret a 4 dimensional state as the plane `w0*x + w1*y + w2*z + w3 = 0`.
    pub fn to_plane(&self) -> Result<Plane, GeometryError> {
        match self.weights.as_slice() {
            &[a, b, c, d] => Plane::new(a, b, c, d),
            _ => Err(GeometryError::DimensionMismatch {
                expected: 4,
                actual: self.dim(),
            }),
        }
    }
}

impl fmt::Display for RegressorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plane regressor with weights {:?}", self.weights)
    }
}

fn check_dims<S: AsRef<[f64]>>(samples: &[S], dim: usize) -> Result<(), GeometryError> {
    match samples.iter().find(|s| s.as_ref().len() != dim) {
        Some(s) => Err(GeometryError::DimensionMismatch {
            expected: dim,
            actual: s.as_ref().len(),
        }),
        None => Ok(()),
    }
}

/// Augment 3d points with a unit scale coordinate.
pub fn homogeneous(points: &[[f64; 3]]) -> Vec<[f64; 4]> {
    points.iter().map(|p| [p[0], p[1], p[2], 1.0]).collect()
}

/// Train a plane regressor on a set of homogeneous samples.
///
/// At every iteration one sample is drawn uniformly at random with
/// replacement and [`RegressorState::step`] is applied with the rate given
/// by `schedule`. There is no stopping rule besides `iterations`.
///
/// # Arguments
///
/// * `samples` - The training samples, all of the same dimension.
/// * `schedule` - The learning-rate schedule.
/// * `iterations` - The number of training steps.
/// * `rng` - The random generator used to draw samples.
///
/// # Returns
///
/// The trained state, or an error if `samples` is empty or inconsistent.
///
/// Example:
///
/// ```
/// use depthrig_3d::regressor::{homogeneous, train, LearningRate};
/// use rand::SeedableRng;
///
/// let points = [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let state = train(&homogeneous(&points), LearningRate::Constant(0.5), 2000, &mut rng).unwrap();
/// assert!(state.mean_abs_error(&homogeneous(&points)).unwrap() < 1e-3);
/// ```
pub fn train<S, R>(
    samples: &[S],
    schedule: LearningRate,
    iterations: usize,
    rng: &mut R,
) -> Result<RegressorState, GeometryError>
where
    S: AsRef<[f64]>,
    R: Rng + ?Sized,
{
    let Some(first) = samples.first() else {
        return Err(GeometryError::DimensionMismatch {
            expected: 1,
            actual: 0,
        });
    };
    let dim = first.as_ref().len();
    check_dims(samples, dim)?;

    let mut state = RegressorState::new(dim);
    for i in 0..iterations {
        let sample = samples[rng.random_range(0..samples.len())].as_ref();
        state = state.step(sample, schedule.rate(i))?;
        log::trace!("iteration {i}: {state}");
    }

    log::debug!("trained {state} in {iterations} iterations");

    Ok(state)
}
