use serde::{Deserialize, Serialize};

use crate::{depth::DepthFrame, error::GeometryError};

/// Projection of a pixel and its depth reading from one camera modality into another.
///
/// Typically backed by a hardware driver routine mapping depth pixels to
/// color pixels. Closures `Fn([i64; 2], u16) -> [i64; 2]` implement it.
pub trait CrossModalProjection {
    /// Project `pixel`, whose depth reading is `depth`, into the other modality.
    fn project(&self, pixel: [i64; 2], depth: u16) -> [i64; 2];
}

impl<F> CrossModalProjection for F
where
    F: Fn([i64; 2], u16) -> [i64; 2],
{
    fn project(&self, pixel: [i64; 2], depth: u16) -> [i64; 2] {
        self(pixel, depth)
    }
}

/// Parameters of the correspondence search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of guesses evaluated before giving up.
    pub max_iterations: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_iterations: 640 + 480,
        }
    }
}

/// Outcome of a correspondence search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// The best pixel found in the source modality.
    pub pixel: [i64; 2],
    /// Squared pixel distance between the projection of `pixel` and the target.
    pub squared_error: u64,
    /// Number of steps taken from the initial guess.
    pub iterations: usize,
    /// Whether `pixel` projects exactly onto the target.
    pub exact: bool,
}

fn squared_distance(a: [i64; 2], b: [i64; 2]) -> u64 {
    let dx = a[0].abs_diff(b[0]);
    let dy = a[1].abs_diff(b[1]);
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

fn depth_at(frame: &DepthFrame, pixel: [i64; 2]) -> Option<u16> {
    let x = usize::try_from(pixel[0]).ok()?;
    let y = usize::try_from(pixel[1]).ok()?;
    frame.get(x, y)
}

/// Find the pixel of the depth frame that projects onto `target` in the other modality.
///
/// Greedy local search: the first guess is `target` itself. At each step the
/// guess is projected; the search stops on an exact hit, or returns the best
/// guess so far as soon as the error stops decreasing. Otherwise the guess
/// moves by one pixel per axis towards reducing the mismatch.
///
/// The search also stops when the guess leaves the frame or after
/// `params.max_iterations` steps, returning the best guess so far.
///
/// # Arguments
///
/// * `target` - The pixel to resolve, in the projected modality.
/// * `depth` - The depth frame the guesses are read from.
/// * `projection` - The depth to other-modality projection.
/// * `params` - The search parameters.
///
/// # Returns
///
/// The best guess, or an error if `target` is not inside the depth frame.
///
/// Example:
///
/// ```
/// use depthrig_3d::correspondence::{search_correspondence, SearchParams};
/// use depthrig_3d::depth::DepthFrame;
///
/// let frame = DepthFrame::from_value(640, 480, 1000);
/// let shift = |p: [i64; 2], _depth: u16| [p[0] + 4, p[1] - 2];
/// let result = search_correspondence([100, 100], &frame, &shift, &SearchParams::default()).unwrap();
/// assert_eq!(result.pixel, [96, 102]);
/// assert!(result.exact);
/// ```
pub fn search_correspondence<P: CrossModalProjection + ?Sized>(
    target: [i64; 2],
    depth: &DepthFrame,
    projection: &P,
    params: &SearchParams,
) -> Result<SearchResult, GeometryError> {
    if depth_at(depth, target).is_none() {
        return Err(GeometryError::Domain(format!(
            "target pixel {target:?} is outside the {}x{} depth frame",
            depth.width(),
            depth.height()
        )));
    }

    let mut guess = target;
    let mut best_err = u64::MAX;
    let mut best_guess = target;

    for iteration in 0..params.max_iterations {
        let Some(reading) = depth_at(depth, guess) else {
            log::debug!("guess {guess:?} left the depth frame after {iteration} steps");
            return Ok(SearchResult {
                pixel: best_guess,
                squared_error: best_err,
                iterations: iteration,
                exact: false,
            });
        };

        let cpt = projection.project(guess, reading);
        if cpt == target {
            return Ok(SearchResult {
                pixel: guess,
                squared_error: 0,
                iterations: iteration,
                exact: true,
            });
        }

        // an equal error is a plateau and is treated as a local minimum
        let err = squared_distance(cpt, target);
        if err >= best_err {
            log::debug!("local minimum at {best_guess:?} with squared error {best_err}");
            return Ok(SearchResult {
                pixel: best_guess,
                squared_error: best_err,
                iterations: iteration,
                exact: false,
            });
        }
        best_err = err;
        best_guess = guess;

        guess[0] += (target[0] - cpt[0]).signum();
        guess[1] += (target[1] - cpt[1]).signum();
    }

    log::warn!(
        "correspondence search for {target:?} hit the cap of {} iterations",
        params.max_iterations
    );

    Ok(SearchResult {
        pixel: best_guess,
        squared_error: best_err,
        iterations: params.max_iterations,
        exact: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DepthFrame {
        DepthFrame::from_value(640, 480, 1000)
    }

    #[test]
    fn test_identity_projection() -> Result<(), GeometryError> {
        let identity = |p: [i64; 2], _: u16| p;
        let result = search_correspondence([123, 45], &frame(), &identity, &SearchParams::default())?;
        assert_eq!(
            result,
            SearchResult {
                pixel: [123, 45],
                squared_error: 0,
                iterations: 0,
                exact: true
            }
        );
        Ok(())
    }

    #[test]
    fn test_constant_offset() -> Result<(), GeometryError> {
        let offset = |p: [i64; 2], _: u16| [p[0] + 3, p[1] - 2];
        let result = search_correspondence([200, 200], &frame(), &offset, &SearchParams::default())?;
        assert_eq!(result.pixel, [197, 202]);
        assert_eq!(result.iterations, 3);
        assert!(result.exact);
        Ok(())
    }

    #[test]
    fn test_projection_uses_depth() -> Result<(), GeometryError> {
        // near pixels read 2000 and shift by 4, far pixels read 1000 and shift by 2
        let mut frame = frame();
        for x in 290..=300 {
            frame.set(x, 60, 2000)?;
        }
        let parallax = |p: [i64; 2], d: u16| [p[0] + d as i64 / 500, p[1]];
        let result = search_correspondence([300, 60], &frame, &parallax, &SearchParams::default())?;
        assert_eq!(result.pixel, [296, 60]);
        assert!(result.exact);

        let result = search_correspondence([300, 61], &frame, &parallax, &SearchParams::default())?;
        assert_eq!(result.pixel, [298, 61]);
        Ok(())
    }

    #[test]
    fn test_local_minimum() -> Result<(), GeometryError> {
        // every projected pixel is even, so an odd target is never hit exactly
        let doubled = |p: [i64; 2], _: u16| [p[0] * 2, p[1] * 2];
        let result = search_correspondence([101, 81], &frame(), &doubled, &SearchParams::default())?;
        assert!(!result.exact);
        assert_eq!(result.squared_error, 2);
        assert!(result.pixel == [50, 40] || result.pixel == [51, 41]);
        Ok(())
    }

    #[test]
    fn test_plateau_terminates() -> Result<(), GeometryError> {
        let constant = |_: [i64; 2], _: u16| [0, 0];
        let result = search_correspondence([5, 5], &frame(), &constant, &SearchParams::default())?;
        assert_eq!(result.pixel, [5, 5]);
        assert_eq!(result.squared_error, 50);
        assert_eq!(result.iterations, 1);
        assert!(!result.exact);
        Ok(())
    }

    #[test]
    fn test_iteration_cap() -> Result<(), GeometryError> {
        let offset = |p: [i64; 2], _: u16| [p[0] - 50, p[1] - 50];
        let params = SearchParams { max_iterations: 10 };
        let result = search_correspondence([100, 100], &frame(), &offset, &params)?;
        assert_eq!(result.iterations, 10);
        assert_eq!(result.pixel, [109, 109]);
        assert!(!result.exact);
        Ok(())
    }

    #[test]
    fn test_guess_leaves_frame() -> Result<(), GeometryError> {
        let offset = |p: [i64; 2], _: u16| [p[0] - 50, p[1]];
        let result = search_correspondence([600, 100], &frame(), &offset, &SearchParams::default())?;
        assert_eq!(result.pixel, [639, 100]);
        assert!(!result.exact);
        Ok(())
    }

    #[test]
    fn test_target_outside_frame() {
        let identity = |p: [i64; 2], _: u16| p;
        assert!(matches!(
            search_correspondence([700, 10], &frame(), &identity, &SearchParams::default()),
            Err(GeometryError::Domain(_))
        ));
        assert!(search_correspondence([-1, 10], &frame(), &identity, &SearchParams::default()).is_err());
    }

    #[test]
    fn test_search_params_serde() -> Result<(), serde_json::Error> {
        let params: SearchParams = serde_json::from_str(r#"{"max_iterations": 32}"#)?;
        assert_eq!(params.max_iterations, 32);
        assert_eq!(SearchParams::default().max_iterations, 1120);
        Ok(())
    }
}
