use crate::{camera::DepthToWorld, error::GeometryError};

/// Depth reading reported by the sensor when there is no return.
pub const NO_DEPTH: u16 = 0;

/// A single raster of raw depth readings in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl DepthFrame {
    /// Create a new depth frame from its size and row-major readings.
    ///
    /// Fails if `data` does not hold exactly `width * height` readings.
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Result<Self, GeometryError> {
        if data.len() != width * height {
            return Err(GeometryError::DimensionMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a frame with every reading set to `value`.
    pub fn from_value(width: usize, height: usize, value: u16) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// The width of the frame in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The height of the frame in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw readings in row-major order.
    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    /// Get the reading at column `x` and row `y`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Set the reading at column `x` and row `y`.
    ///
    /// Fails if the pixel is out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: u16) -> Result<(), GeometryError> {
        if x >= self.width || y >= self.height {
            return Err(out_of_bounds(x, y, self.width, self.height));
        }
        self.data[y * self.width + x] = value;
        Ok(())
    }
}

fn out_of_bounds(x: usize, y: usize, width: usize, height: usize) -> GeometryError {
    GeometryError::Domain(format!(
        "pixel ({x}, {y}) is outside the {width}x{height} frame"
    ))
}

/// Combine several readings of the same pixel into one denoised reading.
///
/// The invalid sentinel [`NO_DEPTH`] is discarded and the median of the
/// remaining readings is returned. With an even number of valid readings the
/// two middle values are averaged.
///
/// Example:
///
/// ```
/// use depthrig_3d::depth::median_depth;
///
/// assert_eq!(median_depth(&[0, 5, 5, 5]).unwrap(), 5.0);
/// assert!(median_depth(&[0, 0]).is_err());
/// ```
pub fn median_depth(readings: &[u16]) -> Result<f64, GeometryError> {
    let mut valid = readings
        .iter()
        .copied()
        .filter(|&r| r != NO_DEPTH)
        .collect::<Vec<_>>();

    if valid.is_empty() {
        return Err(GeometryError::NoValidSample);
    }

    valid.sort_unstable();
    let mid = valid.len() / 2;
    let median = match valid.len() % 2 {
        0 => (valid[mid - 1] as f64 + valid[mid] as f64) / 2.0,
        _ => valid[mid] as f64,
    };

    Ok(median)
}

/// Median depth at pixel `(x, y)` across consecutive frames.
///
/// Fails if the pixel lies outside any of the frames or if every reading is
/// the invalid sentinel.
pub fn median_depth_at(frames: &[DepthFrame], x: usize, y: usize) -> Result<f64, GeometryError> {
    let readings = frames
        .iter()
        .map(|f| {
            f.get(x, y)
                .ok_or_else(|| out_of_bounds(x, y, f.width(), f.height()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    median_depth(&readings)
}

/// Convert pixel coordinates into world points using denoised depth readings.
///
/// For each `[x, y]` pixel the median depth across `frames` is computed and
/// passed to `converter` together with the pixel coordinates.
///
/// # Arguments
///
/// * `frames` - Consecutive frames from the same depth stream.
/// * `pixels` - The `[column, row]` pixels to convert.
/// * `converter` - The pixel + depth to world conversion.
///
/// # Returns
///
/// One world point per input pixel, in the same order.
pub fn depth_pixels_to_world<C: DepthToWorld + ?Sized>(
    frames: &[DepthFrame],
    pixels: &[[usize; 2]],
    converter: &C,
) -> Result<Vec<[f64; 3]>, GeometryError> {
    pixels
        .iter()
        .map(|&[x, y]| {
            let depth = median_depth_at(frames, x, y)?;
            log::trace!("pixel ({x}, {y}) median depth {depth}");
            converter.depth_to_world(x as f64, y as f64, depth)
        })
        .collect()
}
