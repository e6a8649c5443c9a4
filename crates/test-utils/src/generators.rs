//! Test data generators for synthetic grid coordinates.
//!
//! These generators create predictable, verifiable coordinate patterns
//! that can be used across the test suite.

use ndarray::{Array1, Array2, Array3, Array4};

/// Creates `count` evenly spaced values from `start` to `stop` inclusive.
///
/// # Example
///
/// ```
/// use test_utils::linspace;
///
/// let lon = linspace(0.0, 270.0, 4);
/// assert_eq!(lon.to_vec(), vec![0.0, 90.0, 180.0, 270.0]);
/// ```
pub fn linspace(start: f32, stop: f32, count: usize) -> Array1<f32> {
    Array1::linspace(start, stop, count)
}

/// Creates a global longitude axis of `count` points with a constant step,
/// starting at `start` and not repeating the first meridian.
///
/// # Example
///
/// ```
/// use test_utils::global_lon;
///
/// let lon = global_lon(-180.0, 4);
/// assert_eq!(lon.to_vec(), vec![-180.0, -90.0, 0.0, 90.0]);
/// ```
pub fn global_lon(start: f32, count: usize) -> Array1<f32> {
    let step = 360.0 / count as f32;
    Array1::from_shape_fn(count, |i| start + i as f32 * step)
}

/// Creates a time axis of `count` samples spaced by `step` seconds.
///
/// # Example
///
/// ```
/// use test_utils::time_axis;
///
/// assert_eq!(time_axis(3, 3600.0).to_vec(), vec![0.0, 3600.0, 7200.0]);
/// ```
pub fn time_axis(count: usize, step: f64) -> Array1<f64> {
    Array1::from_shape_fn(count, |i| i as f64 * step)
}

/// Creates 2-D curvilinear coordinates from two axes.
///
/// Returns `(lon, lat)`, both shaped `[lat.len(), lon.len()]`.
pub fn meshgrid(lon: &Array1<f32>, lat: &Array1<f32>) -> (Array2<f32>, Array2<f32>) {
    let shape = (lat.len(), lon.len());
    let lon2 = Array2::from_shape_fn(shape, |(_, x)| lon[x]);
    let lat2 = Array2::from_shape_fn(shape, |(y, _)| lat[y]);
    (lon2, lat2)
}

/// Creates rotated curvilinear coordinates: the axes of [`meshgrid`] turned
/// by `degrees` around the origin.
pub fn rotated_mesh(
    lon: &Array1<f32>,
    lat: &Array1<f32>,
    degrees: f32,
) -> (Array2<f32>, Array2<f32>) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let shape = (lat.len(), lon.len());
    let lon2 = Array2::from_shape_fn(shape, |(y, x)| lon[x] * cos - lat[y] * sin);
    let lat2 = Array2::from_shape_fn(shape, |(y, x)| lon[x] * sin + lat[y] * cos);
    (lon2, lat2)
}

/// Creates an s-level depth field with predictable values.
///
/// Each value is calculated as: `z * 100 + y * 10 + x`
///
/// This makes it easy to verify flips and halo wraps by checking that
/// depth[z][y][x] == z * 100 + y * 10 + x.
///
/// # Example
///
/// ```
/// use test_utils::s_depth;
///
/// let depth = s_depth(3, 4, 5);
/// assert_eq!(depth.shape(), &[3, 4, 5]);
/// assert_eq!(depth[[2, 3, 4]], 234.0);
/// ```
pub fn s_depth(zdim: usize, ydim: usize, xdim: usize) -> Array3<f32> {
    Array3::from_shape_fn((zdim, ydim, xdim), |(z, y, x)| {
        (z * 100 + y * 10 + x) as f32
    })
}

/// Creates a time-varying s-level depth field.
///
/// Each value is calculated as: `t * 1000 + z * 100 + y * 10 + x`
pub fn s_depth_4d(tdim: usize, zdim: usize, ydim: usize, xdim: usize) -> Array4<f32> {
    Array4::from_shape_fn((tdim, zdim, ydim, xdim), |(t, z, y, x)| {
        (t * 1000 + z * 100 + y * 10 + x) as f32
    })
}
