//! Periodic halo padding of coordinate and depth arrays.
//!
//! A halo of `h` samples is wrapped around both ends of one axis:
//!
//! ```text
//! [ a[n-h..] - shift | a | a[..h] + shift ]
//! ```
//!
//! Horizontal coordinates are shifted by the span of the axis plus one edge
//! step so the padded samples continue the coordinate monotonically. Depth
//! is not a horizontal coordinate and is padded with a plain wrap.

use ndarray::{concatenate, Array, ArrayD, ArrayViewD, Axis, Slice, Zip};

use crate::config::GridConfig;
use crate::error::{GridError, Result};

/// Horizontal direction of a halo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaloDirection {
    Zonal,
    Meridional,
}

impl HaloDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zonal => "zonal",
            Self::Meridional => "meridional",
        }
    }
}

/// Check that an axis of length `len` can carry a halo of `halosize`.
pub fn check_halo(len: usize, halosize: usize, direction: HaloDirection) -> Result<()> {
    if halosize == 0 {
        return Err(GridError::invalid_halo("halosize must be > 0"));
    }
    if len < 2 {
        return Err(GridError::invalid_halo(format!(
            "{} axis has {} sample(s), at least 2 are needed",
            direction.as_str(),
            len
        )));
    }
    if halosize > len {
        return Err(GridError::invalid_halo(format!(
            "halosize {} exceeds {} axis length {}",
            halosize,
            direction.as_str(),
            len
        )));
    }
    Ok(())
}

/// Coordinate shift for each lane along `axis`: `a[-1] - 2*a[0] + a[1]`.
pub fn edge_shift(coords: &ArrayViewD<'_, f32>, axis: Axis) -> ArrayD<f32> {
    let n = coords.len_of(axis);
    Zip::from(&coords.index_axis(axis, n - 1))
        .and(&coords.index_axis(axis, 0))
        .and(&coords.index_axis(axis, 1))
        .map_collect(|&last, &first, &second| last - 2.0 * first + second)
}

/// Whether the leading and trailing steps along `axis` agree in every lane.
pub fn uniform_edge_spacing(
    coords: &ArrayViewD<'_, f32>,
    axis: Axis,
    config: &GridConfig,
) -> bool {
    let n = coords.len_of(axis);
    let lead = &coords.index_axis(axis, 1) - &coords.index_axis(axis, 0);
    let trail = &coords.index_axis(axis, n - 1) - &coords.index_axis(axis, n - 2);
    Zip::from(&lead)
        .and(&trail)
        .all(|&a, &b| config.spacing_close(a, b))
}

/// Pad `coords` along `axis` with `halosize` wrapped samples offset by `shift`.
///
/// `shift` holds one value per lane (the array with `axis` removed).
pub fn pad_shifted(
    coords: &ArrayViewD<'_, f32>,
    axis: Axis,
    halosize: usize,
    shift: &ArrayD<f32>,
) -> Result<ArrayD<f32>> {
    let n = coords.len_of(axis);
    let shift = shift.view().insert_axis(axis);

    let mut head = coords.slice_axis(axis, Slice::from(n - halosize..)).to_owned();
    head -= &shift;
    let mut tail = coords.slice_axis(axis, Slice::from(..halosize)).to_owned();
    tail += &shift;

    Ok(concatenate(axis, &[head.view(), coords.view(), tail.view()])?)
}

/// Pad `values` along `axis` with `halosize` plainly wrapped samples.
pub fn pad_wrapped<A: Clone>(
    values: &ArrayViewD<'_, A>,
    axis: Axis,
    halosize: usize,
) -> Result<Array<A, ndarray::IxDyn>> {
    let n = values.len_of(axis);
    if halosize > n {
        return Err(GridError::invalid_halo(format!(
            "halosize {} exceeds axis length {}",
            halosize, n
        )));
    }
    let head = values.slice_axis(axis, Slice::from(n - halosize..));
    let tail = values.slice_axis(axis, Slice::from(..halosize));
    Ok(concatenate(axis, &[head, values.view(), tail])?)
}

/// Pad a coordinate axis, warning when the two edge spacings disagree.
pub fn extend_coordinate(
    coords: &ArrayViewD<'_, f32>,
    axis: Axis,
    halosize: usize,
    direction: HaloDirection,
    config: &GridConfig,
) -> Result<ArrayD<f32>> {
    check_halo(coords.len_of(axis), halosize, direction)?;

    if !uniform_edge_spacing(coords, axis, config) {
        match direction {
            HaloDirection::Zonal => crate::warn_once!(
                "The zonal halo is located at the east and west of the current grid, \
                 with a dx equal to the first longitude step between the last nodes of \
                 the original grid and the first ones of the halo, but the first and last \
                 longitude steps differ. Is the halo computed as you expect?"
            ),
            HaloDirection::Meridional => crate::warn_once!(
                "The meridional halo is located at the north and south of the current grid, \
                 with a dy equal to the first latitude step between the last nodes of \
                 the original grid and the first ones of the halo, but the first and last \
                 latitude steps differ. Is the halo computed as you expect?"
            ),
        }
    }

    let shift = edge_shift(coords, axis);
    pad_shifted(coords, axis, halosize, &shift)
}
