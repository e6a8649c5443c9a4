//! Vertical coordinates: fixed z-levels or terrain-following s-levels.

use ndarray::{arr1, ArcArray, ArcArray1, ArrayD, ArrayViewD, Axis, Ix1, IxDyn};

use crate::error::{GridError, Result};
use crate::halo;
use crate::types::VerticalKind;

/// Shared contract of the vertical coordinates.
pub trait VerticalCoordinate {
    /// Number of vertical levels.
    fn zdim(&self) -> usize;

    fn kind(&self) -> VerticalKind;

    fn depth(&self) -> ArrayViewD<'_, f32>;

    /// Shared handle on the depth buffer (no copy).
    fn shared_depth(&self) -> ArcArray<f32, IxDyn>;

    /// Wrap depth to follow a horizontal halo of `halosize` points.
    ///
    /// `xdim` and `ydim` are the horizontal extents after the halo.
    fn extend_halo(
        &mut self,
        zonal: bool,
        meridional: bool,
        halosize: usize,
        xdim: usize,
        ydim: usize,
    ) -> Result<()>;
}

/// Position-independent depth levels.
#[derive(Debug, Clone)]
pub struct ZLevels {
    depth: ArcArray1<f32>,
}

impl ZLevels {
    /// Build from an optional depth vector; a single surface level when absent.
    pub fn new(depth: Option<ArrayD<f32>>) -> Result<Self> {
        let depth = match depth {
            None => arr1(&[0.0f32]),
            Some(d) if d.ndim() == 0 => d.iter().copied().collect(),
            Some(d) if d.ndim() == 1 => d.into_dimensionality::<Ix1>()?,
            Some(d) => {
                return Err(GridError::shape_mismatch(
                    "depth",
                    "a vector for z-levels",
                    d.shape(),
                ))
            }
        };
        if depth.is_empty() {
            return Err(GridError::validation("depth is empty"));
        }
        Ok(Self {
            depth: depth.into_shared(),
        })
    }
}

impl VerticalCoordinate for ZLevels {
    fn zdim(&self) -> usize {
        self.depth.len()
    }

    fn kind(&self) -> VerticalKind {
        VerticalKind::Z
    }

    fn depth(&self) -> ArrayViewD<'_, f32> {
        self.depth.view().into_dyn()
    }

    fn shared_depth(&self) -> ArcArray<f32, IxDyn> {
        self.depth.clone().into_dyn()
    }

    fn extend_halo(&mut self, _: bool, _: bool, _: usize, _: usize, _: usize) -> Result<()> {
        // z-levels do not depend on horizontal position
        Ok(())
    }
}

/// Depth field `[z, y, x]` or `[t, z, y, x]`.
#[derive(Debug, Clone)]
pub struct SLevels {
    depth: ArcArray<f32, IxDyn>,
}

impl SLevels {
    /// Validate the depth field against the horizontal extents and the time
    /// dimension. Rows are reversed when the latitude axis was flipped.
    pub fn new(
        depth: ArrayD<f32>,
        xdim: usize,
        ydim: usize,
        tdim: usize,
        lat_flipped: bool,
    ) -> Result<Self> {
        let ndim = depth.ndim();
        if ndim != 3 && ndim != 4 {
            return Err(GridError::shape_mismatch(
                "depth",
                "[zdim, ydim, xdim] or [tdim, zdim, ydim, xdim] for s-levels",
                depth.shape(),
            ));
        }

        let shape = depth.shape();
        if shape[ndim - 1] != xdim || shape[ndim - 2] != ydim {
            return Err(GridError::shape_mismatch(
                "depth",
                format!("trailing dimensions [ydim, xdim] = [{}, {}]", ydim, xdim),
                shape,
            ));
        }
        if ndim == 4 && shape[0] != tdim {
            return Err(GridError::shape_mismatch(
                "depth",
                format!("leading dimension equal to tdim = {}", tdim),
                shape,
            ));
        }
        if shape[ndim - 3] == 0 {
            return Err(GridError::validation("depth has no vertical levels"));
        }

        let depth = if lat_flipped {
            let mut flipped = depth;
            flipped.invert_axis(Axis(ndim - 2));
            flipped.as_standard_layout().into_owned()
        } else {
            depth
        };

        Ok(Self {
            depth: depth.into_shared(),
        })
    }
}

impl VerticalCoordinate for SLevels {
    fn zdim(&self) -> usize {
        let ndim = self.depth.ndim();
        self.depth.shape()[ndim - 3]
    }

    fn kind(&self) -> VerticalKind {
        if self.depth.ndim() == 4 {
            VerticalKind::S4d
        } else {
            VerticalKind::S3d
        }
    }

    fn depth(&self) -> ArrayViewD<'_, f32> {
        self.depth.view()
    }

    fn shared_depth(&self) -> ArcArray<f32, IxDyn> {
        self.depth.clone()
    }

    fn extend_halo(
        &mut self,
        zonal: bool,
        meridional: bool,
        halosize: usize,
        xdim: usize,
        ydim: usize,
    ) -> Result<()> {
        let ndim = self.depth.ndim();
        let mut depth = self.depth.to_owned();
        if zonal {
            depth = halo::pad_wrapped(&depth.view(), Axis(ndim - 1), halosize)?;
        }
        if meridional {
            depth = halo::pad_wrapped(&depth.view(), Axis(ndim - 2), halosize)?;
        }

        let shape = depth.shape();
        if shape[ndim - 1] != xdim || shape[ndim - 2] != ydim {
            return Err(GridError::shape_mismatch(
                "depth",
                format!("[.., {}, {}] after halo", ydim, xdim),
                shape,
            ));
        }

        self.depth = depth.into_shared();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3, Array4};

    fn s_depth(z: usize, y: usize, x: usize) -> ArrayD<f32> {
        Array3::from_shape_fn((z, y, x), |(k, j, i)| (k * 100 + j * 10 + i) as f32).into_dyn()
    }

    #[test]
    fn test_default_z_level() {
        let z = ZLevels::new(None).unwrap();
        assert_eq!(z.zdim(), 1);
        assert_eq!(z.kind(), VerticalKind::Z);
        assert_eq!(z.depth().iter().copied().collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn test_z_levels_reject_field() {
        let depth = Array3::<f32>::zeros((2, 2, 2)).into_dyn();
        assert!(ZLevels::new(Some(depth)).is_err());
        assert!(ZLevels::new(Some(array![1.0f32, 2.0].into_dyn())).is_ok());
    }

    #[test]
    fn test_s_levels_shape_checks() {
        assert!(SLevels::new(s_depth(3, 4, 5), 5, 4, 1, false).is_ok());
        assert!(matches!(
            SLevels::new(s_depth(3, 4, 5), 4, 5, 1, false),
            Err(GridError::ShapeMismatch { .. })
        ));
        let flat = ndarray::Array2::<f32>::zeros((4, 5)).into_dyn();
        assert!(SLevels::new(flat, 5, 4, 1, false).is_err());
    }

    #[test]
    fn test_s_levels_4d_tdim() {
        let depth = Array4::<f32>::zeros((2, 3, 4, 5)).into_dyn();
        let levels = SLevels::new(depth.clone(), 5, 4, 2, false).unwrap();
        assert_eq!(levels.kind(), VerticalKind::S4d);
        assert_eq!(levels.zdim(), 3);
        assert!(SLevels::new(depth, 5, 4, 3, false).is_err());
    }

    #[test]
    fn test_s_levels_lat_flip() {
        let levels = SLevels::new(s_depth(3, 4, 5), 5, 4, 1, true).unwrap();
        let depth = levels.depth();
        // row j now holds the original row 3 - j
        assert_eq!(depth[[0, 0, 0]], 30.0);
        assert_eq!(depth[[2, 3, 4]], 204.0);
        assert_eq!(depth[[1, 1, 2]], 122.0);
    }

    #[test]
    fn test_s_levels_halo_wrap() {
        let mut levels = SLevels::new(s_depth(2, 3, 4), 4, 3, 1, false).unwrap();
        levels.extend_halo(true, false, 1, 6, 3).unwrap();
        let depth = levels.depth();
        assert_eq!(depth.shape(), &[2, 3, 6]);
        assert_eq!(depth[[0, 0, 0]], 3.0);
        assert_eq!(depth[[0, 0, 5]], 0.0);

        // horizontal extents that do not match the padded field
        let mut levels = SLevels::new(s_depth(2, 3, 4), 4, 3, 1, false).unwrap();
        assert!(levels.extend_halo(false, true, 1, 4, 4).is_err());
    }
}
