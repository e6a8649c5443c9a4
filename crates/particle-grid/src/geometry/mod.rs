//! Grid geometry: a horizontal layout paired with a vertical coordinate.
//!
//! The four combinations form a closed set, each with a fixed kernel code:
//!
//! | variant        | lon / lat      | depth                       |
//! |----------------|----------------|-----------------------------|
//! | `RectilinearZ` | `[x]` / `[y]`  | `[z]`                       |
//! | `RectilinearS` | `[x]` / `[y]`  | `[z, y, x]` or `[t, z, y, x]` |
//! | `CurvilinearZ` | `[y, x]`       | `[z]`                       |
//! | `CurvilinearS` | `[y, x]`       | `[z, y, x]` or `[t, z, y, x]` |

mod horizontal;
mod vertical;

pub use horizontal::{Curvilinear, HorizontalLayout, Rectilinear};
pub use vertical::{SLevels, VerticalCoordinate, ZLevels};

use ndarray::ArrayD;

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::halo::{check_halo, HaloDirection};
use crate::types::GridType;

/// One of the four supported geometries.
#[derive(Debug, Clone)]
pub enum GridGeometry {
    RectilinearZ(Rectilinear, ZLevels),
    RectilinearS(Rectilinear, SLevels),
    CurvilinearZ(Curvilinear, ZLevels),
    CurvilinearS(Curvilinear, SLevels),
}

impl GridGeometry {
    /// Select and validate the geometry from the array ranks.
    ///
    /// Longitude of rank 0 or 1 gives a rectilinear layout, anything else a
    /// curvilinear one. Depth absent or of rank 0 or 1 gives z-levels, rank 3
    /// or 4 gives s-levels.
    pub fn new(
        lon: ArrayD<f32>,
        lat: ArrayD<f32>,
        depth: Option<ArrayD<f32>>,
        tdim: usize,
    ) -> Result<Self> {
        let s_levels = match depth.as_ref().map(|d| d.ndim()) {
            None | Some(0) | Some(1) => false,
            Some(3) | Some(4) => true,
            Some(_) => {
                let shape = depth.as_ref().map(|d| d.shape().to_vec()).unwrap_or_default();
                return Err(GridError::shape_mismatch(
                    "depth",
                    "a vector, [zdim, ydim, xdim] or [tdim, zdim, ydim, xdim]",
                    &shape,
                ));
            }
        };

        if lon.ndim() <= 1 {
            let horizontal = Rectilinear::new(lon, lat)?;
            match depth {
                Some(depth) if s_levels => {
                    let vertical = SLevels::new(
                        depth,
                        horizontal.xdim(),
                        horizontal.ydim(),
                        tdim,
                        horizontal.lat_flipped(),
                    )?;
                    Ok(Self::RectilinearS(horizontal, vertical))
                }
                depth => Ok(Self::RectilinearZ(horizontal, ZLevels::new(depth)?)),
            }
        } else {
            let horizontal = Curvilinear::new(lon, lat)?;
            match depth {
                Some(depth) if s_levels => {
                    let vertical =
                        SLevels::new(depth, horizontal.xdim(), horizontal.ydim(), tdim, false)?;
                    Ok(Self::CurvilinearS(horizontal, vertical))
                }
                depth => Ok(Self::CurvilinearZ(horizontal, ZLevels::new(depth)?)),
            }
        }
    }

    pub fn grid_type(&self) -> GridType {
        match self {
            Self::RectilinearZ(..) => GridType::RectilinearZ,
            Self::RectilinearS(..) => GridType::RectilinearS,
            Self::CurvilinearZ(..) => GridType::CurvilinearZ,
            Self::CurvilinearS(..) => GridType::CurvilinearS,
        }
    }

    pub fn horizontal(&self) -> &dyn HorizontalLayout {
        match self {
            Self::RectilinearZ(h, _) | Self::RectilinearS(h, _) => h,
            Self::CurvilinearZ(h, _) | Self::CurvilinearS(h, _) => h,
        }
    }

    pub fn horizontal_mut(&mut self) -> &mut dyn HorizontalLayout {
        match self {
            Self::RectilinearZ(h, _) | Self::RectilinearS(h, _) => h,
            Self::CurvilinearZ(h, _) | Self::CurvilinearS(h, _) => h,
        }
    }

    pub fn vertical(&self) -> &dyn VerticalCoordinate {
        match self {
            Self::RectilinearZ(_, v) | Self::CurvilinearZ(_, v) => v,
            Self::RectilinearS(_, v) | Self::CurvilinearS(_, v) => v,
        }
    }

    fn parts_mut(&mut self) -> (&mut dyn HorizontalLayout, &mut dyn VerticalCoordinate) {
        match self {
            Self::RectilinearZ(h, v) => (h, v),
            Self::RectilinearS(h, v) => (h, v),
            Self::CurvilinearZ(h, v) => (h, v),
            Self::CurvilinearS(h, v) => (h, v),
        }
    }

    /// Pad the geometry with a periodic halo in the requested directions.
    ///
    /// Every check runs before any array is replaced, so a failed call leaves
    /// the geometry untouched.
    pub fn extend_halo(
        &mut self,
        zonal: bool,
        meridional: bool,
        halosize: usize,
        config: &GridConfig,
    ) -> Result<()> {
        let horizontal = self.horizontal();
        if zonal {
            check_halo(horizontal.xdim(), halosize, HaloDirection::Zonal)?;
        }
        if meridional {
            check_halo(horizontal.ydim(), halosize, HaloDirection::Meridional)?;
        }

        let mut extended = self.clone();
        {
            let (horizontal, vertical) = extended.parts_mut();
            if zonal {
                horizontal.extend_zonal(halosize, config)?;
            }
            if meridional {
                horizontal.extend_meridional(halosize, config)?;
            }
            let (xdim, ydim) = (horizontal.xdim(), horizontal.ydim());
            vertical.extend_halo(zonal, meridional, halosize, xdim, ydim)?;
        }

        *self = extended;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Array3};

    #[test]
    fn test_variant_selection() {
        let lon = array![0.0f32, 1.0, 2.0].into_dyn();
        let lat = array![0.0f32, 1.0].into_dyn();

        let g = GridGeometry::new(lon.clone(), lat.clone(), None, 1).unwrap();
        assert_eq!(g.grid_type(), GridType::RectilinearZ);

        let depth = Array3::<f32>::zeros((4, 2, 3)).into_dyn();
        let g = GridGeometry::new(lon.clone(), lat.clone(), Some(depth), 1).unwrap();
        assert_eq!(g.grid_type(), GridType::RectilinearS);
        assert_eq!(g.vertical().zdim(), 4);

        let lon2 = Array2::from_shape_fn((2, 3), |(_, x)| x as f32).into_dyn();
        let lat2 = Array2::from_shape_fn((2, 3), |(y, _)| y as f32).into_dyn();
        let g = GridGeometry::new(lon2.clone(), lat2.clone(), None, 1).unwrap();
        assert_eq!(g.grid_type(), GridType::CurvilinearZ);

        let depth = Array3::<f32>::zeros((4, 2, 3)).into_dyn();
        let g = GridGeometry::new(lon2, lat2, Some(depth), 1).unwrap();
        assert_eq!(g.grid_type(), GridType::CurvilinearS);
    }

    #[test]
    fn test_rank_two_depth_rejected() {
        let lon = array![0.0f32, 1.0].into_dyn();
        let lat = array![0.0f32, 1.0].into_dyn();
        let depth = Array2::<f32>::zeros((2, 2)).into_dyn();
        assert!(matches!(
            GridGeometry::new(lon, lat, Some(depth), 1),
            Err(GridError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_failed_halo_leaves_geometry_unchanged() {
        let lon = array![0.0f32, 1.0, 2.0].into_dyn();
        let lat = array![0.0f32].into_dyn();
        let mut g = GridGeometry::new(lon, lat, None, 1).unwrap();

        // single latitude row cannot be padded meridionally
        assert!(g.extend_halo(true, true, 1, &GridConfig::default()).is_err());
        assert_eq!(g.horizontal().xdim(), 3);

        g.extend_halo(true, false, 1, &GridConfig::default()).unwrap();
        assert_eq!(g.horizontal().xdim(), 5);
    }
}
