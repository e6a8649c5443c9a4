//! Grid construction from raw coordinate arrays.
//!
//! Inputs of any numeric element type are coerced once to the canonical
//! storage: `f32` coordinates and `f64` time, in standard (row-major)
//! layout. The geometry variant is chosen from the array ranks alone.
//!
//! # Example
//!
//! ```rust,ignore
//! use particle_grid::{GridBuilder, Mesh};
//!
//! let grid = GridBuilder::new(lon.view().into_dyn(), lat.view().into_dyn())?
//!     .time(time.view())?
//!     .mesh(Mesh::Spherical)
//!     .build()?;
//! ```

use ndarray::{ArrayD, ArrayView1, ArrayViewD};
use num_traits::AsPrimitive;

use crate::config::GridConfig;
use crate::error::Result;
use crate::geometry::GridGeometry;
use crate::grid::Grid;
use crate::time_origin::TimeOrigin;
use crate::time_window::TimeWindow;
use crate::types::Mesh;

/// Step-by-step grid construction.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    lon: ArrayD<f32>,
    lat: ArrayD<f32>,
    depth: Option<ArrayD<f32>>,
    time: Option<Vec<f64>>,
    time_origin: TimeOrigin,
    mesh: Mesh,
    config: GridConfig,
}

impl GridBuilder {
    /// Start from longitude and latitude arrays.
    pub fn new<A>(lon: ArrayViewD<'_, A>, lat: ArrayViewD<'_, A>) -> Result<Self>
    where
        A: AsPrimitive<f32>,
    {
        Ok(Self {
            lon: to_f32(lon)?,
            lat: to_f32(lat)?,
            depth: None,
            time: None,
            time_origin: TimeOrigin::default(),
            mesh: Mesh::default(),
            config: GridConfig::default(),
        })
    }

    /// Depth levels `[z]` or s-level field `[z, y, x]` / `[t, z, y, x]`.
    pub fn depth<A>(mut self, depth: ArrayViewD<'_, A>) -> Result<Self>
    where
        A: AsPrimitive<f32>,
    {
        self.depth = Some(to_f32(depth)?);
        Ok(self)
    }

    /// Full time axis in seconds relative to the time origin.
    pub fn time<T>(mut self, time: ArrayView1<'_, T>) -> Self
    where
        T: AsPrimitive<f64>,
    {
        self.time = Some(time.iter().map(|t| t.as_()).collect());
        self
    }

    pub fn time_origin(mut self, time_origin: TimeOrigin) -> Self {
        self.time_origin = time_origin;
        self
    }

    pub fn mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate everything and assemble the grid.
    pub fn build(self) -> Result<Grid> {
        self.config.validate()?;

        let window = TimeWindow::new(self.time.unwrap_or_else(|| vec![0.0]))?;
        let geometry =
            GridGeometry::new(self.lon, self.lat, self.depth, window.time_full().len())?;

        Grid::from_parts(geometry, window, self.time_origin, self.mesh, self.config)
    }
}

/// Build a grid, dispatching on the ranks of `lon` and `depth`.
///
/// `mesh` must be exactly `"spherical"` or `"flat"`. Absent time becomes a
/// single sample at 0, absent depth a single level at 0.
pub fn create_grid<A, T>(
    lon: ArrayViewD<'_, A>,
    lat: ArrayViewD<'_, A>,
    depth: Option<ArrayViewD<'_, A>>,
    time: Option<ArrayView1<'_, T>>,
    time_origin: TimeOrigin,
    mesh: &str,
) -> Result<Grid>
where
    A: AsPrimitive<f32>,
    T: AsPrimitive<f64>,
{
    let mesh: Mesh = mesh.parse()?;

    let mut builder = GridBuilder::new(lon, lat)?
        .time_origin(time_origin)
        .mesh(mesh);
    if let Some(depth) = depth {
        builder = builder.depth(depth)?;
    }
    if let Some(time) = time {
        builder = builder.time(time);
    }
    builder.build()
}

fn to_f32<A>(values: ArrayViewD<'_, A>) -> Result<ArrayD<f32>>
where
    A: AsPrimitive<f32>,
{
    let data: Vec<f32> = values.iter().map(|v| v.as_()).collect();
    Ok(ArrayD::from_shape_vec(values.raw_dim(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::types::GridType;
    use ndarray::{array, Array2};

    #[test]
    fn test_create_grid_coerces_types() {
        let lon = array![0i32, 1, 2];
        let lat = array![0i32, 1];
        let time = array![0i64, 3600, 7200];
        let grid = create_grid(
            lon.view().into_dyn(),
            lat.view().into_dyn(),
            None,
            Some(time.view()),
            TimeOrigin::default(),
            "flat",
        )
        .unwrap();

        assert_eq!(grid.grid_type(), GridType::RectilinearZ);
        assert_eq!(grid.time_full(), &[0.0, 3600.0, 7200.0]);
        assert_eq!(grid.depth().iter().copied().collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn test_fortran_order_is_standardized() {
        let lon = Array2::from_shape_fn((2, 3), |(_, x)| x as f64);
        let lat = Array2::from_shape_fn((2, 3), |(y, _)| y as f64);
        let lon_f = lon.t().to_owned().reversed_axes();
        let lat_f = lat.t().to_owned().reversed_axes();
        assert!(!lon_f.is_standard_layout());

        let grid = GridBuilder::new(lon_f.view().into_dyn(), lat_f.view().into_dyn())
            .unwrap()
            .build()
            .unwrap();
        assert!(grid.lon().is_standard_layout());
        assert_eq!(grid.lon().as_slice().unwrap(), &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
        assert_eq!(grid.grid_type(), GridType::CurvilinearZ);
    }

    #[test]
    fn test_default_time_axis() {
        let lon = array![0.0f32, 1.0];
        let grid = GridBuilder::new(lon.view().into_dyn(), lon.view().into_dyn())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(grid.time_full(), &[0.0]);
        assert_eq!(grid.tdim(), 1);
    }

    #[test]
    fn test_invalid_mesh_and_time() {
        let lon = array![0.0f32, 1.0];
        let err = create_grid::<f32, f64>(
            lon.view().into_dyn(),
            lon.view().into_dyn(),
            None,
            None,
            TimeOrigin::default(),
            "sphere",
        )
        .unwrap_err();
        assert_eq!(err, GridError::InvalidMesh("sphere".to_string()));

        let time = array![0.0f64, f64::NAN];
        let err = create_grid(
            lon.view().into_dyn(),
            lon.view().into_dyn(),
            None,
            Some(time.view()),
            TimeOrigin::default(),
            "flat",
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidTime(_)));
    }
}
