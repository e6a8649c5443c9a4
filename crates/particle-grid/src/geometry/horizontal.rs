//! Horizontal layouts: separable 1-D axes or 2-D coordinate fields.

use ndarray::{s, ArcArray1, ArcArray2, ArcArray, Array1, ArrayD, ArrayView1, ArrayViewD, Axis, Ix1, Ix2, IxDyn};

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::halo::{self, HaloDirection};
use crate::types::BoundingBox;

/// Shared contract of the horizontal layouts.
pub trait HorizontalLayout {
    /// Number of points along x (longitude).
    fn xdim(&self) -> usize;

    /// Number of points along y (latitude).
    fn ydim(&self) -> usize;

    fn lon(&self) -> ArrayViewD<'_, f32>;

    fn lat(&self) -> ArrayViewD<'_, f32>;

    /// Shared handle on the longitude buffer (no copy).
    fn shared_lon(&self) -> ArcArray<f32, IxDyn>;

    /// Shared handle on the latitude buffer (no copy).
    fn shared_lat(&self) -> ArcArray<f32, IxDyn>;

    /// Whether latitude was reversed to ascending order at construction.
    fn lat_flipped(&self) -> bool {
        false
    }

    /// Longitudes along the first row, west to east.
    fn zonal_row(&self) -> ArrayView1<'_, f32>;

    fn extend_zonal(&mut self, halosize: usize, config: &GridConfig) -> Result<()>;

    fn extend_meridional(&mut self, halosize: usize, config: &GridConfig) -> Result<()>;

    /// Apply `f` to every longitude.
    fn map_lon(&mut self, f: &dyn Fn(f32) -> f32);

    /// Bounding box of the coordinates, NaNs ignored.
    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_coords(self.lon().iter(), self.lat().iter())
    }
}

/// Independent 1-D longitude and latitude axes.
#[derive(Debug, Clone)]
pub struct Rectilinear {
    lon: ArcArray1<f32>,
    lat: ArcArray1<f32>,
    lat_flipped: bool,
}

impl Rectilinear {
    /// Validate the axes; descending latitude is reversed with a warning.
    pub fn new(lon: ArrayD<f32>, lat: ArrayD<f32>) -> Result<Self> {
        let lon = as_vector(lon, "lon")?;
        let mut lat = as_vector(lat, "lat")?;

        let mut lat_flipped = false;
        if lat.len() > 1 && lat[lat.len() - 1] < lat[0] {
            lat = lat.slice(s![..;-1]).to_owned();
            lat_flipped = true;
            crate::warn_once!(
                "Flipping lat data from North-South to South-North. Note that this may \
                 lead to wrong sign for meridional velocity, so tread very carefully"
            );
        }

        Ok(Self {
            lon: lon.into_shared(),
            lat: lat.into_shared(),
            lat_flipped,
        })
    }

    pub fn lon_axis(&self) -> ArrayView1<'_, f32> {
        self.lon.view()
    }

    pub fn lat_axis(&self) -> ArrayView1<'_, f32> {
        self.lat.view()
    }
}

impl HorizontalLayout for Rectilinear {
    fn xdim(&self) -> usize {
        self.lon.len()
    }

    fn ydim(&self) -> usize {
        self.lat.len()
    }

    fn lon(&self) -> ArrayViewD<'_, f32> {
        self.lon.view().into_dyn()
    }

    fn lat(&self) -> ArrayViewD<'_, f32> {
        self.lat.view().into_dyn()
    }

    fn shared_lon(&self) -> ArcArray<f32, IxDyn> {
        self.lon.clone().into_dyn()
    }

    fn shared_lat(&self) -> ArcArray<f32, IxDyn> {
        self.lat.clone().into_dyn()
    }

    fn lat_flipped(&self) -> bool {
        self.lat_flipped
    }

    fn zonal_row(&self) -> ArrayView1<'_, f32> {
        self.lon.view()
    }

    fn extend_zonal(&mut self, halosize: usize, config: &GridConfig) -> Result<()> {
        let padded =
            halo::extend_coordinate(&self.lon(), Axis(0), halosize, HaloDirection::Zonal, config)?;
        self.lon = padded.into_dimensionality::<Ix1>()?.into_shared();
        Ok(())
    }

    fn extend_meridional(&mut self, halosize: usize, config: &GridConfig) -> Result<()> {
        let padded = halo::extend_coordinate(
            &self.lat(),
            Axis(0),
            halosize,
            HaloDirection::Meridional,
            config,
        )?;
        self.lat = padded.into_dimensionality::<Ix1>()?.into_shared();
        Ok(())
    }

    fn map_lon(&mut self, f: &dyn Fn(f32) -> f32) {
        self.lon.mapv_inplace(f);
    }
}

/// 2-D longitude and latitude fields indexed `[y, x]`.
#[derive(Debug, Clone)]
pub struct Curvilinear {
    lon: ArcArray2<f32>,
    lat: ArcArray2<f32>,
}

impl Curvilinear {
    /// Validate the coordinate fields after dropping length-1 axes.
    pub fn new(lon: ArrayD<f32>, lat: ArrayD<f32>) -> Result<Self> {
        let lon = as_matrix(squeeze(lon), "lon")?;
        let lat = as_matrix(squeeze(lat), "lat")?;

        if lon.shape() != lat.shape() {
            return Err(GridError::shape_mismatch(
                "lat",
                format!("{:?} (the shape of lon)", lon.shape()),
                lat.shape(),
            ));
        }

        Ok(Self {
            lon: lon.into_shared(),
            lat: lat.into_shared(),
        })
    }
}

impl HorizontalLayout for Curvilinear {
    fn xdim(&self) -> usize {
        self.lon.ncols()
    }

    fn ydim(&self) -> usize {
        self.lon.nrows()
    }

    fn lon(&self) -> ArrayViewD<'_, f32> {
        self.lon.view().into_dyn()
    }

    fn lat(&self) -> ArrayViewD<'_, f32> {
        self.lat.view().into_dyn()
    }

    fn shared_lon(&self) -> ArcArray<f32, IxDyn> {
        self.lon.clone().into_dyn()
    }

    fn shared_lat(&self) -> ArcArray<f32, IxDyn> {
        self.lat.clone().into_dyn()
    }

    fn zonal_row(&self) -> ArrayView1<'_, f32> {
        self.lon.row(0)
    }

    fn extend_zonal(&mut self, halosize: usize, config: &GridConfig) -> Result<()> {
        let lon =
            halo::extend_coordinate(&self.lon(), Axis(1), halosize, HaloDirection::Zonal, config)?;
        let lat = halo::pad_wrapped(&self.lat(), Axis(1), halosize)?;
        self.lon = lon.into_dimensionality::<Ix2>()?.into_shared();
        self.lat = lat.into_dimensionality::<Ix2>()?.into_shared();
        Ok(())
    }

    fn extend_meridional(&mut self, halosize: usize, config: &GridConfig) -> Result<()> {
        let lat = halo::extend_coordinate(
            &self.lat(),
            Axis(0),
            halosize,
            HaloDirection::Meridional,
            config,
        )?;
        let lon = halo::pad_wrapped(&self.lon(), Axis(0), halosize)?;
        self.lon = lon.into_dimensionality::<Ix2>()?.into_shared();
        self.lat = lat.into_dimensionality::<Ix2>()?.into_shared();
        Ok(())
    }

    fn map_lon(&mut self, f: &dyn Fn(f32) -> f32) {
        self.lon.mapv_inplace(f);
    }
}

fn as_vector(values: ArrayD<f32>, what: &str) -> Result<Array1<f32>> {
    let vector = match values.ndim() {
        0 => values.iter().copied().collect::<Array1<f32>>(),
        1 => values.into_dimensionality::<Ix1>()?,
        _ => {
            return Err(GridError::shape_mismatch(
                what,
                "a vector for a rectilinear grid",
                values.shape(),
            ))
        }
    };
    if vector.is_empty() {
        return Err(GridError::validation(format!("{} is empty", what)));
    }
    Ok(vector)
}

fn as_matrix(values: ArrayD<f32>, what: &str) -> Result<ndarray::Array2<f32>> {
    if values.ndim() != 2 {
        return Err(GridError::shape_mismatch(
            what,
            "a 2-D array for a curvilinear grid",
            values.shape(),
        ));
    }
    Ok(values.into_dimensionality::<Ix2>()?)
}

/// Drop every length-1 axis.
fn squeeze(mut values: ArrayD<f32>) -> ArrayD<f32> {
    while let Some(axis) = values.shape().iter().position(|&n| n == 1) {
        values = values.index_axis_move(Axis(axis), 0);
    }
    values
}
