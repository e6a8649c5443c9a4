//! The grid aggregate: geometry, time window, chunk status and native view.

use ndarray::ArrayViewD;
use std::sync::Arc;

use crate::chunk::{ChunkLayout, ChunkStatusMap};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::geometry::GridGeometry;
use crate::native_view::{NativeView, NativeViewBuilder, ViewKey};
use crate::time_origin::TimeOrigin;
use crate::time_window::{FieldTiming, TimeWindow, UpdateStatus};
use crate::types::{BoundingBox, GridType, Mesh, VerticalKind};

/// A spatial and temporal grid on which fields are defined.
///
/// Construct with [`crate::GridBuilder`] or [`crate::create_grid`].
#[derive(Debug)]
pub struct Grid {
    geometry: GridGeometry,
    window: TimeWindow,
    time_origin: TimeOrigin,
    mesh: Mesh,
    config: GridConfig,
    zonal_periodic: bool,
    zonal_halo: usize,
    meridional_halo: usize,
    lonlat_minmax: BoundingBox,
    chunks: Arc<ChunkStatusMap>,
    generation: u64,
    views: NativeViewBuilder,
}

impl Grid {
    /// Assemble a grid from validated parts.
    pub fn from_parts(
        geometry: GridGeometry,
        window: TimeWindow,
        time_origin: TimeOrigin,
        mesh: Mesh,
        config: GridConfig,
    ) -> Result<Self> {
        config.validate()?;

        let lonlat_minmax = geometry.horizontal().bounds();
        tracing::debug!(
            gtype = %geometry.grid_type(),
            xdim = geometry.horizontal().xdim(),
            ydim = geometry.horizontal().ydim(),
            zdim = geometry.vertical().zdim(),
            ntime = window.time_full().len(),
            %mesh,
            "Created grid"
        );

        Ok(Self {
            geometry,
            window,
            time_origin,
            mesh,
            config,
            zonal_periodic: false,
            zonal_halo: 0,
            meridional_halo: 0,
            lonlat_minmax,
            chunks: Arc::new(ChunkStatusMap::default()),
            generation: 0,
            views: NativeViewBuilder::new(),
        })
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    pub fn grid_type(&self) -> GridType {
        self.geometry.grid_type()
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn lon(&self) -> ArrayViewD<'_, f32> {
        self.geometry.horizontal().lon()
    }

    pub fn lat(&self) -> ArrayViewD<'_, f32> {
        self.geometry.horizontal().lat()
    }

    pub fn depth(&self) -> ArrayViewD<'_, f32> {
        self.geometry.vertical().depth()
    }

    pub fn xdim(&self) -> usize {
        self.geometry.horizontal().xdim()
    }

    pub fn ydim(&self) -> usize {
        self.geometry.horizontal().ydim()
    }

    pub fn zdim(&self) -> usize {
        self.geometry.vertical().zdim()
    }

    /// Number of time samples currently exposed (2 once the window is active).
    pub fn tdim(&self) -> usize {
        self.window.tdim()
    }

    pub fn vertical_kind(&self) -> VerticalKind {
        self.geometry.vertical().kind()
    }

    pub fn mesh(&self) -> Mesh {
        self.mesh
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn lat_flipped(&self) -> bool {
        self.geometry.horizontal().lat_flipped()
    }

    pub fn zonal_periodic(&self) -> bool {
        self.zonal_periodic
    }

    pub fn zonal_halo(&self) -> usize {
        self.zonal_halo
    }

    pub fn meridional_halo(&self) -> usize {
        self.meridional_halo
    }

    pub fn lonlat_minmax(&self) -> BoundingBox {
        self.lonlat_minmax
    }

    /// Counter bumped by every structural mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.views.invalidate();
    }

    /// Pad the grid with a periodic halo of `halosize` points.
    ///
    /// Each direction may be extended once. Zonal extension marks the grid
    /// as zonally periodic.
    pub fn extend_halo(&mut self, zonal: bool, meridional: bool, halosize: usize) -> Result<()> {
        if zonal && self.zonal_halo > 0 {
            return Err(GridError::invalid_halo("zonal halo already extended"));
        }
        if meridional && self.meridional_halo > 0 {
            return Err(GridError::invalid_halo("meridional halo already extended"));
        }
        if !zonal && !meridional {
            return Ok(());
        }

        self.geometry
            .extend_halo(zonal, meridional, halosize, &self.config)?;

        if zonal {
            self.zonal_periodic = true;
            self.zonal_halo = halosize;
        }
        if meridional {
            self.meridional_halo = halosize;
        }
        self.lonlat_minmax = self.geometry.horizontal().bounds();
        self.touch();

        tracing::debug!(
            zonal,
            meridional,
            halosize,
            xdim = self.xdim(),
            ydim = self.ydim(),
            "Extended grid halo"
        );
        Ok(())
    }

    /// [`Grid::extend_halo`] with the configured default size.
    pub fn extend_default_halo(&mut self, zonal: bool, meridional: bool) -> Result<()> {
        self.extend_halo(zonal, meridional, self.config.default_halosize)
    }

    /// Detect whether a spherical grid already wraps around the globe.
    ///
    /// Sums the first-row longitude steps, each folded into [-180, 180].
    pub fn check_zonal_periodic(&mut self) -> bool {
        if self.zonal_periodic || !self.mesh.is_spherical() {
            return self.zonal_periodic;
        }
        let row = self.geometry.horizontal().zonal_row();
        if row.len() < 2 {
            return false;
        }

        let span: f64 = row
            .windows(2)
            .into_iter()
            .map(|w| {
                let dx = (w[1] - w[0]) as f64;
                if dx < -180.0 {
                    dx + 360.0
                } else if dx > 180.0 {
                    dx - 360.0
                } else {
                    dx
                }
            })
            .sum();

        if span > self.config.zonal_periodic_threshold {
            tracing::debug!(span, "Grid is zonally periodic");
            self.zonal_periodic = true;
            self.touch();
        }
        self.zonal_periodic
    }

    /// Apply `f` to every longitude, e.g. to move between [0, 360) and [-180, 180).
    pub fn remap_lon<F>(&mut self, f: F)
    where
        F: Fn(f32) -> f32,
    {
        self.geometry.horizontal_mut().map_lon(&f);
        self.lonlat_minmax = self.geometry.horizontal().bounds();
        self.touch();
    }

    // ========================================================================
    // Time
    // ========================================================================

    pub fn time_origin(&self) -> &TimeOrigin {
        &self.time_origin
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn time_full(&self) -> &[f64] {
        self.window.time_full()
    }

    /// Active window samples, or the full axis before the first step.
    pub fn time(&self) -> &[f64] {
        self.window.window()
    }

    pub fn ti(&self) -> Option<usize> {
        self.window.ti()
    }

    pub fn periods(&self) -> i32 {
        self.window.periods()
    }

    pub fn update_status(&self) -> UpdateStatus {
        self.window.status()
    }

    /// Move the time window to bracket `time`; returns the time at which
    /// the window stops being valid.
    pub fn compute_time_chunk<F>(&mut self, time: f64, signdt: f64, timing: &F) -> f64
    where
        F: FieldTiming + ?Sized,
    {
        self.window.compute_time_chunk(time, signdt, timing)
    }

    /// The field layer has consumed the last window change.
    pub fn acknowledge_update(&mut self) {
        self.window.acknowledge_update();
    }

    /// Force a full lookup on the next step.
    pub fn invalidate_window(&mut self) {
        self.window.invalidate();
    }

    // ========================================================================
    // Chunks
    // ========================================================================

    /// Split the data arrays into chunks of `chunk_shape`.
    ///
    /// A 2-element shape chunks `[ydim, xdim]`, a 3-element shape chunks
    /// `[zdim, ydim, xdim]`. All chunks start `NotLoaded`.
    pub fn configure_chunks(&mut self, chunk_shape: &[usize]) -> Result<()> {
        let dims = match chunk_shape.len() {
            2 => vec![self.ydim(), self.xdim()],
            3 => vec![self.zdim(), self.ydim(), self.xdim()],
            n => {
                return Err(GridError::validation(format!(
                    "chunk shape must have 2 or 3 dimensions, got {}",
                    n
                )))
            }
        };
        let layout = ChunkLayout::from_dims(&dims, chunk_shape)?;
        tracing::debug!(counts = ?layout.chunk_counts, "Configured grid chunks");
        self.chunks = Arc::new(ChunkStatusMap::new(layout));
        self.touch();
        Ok(())
    }

    /// Load-state bitmap, shared with the deferred loader.
    pub fn chunk_status(&self) -> &ChunkStatusMap {
        &self.chunks
    }

    pub fn shared_chunk_status(&self) -> Arc<ChunkStatusMap> {
        Arc::clone(&self.chunks)
    }

    // ========================================================================
    // Native view
    // ========================================================================

    fn view_key(&self) -> ViewKey {
        ViewKey {
            generation: self.generation,
            ti: self.window.ti(),
        }
    }

    /// Cached kernel view, rebuilt only when the grid or its window changed.
    pub fn build_view(&mut self) -> Arc<NativeView> {
        match self.views.current(self.view_key()) {
            Some(view) => view,
            None => self.rebuild_view(),
        }
    }

    /// Capture a fresh kernel view regardless of the cache.
    pub fn rebuild_view(&mut self) -> Arc<NativeView> {
        let horizontal = self.geometry.horizontal();
        let vertical = self.geometry.vertical();
        let time_full = self.window.time_full();

        let view = Arc::new(NativeView {
            key: self.view_key(),
            gtype: self.grid_type(),
            xdim: horizontal.xdim(),
            ydim: horizontal.ydim(),
            zdim: vertical.zdim(),
            tdim: self.window.tdim(),
            vertical: vertical.kind(),
            mesh_spherical: self.mesh.is_spherical(),
            zonal_periodic: self.zonal_periodic,
            chunk_info: self.chunks.layout().chunk_info(),
            chunk_status: Arc::clone(&self.chunks),
            tfull_min: time_full[0],
            tfull_max: time_full[time_full.len() - 1],
            periods: self.window.shared_periods(),
            lonlat_minmax: self.lonlat_minmax.to_minmax(),
            lon: horizontal.shared_lon(),
            lat: horizontal.shared_lat(),
            depth: vertical.shared_depth(),
            time: Arc::from(self.window.window()),
        });

        self.views.store(Arc::clone(&view));
        view
    }

    /// Number of views built over the grid's lifetime.
    pub fn view_builds(&self) -> u64 {
        self.views.builds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_window::TimePolicy;
    use ndarray::array;

    fn grid(mesh: Mesh, lon: Vec<f32>) -> Grid {
        let geometry = GridGeometry::new(
            ndarray::Array1::from(lon).into_dyn(),
            array![-10.0f32, 0.0, 10.0].into_dyn(),
            None,
            5,
        )
        .unwrap();
        let window = TimeWindow::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        Grid::from_parts(geometry, window, TimeOrigin::default(), mesh, GridConfig::default())
            .unwrap()
    }

    #[test]
    fn test_halo_once_per_direction() {
        let mut g = grid(Mesh::Spherical, vec![0.0, 90.0, 180.0, 270.0]);
        g.extend_halo(true, false, 2).unwrap();
        assert_eq!(g.xdim(), 8);
        assert!(g.zonal_periodic());
        assert_eq!(g.zonal_halo(), 2);
        assert_eq!(g.lonlat_minmax().to_minmax(), [-180.0, 450.0, -10.0, 10.0]);

        assert!(matches!(
            g.extend_halo(true, false, 1),
            Err(GridError::InvalidHalo(_))
        ));
        g.extend_halo(false, true, 1).unwrap();
        assert_eq!(g.ydim(), 5);
        assert_eq!(g.generation(), 2);
    }

    #[test]
    fn test_check_zonal_periodic() {
        let mut g = grid(Mesh::Spherical, (0..360).map(|x| x as f32).collect());
        assert!(!g.check_zonal_periodic());

        // steps across the dateline fold back into [-180, 180]
        let lon: Vec<f32> = (0..360).map(|x| ((x + 180) % 360) as f32 - 180.0).collect();
        let mut g = grid(Mesh::Spherical, lon);
        assert!(!g.check_zonal_periodic());

        let lon: Vec<f32> = (0..=360).map(|x| x as f32).collect();
        let mut g = grid(Mesh::Spherical, lon.clone());
        assert!(g.check_zonal_periodic());
        assert_eq!(g.generation(), 1);

        let mut flat = grid(Mesh::Flat, lon);
        assert!(!flat.check_zonal_periodic());
    }

    #[test]
    fn test_remap_lon() {
        let mut g = grid(Mesh::Spherical, vec![0.0, 120.0, 240.0]);
        g.remap_lon(|x| if x >= 180.0 { x - 360.0 } else { x });
        assert_eq!(g.lon().iter().copied().collect::<Vec<_>>(), vec![0.0, 120.0, -120.0]);
        assert_eq!(g.lonlat_minmax().min_lon, -120.0);
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn test_configure_chunks() {
        let mut g = grid(Mesh::Flat, vec![0.0, 1.0, 2.0, 3.0]);
        g.configure_chunks(&[2, 2]).unwrap();
        assert_eq!(g.chunk_status().len(), 4);
        assert_eq!(g.chunk_status().layout().chunk_info(), vec![2, 2, 2, 2, 2]);
        assert!(g.configure_chunks(&[4]).is_err());
    }

    #[test]
    fn test_view_cache_follows_generation_and_window() {
        let mut g = grid(Mesh::Flat, vec![0.0, 1.0, 2.0]);
        let policy = TimePolicy::default();

        let first = g.build_view();
        assert_eq!(first.dims(), (3, 3, 1, 5));
        let again = g.build_view();
        assert!(Arc::ptr_eq(&first, &again));

        g.compute_time_chunk(0.5, 1.0, &policy);
        let stepped = g.build_view();
        assert!(!Arc::ptr_eq(&first, &stepped));
        assert_eq!(stepped.time(), &[0.0, 1.0]);
        assert_eq!(stepped.tdim, 2);

        g.extend_halo(true, false, 1).unwrap();
        let extended = g.build_view();
        assert_eq!(extended.dims().0, 5);
        assert_eq!(first.dims().0, 3);

        let forced = g.rebuild_view();
        assert!(!Arc::ptr_eq(&extended, &forced));
        assert_eq!(g.view_builds(), 4);
    }
}
