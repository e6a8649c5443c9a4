//! Flattened, read-only grid snapshots for the compiled interpolation kernel.
//!
//! A [`NativeView`] holds shared handles on the coordinate buffers of a grid
//! as they were when the view was built. Views are cached by
//! [`NativeViewBuilder`] under a [`ViewKey`]: the grid's structural
//! generation plus the position of its time window. Any structural mutation
//! bumps the generation, so a stale view is never handed out.
//!
//! # Example
//!
//! ```rust,ignore
//! let view = grid.build_view();
//! let raw = view.raw();
//! let handle = RawGridHandle::new(view.grid_type(), &raw);
//! unsafe { kernel(&handle) };
//! ```

use ndarray::{ArcArray, IxDyn};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use crate::chunk::ChunkStatusMap;
use crate::types::{GridType, VerticalKind};

/// Identifies the grid state a view was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewKey {
    /// Structural generation of the grid.
    pub generation: u64,
    /// Lower index of the time window, `None` while inactive.
    pub ti: Option<usize>,
}

/// Immutable snapshot of everything the kernel reads from a grid.
#[derive(Debug)]
pub struct NativeView {
    pub(crate) key: ViewKey,
    pub(crate) gtype: GridType,
    pub(crate) xdim: usize,
    pub(crate) ydim: usize,
    pub(crate) zdim: usize,
    pub(crate) tdim: usize,
    pub(crate) vertical: VerticalKind,
    pub(crate) mesh_spherical: bool,
    pub(crate) zonal_periodic: bool,
    pub(crate) chunk_info: Vec<i32>,
    pub(crate) chunk_status: Arc<ChunkStatusMap>,
    pub(crate) tfull_min: f64,
    pub(crate) tfull_max: f64,
    pub(crate) periods: Arc<AtomicI32>,
    pub(crate) lonlat_minmax: [f32; 4],
    pub(crate) lon: ArcArray<f32, IxDyn>,
    pub(crate) lat: ArcArray<f32, IxDyn>,
    pub(crate) depth: ArcArray<f32, IxDyn>,
    pub(crate) time: Arc<[f64]>,
}

impl NativeView {
    pub fn key(&self) -> ViewKey {
        self.key
    }

    pub fn generation(&self) -> u64 {
        self.key.generation
    }

    pub fn grid_type(&self) -> GridType {
        self.gtype
    }

    /// `(xdim, ydim, zdim, tdim)`.
    pub fn dims(&self) -> (usize, usize, usize, usize) {
        (self.xdim, self.ydim, self.zdim, self.tdim)
    }

    pub fn vertical_kind(&self) -> VerticalKind {
        self.vertical
    }

    pub fn mesh_spherical(&self) -> bool {
        self.mesh_spherical
    }

    pub fn zonal_periodic(&self) -> bool {
        self.zonal_periodic
    }

    pub fn chunk_info(&self) -> &[i32] {
        &self.chunk_info
    }

    pub fn chunk_status(&self) -> &ChunkStatusMap {
        &self.chunk_status
    }

    /// First and last sample of the full time axis.
    pub fn tfull_range(&self) -> (f64, f64) {
        (self.tfull_min, self.tfull_max)
    }

    /// Current cycle count; tracks the grid live.
    pub fn periods(&self) -> i32 {
        self.periods.load(Ordering::Relaxed)
    }

    /// `[min_lon, max_lon, min_lat, max_lat]`.
    pub fn lonlat_minmax(&self) -> [f32; 4] {
        self.lonlat_minmax
    }

    pub fn lon(&self) -> &ArcArray<f32, IxDyn> {
        &self.lon
    }

    pub fn lat(&self) -> &ArcArray<f32, IxDyn> {
        &self.lat
    }

    pub fn depth(&self) -> &ArcArray<f32, IxDyn> {
        &self.depth
    }

    /// Time samples exposed to the kernel (the active window).
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// C-layout record of this view. Pointers stay valid while `self` lives.
    pub fn raw(&self) -> RawGridView<'_> {
        RawGridView {
            xdim: to_c_int(self.xdim),
            ydim: to_c_int(self.ydim),
            zdim: to_c_int(self.zdim),
            tdim: to_c_int(self.tdim),
            z4d: self.vertical.code(),
            mesh_spherical: self.mesh_spherical as i32,
            zonal_periodic: self.zonal_periodic as i32,
            chunk_info: self.chunk_info.as_ptr(),
            load_chunk: self.chunk_status.as_mut_ptr(),
            tfull_min: self.tfull_min,
            tfull_max: self.tfull_max,
            periods: self.periods.as_ptr(),
            lonlat_minmax: self.lonlat_minmax.as_ptr(),
            lon: self.lon.as_ptr(),
            lat: self.lat.as_ptr(),
            depth: self.depth.as_ptr(),
            time: self.time.as_ptr(),
            _view: PhantomData,
        }
    }
}

fn to_c_int(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Pointer-based grid record in the layout the kernel expects.
#[repr(C)]
#[derive(Debug)]
pub struct RawGridView<'a> {
    pub xdim: i32,
    pub ydim: i32,
    pub zdim: i32,
    pub tdim: i32,
    /// [`VerticalKind`] code: -1 z-levels, 0 3-D s-levels, 1 4-D s-levels.
    pub z4d: i32,
    pub mesh_spherical: i32,
    pub zonal_periodic: i32,
    pub chunk_info: *const i32,
    /// Chunk states, written by the kernel when it touches a chunk.
    pub load_chunk: *mut u8,
    pub tfull_min: f64,
    pub tfull_max: f64,
    pub periods: *mut i32,
    pub lonlat_minmax: *const f32,
    pub lon: *const f32,
    pub lat: *const f32,
    pub depth: *const f32,
    pub time: *const f64,
    _view: PhantomData<&'a NativeView>,
}

/// Type-tagged pointer to a [`RawGridView`].
#[repr(C)]
#[derive(Debug)]
pub struct RawGridHandle<'a> {
    pub gtype: i32,
    pub grid: *const RawGridView<'a>,
}

impl<'a> RawGridHandle<'a> {
    pub fn new(gtype: GridType, grid: &'a RawGridView<'a>) -> Self {
        Self {
            gtype: gtype.code(),
            grid,
        }
    }
}

/// Cache of the most recently built view.
#[derive(Debug, Default)]
pub struct NativeViewBuilder {
    cached: Option<Arc<NativeView>>,
    builds: u64,
}

impl NativeViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached view, if it was captured under `key`.
    pub fn current(&self, key: ViewKey) -> Option<Arc<NativeView>> {
        self.cached
            .as_ref()
            .filter(|view| view.key == key)
            .map(Arc::clone)
    }

    /// Replace the cached view.
    pub fn store(&mut self, view: Arc<NativeView>) {
        tracing::debug!(
            generation = view.key.generation,
            ti = ?view.key.ti,
            gtype = %view.gtype,
            "Built native grid view"
        );
        self.builds += 1;
        self.cached = Some(view);
    }

    /// Drop the cached view.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of views built so far.
    pub fn builds(&self) -> u64 {
        self.builds
    }
}
