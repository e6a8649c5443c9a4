//! Grid Abstraction for Lagrangian Particle Tracking
//!
//! This crate provides the spatial and temporal grids on which gridded
//! velocity fields are defined. It enables:
//!
//! - **Four geometries**: rectilinear or curvilinear horizontal layout with
//!   z-level or s-level vertical coordinates
//! - **Periodic halos**: wrap coordinates and depth around domain edges
//! - **Time windows**: track the two-sample bracket containing the clock,
//!   with forward/backward stepping and periodic time axes
//! - **Native views**: cached, pointer-based snapshots for a compiled kernel
//!
//! # Architecture
//!
//! ```text
//! Field loader
//!      │
//!      ▼
//! create_grid(lon, lat, depth, time, origin, mesh)
//!      │
//!      ├─► GridGeometry (Rectilinear|Curvilinear × Z|S)
//!      │
//!      └─► TimeWindow over the full time axis
//!               │
//!               ▼
//! Simulation loop ──► Grid::compute_time_chunk(time, signdt) ──► next_time
//!      │
//!      ├─► UpdateStatus tells the field what to reload
//!      │
//!      └─► Grid::build_view() ──► NativeView ──► kernel
//!                                     │
//!                                     └─► ChunkStatusMap ◄── deferred loader
//! ```
//!
//! # Example
//!
//! ```ignore
//! use particle_grid::{create_grid, TimeOrigin, TimePolicy};
//!
//! let mut grid = create_grid(lon.view(), lat.view(), None, Some(time.view()),
//!                            TimeOrigin::default(), "spherical")?;
//! grid.extend_halo(true, false, 5)?;
//!
//! let policy = TimePolicy::new(false, true);
//! let next = grid.compute_time_chunk(t, dt.signum(), &policy);
//! ```

#[macro_use]
mod macros;

pub mod chunk;
pub mod config;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod grid;
pub mod halo;
pub mod native_view;
pub mod time_origin;
pub mod time_window;
pub mod types;

// Re-export commonly used types at crate root
pub use chunk::{ChunkLayout, ChunkState, ChunkStatusMap};
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use factory::{create_grid, GridBuilder};
pub use geometry::{GridGeometry, HorizontalLayout, VerticalCoordinate};
pub use grid::Grid;
pub use native_view::{NativeView, NativeViewBuilder, RawGridHandle, RawGridView, ViewKey};
pub use time_origin::{CalendarDate, CalendarKind, TimeOrigin, TimeStamp};
pub use time_window::{
    bracket_lookup, Direction, FieldTiming, TimeLookup, TimePolicy, TimeWindow, Transition,
    UpdateStatus,
};
pub use types::{BoundingBox, GridType, Mesh, VerticalKind};
