//! Per-block load status shared with the deferred loader and the kernel.
//!
//! The grid owns the bitmap but never performs I/O. A deferred loader moves
//! blocks through the states below and reads them back to decide what to
//! materialize:
//!
//! ```text
//! NotLoaded ──► LoadingRequested ──► LoadedTouched ◄──► Deprecated
//!     ▲                                                     │
//!     └─────────────────────── release ─────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{GridError, Result};

/// Load state of a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChunkState {
    NotLoaded = 0,
    LoadingRequested = 1,
    LoadedTouched = 2,
    Deprecated = 3,
}

impl ChunkState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::LoadingRequested,
            2 => Self::LoadedTouched,
            3 => Self::Deprecated,
            _ => Self::NotLoaded,
        }
    }

    /// Data for this chunk is resident.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::LoadedTouched | Self::Deprecated)
    }

    /// Whether the loading protocol allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ChunkState) -> bool {
        use ChunkState::*;
        matches!(
            (*self, next),
            (NotLoaded, LoadingRequested)
                | (LoadingRequested, LoadedTouched)
                | (LoadedTouched, Deprecated)
                | (Deprecated, LoadedTouched)
                | (Deprecated, NotLoaded)
        ) || *self == next
    }
}

/// Chunk decomposition of a grid's data arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLayout {
    /// Number of chunks along each dimension.
    pub chunk_counts: Vec<usize>,
    /// Chunk extent along each dimension.
    pub chunk_shape: Vec<usize>,
}

impl ChunkLayout {
    /// Build a layout covering `dims` with chunks of `chunk_shape`.
    pub fn from_dims(dims: &[usize], chunk_shape: &[usize]) -> Result<Self> {
        if dims.len() != chunk_shape.len() {
            return Err(GridError::validation(format!(
                "chunk shape has {} dimensions, data has {}",
                chunk_shape.len(),
                dims.len()
            )));
        }
        if chunk_shape.iter().any(|&c| c == 0) {
            return Err(GridError::validation("chunk extents must be > 0"));
        }

        let chunk_counts = dims
            .iter()
            .zip(chunk_shape)
            .map(|(&dim, &chunk)| (dim + chunk - 1) / chunk)
            .collect();

        Ok(Self {
            chunk_counts,
            chunk_shape: chunk_shape.to_vec(),
        })
    }

    pub fn ndim(&self) -> usize {
        self.chunk_counts.len()
    }

    /// Total number of chunks (zero for an empty layout).
    pub fn total(&self) -> usize {
        if self.chunk_counts.is_empty() {
            0
        } else {
            self.chunk_counts.iter().product()
        }
    }

    /// Row-major flat index of a chunk coordinate.
    pub fn flat_index(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.ndim() {
            return None;
        }
        coords
            .iter()
            .zip(&self.chunk_counts)
            .try_fold(0usize, |acc, (&c, &n)| (c < n).then_some(acc * n + c))
    }

    /// Kernel encoding: `[ndim, counts..., shape...]`.
    pub fn chunk_info(&self) -> Vec<i32> {
        std::iter::once(self.ndim())
            .chain(self.chunk_counts.iter().copied())
            .chain(self.chunk_shape.iter().copied())
            .map(|v| i32::try_from(v).unwrap_or(i32::MAX))
            .collect()
    }
}

/// Load-state bitmap, one byte per chunk.
///
/// States are atomics so that the bitmap can be shared with the native view
/// while the loader keeps writing to it.
#[derive(Debug, Default)]
pub struct ChunkStatusMap {
    layout: ChunkLayout,
    states: Box<[AtomicU8]>,
}

impl ChunkStatusMap {
    /// Create a bitmap with every chunk `NotLoaded`.
    pub fn new(layout: ChunkLayout) -> Self {
        let states = (0..layout.total())
            .map(|_| AtomicU8::new(ChunkState::NotLoaded as u8))
            .collect();
        Self { layout, states }
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get the state of one chunk.
    pub fn get(&self, index: usize) -> Result<ChunkState> {
        self.slot(index)
            .map(|slot| ChunkState::from_u8(slot.load(Ordering::Relaxed)))
    }

    /// Move a chunk to `next`, returning its previous state.
    pub fn transition(&self, index: usize, next: ChunkState) -> Result<ChunkState> {
        let slot = self.slot(index)?;
        let current = ChunkState::from_u8(slot.load(Ordering::Relaxed));
        if !current.can_transition_to(next) {
            return Err(GridError::InvalidChunkTransition {
                index,
                from: current,
                to: next,
            });
        }
        slot.store(next as u8, Ordering::Relaxed);
        Ok(current)
    }

    /// Mark every touched chunk as deprecated. Returns how many changed.
    pub fn deprecate_touched(&self) -> usize {
        self.replace_all(ChunkState::LoadedTouched, ChunkState::Deprecated)
    }

    /// Release every deprecated chunk back to `NotLoaded`. Returns how many changed.
    pub fn release_deprecated(&self) -> usize {
        self.replace_all(ChunkState::Deprecated, ChunkState::NotLoaded)
    }

    /// Number of chunks whose data is resident.
    pub fn loaded_count(&self) -> usize {
        self.snapshot().iter().filter(|s| s.is_loaded()).count()
    }

    /// Copy of all states, in flat index order.
    pub fn snapshot(&self) -> Vec<ChunkState> {
        self.states
            .iter()
            .map(|slot| ChunkState::from_u8(slot.load(Ordering::Relaxed)))
            .collect()
    }

    /// Raw byte view of the bitmap for the kernel.
    pub(crate) fn as_mut_ptr(&self) -> *mut u8 {
        // AtomicU8 has the same in-memory representation as u8
        self.states.as_ptr() as *mut u8
    }

    fn slot(&self, index: usize) -> Result<&AtomicU8> {
        self.states.get(index).ok_or(GridError::ChunkIndexOutOfRange {
            index,
            len: self.states.len(),
        })
    }

    fn replace_all(&self, from: ChunkState, to: ChunkState) -> usize {
        self.states
            .iter()
            .filter(|slot| {
                slot.compare_exchange(from as u8, to as u8, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
            })
            .count()
    }
}
