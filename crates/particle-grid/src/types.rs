//! Core value types shared across the grid modules.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GridError;

/// Horizontal metric of the grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mesh {
    /// Lon/lat in degrees; zonal velocities need latitude-dependent scaling.
    Spherical,
    /// Lon/lat are plain metres.
    #[default]
    Flat,
}

impl Mesh {
    /// Get the mesh name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spherical => "spherical",
            Self::Flat => "flat",
        }
    }

    pub fn is_spherical(&self) -> bool {
        matches!(self, Self::Spherical)
    }
}

impl FromStr for Mesh {
    type Err = GridError;

    /// Parse a mesh name. Only the exact names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spherical" => Ok(Self::Spherical),
            "flat" => Ok(Self::Flat),
            other => Err(GridError::InvalidMesh(other.to_string())),
        }
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lon/lat bounding box of the grid coordinates (NaNs ignored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f32,
    pub min_lat: f32,
    pub max_lon: f32,
    pub max_lat: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f32, min_lat: f32, max_lon: f32, max_lat: f32) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Compute the box spanned by coordinate samples, skipping NaNs.
    pub fn from_coords<'a>(
        lon: impl IntoIterator<Item = &'a f32>,
        lat: impl IntoIterator<Item = &'a f32>,
    ) -> Self {
        // f32::min/max return the non-NaN operand
        let (min_lon, max_lon) = lon
            .into_iter()
            .fold((f32::NAN, f32::NAN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (min_lat, max_lat) = lat
            .into_iter()
            .fold((f32::NAN, f32::NAN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Self::new(min_lon, min_lat, max_lon, max_lat)
    }

    /// Get the width in coordinate units.
    pub fn width(&self) -> f32 {
        self.max_lon - self.min_lon
    }

    /// Get the height in coordinate units.
    pub fn height(&self) -> f32 {
        self.max_lat - self.min_lat
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f32, lat: f32) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Kernel ordering: `[min_lon, max_lon, min_lat, max_lat]`.
    pub fn to_minmax(&self) -> [f32; 4] {
        [self.min_lon, self.max_lon, self.min_lat, self.max_lat]
    }
}

/// The four horizontal x vertical grid combinations, with the codes the
/// compiled kernel dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum GridType {
    RectilinearZ = 0,
    RectilinearS = 1,
    CurvilinearZ = 2,
    CurvilinearS = 3,
}

impl GridType {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_rectilinear(&self) -> bool {
        matches!(self, Self::RectilinearZ | Self::RectilinearS)
    }

    pub fn has_s_levels(&self) -> bool {
        matches!(self, Self::RectilinearS | Self::CurvilinearS)
    }
}

impl std::fmt::Display for GridType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RectilinearZ => "RectilinearZGrid",
            Self::RectilinearS => "RectilinearSGrid",
            Self::CurvilinearZ => "CurvilinearZGrid",
            Self::CurvilinearS => "CurvilinearSGrid",
        };
        write!(f, "{}", name)
    }
}

/// Layout of the depth array, as seen by the kernel (`z4d` flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum VerticalKind {
    /// Position-independent z-levels `[z]`.
    Z = -1,
    /// S-levels `[z, y, x]`.
    S3d = 0,
    /// Time-varying S-levels `[t, z, y, x]`.
    S4d = 1,
}

impl VerticalKind {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_from_str() {
        assert_eq!("spherical".parse::<Mesh>().unwrap(), Mesh::Spherical);
        assert_eq!("flat".parse::<Mesh>().unwrap(), Mesh::Flat);
        assert_eq!(
            "Spherical".parse::<Mesh>(),
            Err(GridError::InvalidMesh("Spherical".to_string()))
        );
        assert!("cartesian".parse::<Mesh>().is_err());
    }

    #[test]
    fn test_bbox_from_coords_skips_nan() {
        let lon = [10.0, f32::NAN, -5.0, 3.0];
        let lat = [f32::NAN, 1.0, 2.0];
        let bbox = BoundingBox::from_coords(&lon, &lat);
        assert_eq!(bbox.to_minmax(), [-5.0, 10.0, 1.0, 2.0]);
        assert!((bbox.width() - 15.0).abs() < f32::EPSILON);
        assert!(bbox.contains(0.0, 1.5));
        assert!(!bbox.contains(0.0, 3.0));
    }

    #[test]
    fn test_grid_type_codes() {
        assert_eq!(GridType::RectilinearZ.code(), 0);
        assert_eq!(GridType::RectilinearS.code(), 1);
        assert_eq!(GridType::CurvilinearZ.code(), 2);
        assert_eq!(GridType::CurvilinearS.code(), 3);
        assert!(GridType::RectilinearS.is_rectilinear());
        assert!(GridType::CurvilinearS.has_s_levels());
        assert_eq!(GridType::CurvilinearZ.to_string(), "CurvilinearZGrid");
    }
}
