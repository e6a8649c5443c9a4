//! Configuration for grid construction and halo extension.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Tunables passed explicitly to every grid at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Halo width (in grid points) used by `Grid::extend_default_halo`.
    pub default_halosize: usize,

    /// Relative tolerance when comparing the two edge spacings of a padded axis.
    pub halo_spacing_rtol: f64,

    /// Absolute tolerance when comparing the two edge spacings of a padded axis.
    pub halo_spacing_atol: f64,

    /// Summed longitude span (degrees) above which a spherical grid is zonally periodic.
    pub zonal_periodic_threshold: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_halosize: 5,
            halo_spacing_rtol: 1e-5,
            halo_spacing_atol: 1e-8,
            zonal_periodic_threshold: 359.9,
        }
    }
}

impl GridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_HALO_SIZE") {
            if let Ok(size) = val.parse() {
                config.default_halosize = size;
            }
        }

        if let Ok(val) = std::env::var("GRID_HALO_RTOL") {
            if let Ok(rtol) = val.parse() {
                config.halo_spacing_rtol = rtol;
            }
        }

        if let Ok(val) = std::env::var("GRID_HALO_ATOL") {
            if let Ok(atol) = val.parse() {
                config.halo_spacing_atol = atol;
            }
        }

        if let Ok(val) = std::env::var("GRID_ZONAL_PERIODIC_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.zonal_periodic_threshold = threshold;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.default_halosize == 0 {
            return Err(GridError::config("default_halosize must be > 0"));
        }

        if !(self.halo_spacing_rtol >= 0.0) || !(self.halo_spacing_atol >= 0.0) {
            return Err(GridError::config("halo spacing tolerances must be >= 0"));
        }

        if !(self.zonal_periodic_threshold > 0.0) {
            return Err(GridError::config("zonal_periodic_threshold must be > 0"));
        }

        Ok(())
    }

    /// Closeness test for edge spacings, `|a - b| <= atol + rtol * |b|`.
    pub fn spacing_close(&self, a: f32, b: f32) -> bool {
        let (a, b) = (a as f64, b as f64);
        (a - b).abs() <= self.halo_spacing_atol + self.halo_spacing_rtol * b.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.default_halosize, 5);
        assert!((config.halo_spacing_rtol - 1e-5).abs() < f64::EPSILON);
        assert!((config.zonal_periodic_threshold - 359.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = GridConfig::default();
        assert!(config.validate().is_ok());

        config.default_halosize = 0;
        assert!(config.validate().is_err());

        config = GridConfig::default();
        config.halo_spacing_atol = -1.0;
        assert!(config.validate().is_err());

        config = GridConfig::default();
        config.halo_spacing_rtol = f64::NAN;
        assert!(config.validate().is_err());

        config = GridConfig::default();
        config.zonal_periodic_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spacing_close() {
        let config = GridConfig::default();
        assert!(config.spacing_close(1.0, 1.0));
        assert!(config.spacing_close(0.25, 0.250001));
        assert!(!config.spacing_close(1.0, 2.0));
    }
}
