//! Common test fixtures for grid tests.
//!
//! This module provides pre-defined axes that represent common scenarios
//! in gridded ocean and atmosphere datasets.

/// Common time axes, in seconds.
pub mod time {
    /// Five unit-spaced samples `[0, 1, 2, 3, 4]`
    pub const UNIT_5: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];

    /// Daily samples over one week
    pub const DAILY_WEEK: [f64; 7] = [
        0.0, 86400.0, 172800.0, 259200.0, 345600.0, 432000.0, 518400.0,
    ];

    /// Monthly climatology samples (30-day months)
    pub const MONTHLY_CLIMATOLOGY: [f64; 12] = [
        0.0, 2592000.0, 5184000.0, 7776000.0, 10368000.0, 12960000.0, 15552000.0, 18144000.0,
        20736000.0, 23328000.0, 25920000.0, 28512000.0,
    ];
}

/// Common horizontal axes.
pub mod axes {
    /// Descending latitude, as stored by many north-up datasets
    pub const LAT_DESCENDING: [f32; 3] = [10.0, 5.0, 0.0];

    /// Coarse global longitude (90 degree steps)
    pub const LON_QUARTERS: [f32; 4] = [0.0, 90.0, 180.0, 270.0];

    /// Longitude with an irregular last step
    pub const LON_IRREGULAR: [f32; 4] = [0.0, 1.0, 2.0, 5.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_axes_sorted() {
        for axis in [&time::UNIT_5[..], &time::DAILY_WEEK[..], &time::MONTHLY_CLIMATOLOGY[..]] {
            assert!(axis.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_climatology_spacing() {
        let steps: Vec<f64> = time::MONTHLY_CLIMATOLOGY
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect();
        assert!(steps.iter().all(|&dt| dt == 2592000.0));
    }
}
