// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Reference sensor geometry, the default depth window and the timing used by
//! the display loop live here.

use std::time::Duration;

/// Depth sensor constants
pub mod depth {
    /// Default near edge of the depth window (millimeters)
    pub const DEPTH_NEAR_MM: u16 = 500;
    /// Default far edge of the depth window (millimeters)
    pub const DEPTH_FAR_MM: u16 = 1500;

    /// Sample value reported when the sensor has no reading for a pixel
    pub const DEPTH_NO_READING: u16 = 0;

    /// Reference depth stream geometry (time-of-flight sensor)
    pub const DEPTH_WIDTH: u32 = 512;
    pub const DEPTH_HEIGHT: u32 = 424;

    /// Largest distance the synthetic sensor sweeps to (millimeters)
    pub const SYNTHETIC_DEPTH_MAX_MM: u16 = 2000;
}

/// Color stream constants
pub mod color {
    /// Reference color stream geometry
    pub const COLOR_WIDTH: u32 = 1920;
    pub const COLOR_HEIGHT: u32 = 1080;

    /// Bytes per BGRA pixel
    pub const COLOR_BYTES_PER_PIXEL: usize = 4;
}

/// Window names used by the viewer
pub mod windows {
    pub const DEPTH_WINDOW: &str = "Depth";
    pub const COLOR_WINDOW: &str = "Color";
}

/// Key that ends the display loop
pub const QUIT_KEY: char = 'q';

/// Interval between frame acquisition attempts while waiting for a frame
pub const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How long the display loop waits for a key press per iteration
pub const KEY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Frame interval of the synthetic sensor (~30 fps)
pub const SYNTHETIC_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
