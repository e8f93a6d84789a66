// SPDX-License-Identifier: GPL-3.0-only

//! Viewer configuration
//!
//! There are no configuration files; [`ViewerConfig`] is built from command
//! line flags and every field defaults to the reference behavior.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::depth::{DEPTH_FAR_MM, DEPTH_NEAR_MM};
use crate::constants::{FRAME_POLL_INTERVAL, KEY_POLL_INTERVAL};
use crate::errors::ConfigError;

/// Distance window emphasized by the depth visualization
///
/// Always satisfies `near < far`, so the span used for normalization is
/// strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDepthRange", into = "RawDepthRange")]
pub struct DepthRange {
    near_mm: u16,
    far_mm: u16,
}

#[derive(Serialize, Deserialize)]
struct RawDepthRange {
    near_mm: u16,
    far_mm: u16,
}

impl DepthRange {
    pub fn new(near_mm: u16, far_mm: u16) -> Result<Self, ConfigError> {
        if near_mm >= far_mm {
            return Err(ConfigError::InvalidDepthRange { near_mm, far_mm });
        }
        Ok(Self { near_mm, far_mm })
    }

    /// Minimum distance of interest (maps to intensity 0)
    pub fn near(&self) -> u16 {
        self.near_mm
    }

    /// Maximum distance of interest (maps to intensity 255)
    pub fn far(&self) -> u16 {
        self.far_mm
    }

    pub fn span(&self) -> u16 {
        self.far_mm - self.near_mm
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            near_mm: DEPTH_NEAR_MM,
            far_mm: DEPTH_FAR_MM,
        }
    }
}

impl TryFrom<RawDepthRange> for DepthRange {
    type Error = ConfigError;

    fn try_from(raw: RawDepthRange) -> Result<Self, Self::Error> {
        DepthRange::new(raw.near_mm, raw.far_mm)
    }
}

impl From<DepthRange> for RawDepthRange {
    fn from(range: DepthRange) -> Self {
        Self {
            near_mm: range.near_mm,
            far_mm: range.far_mm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Depth window for the false-color visualization
    pub depth_range: DepthRange,
    /// Delay between acquisition attempts while waiting for a frame
    pub poll_interval: Duration,
    /// Give up waiting for a frame after this long (None = wait forever)
    pub frame_timeout: Option<Duration>,
    /// How long each loop iteration waits for a key press
    pub key_poll_interval: Duration,
    /// Stop after this many loop iterations (None = until quit)
    pub max_frames: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            depth_range: DepthRange::default(),
            poll_interval: FRAME_POLL_INTERVAL,
            frame_timeout: None,
            key_poll_interval: KEY_POLL_INTERVAL,
            max_frames: None,
        }
    }
}
