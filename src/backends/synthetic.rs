// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic sensor
//!
//! Produces deterministic frames without hardware: a depth ramp that sweeps
//! through the default window as the sequence advances, framed by a border
//! with no reading, and a BGRA color gradient. Frames become ready at a fixed
//! interval, so between frames the backend reports "nothing new" like a
//! real driver does.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{DeviceDescriptor, SensorBackend, SourceKind};
use crate::constants::SYNTHETIC_FRAME_INTERVAL;
use crate::constants::color::{COLOR_BYTES_PER_PIXEL, COLOR_HEIGHT, COLOR_WIDTH};
use crate::constants::depth::{DEPTH_HEIGHT, DEPTH_NO_READING, DEPTH_WIDTH, SYNTHETIC_DEPTH_MAX_MM};
use crate::errors::BackendResult;
use crate::frame::{ColorFrame, DepthFrame, FrameGeometry};

const NAME: &str = "Synthetic depth sensor";

/// Width of the no-reading border around synthetic depth frames
const BORDER_PX: u32 = 8;

/// Millimeters the depth ramp moves per frame
const SWEEP_STEP_MM: u32 = 16;

/// Per-stream pacing state
#[derive(Debug, Default)]
struct StreamClock {
    last_frame: Option<Instant>,
    sequence: u64,
}

impl StreamClock {
    /// Advance if a new frame is due, returning its sequence number
    fn tick(&mut self, interval: Duration) -> Option<u64> {
        let now = Instant::now();
        let due = self
            .last_frame
            .map(|last| now.duration_since(last) >= interval)
            .unwrap_or(true);
        if !due {
            return None;
        }
        self.last_frame = Some(now);
        self.sequence += 1;
        Some(self.sequence)
    }
}

pub struct SyntheticBackend {
    depth_geometry: FrameGeometry,
    color_geometry: FrameGeometry,
    frame_interval: Duration,
    depth_clock: StreamClock,
    color_clock: StreamClock,
    running: bool,
}

impl SyntheticBackend {
    /// Synthetic sensor with the reference geometry at ~30 fps
    pub fn new() -> Self {
        Self::with_geometry(
            FrameGeometry::new(DEPTH_WIDTH, DEPTH_HEIGHT),
            FrameGeometry::new(COLOR_WIDTH, COLOR_HEIGHT),
            SYNTHETIC_FRAME_INTERVAL,
        )
    }

    /// Synthetic sensor with custom geometry and frame interval
    ///
    /// A zero interval makes every acquisition attempt produce a frame.
    pub fn with_geometry(
        depth_geometry: FrameGeometry,
        color_geometry: FrameGeometry,
        frame_interval: Duration,
    ) -> Self {
        info!(
            depth = %depth_geometry,
            color = %color_geometry,
            interval_ms = frame_interval.as_millis() as u64,
            "Starting synthetic sensor"
        );
        Self {
            depth_geometry,
            color_geometry,
            frame_interval,
            depth_clock: StreamClock::default(),
            color_clock: StreamClock::default(),
            running: true,
        }
    }

    pub(crate) fn descriptor(index: usize) -> DeviceDescriptor {
        DeviceDescriptor {
            index,
            name: NAME.to_string(),
            source: SourceKind::Synthetic,
            serial: None,
            depth: FrameGeometry::new(DEPTH_WIDTH, DEPTH_HEIGHT),
            color: FrameGeometry::new(COLOR_WIDTH, COLOR_HEIGHT),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn depth_frame(&self, sequence: u64) -> BackendResult<DepthFrame> {
        let FrameGeometry { width, height } = self.depth_geometry;
        let range = SYNTHETIC_DEPTH_MAX_MM as u32 + 1;
        let offset = (sequence as u32).wrapping_mul(SWEEP_STEP_MM);

        let mut data = Vec::with_capacity(self.depth_geometry.pixel_count());
        for y in 0..height {
            for x in 0..width {
                let border = x < BORDER_PX
                    || y < BORDER_PX
                    || x >= width.saturating_sub(BORDER_PX)
                    || y >= height.saturating_sub(BORDER_PX);
                if border {
                    data.push(DEPTH_NO_READING);
                } else {
                    let ramp = x * SYNTHETIC_DEPTH_MAX_MM as u32 / width;
                    data.push(((ramp + offset) % range) as u16);
                }
            }
        }
        Ok(DepthFrame::new(self.depth_geometry, data)?.with_sequence(sequence))
    }

    fn color_frame(&self, sequence: u64) -> BackendResult<ColorFrame> {
        let FrameGeometry { width, height } = self.color_geometry;
        let red = (sequence % 256) as u8;

        let mut data = Vec::with_capacity(self.color_geometry.pixel_count() * COLOR_BYTES_PER_PIXEL);
        for y in 0..height {
            let green = (y * 255 / height.max(1)) as u8;
            for x in 0..width {
                let blue = (x * 255 / width.max(1)) as u8;
                data.extend_from_slice(&[blue, green, red, 255]);
            }
        }
        Ok(ColorFrame::new(self.color_geometry, data)?.with_sequence(sequence))
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorBackend for SyntheticBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn depth_geometry(&self) -> FrameGeometry {
        self.depth_geometry
    }

    fn color_geometry(&self) -> FrameGeometry {
        self.color_geometry
    }

    fn try_acquire_depth(&mut self) -> BackendResult<Option<DepthFrame>> {
        match self.depth_clock.tick(self.frame_interval) {
            Some(sequence) => self.depth_frame(sequence).map(Some),
            None => Ok(None),
        }
    }

    fn try_acquire_color(&mut self) -> BackendResult<Option<ColorFrame>> {
        match self.color_clock.tick(self.frame_interval) {
            Some(sequence) => self.color_frame(sequence).map(Some),
            None => Ok(None),
        }
    }

    fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        debug!(
            depth_frames = self.depth_clock.sequence,
            color_frames = self.color_clock.sequence,
            "Synthetic sensor stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(interval: Duration) -> SyntheticBackend {
        SyntheticBackend::with_geometry(
            FrameGeometry::new(32, 24),
            FrameGeometry::new(16, 9),
            interval,
        )
    }

    #[test]
    fn test_zero_interval_always_ready() {
        let mut backend = small(Duration::ZERO);
        for expected in 1..=3 {
            let frame = backend.try_acquire_depth().unwrap().unwrap();
            assert_eq!(frame.sequence(), expected);
            assert_eq!(frame.geometry(), FrameGeometry::new(32, 24));
        }
    }

    #[test]
    fn test_not_ready_between_frames() {
        let mut backend = small(Duration::from_secs(3600));
        assert!(backend.try_acquire_depth().unwrap().is_some());
        assert!(backend.try_acquire_depth().unwrap().is_none());
        // Streams are paced independently
        assert!(backend.try_acquire_color().unwrap().is_some());
        assert!(backend.try_acquire_color().unwrap().is_none());
    }

    #[test]
    fn test_depth_border_has_no_reading() {
        let mut backend = small(Duration::ZERO);
        let frame = backend.try_acquire_depth().unwrap().unwrap();
        assert_eq!(frame.get(0, 0), Some(DEPTH_NO_READING));
        assert_eq!(frame.get(31, 23), Some(DEPTH_NO_READING));
        assert!(
            frame
                .samples()
                .iter()
                .all(|&d| d <= SYNTHETIC_DEPTH_MAX_MM)
        );
    }

    #[test]
    fn test_color_frame_is_bgra() {
        let mut backend = small(Duration::ZERO);
        let frame = backend.try_acquire_color().unwrap().unwrap();
        assert_eq!(frame.bgra().len(), 16 * 9 * 4);
        assert!(frame.bgra().chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut backend = small(Duration::ZERO);
        backend.shutdown();
        backend.shutdown();
        assert!(!backend.is_running());
    }
}
