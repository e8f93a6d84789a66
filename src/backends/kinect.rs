// SPDX-License-Identifier: GPL-3.0-only

//! Kinect backend via freedepth
//!
//! Streams Bayer video and 11-bit depth directly over USB with freedepth's
//! `KinectStreamer`, which unbinds the kernel driver while streaming and
//! rebinds it on shutdown. Raw disparity values are converted to millimeters
//! with the device-calibrated `DepthToMm` table, and Bayer video is
//! demosaiced to RGB before being packed as BGRA.

use std::sync::mpsc::{Receiver, TryRecvError};

use freedepth::{DepthFormat, DepthToMm, KinectStreamer, Resolution, VideoFormat, VideoFrame};
use tracing::{debug, info, trace, warn};

use super::{DeviceDescriptor, SensorBackend, SourceKind};
use crate::errors::{BackendError, BackendResult};
use crate::frame::{ColorFrame, DepthFrame, FrameGeometry};

/// Video resolution requested from the sensor
const VIDEO_RESOLUTION: Resolution = Resolution::Medium;

/// 11-bit depth is only streamed at 640x480
const DEPTH_GEOMETRY: FrameGeometry = FrameGeometry::new(640, 480);

/// Bayer video geometry for a freedepth resolution (640x480 or 1280x1024)
fn video_geometry(resolution: Resolution) -> FrameGeometry {
    if resolution == Resolution::High {
        FrameGeometry::new(1280, 1024)
    } else {
        FrameGeometry::new(640, 480)
    }
}

/// Enumerate Kinect sensors attached over USB
pub fn enumerate_devices() -> Vec<DeviceDescriptor> {
    let devices = match freedepth::enumerate_devices() {
        Ok(d) => d,
        Err(e) => {
            debug!("Failed to enumerate depth cameras: {}", e);
            return Vec::new();
        }
    };

    devices
        .iter()
        .enumerate()
        .map(|(index, dev)| DeviceDescriptor {
            index,
            name: dev.name.clone(),
            source: SourceKind::Kinect,
            serial: dev.id.serial.clone(),
            depth: DEPTH_GEOMETRY,
            color: video_geometry(VIDEO_RESOLUTION),
        })
        .collect()
}

pub struct KinectBackend {
    name: String,
    /// None once shut down
    streamer: Option<KinectStreamer>,
    video_rx: Receiver<VideoFrame>,
    depth_rx: Receiver<freedepth::DepthFrame>,
    depth_to_mm: DepthToMm,
    depth_sequence: u64,
    color_sequence: u64,
}

impl KinectBackend {
    /// Open the sensor at `index` and start both streams
    pub fn open(index: usize) -> BackendResult<Self> {
        let devices = freedepth::enumerate_devices()
            .map_err(|e| BackendError::DeviceNotFound(format!("USB enumeration failed: {}", e)))?;
        let device = devices.get(index).ok_or_else(|| {
            BackendError::DeviceNotFound(format!(
                "no Kinect sensor at index {} ({} attached)",
                index,
                devices.len()
            ))
        })?;
        let name = device.name.clone();

        info!(device = index, name = %name, "Opening Kinect sensor");

        // Creating the streamer unbinds the kernel driver
        let mut streamer = KinectStreamer::new(index).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to create streamer: {}", e))
        })?;

        let (video_rx, depth_rx) = streamer
            .start(VideoFormat::Bayer, VIDEO_RESOLUTION, DepthFormat::Depth11Bit)
            .map_err(|e| {
                BackendError::InitializationFailed(format!("Failed to start streaming: {}", e))
            })?;

        let registration = streamer.create_depth_registration();
        let depth_to_mm = registration.depth_to_mm().clone();

        info!(name = %name, "Kinect streams started");

        Ok(Self {
            name,
            streamer: Some(streamer),
            video_rx,
            depth_rx,
            depth_to_mm,
            depth_sequence: 0,
            color_sequence: 0,
        })
    }

    fn convert_depth(&mut self, frame: &freedepth::DepthFrame) -> BackendResult<DepthFrame> {
        let raw = frame.as_u16().ok_or_else(|| {
            BackendError::Transient("depth frame is not 16-bit".to_string())
        })?;

        let mut depth_mm = vec![0u16; raw.len()];
        self.depth_to_mm.convert_frame(raw, &mut depth_mm);

        self.depth_sequence += 1;
        let geometry = FrameGeometry::new(frame.width, frame.height);
        Ok(DepthFrame::new(geometry, depth_mm)?.with_sequence(self.depth_sequence))
    }

    fn convert_video(&mut self, frame: &VideoFrame) -> BackendResult<ColorFrame> {
        let geometry = FrameGeometry::new(frame.width, frame.height);

        // The Kinect has no native RGB output; Bayer is demosaiced in software
        let mut rgb = vec![0u8; geometry.pixel_count() * 3];
        freedepth::convert_bayer_to_rgb(&frame.data, &mut rgb, frame.width, frame.height);

        self.color_sequence += 1;
        Ok(ColorFrame::from_rgb(geometry, &rgb)?.with_sequence(self.color_sequence))
    }
}

/// Drain a channel down to its newest message
fn latest<T>(rx: &Receiver<T>, stream: &str) -> BackendResult<Option<T>> {
    let mut newest = None;
    loop {
        match rx.try_recv() {
            Ok(item) => {
                if newest.is_some() {
                    trace!(stream, "Dropping stale frame");
                }
                newest = Some(item);
            }
            Err(TryRecvError::Empty) => return Ok(newest),
            Err(TryRecvError::Disconnected) => {
                return match newest {
                    Some(item) => Ok(Some(item)),
                    None => Err(BackendError::Disconnected(format!(
                        "{} channel closed",
                        stream
                    ))),
                };
            }
        }
    }
}

impl SensorBackend for KinectBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn depth_geometry(&self) -> FrameGeometry {
        DEPTH_GEOMETRY
    }

    fn color_geometry(&self) -> FrameGeometry {
        video_geometry(VIDEO_RESOLUTION)
    }

    fn try_acquire_depth(&mut self) -> BackendResult<Option<DepthFrame>> {
        match latest(&self.depth_rx, "depth")? {
            Some(frame) => self.convert_depth(&frame).map(Some),
            None => Ok(None),
        }
    }

    fn try_acquire_color(&mut self) -> BackendResult<Option<ColorFrame>> {
        match latest(&self.video_rx, "video")? {
            Some(frame) => self.convert_video(&frame).map(Some),
            None => Ok(None),
        }
    }

    fn shutdown(&mut self) {
        let Some(mut streamer) = self.streamer.take() else {
            return;
        };

        info!(name = %self.name, "Stopping Kinect streams");
        streamer.stop();
        if let Err(e) = streamer.rebind_driver() {
            warn!("Failed to rebind kernel driver: {}", e);
        }
        info!(
            depth_frames = self.depth_sequence,
            color_frames = self.color_sequence,
            "Kinect sensor released"
        );
    }
}

impl Drop for KinectBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
