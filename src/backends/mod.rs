// SPDX-License-Identifier: GPL-3.0-only

//! Sensor backend abstraction
//!
//! A backend is the device driver seam: it knows how to talk to one kind of
//! depth+color sensor and hands out the latest frame of each stream when one
//! is ready. Blocking, retries and frame ownership rules live one layer up in
//! [`crate::session`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │     Viewer loop     │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │       Session       │  ← Blocking waits, leases, geometry checks
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ SensorBackend Trait │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!       ┌────┴──────┐
//!       ▼           ▼
//!  ┌────────┐  ┌─────────┐
//!  │ Kinect │  │Synthetic│
//!  └────────┘  └─────────┘
//! ```

#[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
pub mod kinect;
pub mod synthetic;

use serde::Serialize;

use crate::errors::BackendResult;
use crate::frame::{ColorFrame, DepthFrame, FrameGeometry};

/// Device driver interface for a depth+color sensor
pub trait SensorBackend {
    /// Human readable device name
    fn name(&self) -> &str;

    /// Geometry of depth frames produced by this device
    fn depth_geometry(&self) -> FrameGeometry;

    /// Geometry of color frames produced by this device
    fn color_geometry(&self) -> FrameGeometry;

    /// Take the latest depth frame if a new one is ready
    ///
    /// # Returns
    /// * `Ok(Some(frame))` - A new frame
    /// * `Ok(None)` - No new frame yet
    /// * `Err(BackendError::Transient)` - This attempt failed, try again
    /// * `Err(_)` - The stream is unusable
    fn try_acquire_depth(&mut self) -> BackendResult<Option<DepthFrame>>;

    /// Take the latest color frame if a new one is ready
    ///
    /// Same contract as [`SensorBackend::try_acquire_depth`].
    fn try_acquire_color(&mut self) -> BackendResult<Option<ColorFrame>>;

    /// Stop streaming and release the device
    fn shutdown(&mut self);
}

/// Which backend a session should open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Kinect sensor via freedepth
    #[default]
    Kinect,
    /// Built-in generator, no hardware needed
    Synthetic,
}

/// An attached (or built-in) sensor, as reported by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub index: usize,
    pub name: String,
    pub source: SourceKind,
    pub serial: Option<String>,
    pub depth: FrameGeometry,
    pub color: FrameGeometry,
}

/// Open the backend for a source kind
pub fn open_backend(source: SourceKind) -> BackendResult<Box<dyn SensorBackend>> {
    match source {
        SourceKind::Kinect => open_kinect(),
        SourceKind::Synthetic => Ok(Box::new(synthetic::SyntheticBackend::new())),
    }
}

#[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
fn open_kinect() -> BackendResult<Box<dyn SensorBackend>> {
    Ok(Box::new(kinect::KinectBackend::open(0)?))
}

#[cfg(not(all(target_arch = "x86_64", feature = "freedepth")))]
fn open_kinect() -> BackendResult<Box<dyn SensorBackend>> {
    Err(crate::errors::BackendError::NotAvailable(
        "built without Kinect support (enable the `freedepth` feature on x86_64)".to_string(),
    ))
}

/// Enumerate sensors that a session could be opened on
///
/// Hardware sensors come first; the synthetic source is always listed last.
pub fn list_devices() -> Vec<DeviceDescriptor> {
    let mut devices = hardware_devices();
    devices.push(synthetic::SyntheticBackend::descriptor(devices.len()));
    devices
}

#[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
fn hardware_devices() -> Vec<DeviceDescriptor> {
    kinect::enumerate_devices()
}

#[cfg(not(all(target_arch = "x86_64", feature = "freedepth")))]
fn hardware_devices() -> Vec<DeviceDescriptor> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_is_always_listed() {
        let devices = list_devices();
        let last = devices.last().unwrap();
        assert_eq!(last.source, SourceKind::Synthetic);
        assert_eq!(last.index, devices.len() - 1);
    }

    #[test]
    fn test_open_synthetic() {
        let backend = open_backend(SourceKind::Synthetic).unwrap();
        assert!(!backend.depth_geometry().is_empty());
        assert!(!backend.color_geometry().is_empty());
    }
}
