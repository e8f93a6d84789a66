// SPDX-License-Identifier: GPL-3.0-only

//! depthview - real-time viewer for depth+color sensors
//!
//! Pulls depth and color frames from a sensor, turns each depth frame into a
//! false-color image and shows both streams until the user quits.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Sensor driver abstraction (Kinect via freedepth, synthetic)
//! - [`session`]: Blocking frame acquisition with scoped frame leases
//! - [`depth`]: Depth to false-color conversion and the ocean palette
//! - [`display`]: Terminal and headless display surfaces
//! - [`viewer`]: The acquire / convert / display loop
//! - [`config`]: Viewer configuration and the near/far depth window
//!
//! # Example
//!
//! ```ignore
//! use std::sync::atomic::AtomicBool;
//! use depthview::{HeadlessDisplay, SourceKind, Viewer, ViewerConfig, open_session};
//!
//! let config = ViewerConfig { max_frames: Some(30), ..Default::default() };
//! let mut session = open_session(SourceKind::Synthetic, &config)?;
//! let mut viewer = Viewer::new(HeadlessDisplay::new(), &config);
//! viewer.run(&mut session, &AtomicBool::new(false))?;
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod depth;
pub mod display;
pub mod errors;
pub mod frame;
pub mod session;
pub mod viewer;

// Re-export commonly used types
pub use backends::{DeviceDescriptor, SensorBackend, SourceKind, list_devices};
pub use config::{DepthRange, ViewerConfig};
pub use depth::DepthVisualizer;
pub use display::{DisplaySurface, HeadlessDisplay, TerminalDisplay};
pub use errors::{AppError, AppResult, BackendError, SessionError, SessionResult, StreamKind};
pub use frame::{ColorFrame, DepthFrame, FrameGeometry};
pub use session::{FrameLease, Session, open_session};
pub use viewer::{RunSummary, StopReason, Viewer};
