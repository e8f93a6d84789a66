// SPDX-License-Identifier: GPL-3.0-only

//! Depth visualization
//!
//! Turns raw depth frames (millimeters) into false-color images using a
//! near/far window and the ocean palette.

pub mod palette;
mod visualizer;

pub use palette::{OCEAN, ocean};
pub use visualizer::DepthVisualizer;
