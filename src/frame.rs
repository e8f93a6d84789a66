// SPDX-License-Identifier: GPL-3.0-only

//! Raw sensor frames
//!
//! A [`DepthFrame`] is a row-major grid of distances in millimeters, a
//! [`ColorFrame`] a row-major grid of BGRA pixels. Both are validated against
//! their geometry on construction and are immutable afterwards.

use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::constants::color::COLOR_BYTES_PER_PIXEL;
use crate::errors::{BackendError, BackendResult};

/// Width and height of a frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in a frame of this geometry
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One depth frame: distances in millimeters, 0 = no reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFrame {
    geometry: FrameGeometry,
    data: Vec<u16>,
    sequence: u64,
}

impl DepthFrame {
    /// Wrap depth samples captured with the given geometry
    pub fn new(geometry: FrameGeometry, data: Vec<u16>) -> BackendResult<Self> {
        check_buffer(geometry, data.len(), 1)?;
        Ok(Self {
            geometry,
            data,
            sequence: 0,
        })
    }

    /// Set the sequence number assigned by the producing backend
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Row-major depth samples
    pub fn samples(&self) -> &[u16] {
        &self.data
    }

    /// Sample at (x, y), if inside the frame
    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let idx = y as usize * self.geometry.width as usize + x as usize;
        self.data.get(idx).copied()
    }
}

/// One color frame in BGRA byte order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFrame {
    geometry: FrameGeometry,
    data: Vec<u8>,
    sequence: u64,
}

impl ColorFrame {
    /// Wrap BGRA bytes (4 per pixel) captured with the given geometry
    pub fn new(geometry: FrameGeometry, data: Vec<u8>) -> BackendResult<Self> {
        check_buffer(geometry, data.len(), COLOR_BYTES_PER_PIXEL)?;
        Ok(Self {
            geometry,
            data,
            sequence: 0,
        })
    }

    /// Build a BGRA frame from packed RGB bytes (3 per pixel)
    pub fn from_rgb(geometry: FrameGeometry, rgb: &[u8]) -> BackendResult<Self> {
        check_buffer(geometry, rgb.len(), 3)?;
        let mut bgra = Vec::with_capacity(geometry.pixel_count() * COLOR_BYTES_PER_PIXEL);
        for chunk in rgb.chunks_exact(3) {
            bgra.extend_from_slice(&[chunk[2], chunk[1], chunk[0], 255]);
        }
        Self::new(geometry, bgra)
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Raw BGRA bytes
    pub fn bgra(&self) -> &[u8] {
        &self.data
    }

    /// Convert to an RGBA image for display (swaps B and R)
    pub fn to_rgba_image(&self) -> RgbaImage {
        let pixels: &[[u8; 4]] = bytemuck::cast_slice(&self.data);
        let mut rgba = Vec::with_capacity(self.data.len());
        for &[b, g, r, a] in pixels {
            rgba.extend_from_slice(&[r, g, b, a]);
        }
        // Length was validated against the geometry in `new`.
        RgbaImage::from_raw(self.geometry.width, self.geometry.height, rgba)
            .unwrap_or_else(|| RgbaImage::new(self.geometry.width, self.geometry.height))
    }
}

fn check_buffer(geometry: FrameGeometry, len: usize, bytes_per_pixel: usize) -> BackendResult<()> {
    if geometry.is_empty() {
        return Err(BackendError::InvalidFrame(format!(
            "frame geometry {} has no pixels",
            geometry
        )));
    }
    let expected = geometry.pixel_count() * bytes_per_pixel;
    if len != expected {
        return Err(BackendError::InvalidFrame(format!(
            "{} frame needs {} elements, got {}",
            geometry, expected, len
        )));
    }
    Ok(())
}
