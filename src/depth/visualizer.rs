// SPDX-License-Identifier: GPL-3.0-only

//! Depth to false-color conversion
//!
//! Every sample is remapped linearly so that `near` becomes 0 and `far`
//! becomes 255, clamped, truncated to 8 bits and looked up in the ocean
//! palette. Samples closer than `near` (including the 0 "no reading" value)
//! saturate to palette entry 0, samples beyond `far` to entry 255.

use image::{Rgb, RgbImage};

use super::palette::ocean;
use crate::config::DepthRange;
use crate::frame::DepthFrame;

/// Converts depth frames into displayable RGB images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthVisualizer {
    range: DepthRange,
}

impl DepthVisualizer {
    pub fn new(range: DepthRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> DepthRange {
        self.range
    }

    /// Map a distance in millimeters to an 8-bit intensity
    ///
    /// Computes `(d - near) * 255 / (far - near)`, which is the same remap as
    /// `d * alpha + beta` with `alpha = 255 / (far - near)` and
    /// `beta = -near * alpha`, but keeps integer inputs exact. The result is
    /// clamped to [0, 255] and truncated toward zero, so half-way values
    /// round down (1000 mm in a 500..1500 window gives 127).
    #[inline]
    pub fn intensity(&self, depth_mm: u16) -> u8 {
        let near = self.range.near() as f32;
        let span = self.range.span() as f32;
        let v = (depth_mm as f32 - near) * 255.0 / span;
        v.clamp(0.0, 255.0) as u8
    }

    /// Colorized pixel for a single sample
    #[inline]
    pub fn color(&self, depth_mm: u16) -> [u8; 3] {
        ocean(self.intensity(depth_mm))
    }

    /// Convert a whole depth frame to an image of the same dimensions
    pub fn colorize(&self, frame: &DepthFrame) -> RgbImage {
        let mut image = RgbImage::new(frame.width(), frame.height());
        for (pixel, &depth) in image.pixels_mut().zip(frame.samples()) {
            *pixel = Rgb(self.color(depth));
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::palette::OCEAN;
    use crate::frame::FrameGeometry;

    fn frame(width: u32, height: u32, data: Vec<u16>) -> DepthFrame {
        DepthFrame::new(FrameGeometry::new(width, height), data).unwrap()
    }

    #[test]
    fn test_window_edges() {
        let viz = DepthVisualizer::default();
        assert_eq!(viz.intensity(500), 0);
        assert_eq!(viz.intensity(1500), 255);
        assert_eq!(viz.color(500), OCEAN[0]);
        assert_eq!(viz.color(1500), OCEAN[255]);
    }

    #[test]
    fn test_midpoint_truncates() {
        let viz = DepthVisualizer::default();
        // 500 * 255 / 1000 = 127.5
        assert_eq!(viz.intensity(1000), 127);
        assert_eq!(viz.color(1000), OCEAN[127]);
        // 504 * 255 / 1000 = 128.52
        assert_eq!(viz.intensity(1004), 128);
    }

    #[test]
    fn test_no_reading_clamps_to_zero() {
        let viz = DepthVisualizer::default();
        assert_eq!(viz.intensity(0), 0);
        assert_eq!(viz.color(0), viz.color(500));
    }

    #[test]
    fn test_out_of_range_noise_clamps_to_max() {
        let viz = DepthVisualizer::default();
        assert_eq!(viz.intensity(60000), 255);
        assert_eq!(viz.intensity(u16::MAX), 255);
        assert_eq!(viz.color(60000), OCEAN[255]);
    }

    #[test]
    fn test_clamping_outside_window() {
        let viz = DepthVisualizer::default();
        for d in 0..=500u16 {
            assert_eq!(viz.intensity(d), 0, "d = {}", d);
        }
        for d in 1500..=u16::MAX {
            assert_eq!(viz.intensity(d), 255, "d = {}", d);
        }
    }

    #[test]
    fn test_intensity_is_monotonic() {
        let viz = DepthVisualizer::new(DepthRange::new(300, 4000).unwrap());
        let mut prev = viz.intensity(0);
        for d in 1..=u16::MAX {
            let cur = viz.intensity(d);
            assert!(cur >= prev, "intensity fell at d = {}", d);
            prev = cur;
        }
    }

    #[test]
    fn test_narrow_window() {
        let viz = DepthVisualizer::new(DepthRange::new(1000, 1001).unwrap());
        assert_eq!(viz.intensity(1000), 0);
        assert_eq!(viz.intensity(1001), 255);
    }

    #[test]
    fn test_colorize_keeps_dimensions() {
        let viz = DepthVisualizer::default();
        for (w, h) in [(1, 1), (7, 3), (3, 7), (512, 424)] {
            let image = viz.colorize(&frame(w, h, vec![1000; (w * h) as usize]));
            assert_eq!(image.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_colorize_maps_each_pixel() {
        let viz = DepthVisualizer::default();
        let image = viz.colorize(&frame(2, 2, vec![0, 1000, 1500, 60000]));
        assert_eq!(image.get_pixel(0, 0).0, OCEAN[0]);
        assert_eq!(image.get_pixel(1, 0).0, OCEAN[127]);
        assert_eq!(image.get_pixel(0, 1).0, OCEAN[255]);
        assert_eq!(image.get_pixel(1, 1).0, OCEAN[255]);
    }

    #[test]
    fn test_all_no_reading_frame_is_uniform() {
        let viz = DepthVisualizer::default();
        let image = viz.colorize(&frame(16, 9, vec![0; 16 * 9]));
        assert!(image.pixels().all(|p| p.0 == OCEAN[0]));
    }

    #[test]
    fn test_colorize_is_deterministic() {
        let viz = DepthVisualizer::default();
        let data: Vec<u16> = (0..64u16).map(|i| i * 37).collect();
        let input = frame(8, 8, data);
        let a = viz.colorize(&input);
        let b = viz.colorize(&input);
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
