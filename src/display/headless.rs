// SPDX-License-Identifier: GPL-3.0-only

//! Display without a screen
//!
//! Accepts images, logs what would have been shown and never reports a key,
//! so a run ends through the quit signal or a frame limit.

use image::DynamicImage;
use std::time::Duration;
use tracing::{debug, info};

use super::DisplaySurface;
use crate::errors::AppResult;

#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    /// (window name, frames shown) in first-use order
    windows: Vec<(String, u64)>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of images shown in a window so far
    pub fn frames_shown(&self, name: &str) -> u64 {
        self.windows
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn show_window(&mut self, name: &str, image: DynamicImage) -> AppResult<()> {
        let index = match self.windows.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                info!(window = name, "Creating window");
                self.windows.push((name.to_string(), 0));
                self.windows.len() - 1
            }
        };
        let count = &mut self.windows[index].1;
        *count += 1;
        debug!(
            window = name,
            frame = *count,
            width = image.width(),
            height = image.height(),
            "Frame shown"
        );
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> AppResult<Option<char>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_counts_frames_per_window() {
        let mut display = HeadlessDisplay::new();
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        display.show_window("Depth", image.clone()).unwrap();
        display.show_window("Depth", image.clone()).unwrap();
        display.show_window("Color", image).unwrap();

        assert_eq!(display.frames_shown("Depth"), 2);
        assert_eq!(display.frames_shown("Color"), 1);
        assert_eq!(display.frames_shown("Missing"), 0);
        assert_eq!(display.poll_key(Duration::ZERO).unwrap(), None);
    }
}
