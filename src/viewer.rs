// SPDX-License-Identifier: GPL-3.0-only

//! The display loop
//!
//! Each iteration waits for a depth frame, colorizes and shows it, waits for
//! a color frame and shows it unmodified, then checks for the quit key, the
//! quit signal and the optional frame limit. A wait cancelled by the quit
//! signal ends the loop like the signal itself. Frames are released before the
//! next frame of the same stream is requested.

use image::DynamicImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::constants::QUIT_KEY;
use crate::constants::windows::{COLOR_WINDOW, DEPTH_WINDOW};
use crate::depth::DepthVisualizer;
use crate::display::DisplaySurface;
use crate::errors::{AppError, AppResult, SessionError};
use crate::session::Session;

/// Why the display loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user pressed the quit key
    QuitKey,
    /// The process-level quit flag was set (Ctrl+C)
    Signal,
    /// The configured number of iterations was reached
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
}

pub struct Viewer<D: DisplaySurface> {
    display: D,
    visualizer: DepthVisualizer,
    key_poll_interval: Duration,
    max_frames: Option<u64>,
}

impl<D: DisplaySurface> Viewer<D> {
    pub fn new(display: D, config: &ViewerConfig) -> Self {
        Self {
            display,
            visualizer: DepthVisualizer::new(config.depth_range),
            key_poll_interval: config.key_poll_interval,
            max_frames: config.max_frames,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    /// Run until quit
    pub fn run(&mut self, session: &mut Session, quit: &AtomicBool) -> AppResult<RunSummary> {
        info!(
            device = %session.name(),
            near_mm = self.visualizer.range().near(),
            far_mm = self.visualizer.range().far(),
            "Viewer started"
        );

        let started = Instant::now();
        let mut iterations = 0u64;

        let reason = loop {
            match self.step(session) {
                Ok(()) => iterations += 1,
                Err(AppError::Session(SessionError::Interrupted(stream))) => {
                    debug!(%stream, "Frame wait interrupted");
                    break StopReason::Signal;
                }
                Err(e) => return Err(e),
            }

            if let Some(key) = self.display.poll_key(self.key_poll_interval)?
                && key == QUIT_KEY
            {
                break StopReason::QuitKey;
            }
            if quit.load(Ordering::SeqCst) {
                break StopReason::Signal;
            }
            if self.max_frames.is_some_and(|max| iterations >= max) {
                break StopReason::FrameLimit;
            }
        };

        let summary = RunSummary {
            iterations,
            elapsed: started.elapsed(),
            reason,
        };
        info!(
            iterations,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            reason = ?reason,
            "Viewer stopped"
        );
        Ok(summary)
    }

    /// One depth + color cycle
    pub fn step(&mut self, session: &mut Session) -> AppResult<()> {
        self.show_depth(session)?;
        self.show_color(session)
    }

    fn show_depth(&mut self, session: &mut Session) -> AppResult<()> {
        let frame = session.wait_next_depth_frame()?;
        let image = self.visualizer.colorize(&frame);
        debug!(sequence = frame.sequence(), "Depth frame colorized");
        drop(frame);
        self.display
            .show_window(DEPTH_WINDOW, DynamicImage::ImageRgb8(image))
    }

    fn show_color(&mut self, session: &mut Session) -> AppResult<()> {
        let frame = session.wait_next_color_frame()?;
        let image = frame.to_rgba_image();
        drop(frame);
        self.display
            .show_window(COLOR_WINDOW, DynamicImage::ImageRgba8(image))
    }
}
