// SPDX-License-Identifier: GPL-3.0-only

//! Shared test doubles: a backend that replays a script of acquisition
//! results and a display that records what it was asked to show.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use depthview::errors::{AppResult, BackendError, BackendResult};
use depthview::{ColorFrame, DepthFrame, DisplaySurface, FrameGeometry, SensorBackend};
use image::DynamicImage;

pub const DEPTH: FrameGeometry = FrameGeometry::new(8, 6);
pub const COLOR: FrameGeometry = FrameGeometry::new(4, 3);

/// One scripted acquisition result
pub enum Script<T> {
    Empty,
    Transient,
    Frame(T),
    Error(BackendError),
}

/// Backend replaying scripted results; once a script runs out it keeps
/// reporting "no new frame", or repeats its template frame if one is set.
pub struct ScriptedBackend {
    pub depth: VecDeque<Script<DepthFrame>>,
    pub color: VecDeque<Script<ColorFrame>>,
    pub repeat_depth: Option<DepthFrame>,
    pub repeat_color: Option<ColorFrame>,
    pub shutdowns: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            depth: VecDeque::new(),
            color: VecDeque::new(),
            repeat_depth: None,
            repeat_color: None,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Backend that always has a fresh frame of constant depth and color
    pub fn streaming(depth_mm: u16) -> Self {
        let mut backend = Self::new();
        backend.repeat_depth = Some(depth_frame(depth_mm));
        backend.repeat_color = Some(color_frame([10, 20, 30, 255]));
        backend
    }

    pub fn shutdown_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.shutdowns)
    }
}

fn next<T: Clone>(script: &mut VecDeque<Script<T>>, repeat: &Option<T>) -> BackendResult<Option<T>> {
    match script.pop_front() {
        Some(Script::Empty) => Ok(None),
        Some(Script::Transient) => Err(BackendError::Transient("not ready".to_string())),
        Some(Script::Frame(frame)) => Ok(Some(frame)),
        Some(Script::Error(e)) => Err(e),
        None => Ok(repeat.clone()),
    }
}

impl SensorBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted sensor"
    }

    fn depth_geometry(&self) -> FrameGeometry {
        DEPTH
    }

    fn color_geometry(&self) -> FrameGeometry {
        COLOR
    }

    fn try_acquire_depth(&mut self) -> BackendResult<Option<DepthFrame>> {
        next(&mut self.depth, &self.repeat_depth)
    }

    fn try_acquire_color(&mut self) -> BackendResult<Option<ColorFrame>> {
        next(&mut self.color, &self.repeat_color)
    }

    fn shutdown(&mut self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn depth_frame(depth_mm: u16) -> DepthFrame {
    DepthFrame::new(DEPTH, vec![depth_mm; DEPTH.pixel_count()]).unwrap()
}

pub fn color_frame(bgra: [u8; 4]) -> ColorFrame {
    let data = bgra.repeat(COLOR.pixel_count());
    ColorFrame::new(COLOR, data).unwrap()
}

/// Display that records shown images and replays scripted key presses
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Vec<(String, DynamicImage)>,
    pub keys: VecDeque<Option<char>>,
    pub key_polls: usize,
}

impl RecordingDisplay {
    pub fn with_keys(keys: &[Option<char>]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn window(&self, name: &str) -> Vec<&DynamicImage> {
        self.shown
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, image)| image)
            .collect()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn show_window(&mut self, name: &str, image: DynamicImage) -> AppResult<()> {
        self.shown.push((name.to_string(), image));
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> AppResult<Option<char>> {
        self.key_polls += 1;
        Ok(self.keys.pop_front().flatten())
    }
}
