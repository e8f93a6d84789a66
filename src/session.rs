// SPDX-License-Identifier: GPL-3.0-only

//! Device session
//!
//! Owns the connection to one sensor and turns the backend's non-blocking
//! "is there a new frame?" calls into blocking waits:
//!
//! - Empty polls and transient failures are retried after a short sleep and
//!   never reach the caller. Retries are unbounded unless a frame timeout is
//!   configured.
//! - Frames are handed out as [`FrameLease`]s. A stream cannot be acquired
//!   again until its previous lease has been dropped, and dropping the lease
//!   is what releases it, so every exit path releases.
//! - Every frame is checked against the geometry the backend reported when
//!   the session opened.
//! - A cancel flag set with [`Session::with_cancel`] ends a pending wait
//!   with [`SessionError::Interrupted`].
//! - [`Session::close`] shuts the backend down exactly once and also runs on
//!   drop.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, trace};

use crate::backends::{self, SensorBackend, SourceKind};
use crate::config::ViewerConfig;
use crate::errors::{BackendError, BackendResult, SessionError, SessionResult, StreamKind};
use crate::frame::{ColorFrame, DepthFrame, FrameGeometry};

/// Open a session on the sensor selected by `source`
///
/// # Returns
/// * `Err(SessionError::DeviceNotFound)` - No compatible sensor is attached
/// * `Err(SessionError::DeviceInitFailed)` - Stream negotiation failed
pub fn open_session(source: SourceKind, config: &ViewerConfig) -> SessionResult<Session> {
    let backend = backends::open_backend(source)?;
    Ok(Session::from_backend(backend, config))
}

/// Counters collected over the lifetime of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub depth_frames: u64,
    pub color_frames: u64,
    /// Acquisition attempts that found no new frame
    pub empty_polls: u64,
    /// Acquisition attempts that failed and were retried
    pub transient_errors: u64,
}

/// A frame on loan from a [`Session`]
///
/// Dereferences to the frame. Dropping the lease releases it; the session
/// refuses to hand out another frame of the same stream while it is held.
#[derive(Debug)]
pub struct FrameLease<T> {
    frame: T,
    _guard: LeaseGuard,
}

impl<T> FrameLease<T> {
    /// Release the lease and keep the frame
    pub fn into_inner(self) -> T {
        let FrameLease { frame, _guard } = self;
        frame
    }
}

impl<T> Deref for FrameLease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.frame
    }
}

#[derive(Debug)]
struct LeaseGuard {
    outstanding: Arc<AtomicUsize>,
}

impl LeaseGuard {
    fn acquire(outstanding: &Arc<AtomicUsize>) -> Self {
        outstanding.fetch_add(1, Ordering::SeqCst);
        Self {
            outstanding: Arc::clone(outstanding),
        }
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Session {
    backend: Box<dyn SensorBackend>,
    depth_geometry: FrameGeometry,
    color_geometry: FrameGeometry,
    poll_interval: Duration,
    frame_timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    depth_leases: Arc<AtomicUsize>,
    color_leases: Arc<AtomicUsize>,
    stats: SessionStats,
    closed: bool,
}

impl Session {
    /// Wrap an already opened backend
    pub fn from_backend(backend: Box<dyn SensorBackend>, config: &ViewerConfig) -> Self {
        let depth_geometry = backend.depth_geometry();
        let color_geometry = backend.color_geometry();

        info!(
            device = %backend.name(),
            depth = %depth_geometry,
            color = %color_geometry,
            "Session opened"
        );

        Self {
            backend,
            depth_geometry,
            color_geometry,
            poll_interval: config.poll_interval,
            frame_timeout: config.frame_timeout,
            cancel: None,
            depth_leases: Arc::new(AtomicUsize::new(0)),
            color_leases: Arc::new(AtomicUsize::new(0)),
            stats: SessionStats::default(),
            closed: false,
        }
    }

    /// Abort waits once `flag` is set
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub fn depth_geometry(&self) -> FrameGeometry {
        self.depth_geometry
    }

    pub fn color_geometry(&self) -> FrameGeometry {
        self.color_geometry
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Block until the next depth frame is available
    pub fn wait_next_depth_frame(&mut self) -> SessionResult<FrameLease<DepthFrame>> {
        let frame = self.wait_for(StreamKind::Depth, |b| b.try_acquire_depth())?;
        check_geometry(StreamKind::Depth, self.depth_geometry, frame.geometry())?;
        self.stats.depth_frames += 1;
        Ok(FrameLease {
            frame,
            _guard: LeaseGuard::acquire(&self.depth_leases),
        })
    }

    /// Block until the next color frame is available
    pub fn wait_next_color_frame(&mut self) -> SessionResult<FrameLease<ColorFrame>> {
        let frame = self.wait_for(StreamKind::Color, |b| b.try_acquire_color())?;
        check_geometry(StreamKind::Color, self.color_geometry, frame.geometry())?;
        self.stats.color_frames += 1;
        Ok(FrameLease {
            frame,
            _guard: LeaseGuard::acquire(&self.color_leases),
        })
    }

    /// Release the device. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.backend.shutdown();
        info!(
            device = %self.backend.name(),
            depth_frames = self.stats.depth_frames,
            color_frames = self.stats.color_frames,
            empty_polls = self.stats.empty_polls,
            transient_errors = self.stats.transient_errors,
            "Session closed"
        );
    }

    fn outstanding(&self, stream: StreamKind) -> usize {
        match stream {
            StreamKind::Depth => self.depth_leases.load(Ordering::SeqCst),
            StreamKind::Color => self.color_leases.load(Ordering::SeqCst),
        }
    }

    fn wait_for<T, F>(&mut self, stream: StreamKind, mut acquire: F) -> SessionResult<T>
    where
        F: FnMut(&mut (dyn SensorBackend + 'static)) -> BackendResult<Option<T>>,
    {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if self.outstanding(stream) > 0 {
            return Err(SessionError::FrameStillHeld(stream));
        }

        let started = Instant::now();
        loop {
            match acquire(self.backend.as_mut()) {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {
                    self.stats.empty_polls += 1;
                }
                Err(BackendError::Transient(msg)) => {
                    self.stats.transient_errors += 1;
                    trace!(%stream, reason = %msg, "Frame acquisition failed, retrying");
                }
                Err(e) => return Err(SessionError::Backend(e)),
            }

            if self
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
            {
                return Err(SessionError::Interrupted(stream));
            }

            if let Some(timeout) = self.frame_timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(SessionError::FrameTimeout {
                        stream,
                        waited_ms: waited.as_millis(),
                    });
                }
            }

            thread::sleep(self.poll_interval);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn check_geometry(
    stream: StreamKind,
    expected: FrameGeometry,
    actual: FrameGeometry,
) -> SessionResult<()> {
    if expected != actual {
        return Err(SessionError::GeometryMismatch {
            stream,
            expected,
            actual,
        });
    }
    Ok(())
}
