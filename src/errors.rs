// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the depth viewer
//!
//! Errors are split by layer: the backend (device driver) reports
//! [`BackendError`], the session turns those into [`SessionError`], and
//! everything surfaces to the binary as [`AppError`].

use std::fmt;

use crate::frame::FrameGeometry;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for device session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for backend (driver) operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Device session errors
    Session(SessionError),
    /// Configuration errors
    Config(ConfigError),
    /// Terminal or other display I/O errors
    Display(String),
    /// Generic error with message
    Other(String),
}

/// Which stream of the sensor an error or frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Depth,
    Color,
}

/// Device session errors
#[derive(Debug, Clone)]
pub enum SessionError {
    /// No compatible sensor is attached
    DeviceNotFound(String),
    /// The sensor was found but stream negotiation failed
    DeviceInitFailed(String),
    /// No frame arrived within the configured timeout
    FrameTimeout { stream: StreamKind, waited_ms: u128 },
    /// A frame did not match the geometry reported when the session opened
    GeometryMismatch {
        stream: StreamKind,
        expected: FrameGeometry,
        actual: FrameGeometry,
    },
    /// A frame of this stream is still leased out
    FrameStillHeld(StreamKind),
    /// The session has been closed
    Closed,
    /// A wait was cancelled through the session's cancel flag
    Interrupted(StreamKind),
    /// Non-transient backend failure while streaming
    Backend(BackendError),
}

/// Backend (device driver) errors
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system (e.g. not compiled in)
    NotAvailable(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// Failed to initialize streams
    InitializationFailed(String),
    /// A single acquisition attempt failed; the caller may retry
    Transient(String),
    /// The device stopped delivering frames
    Disconnected(String),
    /// Frame buffer does not match its declared geometry
    InvalidFrame(String),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// near must be strictly less than far
    InvalidDepthRange { near_mm: u16, far_mm: u16 },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Session(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Display(msg) => write!(f, "Display error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Depth => write!(f, "depth"),
            StreamKind::Color => write!(f, "color"),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::DeviceNotFound(msg) => {
                write!(f, "Depth sensor could not be found: {}", msg)
            }
            SessionError::DeviceInitFailed(msg) => {
                write!(f, "Depth sensor initialization failed: {}", msg)
            }
            SessionError::FrameTimeout { stream, waited_ms } => {
                write!(f, "No {} frame after {} ms", stream, waited_ms)
            }
            SessionError::GeometryMismatch {
                stream,
                expected,
                actual,
            } => write!(
                f,
                "Unexpected {} frame geometry: expected {}, got {}",
                stream, expected, actual
            ),
            SessionError::FrameStillHeld(stream) => {
                write!(f, "Previous {} frame has not been released", stream)
            }
            SessionError::Closed => write!(f, "Session is closed"),
            SessionError::Interrupted(stream) => {
                write!(f, "Interrupted while waiting for a {} frame", stream)
            }
            SessionError::Backend(e) => write!(f, "Backend error: {}", e),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::Transient(msg) => write!(f, "Frame not acquired: {}", msg),
            BackendError::Disconnected(msg) => write!(f, "Device disconnected: {}", msg),
            BackendError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDepthRange { near_mm, far_mm } => write!(
                f,
                "near ({} mm) must be less than far ({} mm)",
                near_mm, far_mm
            ),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SessionError {}
impl std::error::Error for BackendError {}
impl std::error::Error for ConfigError {}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

/// Startup failures keep their own variants so callers can tell a missing
/// sensor from a broken one; everything else is a streaming failure.
impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DeviceNotFound(msg) | BackendError::NotAvailable(msg) => {
                SessionError::DeviceNotFound(msg)
            }
            BackendError::InitializationFailed(msg) => SessionError::DeviceInitFailed(msg),
            other => SessionError::Backend(other),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Display(err.to_string())
    }
}
