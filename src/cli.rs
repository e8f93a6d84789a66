// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Running the viewer (terminal or headless)
//! - Listing available sensors

use clap::Args;
use depthview::backends::{DeviceDescriptor, SourceKind, list_devices};
use depthview::config::{DepthRange, ViewerConfig};
use depthview::constants::depth::{DEPTH_FAR_MM, DEPTH_NEAR_MM};
use depthview::display::{HeadlessDisplay, TerminalDisplay};
use depthview::errors::{AppError, AppResult};
use depthview::session::open_session;
use depthview::viewer::{RunSummary, Viewer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// Viewer options; the defaults reproduce the plain `depthview` behavior
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Sensor to open
    #[arg(long, value_enum, default_value_t = SourceKind::Kinect)]
    pub source: SourceKind,

    /// Near edge of the depth window in millimeters
    #[arg(long, default_value_t = DEPTH_NEAR_MM)]
    pub near: u16,

    /// Far edge of the depth window in millimeters
    #[arg(long, default_value_t = DEPTH_FAR_MM)]
    pub far: u16,

    /// Fail if a frame takes longer than this to arrive (default: wait forever)
    #[arg(long, value_name = "MS")]
    pub frame_timeout_ms: Option<u64>,

    /// Run without a terminal display (quit with Ctrl+C or --max-frames)
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many depth+color iterations
    #[arg(long, value_name = "N")]
    pub max_frames: Option<u64>,
}

impl ViewArgs {
    pub fn to_config(&self) -> AppResult<ViewerConfig> {
        Ok(ViewerConfig {
            depth_range: DepthRange::new(self.near, self.far)?,
            frame_timeout: self.frame_timeout_ms.map(Duration::from_millis),
            max_frames: self.max_frames,
            ..ViewerConfig::default()
        })
    }
}

/// Open the sensor and run the viewer until quit
pub fn run_viewer(args: &ViewArgs) -> AppResult<()> {
    let config = args.to_config()?;
    let quit = install_quit_handler()?;

    let mut session = open_session(args.source, &config)?.with_cancel(Arc::clone(&quit));

    let summary = if args.headless {
        let mut viewer = Viewer::new(HeadlessDisplay::new(), &config);
        viewer.run(&mut session, &quit)?
    } else {
        let mut viewer = Viewer::new(TerminalDisplay::new()?, &config);
        viewer.run(&mut session, &quit)?
    };

    session.close();
    log_summary(&summary, session.stats().empty_polls);
    Ok(())
}

/// List all sensors a session could be opened on
pub fn list_sensors(json: bool) -> AppResult<()> {
    let devices = list_devices();

    if json {
        println!("{}", devices_json(&devices)?);
        return Ok(());
    }

    println!("Available sensors:");
    println!();
    for device in &devices {
        println!("  [{}] {}", device.index, device.name);
        if let Some(serial) = &device.serial {
            println!("      Serial: {}", serial);
        }
        println!("      Depth: {}  Color: {}", device.depth, device.color);
        println!();
    }

    Ok(())
}

fn devices_json(devices: &[DeviceDescriptor]) -> AppResult<String> {
    serde_json::to_string_pretty(devices)
        .map_err(|e| AppError::Other(format!("Failed to encode device list: {}", e)))
}

/// Ctrl+C sets the quit flag, which also cancels a pending frame wait so
/// the session is closed on the way out.
fn install_quit_handler() -> AppResult<Arc<AtomicBool>> {
    let quit = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&quit);
    ctrlc::set_handler(move || {
        if !flag.swap(true, Ordering::SeqCst) {
            info!("Interrupt received, stopping");
        }
    })
    .map_err(|e| AppError::Other(format!("Failed to install Ctrl+C handler: {}", e)))?;
    Ok(quit)
}

fn log_summary(summary: &RunSummary, empty_polls: u64) {
    let secs = summary.elapsed.as_secs_f64();
    let fps = if secs > 0.0 {
        summary.iterations as f64 / secs
    } else {
        0.0
    };
    info!(
        iterations = summary.iterations,
        fps = %format!("{:.1}", fps),
        empty_polls,
        "Run finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use depthview::errors::ConfigError;
    use depthview::frame::FrameGeometry;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        view: ViewArgs,
    }

    fn parse(args: &[&str]) -> ViewArgs {
        TestCli::parse_from(std::iter::once("depthview").chain(args.iter().copied())).view
    }

    #[test]
    fn test_no_arguments_use_defaults() {
        let args = parse(&[]);
        assert_eq!(args.source, SourceKind::Kinect);
        assert!(!args.headless);

        let config = args.to_config().unwrap();
        assert_eq!(config.depth_range, DepthRange::default());
        assert_eq!(config.frame_timeout, None);
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn test_flags_map_to_config() {
        let args = parse(&[
            "--source",
            "synthetic",
            "--near",
            "300",
            "--far",
            "4000",
            "--frame-timeout-ms",
            "250",
            "--max-frames",
            "12",
        ]);
        assert_eq!(args.source, SourceKind::Synthetic);

        let config = args.to_config().unwrap();
        assert_eq!(config.depth_range, DepthRange::new(300, 4000).unwrap());
        assert_eq!(config.frame_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.max_frames, Some(12));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let args = parse(&["--near", "1500", "--far", "500"]);
        assert!(matches!(
            args.to_config(),
            Err(AppError::Config(ConfigError::InvalidDepthRange {
                near_mm: 1500,
                far_mm: 500
            }))
        ));
    }

    #[test]
    fn test_device_list_json_shape() {
        let devices = vec![DeviceDescriptor {
            index: 0,
            name: "Test sensor".to_string(),
            source: SourceKind::Synthetic,
            serial: None,
            depth: FrameGeometry::new(512, 424),
            color: FrameGeometry::new(1920, 1080),
        }];

        let json: serde_json::Value = serde_json::from_str(&devices_json(&devices).unwrap()).unwrap();
        let entry = &json[0];
        assert_eq!(entry["index"], 0);
        assert_eq!(entry["name"], "Test sensor");
        assert_eq!(entry["source"], "synthetic");
        assert!(entry["serial"].is_null());
        assert_eq!(entry["depth"]["width"], 512);
        assert_eq!(entry["depth"]["height"], 424);
        assert_eq!(entry["color"]["width"], 1920);
        assert_eq!(entry["color"]["height"], 1080);
    }
}
