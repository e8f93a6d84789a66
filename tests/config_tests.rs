// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use depthview::ViewerConfig;
use depthview::config::DepthRange;
use depthview::errors::ConfigError;
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = ViewerConfig::default();

    assert_eq!(config.depth_range.near(), 500);
    assert_eq!(config.depth_range.far(), 1500);
    assert_eq!(config.poll_interval, Duration::from_millis(1));
    assert_eq!(config.key_poll_interval, Duration::from_millis(10));
    assert_eq!(
        config.frame_timeout, None,
        "Frames should be waited for indefinitely by default"
    );
    assert_eq!(config.max_frames, None);
}

#[test]
fn test_equal_near_and_far_rejected() {
    assert_eq!(
        DepthRange::new(800, 800),
        Err(ConfigError::InvalidDepthRange {
            near_mm: 800,
            far_mm: 800
        })
    );
}

#[test]
fn test_depth_range_json_roundtrip_validates() {
    let json = serde_json::to_string(&DepthRange::new(400, 4000).unwrap()).unwrap();
    assert_eq!(json, r#"{"near_mm":400,"far_mm":4000}"#);

    let parsed: DepthRange = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, DepthRange::new(400, 4000).unwrap());

    let inverted: Result<DepthRange, _> = serde_json::from_str(r#"{"near_mm":1500,"far_mm":500}"#);
    assert!(
        inverted.is_err(),
        "An inverted range must not deserialize"
    );
}
