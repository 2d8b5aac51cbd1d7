//! Camera acquisition constraints.
//!
//! The constraints describe what the challenge asks of the device: which
//! camera to face, the ideal frame size, and the bounds on the asynchronous
//! waits around a capture.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConfigError;

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front camera, pointed at the person logging in.
    #[default]
    User,
    /// Rear camera.
    Environment,
}

/// Constraints for acquiring a camera and taking a challenge capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    /// Preferred camera facing.
    pub facing: Facing,
    /// Ideal frame width in pixels. Devices may deliver a different size.
    pub width: u32,
    /// Ideal frame height in pixels.
    pub height: u32,
    /// JPEG quality for the encoded capture (1-100).
    pub jpeg_quality: u8,
    /// Upper bound on waiting for the first usable frame.
    pub ready_timeout_ms: u64,
    /// Pause between the stream becoming ready and the capture, so the
    /// sensor can settle exposure and focus.
    pub focus_delay_ms: u64,
    /// Pause between shots of a multi-frame capture.
    pub burst_interval_ms: u64,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing: Facing::User,
            width: 640,
            height: 480,
            jpeg_quality: 80,
            ready_timeout_ms: 5_000,
            focus_delay_ms: 500,
            burst_interval_ms: 300,
        }
    }
}

impl CaptureConstraints {
    /// Creates constraints with the specified ideal dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Bound on the ready wait.
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Settle time before a challenge capture.
    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    /// Pause between burst shots.
    pub fn burst_interval(&self) -> Duration {
        Duration::from_millis(self.burst_interval_ms)
    }

    /// Validates the constraint values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        if self.ready_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("capture.ready_timeout_ms"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_valid() {
        let constraints = CaptureConstraints::default();
        assert!(constraints.validate().is_ok());
        assert_eq!(constraints.facing, Facing::User);
        assert_eq!(constraints.ready_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let constraints = CaptureConstraints::with_dimensions(0, 480);
        assert!(matches!(
            constraints.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_quality_out_of_range() {
        let constraints = CaptureConstraints {
            jpeg_quality: 101,
            ..Default::default()
        };
        assert!(matches!(
            constraints.validate(),
            Err(ConfigError::InvalidQuality(101))
        ));
    }

    #[test]
    fn test_zero_ready_timeout_invalid() {
        let constraints = CaptureConstraints {
            ready_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            constraints.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }
}
