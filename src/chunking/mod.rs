//! Sliding-window slicing of transcripts.
//!
//! Windows are laid over a fixed timeline starting at zero, not over segment
//! boundaries, so consecutive windows overlap by `window_size - step_size`.

mod sliding;

pub use sliding::window;

use crate::config::WindowingSettings;
use crate::error::{Result, VidsearchError};
use serde::{Deserialize, Serialize};

/// A fixed-duration slice of a transcript; the unit of embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// First contributing segment's start, clamped up to the window's nominal start.
    pub start: f64,
    /// Nominal window end. May lie past the end of the recording.
    pub end: f64,
    /// Overlapping segments' text joined by single spaces. Never empty.
    pub text: String,
}

/// Window size and step, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    pub window_size: f64,
    pub step_size: f64,
}

impl WindowConfig {
    /// Create a validated configuration.
    pub fn new(window_size: f64, step_size: f64) -> Result<Self> {
        if !(window_size.is_finite() && window_size > 0.0) {
            return Err(VidsearchError::InvalidInput(format!(
                "window size must be positive, got {}",
                window_size
            )));
        }
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(VidsearchError::InvalidInput(format!(
                "step size must be positive, got {}",
                step_size
            )));
        }

        Ok(Self {
            window_size,
            step_size,
        })
    }
}

impl Default for WindowConfig {
    /// 30 second windows every 15 seconds (50% overlap).
    fn default() -> Self {
        Self {
            window_size: 30.0,
            step_size: 15.0,
        }
    }
}

impl TryFrom<&WindowingSettings> for WindowConfig {
    type Error = VidsearchError;

    fn try_from(settings: &WindowingSettings) -> Result<Self> {
        Self::new(settings.window_seconds, settings.step_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_config_validation() {
        assert!(WindowConfig::new(30.0, 15.0).is_ok());
        assert!(WindowConfig::new(0.0, 15.0).is_err());
        assert!(WindowConfig::new(30.0, -1.0).is_err());
        assert!(WindowConfig::new(f64::INFINITY, 15.0).is_err());
        assert!(WindowConfig::new(30.0, f64::NAN).is_err());
    }

    #[test]
    fn test_window_config_from_settings() {
        let config = WindowConfig::try_from(&WindowingSettings::default()).unwrap();
        assert_eq!(config, WindowConfig::default());
    }
}
