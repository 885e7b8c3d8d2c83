#![forbid(unsafe_code)]

//! Tooltip timing and placement configuration.
//!
//! # Loading
//!
//! ```toml
//! # hovertip.toml
//! show_delay_ms = 500
//! hide_delay_ms = 200
//! offset_x = 15
//! offset_y = 15
//! ```
//!
//! ```rust,ignore
//! let config = TooltipConfig::from_toml_file("hovertip.toml")?.validated()?;
//! ```
//!
//! Missing keys fall back to [`TooltipConfig::default`], which matches the
//! console's built-in behavior.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use core::time::Duration;

/// Default show delay in milliseconds.
pub const DEFAULT_SHOW_DELAY_MS: u64 = 500;
/// Default hide delay in milliseconds.
pub const DEFAULT_HIDE_DELAY_MS: u64 = 200;
/// Default delay between pointer-enter and the popup appearing.
pub const SHOW_DELAY: Duration = Duration::from_millis(DEFAULT_SHOW_DELAY_MS);
/// Default delay between pointer-leave and the popup disappearing.
pub const HIDE_DELAY: Duration = Duration::from_millis(DEFAULT_HIDE_DELAY_MS);
/// Default popup offset to the right of the pointer.
pub const X_OFFSET: i32 = 15;
/// Default popup offset below the pointer.
pub const Y_OFFSET: i32 = 15;

/// Upper bound accepted by [`TooltipConfig::validate`] for either delay.
pub const MAX_DELAY_MS: u64 = 60_000;
/// Upper bound accepted by [`TooltipConfig::validate`] for offset magnitude.
pub const MAX_OFFSET_PX: i32 = 10_000;

/// Tooltip scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TooltipConfig {
    /// Milliseconds from pointer-enter to show. Default: 500.
    pub show_delay_ms: u64,
    /// Milliseconds from pointer-leave to hide. Default: 200.
    pub hide_delay_ms: u64,
    /// Pixels to the right of the pointer. Default: 15.
    pub offset_x: i32,
    /// Pixels below the pointer. Default: 15.
    pub offset_y: i32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: DEFAULT_SHOW_DELAY_MS,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
            offset_x: X_OFFSET,
            offset_y: Y_OFFSET,
        }
    }
}

impl TooltipConfig {
    /// Show delay as a [`Duration`].
    #[must_use]
    pub const fn show_delay(&self) -> Duration {
        Duration::from_millis(self.show_delay_ms)
    }

    /// Hide delay as a [`Duration`].
    #[must_use]
    pub const fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, TooltipConfigError> {
        toml::from_str(s).map_err(TooltipConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, TooltipConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TooltipConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, TooltipConfigError> {
        serde_json::from_str(s).map_err(TooltipConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TooltipConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TooltipConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check that all values are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.show_delay_ms > MAX_DELAY_MS {
            errors.push(format!(
                "show_delay_ms must be <= {MAX_DELAY_MS}, got {}",
                self.show_delay_ms
            ));
        }
        if self.hide_delay_ms > MAX_DELAY_MS {
            errors.push(format!(
                "hide_delay_ms must be <= {MAX_DELAY_MS}, got {}",
                self.hide_delay_ms
            ));
        }
        if self.offset_x.unsigned_abs() > MAX_OFFSET_PX.unsigned_abs() {
            errors.push(format!(
                "offset_x must be within ±{MAX_OFFSET_PX}, got {}",
                self.offset_x
            ));
        }
        if self.offset_y.unsigned_abs() > MAX_OFFSET_PX.unsigned_abs() {
            errors.push(format!(
                "offset_y must be within ±{MAX_OFFSET_PX}, got {}",
                self.offset_y
            ));
        }

        errors
    }

    /// Return `self` if valid, otherwise every validation problem.
    pub fn validated(self) -> Result<Self, TooltipConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(TooltipConfigError::Validation(errors))
        }
    }

    /// Format as a JSONL line for structured logging.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"schema":"hovertip-config-v1","show_delay_ms":{},"hide_delay_ms":{},"offset_x":{},"offset_y":{}}}"#,
            self.show_delay_ms, self.hide_delay_ms, self.offset_x, self.offset_y,
        )
    }
}

/// Errors from loading or validating a [`TooltipConfig`].
#[derive(Debug)]
pub enum TooltipConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for TooltipConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for TooltipConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_console_constants() {
        let config = TooltipConfig::default();
        assert_eq!(config.show_delay(), Duration::from_millis(500));
        assert_eq!(config.hide_delay(), Duration::from_millis(200));
        assert_eq!(config.show_delay(), SHOW_DELAY);
        assert_eq!(config.hide_delay(), HIDE_DELAY);
        assert_eq!((config.offset_x, config.offset_y), (15, 15));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validate_reports_every_problem() {
        let config = TooltipConfig {
            show_delay_ms: MAX_DELAY_MS + 1,
            hide_delay_ms: MAX_DELAY_MS + 1,
            offset_x: -(MAX_OFFSET_PX + 1),
            offset_y: MAX_OFFSET_PX + 1,
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("show_delay_ms"));
        assert!(errors[2].starts_with("offset_x"));
    }

    #[test]
    fn validated_wraps_errors() {
        let config = TooltipConfig {
            hide_delay_ms: 120_000,
            ..TooltipConfig::default()
        };
        let err = config.validated().unwrap_err();
        assert!(matches!(err, TooltipConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().starts_with("validation errors: hide_delay_ms"));
    }

    #[test]
    fn zero_delays_are_valid() {
        let config = TooltipConfig {
            show_delay_ms: 0,
            hide_delay_ms: 0,
            ..TooltipConfig::default()
        };
        assert!(config.validated().is_ok());
    }

    #[test]
    fn jsonl_has_schema_tag() {
        let line = TooltipConfig::default().to_jsonl();
        assert!(line.starts_with(r#"{"schema":"hovertip-config-v1""#));
        assert!(line.contains(r#""show_delay_ms":500"#));
    }

    #[cfg(feature = "config")]
    mod loading {
        use super::*;
        use std::io::Write;

        #[test]
        fn partial_toml_uses_defaults() {
            let config = TooltipConfig::from_toml_str("show_delay_ms = 250\n").unwrap();
            assert_eq!(config.show_delay_ms, 250);
            assert_eq!(config.hide_delay_ms, 200);
            assert_eq!(config.offset_x, 15);
        }

        #[test]
        fn json_round_trip() {
            let original = TooltipConfig {
                show_delay_ms: 300,
                hide_delay_ms: 100,
                offset_x: 8,
                offset_y: -4,
            };
            let json = serde_json::to_string(&original).unwrap();
            assert_eq!(TooltipConfig::from_json_str(&json).unwrap(), original);
        }

        #[test]
        fn malformed_toml_is_reported() {
            let err = TooltipConfig::from_toml_str("show_delay_ms = \"soon\"").unwrap_err();
            assert!(matches!(err, TooltipConfigError::Toml(_)));
        }

        #[test]
        fn loads_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "hide_delay_ms = 50").unwrap();
            let config = TooltipConfig::from_toml_file(file.path()).unwrap();
            assert_eq!(config.hide_delay_ms, 50);
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = TooltipConfig::from_json_file("/nonexistent/hovertip.json").unwrap_err();
            assert!(matches!(err, TooltipConfigError::Io(_)));
            assert!(std::error::Error::source(&err).is_some());
        }
    }
}
