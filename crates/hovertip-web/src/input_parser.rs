#![forbid(unsafe_code)]

//! JSON input parser for host-encoded tooltip signals.
//!
//! The JS host serializes DOM events as small JSON objects:
//!
//! ```json
//! {"kind": "pointer_enter", "target": 3, "x": 10, "y": 20}
//! {"kind": "pointer_leave", "target": 3}
//! {"kind": "popup_enter"}
//! {"kind": "timer", "timer": 7}
//! {"kind": "scroll", "x": 0, "y": 120}
//! ```
//!
//! [`parse_host_input`] turns one object into a [`TooltipInput`]. Kinds with
//! no tooltip meaning return `Ok(None)` so hosts can forward every event
//! without filtering.
//!
//! Numbers arrive as JS doubles. Coordinates are rounded to the nearest pixel
//! and saturate at the `i32` range; timer ids must be non-negative integers
//! no larger than `Number.MAX_SAFE_INTEGER`.

use hovertip_core::TargetId;
use serde::Deserialize;

use crate::TooltipInput;

/// Errors from parsing encoded host input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// A numeric field holds a value that cannot be used.
    InvalidNumber(&'static str),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::InvalidNumber(field) => write!(f, "invalid number in field: {field}"),
        }
    }
}

impl std::error::Error for InputParseError {}

#[derive(Debug, Deserialize)]
struct RawInput {
    kind: String,
    #[serde(default)]
    target: Option<u32>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    timer: Option<f64>,
}

/// Largest integer a JS number represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Parse one JSON-encoded host signal.
///
/// Returns `Err` for malformed JSON or when a recognized kind lacks a
/// required field.
pub fn parse_host_input(json: &str) -> Result<Option<TooltipInput>, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;

    let input = match raw.kind.as_str() {
        "pointer_enter" => TooltipInput::PointerEnter {
            target: require_target(&raw)?,
            x: require_coord(raw.x, "x")?,
            y: require_coord(raw.y, "y")?,
        },
        "pointer_leave" => TooltipInput::PointerLeave {
            target: require_target(&raw)?,
        },
        "popup_enter" => TooltipInput::PopupEnter,
        "popup_leave" => TooltipInput::PopupLeave,
        "popup_click" => TooltipInput::PopupClick,
        "timer" => TooltipInput::TimerFired {
            timer: timer_id(raw.timer.ok_or(InputParseError::MissingField("timer"))?)?,
        },
        "scroll" => TooltipInput::Scroll {
            x: coord(raw.x.unwrap_or(0.0), "x")?,
            y: coord(raw.y.unwrap_or(0.0), "y")?,
        },
        _ => return Ok(None),
    };
    Ok(Some(input))
}

fn require_target(raw: &RawInput) -> Result<TargetId, InputParseError> {
    raw.target
        .map(TargetId)
        .ok_or(InputParseError::MissingField("target"))
}

fn require_coord(value: Option<f64>, field: &'static str) -> Result<i32, InputParseError> {
    coord(value.ok_or(InputParseError::MissingField(field))?, field)
}

fn coord(value: f64, field: &'static str) -> Result<i32, InputParseError> {
    if !value.is_finite() {
        return Err(InputParseError::InvalidNumber(field));
    }
    Ok(value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

/// Convert a JS number carrying a timer id back to the id handed out in a
/// `set_timeout` command.
pub fn timer_id(value: f64) -> Result<u64, InputParseError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > MAX_SAFE_INTEGER {
        return Err(InputParseError::InvalidNumber("timer"));
    }
    Ok(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_enter() {
        let input = parse_host_input(r#"{"kind":"pointer_enter","target":3,"x":10,"y":-4}"#);
        assert_eq!(
            input,
            Ok(Some(TooltipInput::PointerEnter {
                target: TargetId(3),
                x: 10,
                y: -4
            }))
        );
    }

    #[test]
    fn pointer_enter_requires_coordinates() {
        let input = parse_host_input(r#"{"kind":"pointer_enter","target":3,"x":10}"#);
        assert_eq!(input, Err(InputParseError::MissingField("y")));
    }

    #[test]
    fn pointer_leave_requires_target() {
        let input = parse_host_input(r#"{"kind":"pointer_leave"}"#);
        assert_eq!(input, Err(InputParseError::MissingField("target")));
    }

    #[test]
    fn popup_signals() {
        assert_eq!(
            parse_host_input(r#"{"kind":"popup_enter"}"#),
            Ok(Some(TooltipInput::PopupEnter))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"popup_leave"}"#),
            Ok(Some(TooltipInput::PopupLeave))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"popup_click"}"#),
            Ok(Some(TooltipInput::PopupClick))
        );
    }

    #[test]
    fn timer_and_scroll() {
        assert_eq!(
            parse_host_input(r#"{"kind":"timer","timer":7}"#),
            Ok(Some(TooltipInput::TimerFired { timer: 7 }))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"scroll","y":120}"#),
            Ok(Some(TooltipInput::Scroll { x: 0, y: 120 }))
        );
    }

    #[test]
    fn fractional_pointer_coordinates_round() {
        assert_eq!(
            parse_host_input(r#"{"kind":"pointer_enter","target":3,"x":10.25,"y":20.5}"#),
            Ok(Some(TooltipInput::PointerEnter {
                target: TargetId(3),
                x: 10,
                y: 21
            }))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"pointer_enter","target":3,"x":-4.6,"y":0.49}"#),
            Ok(Some(TooltipInput::PointerEnter {
                target: TargetId(3),
                x: -5,
                y: 0
            }))
        );
    }

    #[test]
    fn fractional_scroll_offsets_round() {
        assert_eq!(
            parse_host_input(r#"{"kind":"scroll","x":0,"y":120.5}"#),
            Ok(Some(TooltipInput::Scroll { x: 0, y: 121 }))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"scroll","x":33.3333}"#),
            Ok(Some(TooltipInput::Scroll { x: 33, y: 0 }))
        );
    }

    #[test]
    fn huge_coordinates_saturate() {
        assert_eq!(
            parse_host_input(r#"{"kind":"scroll","x":1e12,"y":-1e12}"#),
            Ok(Some(TooltipInput::Scroll {
                x: i32::MAX,
                y: i32::MIN
            }))
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert_eq!(coord(f64::NAN, "x"), Err(InputParseError::InvalidNumber("x")));
        assert_eq!(
            coord(f64::INFINITY, "y"),
            Err(InputParseError::InvalidNumber("y"))
        );
        assert_eq!(
            coord(f64::NEG_INFINITY, "y").unwrap_err().to_string(),
            "invalid number in field: y"
        );
    }

    #[test]
    fn timer_ids_accept_js_integers_only() {
        assert_eq!(timer_id(7.0), Ok(7));
        assert_eq!(timer_id(4_294_967_296.0), Ok(4_294_967_296));
        assert_eq!(timer_id(MAX_SAFE_INTEGER), Ok(9_007_199_254_740_991));
        for bad in [-1.0, 1.5, f64::NAN, f64::INFINITY, MAX_SAFE_INTEGER * 2.0] {
            assert_eq!(timer_id(bad), Err(InputParseError::InvalidNumber("timer")));
        }
        assert_eq!(
            parse_host_input(r#"{"kind":"timer","timer":2.5}"#),
            Err(InputParseError::InvalidNumber("timer"))
        );
    }

    #[test]
    fn unknown_kind_is_none() {
        assert_eq!(parse_host_input(r#"{"kind":"keydown","key":"a"}"#), Ok(None));
    }

    #[test]
    fn malformed_json() {
        let err = parse_host_input("{kind:").unwrap_err();
        assert!(matches!(err, InputParseError::Json(_)));
        assert!(err.to_string().starts_with("JSON parse error"));
    }
}
