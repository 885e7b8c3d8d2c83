#![forbid(unsafe_code)]

//! `wasm-bindgen` surface for JavaScript hosts.
//!
//! ```js
//! const bridge = new TooltipBridge();
//! bridge.register(3, "Backup duration in hours");
//! el.onmouseover = (e) => bridge.pushInput(JSON.stringify(
//!   { kind: "pointer_enter", target: 3, x: e.clientX, y: e.clientY }));
//! for (const cmd of JSON.parse(bridge.drainCommands())) apply(cmd);
//! ```

use hovertip_core::{TargetId, TooltipConfig};
use wasm_bindgen::prelude::*;

use crate::input_parser::{parse_host_input, timer_id};
use crate::{WebTooltipHost, encode_commands};

/// JS handle owning one tooltip host.
#[wasm_bindgen]
pub struct TooltipBridge {
    host: WebTooltipHost,
}

#[wasm_bindgen]
impl TooltipBridge {
    /// Create a bridge with the default delays.
    #[wasm_bindgen(constructor)]
    pub fn new() -> TooltipBridge {
        Self {
            host: WebTooltipHost::default(),
        }
    }

    /// Create a bridge with custom show/hide delays in milliseconds.
    #[wasm_bindgen(js_name = withDelays)]
    pub fn with_delays(show_delay_ms: u32, hide_delay_ms: u32) -> Result<TooltipBridge, JsValue> {
        let config = TooltipConfig {
            show_delay_ms: u64::from(show_delay_ms),
            hide_delay_ms: u64::from(hide_delay_ms),
            ..TooltipConfig::default()
        }
        .validated()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            host: WebTooltipHost::new(config),
        })
    }

    /// Register an element id with its tip. Returns `false` if already known.
    pub fn register(&mut self, target: u32, tip: String) -> bool {
        !self.host.register(TargetId(target), tip).is_ignored()
    }

    /// Remove an element id.
    pub fn unregister(&mut self, target: u32) -> bool {
        !self.host.unregister(TargetId(target)).is_ignored()
    }

    /// Replace an element's tip text.
    #[wasm_bindgen(js_name = setTip)]
    pub fn set_tip(&mut self, target: u32, tip: String) -> bool {
        !self.host.set_tip(TargetId(target), tip).is_ignored()
    }

    /// Forward one JSON-encoded host signal.
    #[wasm_bindgen(js_name = pushInput)]
    pub fn push_input(&mut self, json: &str) -> Result<(), JsValue> {
        let input = parse_host_input(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(input) = input {
            self.host.handle(input);
        }
        Ok(())
    }

    /// Report that a `set_timeout` command's timer expired.
    ///
    /// Takes the id as a JS number, with the same checks as the `timer`
    /// field accepted by `pushInput`.
    #[wasm_bindgen(js_name = timerFired)]
    pub fn timer_fired(&mut self, timer: f64) -> Result<(), JsValue> {
        let timer = timer_id(timer).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.host.timer_fired(timer);
        Ok(())
    }

    /// Take queued commands as a JSON array string.
    #[wasm_bindgen(js_name = drainCommands)]
    pub fn drain_commands(&mut self) -> Result<String, JsValue> {
        let commands = self.host.drain_commands();
        encode_commands(&commands).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for TooltipBridge {
    fn default() -> Self {
        Self::new()
    }
}
