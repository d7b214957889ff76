// Support utilities for WASM bindings
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

/// Parse a JSON config with defaults.
/// Returns the deserialized config, falling back to the default value when
/// the config is empty or does not parse.
pub fn parse_with_defaults<T: DeserializeOwned + Default>(config_json: &str) -> T {
    if config_json.trim().is_empty() || config_json == "{}" {
        T::default()
    } else {
        serde_json::from_str::<T>(config_json).unwrap_or_else(|_| T::default())
    }
}

/// Map any displayable core error onto a JS exception value.
pub fn to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}
