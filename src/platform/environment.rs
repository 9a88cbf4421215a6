//! Initialization options supplied by the hosting environment.
//!
//! Sources are consulted in order: the `SPARGA_OPTIONS` variable (raw JSON), the file named by
//! `SPARGA_OPTIONS_PATH`, and in browser builds the `__SPARGA_OPTIONS__` page global.

use std::env;
use std::fs;

use crate::analytics::constants::{OPTIONS_ENV_VAR, OPTIONS_PATH_ENV_VAR};
use crate::analytics::error::{invalid_config, AnalyticsResult};
use crate::analytics::InitOptions;

/// Returns the options published by the environment, or `None` when no source is set.
///
/// A source that is present but malformed is an error rather than being skipped.
pub fn options_from_environment() -> AnalyticsResult<Option<InitOptions>> {
    if let Ok(raw) = env::var(OPTIONS_ENV_VAR) {
        return InitOptions::from_json(&raw).map(Some);
    }

    if let Ok(path) = env::var(OPTIONS_PATH_ENV_VAR) {
        let raw = fs::read_to_string(&path)
            .map_err(|err| invalid_config(format!("Unable to read {path}: {err}")))?;
        return InitOptions::from_json(&raw).map(Some);
    }

    options_from_global()
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
fn options_from_global() -> AnalyticsResult<Option<InitOptions>> {
    use wasm_bindgen::JsValue;

    use crate::analytics::constants::OPTIONS_GLOBAL;

    let global = js_sys::global();
    let value = js_sys::Reflect::get(&global, &JsValue::from_str(OPTIONS_GLOBAL))
        .map_err(|_| invalid_config(format!("Unable to read {OPTIONS_GLOBAL}")))?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let serialized = js_sys::JSON::stringify(&value)
        .ok()
        .and_then(|text| text.as_string())
        .ok_or_else(|| invalid_config(format!("{OPTIONS_GLOBAL} is not serializable")))?;
    InitOptions::from_json(&serialized).map(Some)
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
fn options_from_global() -> AnalyticsResult<Option<InitOptions>> {
    Ok(None)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::test_support::env_guard;
    use std::io::Write;

    fn clear_env() {
        env::remove_var(OPTIONS_ENV_VAR);
        env::remove_var(OPTIONS_PATH_ENV_VAR);
    }

    #[test]
    fn no_sources_yield_none() {
        let _guard = env_guard();
        clear_env();
        assert!(options_from_environment().unwrap().is_none());
    }

    #[test]
    fn reads_inline_json() {
        let _guard = env_guard();
        clear_env();
        env::set_var(OPTIONS_ENV_VAR, r#"{"gaSettings": "UA-ENV"}"#);
        let options = options_from_environment().unwrap().unwrap();
        clear_env();
        assert_eq!(options, InitOptions::from_tracking_id("UA-ENV"));
    }

    #[test]
    fn reads_json_file() {
        let _guard = env_guard();
        clear_env();
        let path = env::temp_dir().join(format!("sparga-options-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(br#"{"trackerMap": {"main": "UA-FILE"}}"#).unwrap();
        env::set_var(OPTIONS_PATH_ENV_VAR, &path);

        let options = options_from_environment().unwrap().unwrap();
        clear_env();
        let _ = fs::remove_file(&path);
        assert_eq!(options.tracker_map.unwrap().get("main"), Some("UA-FILE"));
    }

    #[test]
    fn malformed_source_is_an_error() {
        let _guard = env_guard();
        clear_env();
        env::set_var(OPTIONS_ENV_VAR, "{not json");
        let result = options_from_environment();
        clear_env();
        assert_eq!(result.unwrap_err().code_str(), "analytics/invalid-config");
    }
}
