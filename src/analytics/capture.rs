//! Passive capture: unhandled errors, clicks and navigations turned into hits.

use std::sync::Arc;

use crate::analytics::api::Sparga;
use crate::analytics::constants::{CLICK_EVENT_ACTION, CLICK_EVENT_CATEGORY};
use crate::analytics::hits::FieldValue;
use crate::analytics::logger::LOGGER;
use crate::platform::{ClickDetails, ErrorDetails, Platform};

/// Builds the multi-line exception description. Details that are missing, empty or zero are
/// left out.
pub fn format_exception(details: &ErrorDetails) -> String {
    let mut formatted = format!("Error: {}", details.message);
    if let Some(url) = details.url.as_deref().filter(|url| !url.is_empty()) {
        formatted.push_str(&format!("\nURL: {url}"));
    }
    if let Some(line) = details.line.filter(|line| *line != 0) {
        formatted.push_str(&format!("\nLine: {line}"));
    }
    if let Some(column) = details.column.filter(|column| *column != 0) {
        formatted.push_str(&format!("\nColumn: {column}"));
    }
    formatted
}

/// Serializes the click into the JSON label sent with the click event.
pub fn click_label(details: &ClickDetails) -> String {
    serde_json::to_string(details).unwrap_or_default()
}

pub(crate) fn install_exception_adapter(sparga: &Sparga, platform: &dyn Platform, enabled: bool) {
    if !enabled {
        return;
    }
    let sparga = sparga.clone();
    platform.set_error_handler(Some(Arc::new(move |details: &ErrorDetails| {
        sparga.send_exception(&format_exception(details), None, None);
    })));
}

pub(crate) fn install_click_adapter(sparga: &Sparga, platform: &dyn Platform, enabled: bool) {
    if !enabled {
        platform.set_click_listener(None);
        return;
    }
    let sparga = sparga.clone();
    platform.set_click_listener(Some(Arc::new(move |details: &ClickDetails| {
        let label = click_label(details);
        sparga.send_event(
            CLICK_EVENT_CATEGORY,
            CLICK_EVENT_ACTION,
            Some(label.as_str()),
            FieldValue::Null,
            None,
        );
    })));
}

/// Sends the landing pageview, which no navigation reports, then one per navigation.
pub(crate) fn install_navigation_adapter(sparga: &Sparga, platform: &dyn Platform) {
    sparga.send_page_view(&platform.current_path(), None);

    let sparga = sparga.clone();
    platform.subscribe_navigation(Arc::new(move |path: &str| {
        sparga.send_page_view(path, None);
    }));
    LOGGER.debug("pageview capture subscribed to navigation");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_description_includes_present_details() {
        let details = ErrorDetails {
            message: "x is undefined".into(),
            url: Some("https://app.example/main.js".into()),
            line: Some(12),
            column: Some(4),
        };
        assert_eq!(
            format_exception(&details),
            "Error: x is undefined\nURL: https://app.example/main.js\nLine: 12\nColumn: 4"
        );
    }

    #[test]
    fn exception_description_skips_empty_details() {
        let details = ErrorDetails {
            message: "boom".into(),
            url: Some(String::new()),
            line: Some(0),
            column: None,
        };
        assert_eq!(format_exception(&details), "Error: boom");
    }

    #[test]
    fn click_label_is_json() {
        let details = ClickDetails {
            id: "cta".into(),
            class_name: "hero".into(),
            x: 3,
            y: 4,
        };
        assert_eq!(
            click_label(&details),
            r#"{"id":"cta","className":"hero","x":3,"y":4}"#
        );
    }
}
