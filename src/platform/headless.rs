use std::fmt;
use std::sync::{Mutex, RwLock};

use url::Url;

use crate::analytics::error::{invalid_config, AnalyticsResult};
use crate::platform::gateway::{Gateway, GatewayCall, RecordingGateway};
use crate::platform::{
    ClickDetails, ClickListener, ErrorDetails, ErrorHandler, NavigationListener, Platform,
};

const DEFAULT_LOCATION: &str = "http://localhost/";

/// A platform without a browser.
///
/// Gateway calls are recorded instead of reaching analytics.js, and page events are raised
/// explicitly through [`navigate`](Self::navigate), [`click`](Self::click) and
/// [`raise_error`](Self::raise_error).
pub struct HeadlessPlatform {
    gateway: RecordingGateway,
    location: Mutex<Url>,
    error_handler: RwLock<Option<ErrorHandler>>,
    click_listener: RwLock<Option<ClickListener>>,
    navigation_listeners: RwLock<Vec<NavigationListener>>,
}

impl fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessPlatform")
            .field("location", &self.location.lock().unwrap().as_str())
            .field("gateway_installed", &self.gateway.is_installed())
            .finish()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        let location = Url::parse(DEFAULT_LOCATION).expect("default location is a valid URL");
        Self::at(location)
    }

    /// Starts the page at `href`, which must be an absolute URL.
    pub fn with_location(href: &str) -> AnalyticsResult<Self> {
        let location = Url::parse(href)
            .map_err(|err| invalid_config(format!("Invalid page location {href}: {err}")))?;
        Ok(Self::at(location))
    }

    fn at(location: Url) -> Self {
        Self {
            gateway: RecordingGateway::new(),
            location: Mutex::new(location),
            error_handler: RwLock::new(None),
            click_listener: RwLock::new(None),
            navigation_listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn recorder(&self) -> &RecordingGateway {
        &self.gateway
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.gateway.calls()
    }

    pub fn take_calls(&self) -> Vec<GatewayCall> {
        self.gateway.take_calls()
    }

    pub fn location(&self) -> String {
        self.location.lock().unwrap().to_string()
    }

    /// Pushes a new location, resolved against the current one, and notifies navigation
    /// subscribers with the new path.
    pub fn navigate(&self, target: &str) -> AnalyticsResult<()> {
        let path = {
            let mut location = self.location.lock().unwrap();
            let next = location
                .join(target)
                .map_err(|err| invalid_config(format!("Invalid navigation target {target}: {err}")))?;
            *location = next;
            location.path().to_string()
        };
        let listeners = self.navigation_listeners.read().unwrap().clone();
        for listener in listeners {
            listener(&path);
        }
        Ok(())
    }

    /// Dispatches a click; returns whether a listener received it.
    pub fn click(&self, details: &ClickDetails) -> bool {
        let listener = self.click_listener.read().unwrap().clone();
        match listener {
            Some(listener) => {
                listener(details);
                true
            }
            None => false,
        }
    }

    /// Reports an unhandled error; returns whether a handler received it.
    pub fn raise_error(&self, details: &ErrorDetails) -> bool {
        let handler = self.error_handler.read().unwrap().clone();
        match handler {
            Some(handler) => {
                handler(details);
                true
            }
            None => false,
        }
    }

    pub fn has_click_listener(&self) -> bool {
        self.click_listener.read().unwrap().is_some()
    }

    pub fn has_error_handler(&self) -> bool {
        self.error_handler.read().unwrap().is_some()
    }

    pub fn navigation_subscribers(&self) -> usize {
        self.navigation_listeners.read().unwrap().len()
    }
}

impl Platform for HeadlessPlatform {
    fn gateway(&self) -> &dyn Gateway {
        &self.gateway
    }

    fn current_path(&self) -> String {
        self.location.lock().unwrap().path().to_string()
    }

    fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.error_handler.write().unwrap() = handler;
    }

    fn set_click_listener(&self, listener: Option<ClickListener>) {
        *self.click_listener.write().unwrap() = listener;
    }

    fn subscribe_navigation(&self, listener: NavigationListener) {
        self.navigation_listeners.write().unwrap().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn navigate_resolves_against_current_location() {
        let platform = HeadlessPlatform::with_location("https://shop.example/catalog/").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        platform.subscribe_navigation(Arc::new(move |path: &str| {
            sink.lock().unwrap().push(path.to_string());
        }));

        platform.navigate("shoes?color=red").unwrap();
        platform.navigate("/checkout").unwrap();

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["/catalog/shoes", "/checkout"]
        );
        assert_eq!(platform.current_path(), "/checkout");
        assert_eq!(platform.navigation_subscribers(), 1);
    }

    #[test]
    fn rejects_relative_start_location() {
        let err = HeadlessPlatform::with_location("/relative").unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-config");
    }

    #[test]
    fn events_without_listeners_are_dropped() {
        let platform = HeadlessPlatform::new();
        assert_eq!(platform.current_path(), "/");
        assert!(!platform.click(&ClickDetails::default()));
        assert!(!platform.raise_error(&ErrorDetails::new("boom")));

        platform.set_click_listener(Some(Arc::new(|_: &ClickDetails| {})));
        assert!(platform.click(&ClickDetails::default()));
        platform.set_click_listener(None);
        assert!(!platform.has_click_listener());
    }
}
