//! Host collaborators: the gateway primitive and the page events the capture adapters listen
//! to.
//!
//! [`HeadlessPlatform`] keeps everything in memory and lets the host drive page events by hand.
//! With the `wasm-web` feature on `wasm32`, [`browser_platform`] wires the same hooks to the
//! real `window`.

use std::sync::Arc;

use serde::Serialize;

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub mod browser;
pub mod environment;
pub mod gateway;
pub mod headless;

pub use gateway::{Gateway, GatewayCall, RecordingGateway};
pub use headless::HeadlessPlatform;

use crate::analytics::error::AnalyticsResult;

/// Details of an unhandled script error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorDetails {
    pub message: String,
    pub url: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// The clicked element and pointer position of a click.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClickDetails {
    pub id: String,
    #[serde(rename = "className")]
    pub class_name: String,
    pub x: i32,
    pub y: i32,
}

pub type ErrorHandler = Arc<dyn Fn(&ErrorDetails) + Send + Sync + 'static>;
pub type ClickListener = Arc<dyn Fn(&ClickDetails) + Send + Sync + 'static>;
/// Receives the path navigated to.
pub type NavigationListener = Arc<dyn Fn(&str) + Send + Sync + 'static>;

pub trait Platform: Send + Sync {
    fn gateway(&self) -> &dyn Gateway;

    /// Path of the current page location.
    fn current_path(&self) -> String;

    /// Installs the unhandled-error handler, replacing any previous one.
    fn set_error_handler(&self, handler: Option<ErrorHandler>);

    /// Installs the page-wide click listener; `None` removes the installed one.
    fn set_click_listener(&self, listener: Option<ClickListener>);

    /// Registers a listener for programmatic navigations. Subscriptions last for the lifetime
    /// of the page.
    fn subscribe_navigation(&self, listener: NavigationListener);
}

/// Returns the platform backed by the current browser window.
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub fn browser_platform() -> AnalyticsResult<Arc<dyn Platform>> {
    browser::BrowserPlatform::detect().map(|platform| Arc::new(platform) as Arc<dyn Platform>)
}

/// Returns the platform backed by the current browser window.
///
/// Outside a browser build there is no window, so this always fails with
/// `analytics/unsupported-environment`.
#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
pub fn browser_platform() -> AnalyticsResult<Arc<dyn Platform>> {
    Err(crate::analytics::error::unsupported_environment())
}
