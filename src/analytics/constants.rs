/// Global name under which the analytics.js command queue is exposed.
pub(crate) const GA_GLOBAL_NAME: &str = "ga";

pub(crate) const GA_SCRIPT_URL: &str = "https://www.google-analytics.com/analytics.js";

pub(crate) const CLICK_EVENT_CATEGORY: &str = "Mouse";
pub(crate) const CLICK_EVENT_ACTION: &str = "Click";

/// Raw JSON options, read by `Sparga::init_from_environment`.
pub(crate) const OPTIONS_ENV_VAR: &str = "SPARGA_OPTIONS";
/// Path of a JSON file holding the options.
pub(crate) const OPTIONS_PATH_ENV_VAR: &str = "SPARGA_OPTIONS_PATH";
/// Page global holding the options object when running in a browser.
pub(crate) const OPTIONS_GLOBAL: &str = "__SPARGA_OPTIONS__";
