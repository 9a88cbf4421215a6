mod api;
mod capture;
mod config;
pub(crate) mod constants;
pub mod error;
mod hits;
pub(crate) mod logger;
mod registry;

pub use api::Sparga;
pub use capture::{click_label, format_exception};
pub use config::{FieldMap, GaSettings, InitOptions, TrackerMap};
pub use hits::{FieldValue, Hit, TimingStart};
pub use registry::is_valid_tracker_name;
