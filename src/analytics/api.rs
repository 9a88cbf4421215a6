use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::analytics::capture;
use crate::analytics::config::InitOptions;
use crate::analytics::error::{missing_tracking_config, AnalyticsResult};
use crate::analytics::hits::{FieldValue, Hit, TimingStart};
use crate::analytics::logger::LOGGER;
use crate::analytics::registry::{InitPlan, TrackerRegistry};
use crate::platform::environment::options_from_environment;
use crate::platform::{browser_platform, GatewayCall, Platform};

/// Handle to the analytics façade of one page.
///
/// Cloning is cheap and every clone shares the same registry and platform. Sessions are only
/// created by the `init` call that installs the gateway; later calls replace the lookup maps
/// and rewire the error and click capture but leave the sessions alone.
#[derive(Clone)]
pub struct Sparga {
    inner: Arc<SpargaInner>,
}

struct SpargaInner {
    platform: Arc<dyn Platform>,
    registry: Mutex<Option<Arc<TrackerRegistry>>>,
}

impl fmt::Debug for Sparga {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sparga")
            .field("initialized", &self.is_initialized())
            .field("trackers", &self.tracker_names())
            .finish()
    }
}

impl Sparga {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            inner: Arc::new(SpargaInner {
                platform,
                registry: Mutex::new(None),
            }),
        }
    }

    /// Binds to the current browser window. Fails with `analytics/unsupported-environment`
    /// anywhere else.
    pub fn browser() -> AnalyticsResult<Self> {
        Ok(Self::new(browser_platform()?))
    }

    pub fn init(&self, options: InitOptions) -> AnalyticsResult<()> {
        let InitPlan {
            registry,
            sessions,
            capture,
            ignores_tracking_id,
        } = InitPlan::from_options(options)?;
        *self.inner.registry.lock().unwrap() = Some(Arc::new(registry));

        let platform = self.inner.platform.as_ref();
        capture::install_exception_adapter(self, platform, capture.exceptions);
        capture::install_click_adapter(self, platform, capture.click_events);

        let gateway = platform.gateway();
        if !gateway.install() {
            LOGGER.debug("analytics gateway already installed, sessions are not recreated");
            return Ok(());
        }

        if ignores_tracking_id {
            LOGGER.warn(
                "gaSettings.trackingId was supplied in addition to trackerMap; only the \
                 trackerMap is used and the trackingId is ignored.",
            );
        }
        for fields in sessions {
            gateway.invoke(GatewayCall::Create { fields });
        }

        if capture.pageviews {
            capture::install_navigation_adapter(self, platform);
        }
        Ok(())
    }

    /// Initializes from the options published by the environment.
    pub fn init_from_environment(&self) -> AnalyticsResult<()> {
        let options = options_from_environment()?.ok_or_else(missing_tracking_config)?;
        self.init(options)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.registry.lock().unwrap().is_some()
    }

    /// Friendly tracker names in registration order; empty without a tracker map.
    pub fn tracker_names(&self) -> Vec<String> {
        self.inner
            .registry
            .lock()
            .unwrap()
            .as_ref()
            .map(|registry| registry.tracker_names())
            .unwrap_or_default()
    }

    /// Sends a raw field object, e.g. for hit types without a dedicated helper.
    pub fn send(&self, fields: Map<String, Value>, targets: Option<&[&str]>) {
        let Some(registry) = self.registry_for("send") else {
            return;
        };
        let gateway = self.inner.platform.gateway();
        for tracker in registry.resolve_targets(targets, "send") {
            gateway.invoke(GatewayCall::Send {
                tracker,
                fields: fields.clone(),
            });
        }
    }

    pub fn send_hit(&self, hit: Hit, targets: Option<&[&str]>) {
        self.send(hit.into_fields(), targets);
    }

    /// `value` is read as an integer; when it has none, `eventValue` is left out.
    pub fn send_event(
        &self,
        category: &str,
        action: &str,
        label: Option<&str>,
        value: impl Into<FieldValue>,
        targets: Option<&[&str]>,
    ) {
        let value: FieldValue = value.into();
        self.send_hit(
            Hit::Event {
                event_category: category.to_string(),
                event_action: action.to_string(),
                event_label: label.map(str::to_string),
                event_value: value.as_integer(),
            },
            targets,
        );
    }

    pub fn send_exception(&self, description: &str, fatal: Option<bool>, targets: Option<&[&str]>) {
        self.send_hit(
            Hit::Exception {
                ex_description: description.to_string(),
                ex_fatal: fatal,
            },
            targets,
        );
    }

    pub fn send_page_view(&self, page: &str, targets: Option<&[&str]>) {
        self.send_hit(
            Hit::Pageview {
                page: page.to_string(),
            },
            targets,
        );
    }

    pub fn send_social(
        &self,
        network: &str,
        action: &str,
        target: &str,
        targets: Option<&[&str]>,
    ) {
        self.send_hit(
            Hit::Social {
                social_network: network.to_string(),
                social_action: action.to_string(),
                social_target: target.to_string(),
            },
            targets,
        );
    }

    /// Sends a timing hit and reports whether it went out.
    ///
    /// With an instant start the duration runs to `stop`, or to now when `stop` is `None`;
    /// otherwise `start_or_duration` is the duration in milliseconds. A zero or unreadable
    /// duration sends nothing.
    pub fn send_timing(
        &self,
        category: &str,
        variable: &str,
        label: Option<&str>,
        start_or_duration: impl Into<TimingStart>,
        stop: Option<DateTime<Utc>>,
        targets: Option<&[&str]>,
    ) -> bool {
        let start: TimingStart = start_or_duration.into();
        let duration = start.duration_millis(stop).filter(|millis| *millis != 0);
        let Some(timing_value) = duration else {
            LOGGER.warn(
                "A send_timing call was ignored because start_or_duration was neither a valid \
                 start time nor a non-zero duration.",
            );
            return false;
        };

        self.send_hit(
            Hit::Timing {
                timing_category: category.to_string(),
                timing_var: variable.to_string(),
                timing_label: label.map(str::to_string),
                timing_value,
            },
            targets,
        );
        true
    }

    /// Sets the custom dimension registered under `name`; `false` when the name is unknown.
    pub fn set_dimension(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
        targets: Option<&[&str]>,
    ) -> bool {
        let Some(registry) = self.registry_for("set") else {
            return false;
        };
        let Some(field) = registry.dimension(name) else {
            LOGGER.warn(format!(
                "A set_dimension call was ignored because the key {name} was not found in the \
                 provided dimensionMap."
            ));
            return false;
        };
        let value: FieldValue = value.into();
        self.assign(&registry, field, value.to_json(), targets);
        true
    }

    /// Sets the custom metric registered under `name`. The value must read as a finite
    /// number; it is forwarded as given.
    pub fn set_metric(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
        targets: Option<&[&str]>,
    ) -> bool {
        let Some(registry) = self.registry_for("set") else {
            return false;
        };
        let Some(field) = registry.metric(name) else {
            LOGGER.warn(format!(
                "A set_metric call was ignored because the key {name} was not found in the \
                 provided metricMap."
            ));
            return false;
        };
        let value: FieldValue = value.into();
        if value.as_finite_number().is_none() {
            LOGGER.warn(format!(
                "A set_metric call was ignored because the value {} could not be parsed as a \
                 valid number.",
                value.to_json()
            ));
            return false;
        }
        self.assign(&registry, field, value.to_json(), targets);
        true
    }

    fn assign(
        &self,
        registry: &TrackerRegistry,
        field: &str,
        value: Value,
        targets: Option<&[&str]>,
    ) {
        let gateway = self.inner.platform.gateway();
        for tracker in registry.resolve_targets(targets, "set") {
            gateway.invoke(GatewayCall::Set {
                tracker,
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }

    fn registry_for(&self, action: &str) -> Option<Arc<TrackerRegistry>> {
        let registry = self.inner.registry.lock().unwrap().clone();
        if registry.is_none() {
            LOGGER.warn(format!(
                "A {action} call was ignored because Sparga has not been initialized."
            ));
        }
        registry
    }
}
