//! Initialization options and the `create`-time settings they carry.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::analytics::error::{invalid_config, AnalyticsResult};

/// Friendly name to custom field identifier, e.g. `userRole -> dimension3`.
pub type FieldMap = BTreeMap<String, String>;

/// Tracker fields applied when a session is created.
///
/// Only the fields whose default differs from Google's are modelled explicitly; any other
/// field from the analytics.js field reference can be supplied through [`GaSettings::extra`].
/// A `name` field is never forwarded, tracker names come from the [`TrackerMap`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_anchor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_send_referrer: Option<bool>,
    #[serde(default, rename = "forceSSL", skip_serializing_if = "Option::is_none")]
    pub force_ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_speed_sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_gac: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GaSettings {
    pub fn from_tracking_id(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: Some(tracking_id.into()),
            ..Default::default()
        }
    }

    /// Adds an arbitrary `create`-time field. A `trackingId` key sets [`Self::tracking_id`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key == "trackingId" {
            self.tracking_id = match value {
                Value::Null => None,
                Value::String(id) => Some(id),
                other => Some(other.to_string()),
            };
        } else {
            self.extra.insert(key, value);
        }
        self
    }

    /// Returns the tracking id, treating an empty string as missing.
    ///
    /// A string `trackingId` placed directly in `extra` is honoured when the named field is unset.
    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id
            .as_deref()
            .or_else(|| self.extra.get("trackingId").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the supplied fields over the defaults and strips `name`.
    pub(crate) fn create_fields(&self) -> Map<String, Value> {
        let mut fields = default_create_fields();
        if let Ok(Value::Object(provided)) = serde_json::to_value(self) {
            fields.extend(provided);
        }
        fields.remove("name");
        fields
    }
}

impl From<&str> for GaSettings {
    fn from(tracking_id: &str) -> Self {
        Self::from_tracking_id(tracking_id)
    }
}

impl From<String> for GaSettings {
    fn from(tracking_id: String) -> Self {
        Self::from_tracking_id(tracking_id)
    }
}

fn default_create_fields() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("allowAnchor".into(), Value::Bool(false));
    fields.insert("alwaysSendReferrer".into(), Value::Bool(true));
    fields.insert("forceSSL".into(), Value::Bool(true));
    fields.insert("cookieDomain".into(), Value::String("auto".into()));
    fields.insert("siteSpeedSampleRate".into(), Value::from(100));
    fields.insert("storeGac".into(), Value::Bool(false));
    fields
}

/// Friendly tracker names mapped to tracking ids, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackerMap {
    entries: Vec<(String, String)>,
}

impl TrackerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a tracker, keeping the position of a replaced entry.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        tracking_id: impl Into<String>,
    ) -> Option<String> {
        let name = name.into();
        let tracking_id = tracking_id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, id)) => Some(std::mem::replace(id, tracking_id)),
            None => {
                self.entries.push((name, tracking_id));
                None
            }
        }
    }

    pub fn with_tracker(mut self, name: impl Into<String>, tracking_id: impl Into<String>) -> Self {
        self.insert(name, tracking_id);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, id)| id.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, I> FromIterator<(N, I)> for TrackerMap
where
    N: Into<String>,
    I: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut map = TrackerMap::new();
        for (name, tracking_id) in iter {
            map.insert(name, tracking_id);
        }
        map
    }
}

impl Serialize for TrackerMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, tracking_id) in &self.entries {
            map.serialize_entry(name, tracking_id)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TrackerMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TrackerMapVisitor;

        impl<'de> Visitor<'de> for TrackerMapVisitor {
            type Value = TrackerMap;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object mapping tracker names to tracking ids")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = TrackerMap::new();
                while let Some((name, tracking_id)) = access.next_entry::<String, String>()? {
                    map.insert(name, tracking_id);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TrackerMapVisitor)
    }
}

/// Everything `Sparga::init` accepts.
///
/// Build it with [`InitOptions::from_tracking_id`] for the single-tracker case, or fill the
/// struct directly. [`InitOptions::from_json`] reads the camelCase JSON shape
/// (`gaSettings`, `trackerMap`, `dimensionMap`, `metricMap`, `autoCapture*`), where
/// `gaSettings` may also be a plain tracking id string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOptions {
    #[serde(default, deserialize_with = "settings_from_json")]
    pub ga_settings: Option<GaSettings>,
    #[serde(default)]
    pub tracker_map: Option<TrackerMap>,
    #[serde(default)]
    pub dimension_map: FieldMap,
    #[serde(default)]
    pub metric_map: FieldMap,
    #[serde(default)]
    pub auto_capture_click_events: bool,
    #[serde(default = "enabled")]
    pub auto_capture_exceptions: bool,
    #[serde(default = "enabled")]
    pub auto_capture_pageviews: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            ga_settings: None,
            tracker_map: None,
            dimension_map: FieldMap::new(),
            metric_map: FieldMap::new(),
            auto_capture_click_events: false,
            auto_capture_exceptions: true,
            auto_capture_pageviews: true,
        }
    }
}

impl InitOptions {
    pub fn from_tracking_id(tracking_id: impl Into<String>) -> Self {
        Self::from_settings(GaSettings::from_tracking_id(tracking_id))
    }

    pub fn from_settings(settings: impl Into<GaSettings>) -> Self {
        Self {
            ga_settings: Some(settings.into()),
            ..Default::default()
        }
    }

    pub fn from_tracker_map(tracker_map: TrackerMap) -> Self {
        Self {
            tracker_map: Some(tracker_map),
            ..Default::default()
        }
    }

    /// Parses options from JSON text, accepting either an options object or a bare tracking
    /// id string.
    pub fn from_json(raw: &str) -> AnalyticsResult<Self> {
        if raw.trim_start().starts_with('"') {
            let tracking_id: String = serde_json::from_str(raw)
                .map_err(|err| invalid_config(format!("Invalid Sparga tracking id: {err}")))?;
            return Ok(Self::from_tracking_id(tracking_id));
        }
        serde_json::from_str(raw)
            .map_err(|err| invalid_config(format!("Invalid Sparga options: {err}")))
    }

    pub fn with_dimension_map(mut self, dimension_map: FieldMap) -> Self {
        self.dimension_map = dimension_map;
        self
    }

    pub fn with_metric_map(mut self, metric_map: FieldMap) -> Self {
        self.metric_map = metric_map;
        self
    }

    pub fn with_click_capture(mut self, enabled: bool) -> Self {
        self.auto_capture_click_events = enabled;
        self
    }

    pub fn with_exception_capture(mut self, enabled: bool) -> Self {
        self.auto_capture_exceptions = enabled;
        self
    }

    pub fn with_pageview_capture(mut self, enabled: bool) -> Self {
        self.auto_capture_pageviews = enabled;
        self
    }
}

fn enabled() -> bool {
    true
}

fn settings_from_json<'de, D>(deserializer: D) -> Result<Option<GaSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SettingsSource {
        TrackingId(String),
        Settings(GaSettings),
    }

    let source = Option::<SettingsSource>::deserialize(deserializer)?;
    Ok(source.map(|source| match source {
        SettingsSource::TrackingId(tracking_id) => GaSettings::from_tracking_id(tracking_id),
        SettingsSource::Settings(settings) => settings,
    }))
}
