//! Hit payloads and the loosely typed values callers hand to the send/set helpers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::util::{parse_float, parse_int};

/// One hit, serialized into the field object analytics.js expects for `send`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "hitType", rename_all = "lowercase")]
pub enum Hit {
    #[serde(rename_all = "camelCase")]
    Event {
        event_category: String,
        event_action: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        event_label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        event_value: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Exception {
        ex_description: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        ex_fatal: Option<bool>,
    },
    Pageview { page: String },
    #[serde(rename_all = "camelCase")]
    Social {
        social_network: String,
        social_action: String,
        social_target: String,
    },
    #[serde(rename_all = "camelCase")]
    Timing {
        timing_category: String,
        timing_var: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timing_label: Option<String>,
        timing_value: i64,
    },
}

impl Hit {
    pub fn hit_type(&self) -> &'static str {
        match self {
            Hit::Event { .. } => "event",
            Hit::Exception { .. } => "exception",
            Hit::Pageview { .. } => "pageview",
            Hit::Social { .. } => "social",
            Hit::Timing { .. } => "timing",
        }
    }

    pub fn into_fields(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

/// A caller-supplied value that is coerced the way the browser coerces loose input.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// `parseInt` semantics: numbers truncate, text reads its integer prefix.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            FieldValue::Number(value) if value.is_finite() => Some(value.trunc() as i64),
            FieldValue::Text(text) => parse_int(text),
            _ => None,
        }
    }

    /// `parseFloat` semantics, restricted to finite results.
    pub fn as_finite_number(&self) -> Option<f64> {
        let number = match self {
            FieldValue::Integer(value) => *value as f64,
            FieldValue::Number(value) => *value,
            FieldValue::Text(text) => parse_float(text)?,
            _ => return None,
        };
        number.is_finite().then_some(number)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// The fourth argument of `send_timing`: a start instant or a ready-made duration in
/// milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub enum TimingStart {
    At(DateTime<Utc>),
    Duration(FieldValue),
}

impl TimingStart {
    /// Elapsed milliseconds, measured up to `stop` (or now) for an instant start.
    pub fn duration_millis(&self, stop: Option<DateTime<Utc>>) -> Option<i64> {
        match self {
            TimingStart::At(start) => {
                let stop = stop.unwrap_or_else(Utc::now);
                Some((stop - *start).num_milliseconds())
            }
            TimingStart::Duration(value) => value.as_integer(),
        }
    }
}

impl From<DateTime<Utc>> for TimingStart {
    fn from(start: DateTime<Utc>) -> Self {
        TimingStart::At(start)
    }
}

impl From<FieldValue> for TimingStart {
    fn from(value: FieldValue) -> Self {
        TimingStart::Duration(value)
    }
}

macro_rules! impl_duration_start {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TimingStart {
                fn from(value: $ty) -> Self {
                    TimingStart::Duration(value.into())
                }
            }
        )*
    };
}

impl_duration_start!(i64, i32, u32, f64, &str, String);
