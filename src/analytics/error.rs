use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyticsErrorCode {
    MissingTrackingConfig,
    InvalidTrackerName,
    UnsupportedEnvironment,
    InvalidConfig,
}

impl AnalyticsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsErrorCode::MissingTrackingConfig => "analytics/missing-tracking-config",
            AnalyticsErrorCode::InvalidTrackerName => "analytics/invalid-tracker-name",
            AnalyticsErrorCode::UnsupportedEnvironment => "analytics/unsupported-environment",
            AnalyticsErrorCode::InvalidConfig => "analytics/invalid-config",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnalyticsError {
    pub code: AnalyticsErrorCode,
    message: String,
}

impl AnalyticsError {
    pub fn new(code: AnalyticsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for AnalyticsError {}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

pub fn missing_tracking_config() -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::MissingTrackingConfig,
        "Sparga must be initialized with gaSettings containing a GA tracking ID \
         (e.g. \"UA-XXXX-Y\"), or with a map of trackers in trackerMap",
    )
}

pub fn invalid_tracker_name(name: &str) -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::InvalidTrackerName,
        format!(
            "The tracker name \"{name}\" is invalid. Only alphanumeric characters are allowed \
             with no spaces."
        ),
    )
}

pub fn unsupported_environment() -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::UnsupportedEnvironment,
        "Sparga is intended for browser environments only",
    )
}

pub fn invalid_config(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::InvalidConfig, message)
}
