//! Resolves initialization options into session `create` fields and the lookup maps consulted
//! on every dispatch.

use serde_json::{Map, Value};

use crate::analytics::config::{FieldMap, GaSettings, InitOptions, TrackerMap};
use crate::analytics::error::{invalid_tracker_name, missing_tracking_config, AnalyticsResult};
use crate::analytics::logger::LOGGER;

/// Tracker names may only contain ASCII letters and digits.
pub fn is_valid_tracker_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CaptureFlags {
    pub click_events: bool,
    pub exceptions: bool,
    pub pageviews: bool,
}

/// The validated outcome of one `init` call.
#[derive(Debug)]
pub(crate) struct InitPlan {
    pub registry: TrackerRegistry,
    /// `create` fields, one entry per session.
    pub sessions: Vec<Map<String, Value>>,
    pub capture: CaptureFlags,
    /// A tracking id was supplied next to a tracker map and will be ignored.
    pub ignores_tracking_id: bool,
}

impl InitPlan {
    pub fn from_options(options: InitOptions) -> AnalyticsResult<Self> {
        let InitOptions {
            ga_settings,
            tracker_map,
            dimension_map,
            metric_map,
            auto_capture_click_events,
            auto_capture_exceptions,
            auto_capture_pageviews,
        } = options;

        let settings = ga_settings
            .filter(|settings| !settings.is_empty())
            .unwrap_or_default();
        let has_tracking_id = settings.tracking_id().is_some();
        if !has_tracking_id && tracker_map.is_none() {
            return Err(missing_tracking_config());
        }

        let sessions = match &tracker_map {
            Some(tracker_map) => tracker_sessions(&settings, tracker_map)?,
            None => vec![settings.create_fields()],
        };
        let ignores_tracking_id = has_tracking_id && tracker_map.is_some();

        Ok(Self {
            registry: TrackerRegistry {
                tracker_map,
                dimension_map,
                metric_map,
            },
            sessions,
            capture: CaptureFlags {
                click_events: auto_capture_click_events,
                exceptions: auto_capture_exceptions,
                pageviews: auto_capture_pageviews,
            },
            ignores_tracking_id,
        })
    }
}

fn tracker_sessions(
    settings: &GaSettings,
    tracker_map: &TrackerMap,
) -> AnalyticsResult<Vec<Map<String, Value>>> {
    if let Some(invalid) = tracker_map.names().find(|name| !is_valid_tracker_name(name)) {
        return Err(invalid_tracker_name(invalid));
    }

    let mut shared = settings.create_fields();
    shared.remove("trackingId");

    Ok(tracker_map
        .iter()
        .map(|(name, tracking_id)| {
            let mut fields = shared.clone();
            fields.insert("trackingId".into(), Value::String(tracking_id.to_string()));
            fields.insert("name".into(), Value::String(name.to_string()));
            fields
        })
        .collect())
}

/// Friendly-name lookups, fixed once `init` succeeds.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TrackerRegistry {
    tracker_map: Option<TrackerMap>,
    dimension_map: FieldMap,
    metric_map: FieldMap,
}

impl TrackerRegistry {
    pub fn tracker_names(&self) -> Vec<String> {
        self.tracker_map
            .iter()
            .flat_map(|tracker_map| tracker_map.names())
            .map(str::to_string)
            .collect()
    }

    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimension_map.get(name).map(String::as_str)
    }

    pub fn metric(&self, name: &str) -> Option<&str> {
        self.metric_map.get(name).map(String::as_str)
    }

    /// Picks the sessions a call goes to. `None` in the result is the default, unnamed session.
    ///
    /// Explicit names missing from the tracker map are reported and skipped one by one.
    pub fn resolve_targets(&self, requested: Option<&[&str]>, action: &str) -> Vec<Option<String>> {
        match (requested, &self.tracker_map) {
            (None, None) => vec![None],
            (None, Some(tracker_map)) => tracker_map
                .names()
                .map(|name| Some(name.to_string()))
                .collect(),
            (Some(requested), tracker_map) => requested
                .iter()
                .filter(|name| {
                    let known = tracker_map.as_ref().is_some_and(|map| map.contains(name));
                    if !known {
                        LOGGER.warn(format!(
                            "A {action} call was ignored because the provided tracker name {name} \
                             was not found in the provided trackerMap."
                        ));
                    }
                    known
                })
                .map(|name| Some(name.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::WarningCapture;
    use serde_json::json;

    fn tracker_options() -> InitOptions {
        InitOptions::from_tracker_map(
            [("web", "UA-1"), ("app", "UA-2")].into_iter().collect(),
        )
    }

    #[test]
    fn validates_tracker_names() {
        assert!(is_valid_tracker_name("web2"));
        assert!(!is_valid_tracker_name("my tracker"));
        assert!(!is_valid_tracker_name("web-2"));
        assert!(!is_valid_tracker_name(""));
    }

    #[test]
    fn empty_options_are_rejected() {
        let err = InitPlan::from_options(InitOptions::default()).unwrap_err();
        assert_eq!(err.code_str(), "analytics/missing-tracking-config");

        let err = InitPlan::from_options(InitOptions::from_settings(GaSettings::default()))
            .unwrap_err();
        assert_eq!(err.code_str(), "analytics/missing-tracking-config");
    }

    #[test]
    fn settings_without_tracking_id_are_rejected() {
        let settings = GaSettings {
            allow_anchor: Some(true),
            ..Default::default()
        };
        let err = InitPlan::from_options(InitOptions::from_settings(settings)).unwrap_err();
        assert_eq!(err.code_str(), "analytics/missing-tracking-config");
    }

    #[test]
    fn single_tracking_id_plans_one_default_session() {
        let plan = InitPlan::from_options(InitOptions::from_tracking_id("UA-1")).unwrap();
        assert_eq!(plan.sessions.len(), 1);
        assert_eq!(plan.sessions[0].get("trackingId"), Some(&json!("UA-1")));
        assert!(!plan.sessions[0].contains_key("name"));
        assert!(!plan.ignores_tracking_id);
        assert_eq!(plan.registry.resolve_targets(None, "send"), vec![None]);
    }

    #[test]
    fn tracker_map_plans_one_named_session_per_entry() {
        let mut options = tracker_options();
        options.ga_settings = Some(GaSettings {
            tracking_id: Some("UA-IGNORED".into()),
            cookie_domain: Some("example.com".into()),
            ..Default::default()
        });
        let plan = InitPlan::from_options(options).unwrap();

        assert!(plan.ignores_tracking_id);
        let summary: Vec<_> = plan
            .sessions
            .iter()
            .map(|fields| (fields["name"].clone(), fields["trackingId"].clone()))
            .collect();
        assert_eq!(
            summary,
            vec![(json!("web"), json!("UA-1")), (json!("app"), json!("UA-2"))]
        );
        assert_eq!(plan.sessions[1]["cookieDomain"], json!("example.com"));
        assert_eq!(plan.sessions[1]["forceSSL"], json!(true));
    }

    #[test]
    fn invalid_tracker_name_fails_the_plan() {
        let options = InitOptions::from_tracker_map(
            [("good", "UA-1"), ("bad name", "UA-2")].into_iter().collect(),
        );
        let err = InitPlan::from_options(options).unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-tracker-name");
        assert!(err.message().contains("bad name"));
    }

    #[test]
    fn capture_flags_follow_options() {
        let options = InitOptions::from_tracking_id("UA-1")
            .with_click_capture(true)
            .with_pageview_capture(false);
        let plan = InitPlan::from_options(options).unwrap();
        assert_eq!(
            plan.capture,
            CaptureFlags {
                click_events: true,
                exceptions: true,
                pageviews: false,
            }
        );
    }

    #[test]
    fn explicit_targets_skip_unknown_names() {
        let capture = WarningCapture::start();
        let plan = InitPlan::from_options(tracker_options()).unwrap();

        let targets = plan
            .registry
            .resolve_targets(Some(&["app", "unknown"]), "send");
        assert_eq!(targets, vec![Some("app".to_string())]);
        assert_eq!(
            plan.registry.resolve_targets(None, "send"),
            vec![Some("web".to_string()), Some("app".to_string())]
        );
        assert!(plan.registry.resolve_targets(Some(&[]), "set").is_empty());

        let warnings = capture.messages();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown"));
    }

    #[test]
    fn explicit_targets_without_tracker_map_dispatch_nothing() {
        let plan = InitPlan::from_options(InitOptions::from_tracking_id("UA-1")).unwrap();
        assert!(plan
            .registry
            .resolve_targets(Some(&["web"]), "send")
            .is_empty());
    }
}
