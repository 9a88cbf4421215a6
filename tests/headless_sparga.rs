#![cfg(not(target_arch = "wasm32"))]

use std::sync::Arc;

use serde_json::json;
use sparga_rs::analytics::{FieldMap, InitOptions, Sparga};
use sparga_rs::platform::{ClickDetails, ErrorDetails, GatewayCall, HeadlessPlatform};

fn init_json(raw: &str) -> (Arc<HeadlessPlatform>, Sparga) {
    let platform = Arc::new(HeadlessPlatform::with_location("https://app.example/").unwrap());
    let sparga = Sparga::new(platform.clone());
    sparga.init(InitOptions::from_json(raw).unwrap()).unwrap();
    (platform, sparga)
}

#[test]
fn json_configured_trackers_receive_captured_hits() {
    let (platform, sparga) = init_json(
        r#"{
            "gaSettings": {"cookieDomain": "app.example"},
            "trackerMap": {"main": "UA-1", "rollup": "UA-2"},
            "dimensionMap": {"userRole": "dimension3"},
            "autoCaptureClickEvents": true
        }"#,
    );

    let calls = platform.take_calls();
    let commands: Vec<_> = calls.iter().map(GatewayCall::command).collect();
    assert_eq!(
        commands,
        ["create", "create", "main.send", "rollup.send"],
        "two sessions and one landing pageview per tracker"
    );
    match &calls[0] {
        GatewayCall::Create { fields } => {
            assert_eq!(fields["name"], json!("main"));
            assert_eq!(fields["trackingId"], json!("UA-1"));
            assert_eq!(fields["cookieDomain"], json!("app.example"));
        }
        other => panic!("expected create, got {other:?}"),
    }

    platform.navigate("/reports").unwrap();
    platform.click(&ClickDetails {
        id: "export".into(),
        class_name: "btn".into(),
        x: 5,
        y: 6,
    });
    platform.raise_error(&ErrorDetails::new("disk full"));
    assert!(sparga.set_dimension("userRole", "analyst", Some(&["rollup"])));

    let calls = platform.take_calls();
    let summary: Vec<_> = calls
        .iter()
        .map(|call| match call {
            GatewayCall::Send { fields, .. } => (call.command(), fields["hitType"].clone()),
            GatewayCall::Set { field, .. } => (call.command(), json!(field)),
            GatewayCall::Create { .. } => (call.command(), json!(null)),
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("main.send".to_string(), json!("pageview")),
            ("rollup.send".to_string(), json!("pageview")),
            ("main.send".to_string(), json!("event")),
            ("rollup.send".to_string(), json!("event")),
            ("main.send".to_string(), json!("exception")),
            ("rollup.send".to_string(), json!("exception")),
            ("rollup.set".to_string(), json!("dimension3")),
        ]
    );
}

#[test]
fn separate_platforms_keep_separate_gateways() {
    let (first, _) = init_json(r#""UA-FIRST""#);
    let (second, _) = init_json(r#"{"gaSettings": "UA-SECOND", "autoCapturePageviews": false}"#);

    assert_eq!(first.calls().len(), 2);
    let second_calls = second.calls();
    assert_eq!(second_calls.len(), 1);
    match &second_calls[0] {
        GatewayCall::Create { fields } => assert_eq!(fields["trackingId"], json!("UA-SECOND")),
        other => panic!("expected create, got {other:?}"),
    }
}

#[test]
fn metric_values_are_forwarded_as_given() {
    let platform = Arc::new(HeadlessPlatform::new());
    let sparga = Sparga::new(platform.clone());
    sparga
        .init(
            InitOptions::from_tracking_id("UA-1")
                .with_metric_map(FieldMap::from([("load".into(), "metric1".into())]))
                .with_pageview_capture(false),
        )
        .unwrap();
    platform.take_calls();

    assert!(sparga.set_metric("load", 12.5, None));
    assert!(!sparga.set_metric("load", "twelve", None));
    assert_eq!(
        platform.calls(),
        vec![GatewayCall::Set {
            tracker: None,
            field: "metric1".into(),
            value: json!(12.5),
        }]
    );
}

#[test]
fn browser_binding_is_rejected_outside_a_browser() {
    let err = Sparga::browser().unwrap_err();
    assert_eq!(err.code_str(), "analytics/unsupported-environment");
}
