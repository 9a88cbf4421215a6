//! Drives Sparga against the in-memory platform and prints every gateway call it would make
//! to `window.ga`. Set `SPARGA_OPTIONS` to a JSON options object to try other configurations.

use std::sync::Arc;

use sparga_rs::analytics::{FieldMap, InitOptions, Sparga, TrackerMap};
use sparga_rs::platform::{ClickDetails, HeadlessPlatform};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let platform = Arc::new(HeadlessPlatform::with_location("https://shop.example/")?);
    let sparga = Sparga::new(platform.clone());

    if std::env::var("SPARGA_OPTIONS").is_ok() {
        sparga.init_from_environment()?;
    } else {
        let trackers = TrackerMap::new()
            .with_tracker("storefront", "UA-1111-1")
            .with_tracker("marketing", "UA-2222-1");
        sparga.init(
            InitOptions::from_tracker_map(trackers)
                .with_dimension_map(FieldMap::from([("plan".into(), "dimension1".into())]))
                .with_metric_map(FieldMap::from([("cartSize".into(), "metric2".into())]))
                .with_click_capture(true),
        )?;
    }

    sparga.set_dimension("plan", "premium", None);
    sparga.set_metric("cartSize", 3, Some(&["storefront"]));
    sparga.send_event("checkout", "begin", Some("cart"), 42, None);
    sparga.send_timing("checkout", "render", None, 180, None, None);

    platform.navigate("/checkout")?;
    platform.click(&ClickDetails {
        id: "pay".into(),
        class_name: "btn btn-primary".into(),
        x: 320,
        y: 480,
    });

    for call in platform.calls() {
        let arguments: Vec<String> = call.arguments().iter().map(|arg| arg.to_string()).collect();
        println!("ga({:?}, {})", call.command(), arguments.join(", "));
    }

    Ok(())
}
