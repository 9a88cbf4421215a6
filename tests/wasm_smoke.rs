#![cfg(all(target_arch = "wasm32", feature = "wasm-web"))]

use js_sys::Reflect;
use sparga_rs::analytics::{InitOptions, Sparga};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn ga_queue_length() -> u32 {
    let window = web_sys::window().expect("window");
    let ga = Reflect::get(&window, &JsValue::from_str("ga")).expect("ga global");
    let queue = Reflect::get(&ga, &JsValue::from_str("q")).expect("ga queue");
    js_sys::Array::from(&queue).length()
}

#[wasm_bindgen_test]
fn init_installs_command_queue_and_enqueues_calls() {
    let sparga = Sparga::browser().expect("browser platform");
    sparga
        .init(
            InitOptions::from_tracking_id("UA-WASM-1")
                .with_exception_capture(false)
                .with_pageview_capture(false),
        )
        .expect("init");

    let before = ga_queue_length();
    assert!(before >= 1, "create call should be queued");

    sparga.send_event("wasm", "smoke", None, 1, None);
    assert!(sparga.send_timing("wasm", "smoke", None, 25, None, None));
    assert_eq!(ga_queue_length(), before + 2);
}
