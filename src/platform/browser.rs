//! Browser implementation of the platform hooks, talking to `window.ga`, `window.onerror`,
//! document click events and `history.pushState`.

use std::cell::{Cell, RefCell};

use js_sys::{Array, Function, Reflect};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlScriptElement, MouseEvent, Window};

use crate::analytics::constants::{GA_GLOBAL_NAME, GA_SCRIPT_URL};
use crate::analytics::error::{unsupported_environment, AnalyticsResult};
use crate::platform::gateway::{Gateway, GatewayCall};
use crate::platform::{
    ClickDetails, ClickListener, ErrorDetails, ErrorHandler, NavigationListener, Platform,
};

type ErrorCallback = dyn FnMut(JsValue, JsValue, JsValue, JsValue, JsValue) -> bool;
type PushStateCallback = dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>;

thread_local! {
    static ERROR_CLOSURE: RefCell<Option<Closure<ErrorCallback>>> = RefCell::new(None);
    static CLICK_CLOSURE: RefCell<Option<Closure<dyn FnMut(MouseEvent)>>> = RefCell::new(None);
    static NAVIGATION_LISTENERS: RefCell<Vec<NavigationListener>> = RefCell::new(Vec::new());
    static PUSH_STATE_WRAPPED: Cell<bool> = Cell::new(false);
}

/// Gateway backed by the `window.ga` command queue.
#[derive(Debug, Default)]
pub struct WindowGateway;

impl Gateway for WindowGateway {
    fn install(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        if ga_function(&window).is_some() {
            return false;
        }
        match inject_command_queue(&window) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("analytics.js bootstrap failed: {err:?}");
                false
            }
        }
    }

    fn is_installed(&self) -> bool {
        web_sys::window()
            .and_then(|window| ga_function(&window))
            .is_some()
    }

    fn invoke(&self, call: GatewayCall) {
        let Some(ga) = web_sys::window().and_then(|window| ga_function(&window)) else {
            log::debug!("dropping {} call, window.{GA_GLOBAL_NAME} is missing", call.command());
            return;
        };
        let arguments = Array::new();
        arguments.push(&JsValue::from_str(&call.command()));
        for argument in call.arguments() {
            arguments.push(&json_to_js(&argument));
        }
        if let Err(err) = ga.apply(&JsValue::NULL, &arguments) {
            log::debug!("window.{GA_GLOBAL_NAME} call failed: {err:?}");
        }
    }
}

fn ga_function(window: &Window) -> Option<Function> {
    Reflect::get(window, &JsValue::from_str(GA_GLOBAL_NAME))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn json_to_js(value: &Value) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|text| js_sys::JSON::parse(&text).ok())
        .unwrap_or(JsValue::UNDEFINED)
}

/// Defines the queueing `window.ga` stub and loads analytics.js asynchronously; the library
/// drains the queue once it has loaded.
fn inject_command_queue(window: &Window) -> Result<(), JsValue> {
    let queue = Function::new_no_args(&format!(
        "(window.{GA_GLOBAL_NAME}.q = window.{GA_GLOBAL_NAME}.q || []).push(arguments);"
    ));
    Reflect::set(
        window,
        &JsValue::from_str("GoogleAnalyticsObject"),
        &JsValue::from_str(GA_GLOBAL_NAME),
    )?;
    Reflect::set(window, &JsValue::from_str(GA_GLOBAL_NAME), &queue)?;
    Reflect::set(
        &queue,
        &JsValue::from_str("l"),
        &JsValue::from_f64(js_sys::Date::now()),
    )?;

    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;
    let script = document
        .create_element("script")?
        .dyn_into::<HtmlScriptElement>()
        .map_err(JsValue::from)?;
    script.set_async(true);
    script.set_src(GA_SCRIPT_URL);

    let first_script = document.get_elements_by_tag_name("script").item(0);
    match first_script.as_ref().and_then(|first| first.parent_node()) {
        Some(parent) => {
            parent.insert_before(&script, first_script.as_deref())?;
        }
        None => {
            let head = document
                .head()
                .ok_or_else(|| JsValue::from_str("document head unavailable"))?;
            head.append_child(&script)?;
        }
    }
    Ok(())
}

/// The page's window, document and history.
#[derive(Debug, Default)]
pub struct BrowserPlatform {
    gateway: WindowGateway,
}

impl BrowserPlatform {
    pub fn detect() -> AnalyticsResult<Self> {
        web_sys::window().ok_or_else(unsupported_environment)?;
        Ok(Self::default())
    }
}

impl Platform for BrowserPlatform {
    fn gateway(&self) -> &dyn Gateway {
        &self.gateway
    }

    fn current_path(&self) -> String {
        current_pathname().unwrap_or_else(|| "/".to_string())
    }

    fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = handler.map(|handler| {
            Closure::wrap(Box::new(
                move |message: JsValue, url: JsValue, line: JsValue, column: JsValue, _: JsValue| {
                    handler(&ErrorDetails {
                        message: message
                            .as_string()
                            .unwrap_or_else(|| format!("{message:?}")),
                        url: url.as_string().filter(|url| !url.is_empty()),
                        line: line.as_f64().map(|line| line as u32),
                        column: column.as_f64().map(|column| column as u32),
                    });
                    false
                },
            ) as Box<ErrorCallback>)
        });
        window.set_onerror(closure.as_ref().map(|closure| closure.as_ref().unchecked_ref()));
        ERROR_CLOSURE.with(|slot| *slot.borrow_mut() = closure);
    }

    fn set_click_listener(&self, listener: Option<ClickListener>) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        CLICK_CLOSURE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if let Some(previous) = slot.take() {
                let _ = document
                    .remove_event_listener_with_callback("click", previous.as_ref().unchecked_ref());
            }
            let Some(listener) = listener else {
                return;
            };
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                listener(&click_details(&event));
            }) as Box<dyn FnMut(MouseEvent)>);
            match document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            {
                Ok(()) => *slot = Some(closure),
                Err(err) => log::debug!("click listener registration failed: {err:?}"),
            }
        });
    }

    fn subscribe_navigation(&self, listener: NavigationListener) {
        NAVIGATION_LISTENERS.with(|listeners| listeners.borrow_mut().push(listener));
        if let Err(err) = hook_push_state() {
            log::debug!("history.pushState hook failed: {err:?}");
        }
    }
}

fn current_pathname() -> Option<String> {
    web_sys::window()?.location().pathname().ok()
}

fn click_details(event: &MouseEvent) -> ClickDetails {
    let element = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    ClickDetails {
        id: element.as_ref().map(Element::id).unwrap_or_default(),
        class_name: element.as_ref().map(Element::class_name).unwrap_or_default(),
        x: event.client_x(),
        y: event.client_y(),
    }
}

/// Wraps `history.pushState` once per page so every successful push notifies the registered
/// navigation listeners.
fn hook_push_state() -> Result<(), JsValue> {
    if PUSH_STATE_WRAPPED.with(Cell::get) {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
    let history = window.history()?;
    let original = Reflect::get(&history, &JsValue::from_str("pushState"))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str("history.pushState is not a function"))?;

    let target = history.clone();
    let wrapper = Closure::wrap(Box::new(
        move |state: JsValue, title: JsValue, url: JsValue| -> Result<JsValue, JsValue> {
            let result = original.call3(&target, &state, &title, &url)?;
            if let Some(path) = current_pathname() {
                notify_navigation(&path);
            }
            Ok(result)
        },
    ) as Box<PushStateCallback>);
    Reflect::set(&history, &JsValue::from_str("pushState"), wrapper.as_ref())?;
    wrapper.forget();
    PUSH_STATE_WRAPPED.with(|flag| flag.set(true));
    Ok(())
}

fn notify_navigation(path: &str) {
    let listeners = NAVIGATION_LISTENERS.with(|listeners| listeners.borrow().clone());
    for listener in listeners {
        listener(path);
    }
}
