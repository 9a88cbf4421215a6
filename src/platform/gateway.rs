//! The gateway primitive: the single command-queue function every session, hit and field
//! update is issued through.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::{Map, Value};

/// One call into the gateway. The command string is `create`, `send` or `set`, prefixed with
/// `<tracker>.` when a named session is addressed.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayCall {
    Create {
        fields: Map<String, Value>,
    },
    Send {
        tracker: Option<String>,
        fields: Map<String, Value>,
    },
    Set {
        tracker: Option<String>,
        field: String,
        value: Value,
    },
}

impl GatewayCall {
    pub fn command(&self) -> String {
        let (tracker, action) = match self {
            GatewayCall::Create { .. } => (None, "create"),
            GatewayCall::Send { tracker, .. } => (tracker.as_deref(), "send"),
            GatewayCall::Set { tracker, .. } => (tracker.as_deref(), "set"),
        };
        match tracker {
            Some(name) => format!("{name}.{action}"),
            None => action.to_string(),
        }
    }

    /// Arguments following the command string, as passed to the gateway function.
    pub fn arguments(&self) -> Vec<Value> {
        match self {
            GatewayCall::Create { fields } | GatewayCall::Send { fields, .. } => {
                vec![Value::Object(fields.clone())]
            }
            GatewayCall::Set { field, value, .. } => {
                vec![Value::String(field.clone()), value.clone()]
            }
        }
    }
}

pub trait Gateway: Send + Sync {
    /// Creates the gateway unless it already exists. Returns `true` only for the call that
    /// created it.
    fn install(&self) -> bool;

    fn is_installed(&self) -> bool;

    fn invoke(&self, call: GatewayCall);
}

/// In-memory gateway that keeps every call it receives.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    installed: AtomicBool,
    calls: Mutex<Vec<GatewayCall>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<GatewayCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl Gateway for RecordingGateway {
    fn install(&self) -> bool {
        !self.installed.swap(true, Ordering::SeqCst)
    }

    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn invoke(&self, call: GatewayCall) {
        log::debug!("gateway call {}", call.command());
        self.calls.lock().unwrap().push(call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_are_prefixed_with_tracker_name() {
        let send = GatewayCall::Send {
            tracker: Some("web".into()),
            fields: Map::new(),
        };
        let set = GatewayCall::Set {
            tracker: None,
            field: "dimension1".into(),
            value: json!("admin"),
        };
        assert_eq!(send.command(), "web.send");
        assert_eq!(set.command(), "set");
        assert_eq!(set.arguments(), vec![json!("dimension1"), json!("admin")]);
        assert_eq!(
            GatewayCall::Create { fields: Map::new() }.command(),
            "create"
        );
    }

    #[test]
    fn install_succeeds_once() {
        let gateway = RecordingGateway::new();
        assert!(!gateway.is_installed());
        assert!(gateway.install());
        assert!(!gateway.install());
        assert!(gateway.is_installed());
    }

    #[test]
    fn take_calls_drains_the_log() {
        let gateway = RecordingGateway::new();
        gateway.invoke(GatewayCall::Create { fields: Map::new() });
        assert_eq!(gateway.take_calls().len(), 1);
        assert!(gateway.calls().is_empty());
    }
}
