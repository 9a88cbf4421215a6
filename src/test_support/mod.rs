#![allow(dead_code)]

use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use crate::analytics::logger::LOGGER;
use crate::logger::{set_user_log_handler, set_user_log_handler_fn, LogCallbackParams, LogLevel};

static LOGGER_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
static ENV_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Serializes tests that touch global logger state.
pub(crate) fn logger_guard() -> MutexGuard<'static, ()> {
    LOGGER_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Serializes tests that touch process environment variables.
pub(crate) fn env_guard() -> MutexGuard<'static, ()> {
    ENV_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Collects the warnings the analytics logger emits on the current test thread.
pub(crate) struct WarningCapture {
    messages: Arc<Mutex<Vec<String>>>,
    _guard: MutexGuard<'static, ()>,
}

impl WarningCapture {
    pub(crate) fn start() -> Self {
        let guard = logger_guard();

        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let owner: ThreadId = thread::current().id();
        set_user_log_handler_fn(
            Some(move |params: LogCallbackParams| {
                if thread::current().id() == owner && params.logger_type == LOGGER.name() {
                    sink.lock().unwrap().push(params.message);
                }
            }),
            Some(LogLevel::Warn),
        );

        Self {
            messages,
            _guard: guard,
        }
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Drop for WarningCapture {
    fn drop(&mut self) {
        set_user_log_handler(None, None);
    }
}
