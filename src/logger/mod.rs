//! Named loggers sharing one process-wide level and one optional user callback.
//!
//! Every component keeps a `Logger` in a `LazyLock`. The level and the callback live in globals
//! rather than on the loggers, so a callback registered at startup also receives records from
//! loggers that are only created later.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

static GLOBAL_LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static USER_LOG_HANDLER: RwLock<Option<UserLogHandler>> = RwLock::new(None);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Silent = 4,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            _ => LogLevel::Silent,
        }
    }
}

/// A record delivered to the callback installed with [`set_user_log_handler`].
#[derive(Debug, Clone)]
pub struct LogCallbackParams {
    pub level: LogLevel,
    pub message: String,
    pub logger_type: String,
}

pub type LogCallback = Arc<dyn Fn(LogCallbackParams) + Send + Sync + 'static>;

#[derive(Clone)]
struct UserLogHandler {
    callback: LogCallback,
    threshold: Option<LogLevel>,
}

#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.dispatch(LogLevel::Debug, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.dispatch(LogLevel::Warn, message.into());
    }

    fn dispatch(&self, level: LogLevel, message: String) {
        let user_handler = USER_LOG_HANDLER.read().unwrap().clone();
        if let Some(handler) = user_handler {
            if level >= handler.threshold.unwrap_or_else(log_level) {
                (handler.callback)(LogCallbackParams {
                    level,
                    message: message.clone(),
                    logger_type: self.name.to_string(),
                });
            }
        }

        if level >= log_level() {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            write_line(
                level,
                &format!("[{now}]  {} [{}]: {message}", self.name, level.as_str()),
            );
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
fn write_line(level: LogLevel, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Error => web_sys::console::error_1(&value),
        LogLevel::Warn => web_sys::console::warn_1(&value),
        LogLevel::Debug => web_sys::console::debug_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm-web")))]
fn write_line(level: LogLevel, line: &str) {
    match level {
        LogLevel::Warn | LogLevel::Error => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

pub fn log_level() -> LogLevel {
    LogLevel::from_u8(GLOBAL_LOG_LEVEL.load(Ordering::SeqCst))
}

/// Sets the console level of every logger. `Silent` turns console output off.
pub fn set_log_level(level: LogLevel) {
    GLOBAL_LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Installs (or with `None`, clears) the callback receiving records from every logger.
///
/// Records below `level` are skipped; without a level the global level applies.
pub fn set_user_log_handler(callback: Option<LogCallback>, level: Option<LogLevel>) {
    *USER_LOG_HANDLER.write().unwrap() = callback.map(|callback| UserLogHandler {
        callback,
        threshold: level,
    });
}

pub fn set_user_log_handler_fn<F>(callback: Option<F>, level: Option<LogLevel>)
where
    F: Fn(LogCallbackParams) + Send + Sync + 'static,
{
    set_user_log_handler(callback.map(|cb| Arc::new(cb) as LogCallback), level);
}
