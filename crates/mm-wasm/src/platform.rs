//! Browser implementations of the editor's platform seams: recovery storage
//! on `localStorage`, a `Date.now()` clock, console logging and the panic
//! hook.

use mm_editor::{Clock, RecoveryStore, StorageError};
use wasm_bindgen::JsValue;
use web_sys::{Storage, console};

// ─── Storage ─────────────────────────────────────────────────────────────

/// `window.localStorage`, or nothing when the browser denies it (private
/// mode, sandboxed iframes). Without storage every call reports
/// `Unavailable` and the editor keeps working.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable; recovery disabled");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryStore for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> StorageError {
    let message = value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&value, &JsValue::from_str("name"))
                .ok()
                .and_then(|name| name.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"));
    StorageError::Backend(message)
}

// ─── Clock ───────────────────────────────────────────────────────────────

/// Wall-clock milliseconds from `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

// ─── Logging ─────────────────────────────────────────────────────────────

/// Forwards `log` records to the browser console.
pub struct ConsoleLog;

static LOGGER: ConsoleLog = ConsoleLog;

impl log::Log for ConsoleLog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => console::error_1(&msg),
            log::Level::Warn => console::warn_1(&msg),
            log::Level::Info => console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger and panic hook once. Later calls only adjust
/// the level.
pub fn init(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        install_panic_hook();
    }
    log::set_max_level(level);
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(|info| {
            let msg = format!("MerryMaker WASM panic: {info}");
            console::error_1(&msg.into());
        }));
    }
}

/// Parse a level name from the front end; unknown names fall back to `warn`.
pub fn level_from_name(name: &str) -> log::LevelFilter {
    name.parse().unwrap_or(log::LevelFilter::Warn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(level_from_name("debug"), log::LevelFilter::Debug);
        assert_eq!(level_from_name("TRACE"), log::LevelFilter::Trace);
        assert_eq!(level_from_name("loud"), log::LevelFilter::Warn);
    }
}
