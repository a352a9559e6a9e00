//! Global application state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! The shell owns every screen's state; this module only keeps it reachable
//! from event callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use hc_dashboard::Shell;

use crate::dom::Elements;

#[derive(Default)]
struct AppState {
    shell: Option<Rc<Shell>>,
    elements: Option<Elements>,
}

// ── Thread-local singleton ──

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

pub fn install(shell: Rc<Shell>, elements: Elements) {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        s.shell = Some(shell);
        s.elements = Some(elements);
    });
}

pub fn shell() -> Option<Rc<Shell>> {
    STATE.with(|s| s.borrow().shell.clone())
}

pub fn elements() -> Option<Elements> {
    STATE.with(|s| s.borrow().elements.clone())
}

// ── localStorage helpers ──

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub fn local_get(key: &str) -> Option<String> {
    storage()?.get_item(key).ok()?
}

pub fn local_set(key: &str, value: &str) {
    if let Some(s) = storage() {
        let _ = s.set_item(key, value);
    }
}
