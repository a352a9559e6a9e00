//! Event binding.
//!
//! The frame's fixed controls get their own listeners. Everything rendered
//! into the screen bodies is handled by one delegated listener on `#app`
//! that dispatches on `data-action`.

use hc_api_types::ConsentStatus;
use hc_dashboard::{Shell, StatusFilter, Tab};
use hc_wallet::WalletError;
use wasm_bindgen::prelude::*;
use web_sys::{Element, EventTarget, HtmlInputElement, HtmlSelectElement};

use crate::dom::{self, Elements};
use crate::state;

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

/// Run `f` against the installed shell on the UI task queue.
fn with_shell<F, Fut>(f: F)
where
    F: FnOnce(std::rc::Rc<Shell>) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    if let Some(shell) = state::shell() {
        wasm_bindgen_futures::spawn_local(f(shell));
    }
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    // ── Tabs ──
    for tab in &els.tabs {
        let Some(target) = tab.get_attribute("data-tab").as_deref().and_then(Tab::from_key) else {
            continue;
        };
        listen(tab, "click", move |_| {
            with_shell(move |shell| async move { shell.open_tab(target).await });
        })?;
    }

    // ── Wallet ──
    listen(&els.wallet_button, "click", |_| {
        with_shell(|shell| async move {
            if shell.wallet().is_connected() {
                shell.disconnect_wallet().await;
                return;
            }
            match shell.connect_wallet().await {
                Ok(_) => {}
                Err(WalletError::Unavailable) if !shell.wallet().has_provider() => {
                    dom::alert("Please install MetaMask to use this feature");
                }
                Err(err) => {
                    gloo_console::error!(format!("wallet connect failed: {err}"));
                    dom::alert(&format!("Failed to connect wallet: {err}"));
                }
            }
        });
    })?;

    // ── Backend URL ──
    // A new endpoint means a new gateway; reload and let init pick it up.
    {
        let input = els.base_url.clone();
        listen(&els.base_url, "change", move |_| {
            state::local_set("hc_api_url", input.value().trim());
            if let Some(w) = dom::window() {
                let _ = w.location().reload();
            }
        })?;
    }

    // ── Patient search ──
    {
        let input = els.patient_search.clone();
        listen(&els.patient_search, "input", move |_| {
            let term = input.value();
            with_shell(move |shell| async move { shell.patients.set_search_term(&term).await });
        })?;
    }

    // ── Rendered content ──
    listen(&els.root, "click", |event| {
        if let Some(el) = dom::action_target(&event) {
            with_shell(move |shell| on_action(shell, el));
        }
    })?;
    listen(&els.root, "input", on_draft_edit)?;
    listen(&els.root, "change", on_draft_edit)?;

    Ok(())
}

/// Draft edits update state without redrawing, so the inputs keep focus.
fn on_draft_edit(event: web_sys::Event) {
    let Some(shell) = state::shell() else {
        return;
    };
    let Some(target) = event.target() else {
        return;
    };
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        if input.id() == "draftPatientId" {
            shell.consents.set_draft_patient_id(&input.value());
        }
    } else if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
        if select.id() == "draftPurpose" {
            shell.consents.set_draft_purpose(&select.value());
        }
    }
}

async fn on_action(shell: std::rc::Rc<Shell>, el: Element) {
    let action = dom::data(&el, "action").unwrap_or_default();
    let id = dom::data(&el, "id");

    match (action.as_str(), id) {
        ("open-patient", Some(id)) => shell.select_patient(&id).await,
        ("back", _) => shell.back().await,
        ("refresh", _) => shell.refresh().await,
        ("page", _) => {
            if let Some(page) = dom::data(&el, "page").and_then(|p| p.parse().ok()) {
                shell.patients.go_to_page(page).await;
            }
        }
        ("toggle-consent-form", _) => shell.consents.toggle_form(),
        ("consent-filter", _) => {
            if let Some(filter) = dom::data(&el, "filter").and_then(|f| f.parse::<StatusFilter>().ok()) {
                shell.consents.set_filter(filter).await;
            }
        }
        ("create-consent", _) => {
            let _ = shell.consents.create_consent().await;
            show_notice(&shell);
        }
        ("approve", Some(id)) => {
            let _ = shell.consents.update_status(&id, ConsentStatus::Active).await;
            show_notice(&shell);
        }
        ("reject", Some(id)) => {
            let _ = shell.consents.update_status(&id, ConsentStatus::Rejected).await;
            show_notice(&shell);
        }
        (other, _) => gloo_console::warn!(format!("unhandled action: {other}")),
    }
}

fn show_notice(shell: &Shell) {
    if let Some(notice) = shell.consents.take_notice() {
        dom::alert(&notice.text);
    }
}
