//! DOM element bindings.
//!
//! The host page provides a fixed frame: tab buttons (`.tab[data-tab]`), one
//! `.panel` per tab whose id is the tab key, the wallet button and status
//! line, and the patient search box. Everything inside the `*Body`
//! containers is re-rendered from view models on each redraw.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

// ── Helpers ──

pub fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

fn doc() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(nl) = doc().and_then(|d| d.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    (0..nl.length())
        .filter_map(|i| nl.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_inner_html(el: &Element, html: &str) {
    el.set_inner_html(html);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

/// Blocking browser alert; used for mutation outcomes.
pub fn alert(message: &str) {
    if let Some(w) = window() {
        let _ = w.alert_with_message(message);
    }
}

/// Closest ancestor (or self) of the event target carrying `data-action`.
pub fn action_target(event: &web_sys::Event) -> Option<Element> {
    let target: Element = event.target()?.dyn_into().ok()?;
    target.closest("[data-action]").ok()?
}

pub fn data(el: &Element, key: &str) -> Option<String> {
    el.get_attribute(&format!("data-{key}"))
}

// ── Elements struct ──

/// Fixed DOM references used by the dashboard.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    pub root: Element,
    pub base_url: HtmlInputElement,

    pub tabs: Vec<Element>,
    pub panels: Vec<Element>,

    pub wallet_button: HtmlElement,
    pub wallet_status: Element,

    pub patient_search: HtmlInputElement,
    pub patients_body: Element,
    pub consents_body: Element,
    pub transactions_body: Element,
    pub stats_body: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_html {
    ($id:expr) => {
        by_id_typed::<HtmlElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing html element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            root: get_el!("app"),
            base_url: get_input!("baseUrl"),

            tabs: query_all(".tab"),
            panels: query_all(".panel"),

            wallet_button: get_html!("walletButton"),
            wallet_status: get_el!("walletStatus"),

            patient_search: get_input!("patientSearch"),
            patients_body: get_el!("patientsBody"),
            consents_body: get_el!("consentsBody"),
            transactions_body: get_el!("transactionsBody"),
            stats_body: get_el!("statsBody"),
        })
    }
}
