//! Backend endpoint selection.
//!
//! The dashboard talks to the HealthChain REST API through `HttpGateway`,
//! which uses the browser `fetch` under wasm. This module only decides which
//! base URL it points at.

use std::rc::Rc;

use hc_gateway_http::{DEFAULT_API_URL, GatewayConfig, HttpGateway};

use crate::dom;
use crate::state;

const STORED_URL_KEY: &str = "hc_api_url";

/// Determine the API base URL.
///
/// Priority: user-supplied `#baseUrl` input → `?api=` query parameter →
/// last URL used in this browser → the default local backend.
pub fn base_url() -> String {
    if let Some(input) = dom::by_id_typed::<web_sys::HtmlInputElement>("baseUrl") {
        let v = input.value().trim().to_string();
        if !v.is_empty() {
            return v;
        }
    }

    if let Some(v) = query_param("api").filter(|v| !v.trim().is_empty()) {
        return v;
    }

    state::local_get(STORED_URL_KEY)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

fn query_param(name: &str) -> Option<String> {
    let href = dom::window()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get(name)
}

/// Build a gateway for the current base URL and remember the choice.
pub fn gateway() -> Rc<HttpGateway> {
    let config = GatewayConfig::new(base_url());
    state::local_set(STORED_URL_KEY, &config.base_url);
    gloo_console::log!(format!("HealthChain API: {}", config.base_url));
    Rc::new(HttpGateway::new(config))
}
