//! HealthChain dashboard, browser front end.
//!
//! Binds the host page, wires the injected wallet and the HTTP gateway into
//! a `Shell`, and redraws the visible screen whenever the shell changes.

pub mod api;
pub mod dom;
pub mod ethereum;
pub mod events;
pub mod render;
pub mod state;

use std::rc::Rc;

use hc_dashboard::{DashboardConfig, Shell};
use hc_wallet::WalletCapability;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let gateway = api::gateway();
    els.base_url.set_value(gateway.endpoint());

    let wallet = match ethereum::EthereumProvider::detect() {
        Some(provider) => WalletCapability::new(Rc::new(provider)),
        None => {
            gloo_console::warn!("no injected wallet; consent signing is disabled");
            WalletCapability::unavailable()
        }
    };

    let shell = Rc::new(Shell::new(gateway, wallet, &DashboardConfig::default()));
    {
        let els = els.clone();
        let weak = Rc::downgrade(&shell);
        shell.on_change(move || {
            if let Some(shell) = weak.upgrade() {
                render::render_all(&els, &shell);
            }
        });
    }
    // Listener stays for the page's lifetime.
    shell.follow_wallet(|task| wasm_bindgen_futures::spawn_local(task));
    state::install(Rc::clone(&shell), els.clone());

    events::bind_events(&els)?;
    render::render_all(&els, &shell);
    shell.start().await;

    Ok(())
}
