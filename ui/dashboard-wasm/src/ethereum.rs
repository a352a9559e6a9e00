//! `window.ethereum` (EIP-1193) as an [`InjectedWallet`].

use async_trait::async_trait;
use hc_wallet::{InjectedWallet, WalletError};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::dom;

/// EIP-1193 "user rejected request".
const USER_REJECTED: f64 = 4001.0;

pub struct EthereumProvider {
    provider: JsValue,
}

impl EthereumProvider {
    /// `None` when no extension injected a provider into the page.
    pub fn detect() -> Option<Self> {
        let window = dom::window()?;
        let provider = Reflect::get(&window, &"ethereum".into()).ok()?;
        if provider.is_undefined() || provider.is_null() {
            return None;
        }
        Some(Self { provider })
    }

    async fn request(&self, method: &str, params: Array) -> Result<JsValue, WalletError> {
        let args = Object::new();
        Reflect::set(&args, &"method".into(), &method.into()).map_err(provider_error)?;
        Reflect::set(&args, &"params".into(), &params).map_err(provider_error)?;

        let request: Function = Reflect::get(&self.provider, &"request".into())
            .map_err(provider_error)?
            .dyn_into()
            .map_err(|_| WalletError::Provider("provider has no request()".to_string()))?;
        let promise: Promise = request
            .call1(&self.provider, &args)
            .map_err(provider_error)?
            .dyn_into()
            .map_err(|_| WalletError::Provider(format!("{method} did not return a promise")))?;

        JsFuture::from(promise).await.map_err(provider_error)
    }
}

#[async_trait(?Send)]
impl InjectedWallet for EthereumProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let accounts = self.request("eth_requestAccounts", Array::new()).await?;
        Ok(Array::from(&accounts)
            .iter()
            .filter_map(|a| a.as_string())
            .collect())
    }

    async fn sign_message(&self, message: &str, address: &str) -> Result<String, WalletError> {
        let params = Array::of2(&message.into(), &address.into());
        self.request("personal_sign", params)
            .await?
            .as_string()
            .ok_or_else(|| WalletError::Provider("signature is not a string".to_string()))
    }
}

fn provider_error(err: JsValue) -> WalletError {
    let code = Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|c| c.as_f64());
    if code == Some(USER_REJECTED) {
        return WalletError::UserRejected;
    }
    let message = Reflect::get(&err, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    WalletError::Provider(message)
}
