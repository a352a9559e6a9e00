//! Wallet capability shared by every dashboard screen.
//!
//! One `WalletCapability` exists per process. Screens clone the handle, so an
//! account connected from one screen is visible to all of them. The actual
//! account list and signing come from an [`InjectedWallet`]: the browser
//! extension in production, [`LocalKeyWallet`] in development and tests.

mod local;

pub use local::LocalKeyWallet;

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("no wallet connected")]
    Unavailable,
    #[error("request rejected by user")]
    UserRejected,
    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Seam to the external wallet provider.
#[async_trait(?Send)]
pub trait InjectedWallet {
    /// Ask the provider for accounts, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
    /// Sign `message` with the key behind `address`.
    async fn sign_message(&self, message: &str, address: &str) -> Result<String, WalletError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener = Rc<dyn Fn(Option<&str>)>;

struct Inner {
    provider: Option<Rc<dyn InjectedWallet>>,
    account: RefCell<Option<String>>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
}

/// Observable connection state plus signing.
#[derive(Clone)]
pub struct WalletCapability {
    inner: Rc<Inner>,
}

impl WalletCapability {
    pub fn new(provider: Rc<dyn InjectedWallet>) -> Self {
        Self::build(Some(provider))
    }

    /// A capability with no injected wallet behind it; `connect` always
    /// fails with [`WalletError::Unavailable`].
    pub fn unavailable() -> Self {
        Self::build(None)
    }

    fn build(provider: Option<Rc<dyn InjectedWallet>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                provider,
                account: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.inner.provider.is_some()
    }

    pub fn account(&self) -> Option<String> {
        self.inner.account.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.account.borrow().is_some()
    }

    pub async fn connect(&self) -> Result<String, WalletError> {
        let provider = self.inner.provider.clone().ok_or(WalletError::Unavailable)?;
        let accounts = provider.request_accounts().await.inspect_err(|err| {
            warn!("wallet connect failed: {err}");
        })?;
        let Some(address) = accounts.into_iter().next() else {
            return Err(WalletError::Unavailable);
        };

        info!("wallet connected: {address}");
        self.set_account(Some(address.clone()));
        Ok(address)
    }

    pub fn disconnect(&self) {
        if self.inner.account.borrow().is_none() {
            return;
        }
        info!("wallet disconnected");
        self.set_account(None);
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let account = self.account().ok_or(WalletError::Unavailable)?;
        let provider = self.inner.provider.clone().ok_or(WalletError::Unavailable)?;
        provider.sign_message(message, &account).await
    }

    pub fn subscribe(&self, listener: impl Fn(Option<&str>) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription(id)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(id, _)| *id != subscription.0);
    }

    fn set_account(&self, account: Option<String>) {
        *self.inner.account.borrow_mut() = account.clone();

        // Listeners may subscribe or read state; call them without holding a borrow.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(account.as_deref());
        }
    }
}
