use std::cell::RefCell;
use std::rc::Rc;

use hc_api_types::Transaction;
use hc_gateway::Gateway;
use hc_wallet::WalletCapability;

use crate::config::DashboardConfig;
use crate::fetch::{Resource, load_into};
use crate::format::{TRANSACTION_SPLIT, css_token, format_address, format_date_time};
use crate::view::{Panel, Redraw};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCard {
    pub id: String,
    pub tx_type: String,
    pub type_class: String,
    pub status: String,
    pub status_class: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub date: String,
    pub blockchain_tx_hash: Option<String>,
    pub metadata: Option<String>,
}

impl From<&Transaction> for TransactionCard {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            tx_type: tx.tx_type.clone(),
            type_class: css_token(&tx.tx_type),
            status: tx.status.clone(),
            status_class: css_token(&tx.status),
            from: format_address(&tx.from, TRANSACTION_SPLIT),
            to: format_address(&tx.to, TRANSACTION_SPLIT),
            amount: format!("{} {}", tx.amount, tx.currency_or_default()),
            date: format_date_time(tx.timestamp.as_ref()),
            blockchain_tx_hash: tx.blockchain_tx_hash.clone().filter(|h| !h.is_empty()),
            metadata: tx.metadata.as_ref().and_then(|value| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(text) if text.is_empty() => None,
                serde_json::Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionView {
    /// Shortened form of the account the list is filtered by.
    pub filtering_for: Option<String>,
    pub panel: Panel<Vec<TransactionCard>>,
}

/// Recent transactions, optionally scoped to the connected wallet.
/// Dependency: `{account}`, read from the wallet at fetch time.
pub struct TransactionHistory {
    gateway: Rc<dyn Gateway>,
    wallet: WalletCapability,
    limit: u32,
    /// Account the latest fetch was scoped to.
    scoped_to: RefCell<Option<String>>,
    resource: RefCell<Resource<Vec<Transaction>>>,
    redraw: Redraw,
}

impl TransactionHistory {
    pub fn new(
        gateway: Rc<dyn Gateway>,
        wallet: WalletCapability,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            gateway,
            wallet,
            limit: config.transaction_limit,
            scoped_to: RefCell::new(None),
            resource: RefCell::default(),
            redraw: Redraw::default(),
        }
    }

    pub fn on_change(&self, hook: Rc<dyn Fn()>) {
        self.redraw.set(hook);
    }

    pub fn account(&self) -> Option<String> {
        self.wallet.account()
    }

    /// Re-fetches when the wallet account differs from the one the list
    /// was loaded for. Returns whether a fetch ran.
    pub async fn follow_account(&self) -> bool {
        if *self.scoped_to.borrow() == self.wallet.account() {
            return false;
        }
        self.fetch().await;
        true
    }

    pub async fn mount(&self) {
        self.fetch().await;
    }

    pub async fn refresh(&self) {
        self.fetch().await;
    }

    async fn fetch(&self) {
        let account = self.wallet.account();
        self.scoped_to.replace(account.clone());
        load_into(
            "transactions",
            &self.resource,
            &self.redraw,
            self.gateway.list_transactions(account.as_deref(), self.limit),
        )
        .await;
    }

    pub fn view(&self) -> TransactionView {
        let account = self.wallet.account();
        let resource = self.resource.borrow();

        let panel = if resource.is_loading() {
            Panel::Loading("Loading transactions...")
        } else if let Some(err) = resource.error() {
            Panel::Failed {
                message: format!("Error: {err}"),
            }
        } else {
            match resource.data() {
                Some(txs) if !txs.is_empty() => {
                    Panel::Ready(txs.iter().map(TransactionCard::from).collect())
                }
                Some(_) => Panel::Empty {
                    message: "No transactions found",
                    hint: account
                        .is_some()
                        .then_some("No transactions for the connected wallet"),
                },
                None => Panel::Loading("Loading transactions..."),
            }
        };

        TransactionView {
            filtering_for: account
                .as_deref()
                .map(|a| format_address(a, TRANSACTION_SPLIT)),
            panel,
        }
    }
}
