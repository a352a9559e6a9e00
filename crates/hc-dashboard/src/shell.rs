//! Navigation between screens and the wallet wiring they share.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use hc_gateway::Gateway;
use hc_wallet::{Subscription, WalletCapability, WalletError};
use tracing::info;

use crate::config::DashboardConfig;
use crate::consents::ConsentBoard;
use crate::patient_detail::PatientDetail;
use crate::patient_list::PatientList;
use crate::stats::StatsDashboard;
use crate::transactions::TransactionHistory;
use crate::view::Redraw;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Patients,
    Consents,
    Transactions,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Patients, Tab::Consents, Tab::Transactions, Tab::Stats];

    pub fn key(&self) -> &'static str {
        match self {
            Tab::Patients => "patients",
            Tab::Consents => "consents",
            Tab::Transactions => "transactions",
            Tab::Stats => "stats",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Patients => "Patients",
            Tab::Consents => "Consents",
            Tab::Transactions => "Transactions",
            Tab::Stats => "Statistics",
        }
    }

    pub fn from_key(key: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.key() == key)
    }
}

/// Owns the five screens and passes the wallet account and the selected
/// patient between them.
pub struct Shell {
    wallet: WalletCapability,
    tab: Cell<Tab>,
    selected_patient: RefCell<Option<String>>,
    redraw: Redraw,
    pub patients: PatientList,
    pub detail: PatientDetail,
    pub consents: ConsentBoard,
    pub transactions: TransactionHistory,
    pub stats: StatsDashboard,
}

impl Shell {
    pub fn new(
        gateway: Rc<dyn Gateway>,
        wallet: WalletCapability,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            tab: Cell::new(Tab::default()),
            selected_patient: RefCell::new(None),
            redraw: Redraw::default(),
            patients: PatientList::new(Rc::clone(&gateway), config),
            detail: PatientDetail::new(Rc::clone(&gateway)),
            consents: ConsentBoard::new(Rc::clone(&gateway), wallet.clone()),
            transactions: TransactionHistory::new(Rc::clone(&gateway), wallet.clone(), config),
            stats: StatsDashboard::new(gateway),
            wallet,
        }
    }

    /// One hook for every screen; fired on any state change.
    pub fn on_change(&self, hook: impl Fn() + 'static) {
        let hook: Rc<dyn Fn()> = Rc::new(hook);
        self.redraw.set(Rc::clone(&hook));
        self.patients.on_change(Rc::clone(&hook));
        self.detail.on_change(Rc::clone(&hook));
        self.consents.on_change(Rc::clone(&hook));
        self.transactions.on_change(Rc::clone(&hook));
        self.stats.on_change(hook);
    }

    pub fn wallet(&self) -> &WalletCapability {
        &self.wallet
    }

    pub fn tab(&self) -> Tab {
        self.tab.get()
    }

    pub fn selected_patient(&self) -> Option<String> {
        self.selected_patient.borrow().clone()
    }

    /// Mounts the current tab's screen.
    pub async fn start(&self) {
        self.mount_current().await;
    }

    /// Switching tabs mounts the target screen, which always re-fetches.
    /// Filters held by the screen are kept.
    pub async fn open_tab(&self, tab: Tab) {
        self.tab.set(tab);
        self.redraw.fire();
        self.mount_current().await;
    }

    async fn mount_current(&self) {
        match self.tab.get() {
            Tab::Patients if self.selected_patient.borrow().is_some() => self.detail.mount().await,
            Tab::Patients => self.patients.mount().await,
            Tab::Consents => self.consents.mount().await,
            Tab::Transactions => self.transactions.mount().await,
            Tab::Stats => self.stats.mount().await,
        }
    }

    /// Explicit user refresh: re-fetches the visible screen with its
    /// current dependencies.
    pub async fn refresh(&self) {
        match self.tab.get() {
            Tab::Patients if self.selected_patient.borrow().is_some() => self.detail.mount().await,
            Tab::Patients => self.patients.refresh().await,
            Tab::Consents => self.consents.refresh().await,
            Tab::Transactions => self.transactions.refresh().await,
            Tab::Stats => self.stats.refresh().await,
        }
    }

    pub async fn select_patient(&self, patient_id: &str) {
        *self.selected_patient.borrow_mut() = Some(patient_id.to_owned());
        self.tab.set(Tab::Patients);
        self.redraw.fire();
        self.detail.set_patient(Some(patient_id.to_owned())).await;
    }

    /// Leaves the detail view; the list mounts again with its filters.
    pub async fn back(&self) {
        *self.selected_patient.borrow_mut() = None;
        self.detail.set_patient(None).await;
        self.patients.mount().await;
    }

    pub async fn connect_wallet(&self) -> Result<String, WalletError> {
        let address = self.wallet.connect().await?;
        self.sync_account().await;
        Ok(address)
    }

    pub async fn disconnect_wallet(&self) {
        self.wallet.disconnect();
        self.sync_account().await;
    }

    /// Brings the screens in line with the wallet's current account.
    /// Safe to call more than once per change; an off-screen transaction
    /// list picks the account up on its next mount.
    pub async fn sync_account(&self) {
        info!("active account: {:?}", self.wallet.account());
        self.consents.account_changed();
        if self.tab.get() == Tab::Transactions {
            self.transactions.follow_account().await;
        }
        self.redraw.fire();
    }

    /// Subscribes to the wallet so a connect or disconnect made through any
    /// clone of the capability reaches the screens. `spawn` runs the
    /// resulting refetch on the caller's executor.
    pub fn follow_wallet(
        self: &Rc<Self>,
        spawn: impl Fn(Pin<Box<dyn Future<Output = ()>>>) + 'static,
    ) -> Subscription {
        let shell = Rc::downgrade(self);
        self.wallet.subscribe(move |_| {
            let Some(shell) = shell.upgrade() else {
                return;
            };
            spawn(Box::pin(async move { shell.sync_account().await }));
        })
    }
}
