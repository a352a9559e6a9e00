use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use hc_api_types::{
    CONSENT_PURPOSES, Consent, ConsentStatus, CreateConsentRequest, UpdateConsentRequest,
};
use hc_gateway::{Gateway, RequestError};
use hc_wallet::{WalletCapability, WalletError};
use thiserror::Error;
use tracing::{info, warn};

use crate::fetch::{Resource, load_into};
use crate::format::{CONSENT_SPLIT, css_token, format_address, format_date};
use crate::view::{Notice, Panel, Redraw};

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("Please connect your wallet first")]
    WalletRequired,
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl ConsentError {
    /// Local precondition failures are shown as-is; remote and wallet
    /// failures get the operation prefixed.
    fn notice_text(&self, operation: &str) -> String {
        match self {
            ConsentError::WalletRequired | ConsentError::MissingFields => self.to_string(),
            other => format!("Failed to {operation} consent: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ConsentStatus),
}

impl StatusFilter {
    /// Filter tabs offered on the consent screen.
    pub const TABS: [StatusFilter; 3] = [
        StatusFilter::All,
        StatusFilter::Only(ConsentStatus::Active),
        StatusFilter::Only(ConsentStatus::Pending),
    ];

    pub fn status(&self) -> Option<ConsentStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(ConsentStatus::Active) => "Active",
            StatusFilter::Only(ConsentStatus::Pending) => "Pending",
            StatusFilter::Only(ConsentStatus::Rejected) => "Rejected",
            StatusFilter::Only(ConsentStatus::Unknown) => "Unknown",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentDraft {
    pub patient_id: String,
    pub purpose: String,
}

impl ConsentDraft {
    pub fn is_complete(&self) -> bool {
        !self.patient_id.trim().is_empty() && !self.purpose.trim().is_empty()
    }

    /// The exact text the wallet is asked to sign.
    pub fn consent_message(&self) -> String {
        format!(
            "I consent to: {} for patient: {}",
            self.purpose, self.patient_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentCard {
    pub id: String,
    pub patient_id: String,
    pub purpose: String,
    pub status: ConsentStatus,
    pub status_class: String,
    pub created: String,
    pub wallet: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    /// Approve/Reject are offered for pending consents while a wallet is connected.
    pub can_review: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTab {
    pub filter: StatusFilter,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentForm {
    pub draft: ConsentDraft,
    pub purposes: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentView {
    pub can_create: bool,
    pub form_open: bool,
    pub show_wallet_warning: bool,
    pub form: Option<ConsentForm>,
    pub filters: Vec<FilterTab>,
    /// Fetch errors render inline above whatever list is still held.
    pub error: Option<String>,
    pub panel: Panel<Vec<ConsentCard>>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Default)]
struct BoardState {
    filter: StatusFilter,
    form_open: bool,
    draft: ConsentDraft,
    notice: Option<Notice>,
}

/// Consent list plus create/approve/reject. Dependency: `{filter_status}`.
pub struct ConsentBoard {
    gateway: Rc<dyn Gateway>,
    wallet: WalletCapability,
    state: RefCell<BoardState>,
    resource: RefCell<Resource<Vec<Consent>>>,
    redraw: Redraw,
}

impl ConsentBoard {
    pub fn new(gateway: Rc<dyn Gateway>, wallet: WalletCapability) -> Self {
        Self {
            gateway,
            wallet,
            state: RefCell::default(),
            resource: RefCell::default(),
            redraw: Redraw::default(),
        }
    }

    pub fn on_change(&self, hook: Rc<dyn Fn()>) {
        self.redraw.set(hook);
    }

    pub fn filter(&self) -> StatusFilter {
        self.state.borrow().filter
    }

    /// The wallet's current account; the board keeps no copy of its own.
    pub fn account(&self) -> Option<String> {
        self.wallet.account()
    }

    pub fn draft(&self) -> ConsentDraft {
        self.state.borrow().draft.clone()
    }

    pub fn is_form_open(&self) -> bool {
        self.state.borrow().form_open
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state.borrow().notice.clone()
    }

    /// Hands the pending notice to the UI exactly once.
    pub fn take_notice(&self) -> Option<Notice> {
        self.state.borrow_mut().notice.take()
    }

    /// The account is not a fetch dependency; it only gates the form and
    /// the review actions. A disconnect closes the form.
    pub fn account_changed(&self) {
        if !self.wallet.is_connected() {
            self.state.borrow_mut().form_open = false;
        }
        self.redraw.fire();
    }

    pub fn toggle_form(&self) {
        {
            let mut state = self.state.borrow_mut();
            if !self.wallet.is_connected() {
                return;
            }
            state.form_open = !state.form_open;
        }
        self.redraw.fire();
    }

    pub fn set_draft_patient_id(&self, patient_id: &str) {
        self.state.borrow_mut().draft.patient_id = patient_id.to_owned();
    }

    pub fn set_draft_purpose(&self, purpose: &str) {
        self.state.borrow_mut().draft.purpose = purpose.to_owned();
    }

    pub async fn mount(&self) {
        self.fetch().await;
    }

    pub async fn refresh(&self) {
        self.fetch().await;
    }

    pub async fn set_filter(&self, filter: StatusFilter) {
        {
            let mut state = self.state.borrow_mut();
            if state.filter == filter {
                return;
            }
            state.filter = filter;
        }
        self.fetch().await;
    }

    async fn fetch(&self) {
        let status = self.filter().status();
        load_into(
            "consents",
            &self.resource,
            &self.redraw,
            self.gateway.list_consents(None, status),
        )
        .await;
    }

    /// Signs the draft with the connected wallet and submits it. On success
    /// the draft is cleared, the form closes and the filtered list is
    /// re-read from the server. On failure the draft is kept.
    pub async fn create_consent(&self) -> Result<Consent, ConsentError> {
        let result = self.submit_draft().await;
        match &result {
            Ok(consent) => {
                info!("consent {} created", consent.id);
                {
                    let mut state = self.state.borrow_mut();
                    state.draft = ConsentDraft::default();
                    state.form_open = false;
                }
                self.fetch().await;
                self.raise(Notice::success("Consent created successfully!"));
            }
            Err(err) => {
                warn!("consent creation failed: {err}");
                self.raise(Notice::failure(err.notice_text("create")));
            }
        }
        result
    }

    async fn submit_draft(&self) -> Result<Consent, ConsentError> {
        let account = self.wallet.account().ok_or(ConsentError::WalletRequired)?;
        let draft = self.state.borrow().draft.clone();
        if !draft.is_complete() {
            return Err(ConsentError::MissingFields);
        }

        let signature = self.wallet.sign_message(&draft.consent_message()).await?;
        let request = CreateConsentRequest {
            patient_id: draft.patient_id,
            purpose: draft.purpose,
            wallet_address: account,
            signature,
        };
        Ok(self.gateway.create_consent(&request).await?)
    }

    /// Moves a consent to `status`, attaching a synthetic transaction hash,
    /// then re-reads the filtered list.
    pub async fn update_status(
        &self,
        consent_id: &str,
        status: ConsentStatus,
    ) -> Result<Consent, ConsentError> {
        let patch = UpdateConsentRequest {
            status: Some(status),
            blockchain_tx_hash: Some(synthetic_tx_hash()),
        };

        match self.gateway.update_consent(consent_id, &patch).await {
            Ok(consent) => {
                info!("consent {consent_id} moved to {status}");
                self.fetch().await;
                self.raise(Notice::success(format!(
                    "Consent status updated to {status}!"
                )));
                Ok(consent)
            }
            Err(err) => {
                warn!("consent {consent_id} update failed: {err}");
                let err = ConsentError::from(err);
                self.raise(Notice::failure(err.notice_text("update")));
                Err(err)
            }
        }
    }

    fn raise(&self, notice: Notice) {
        self.state.borrow_mut().notice = Some(notice);
        self.redraw.fire();
    }

    pub fn view(&self) -> ConsentView {
        let state = self.state.borrow();
        let resource = self.resource.borrow();
        let connected = self.wallet.is_connected();

        let panel = if resource.is_loading() {
            Panel::Loading("Loading consents...")
        } else {
            let consents = resource.data().map(Vec::as_slice).unwrap_or_default();
            if consents.is_empty() {
                Panel::Empty {
                    message: "No consents found",
                    hint: (state.filter != StatusFilter::All)
                        .then_some("Try changing the filter or create a new consent"),
                }
            } else {
                Panel::Ready(
                    consents
                        .iter()
                        .map(|consent| ConsentCard {
                            id: consent.id.clone(),
                            patient_id: consent.patient_id.clone(),
                            purpose: consent.purpose.clone(),
                            status: consent.status,
                            status_class: css_token(consent.status.as_str()),
                            created: format_date(consent.created_at.as_ref()),
                            wallet: consent
                                .wallet_address
                                .as_deref()
                                .filter(|a| !a.is_empty())
                                .map(|a| format_address(a, CONSENT_SPLIT)),
                            blockchain_tx_hash: consent
                                .blockchain_tx_hash
                                .clone()
                                .filter(|h| !h.is_empty()),
                            can_review: consent.status == ConsentStatus::Pending && connected,
                        })
                        .collect(),
                )
            }
        };

        ConsentView {
            can_create: connected,
            form_open: state.form_open && connected,
            show_wallet_warning: !connected,
            form: (state.form_open && connected).then(|| ConsentForm {
                draft: state.draft.clone(),
                purposes: &CONSENT_PURPOSES,
            }),
            filters: StatusFilter::TABS
                .iter()
                .map(|filter| FilterTab {
                    filter: *filter,
                    label: filter.label(),
                    active: *filter == state.filter,
                })
                .collect(),
            error: (!resource.is_loading())
                .then(|| resource.error().map(|e| format!("Error: {e}")))
                .flatten(),
            panel,
            notice: state.notice.clone(),
        }
    }
}

/// `0x` followed by 64 random hex digits.
pub fn synthetic_tx_hash() -> String {
    let bytes: [u8; 32] = rand::random();
    let mut hash = String::with_capacity(2 + 64);
    hash.push_str("0x");
    for byte in bytes {
        hash.push_str(&format!("{byte:02x}"));
    }
    hash
}
