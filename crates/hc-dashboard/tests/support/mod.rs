#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use hc_api_types::{
    Amount, Consent, ConsentStatus, CreateConsentRequest, MedicalRecord, Pagination, Patient,
    PatientPage, PlatformStats, Timestamp, Transaction, UpdateConsentRequest,
    VerifySignatureRequest,
};
use hc_gateway::{Gateway, GatewayResult, PatientQuery, RequestError};
use hc_wallet::{InjectedWallet, WalletError};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListPatients(PatientQuery),
    GetPatient(String),
    GetRecords(String),
    ListConsents(Option<ConsentStatus>),
    CreateConsent(CreateConsentRequest),
    UpdateConsent(String, UpdateConsentRequest),
    ListTransactions(Option<String>, u32),
    GetStats,
    VerifySignature,
}

/// In-memory backend that records every call. Paging and filtering happen
/// here, the way the real server does them.
#[derive(Default)]
pub struct FakeGateway {
    pub calls: RefCell<Vec<Call>>,
    pub patients: RefCell<Vec<Patient>>,
    pub records: RefCell<HashMap<String, Vec<MedicalRecord>>>,
    pub consents: RefCell<Vec<Consent>>,
    pub transactions: RefCell<Vec<Transaction>>,
    pub stats: RefCell<PlatformStats>,
    failing: RefCell<HashMap<&'static str, String>>,
    held_pages: RefCell<HashMap<u32, oneshot::Receiver<()>>>,
}

impl FakeGateway {
    pub fn with_patients(count: usize) -> Self {
        let gateway = Self::default();
        *gateway.patients.borrow_mut() = (1..=count)
            .map(|n| patient(&format!("patient-{n:03}"), &format!("Patient {n}")))
            .collect();
        gateway
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn patient_queries(&self) -> Vec<PatientQuery> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::ListPatients(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fail(&self, op: &'static str, message: &str) {
        self.failing.borrow_mut().insert(op, message.to_owned());
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.borrow_mut().remove(op);
    }

    /// The next `list_patients` call for `page` waits until the returned
    /// sender fires.
    pub fn hold_page(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_pages.borrow_mut().insert(page, rx);
        tx
    }

    fn check(&self, op: &'static str) -> GatewayResult<()> {
        match self.failing.borrow().get(op) {
            Some(message) => Err(RequestError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl Gateway for FakeGateway {
    async fn list_patients(&self, query: &PatientQuery) -> GatewayResult<PatientPage> {
        self.calls.borrow_mut().push(Call::ListPatients(query.clone()));
        let held = self.held_pages.borrow_mut().remove(&query.page);
        if let Some(gate) = held {
            let _ = gate.await;
        }
        self.check("list_patients")?;

        let needle = query.search.clone().unwrap_or_default().to_lowercase();
        let matching: Vec<Patient> = self
            .patients
            .borrow()
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let size = query.page_size.max(1) as usize;
        let total_pages = matching.len().div_ceil(size) as u32;
        let patients = matching
            .iter()
            .skip((query.page.saturating_sub(1)) as usize * size)
            .take(size)
            .cloned()
            .collect();

        Ok(PatientPage {
            patients,
            pagination: Some(Pagination {
                page: query.page,
                limit: query.page_size,
                total: matching.len() as u64,
                total_pages,
            }),
        })
    }

    async fn get_patient(&self, id: &str) -> GatewayResult<Patient> {
        self.calls.borrow_mut().push(Call::GetPatient(id.to_owned()));
        self.check("get_patient")?;
        self.patients
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| RequestError::new("Patient not found"))
    }

    async fn get_patient_records(&self, id: &str) -> GatewayResult<Vec<MedicalRecord>> {
        self.calls.borrow_mut().push(Call::GetRecords(id.to_owned()));
        self.check("get_patient_records")?;
        Ok(self.records.borrow().get(id).cloned().unwrap_or_default())
    }

    async fn list_consents(
        &self,
        _patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> GatewayResult<Vec<Consent>> {
        self.calls.borrow_mut().push(Call::ListConsents(status));
        self.check("list_consents")?;
        Ok(self
            .consents
            .borrow()
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect())
    }

    async fn create_consent(&self, request: &CreateConsentRequest) -> GatewayResult<Consent> {
        self.calls
            .borrow_mut()
            .push(Call::CreateConsent(request.clone()));
        self.check("create_consent")?;

        let mut consents = self.consents.borrow_mut();
        let created = Consent {
            id: format!("consent-{}", consents.len() + 1),
            patient_id: request.patient_id.clone(),
            purpose: request.purpose.clone(),
            wallet_address: Some(request.wallet_address.clone()),
            signature: Some(request.signature.clone()),
            status: ConsentStatus::Pending,
            created_at: Some(Timestamp::from("2024-02-01T09:00:00Z")),
            blockchain_tx_hash: None,
        };
        consents.push(created.clone());
        Ok(created)
    }

    async fn update_consent(&self, id: &str, patch: &UpdateConsentRequest) -> GatewayResult<Consent> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateConsent(id.to_owned(), patch.clone()));
        self.check("update_consent")?;

        let mut consents = self.consents.borrow_mut();
        let consent = consents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RequestError::new("Consent not found"))?;
        if let Some(status) = patch.status {
            consent.status = status;
        }
        if let Some(hash) = &patch.blockchain_tx_hash {
            consent.blockchain_tx_hash = Some(hash.clone());
        }
        Ok(consent.clone())
    }

    async fn list_transactions(
        &self,
        wallet_address: Option<&str>,
        limit: u32,
    ) -> GatewayResult<Vec<Transaction>> {
        self.calls
            .borrow_mut()
            .push(Call::ListTransactions(wallet_address.map(str::to_owned), limit));
        self.check("list_transactions")?;
        Ok(self
            .transactions
            .borrow()
            .iter()
            .filter(|tx| wallet_address.is_none_or(|w| tx.from == w || tx.to == w))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_stats(&self) -> GatewayResult<PlatformStats> {
        self.calls.borrow_mut().push(Call::GetStats);
        self.check("get_stats")?;
        Ok(self.stats.borrow().clone())
    }

    async fn verify_signature(&self, _request: &VerifySignatureRequest) -> GatewayResult<bool> {
        self.calls.borrow_mut().push(Call::VerifySignature);
        Ok(true)
    }
}

/// Browser-wallet stand-in with a fixed account. Signatures are
/// `signed(<message>)` so tests can see what was signed.
pub struct ScriptedWallet {
    pub account: String,
    pub reject: bool,
}

impl ScriptedWallet {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_owned(),
            reject: false,
        }
    }

    pub fn rejecting(account: &str) -> Self {
        Self {
            account: account.to_owned(),
            reject: true,
        }
    }
}

#[async_trait(?Send)]
impl InjectedWallet for ScriptedWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(vec![self.account.clone()])
    }

    async fn sign_message(&self, message: &str, _address: &str) -> Result<String, WalletError> {
        if self.reject {
            return Err(WalletError::UserRejected);
        }
        Ok(format!("signed({message})"))
    }
}

pub fn patient(id: &str, name: &str) -> Patient {
    Patient {
        id: id.to_owned(),
        name: name.to_owned(),
        email: format!("{id}@example.com"),
        date_of_birth: Some(Timestamp::from("1985-03-15")),
        gender: "Female".to_owned(),
        phone: None,
        address: None,
        wallet_address: None,
    }
}

pub fn record(id: &str, title: &str) -> MedicalRecord {
    MedicalRecord {
        id: id.to_owned(),
        patient_id: None,
        record_type: "Lab Result".to_owned(),
        title: title.to_owned(),
        date: Some(Timestamp::from("2024-01-10")),
        doctor: Some("Dr. Smith".to_owned()),
        hospital: None,
        status: "Completed".to_owned(),
        description: None,
        blockchain_tx_hash: Some("0xfeed".to_owned()),
    }
}

pub fn consent(id: &str, status: ConsentStatus) -> Consent {
    Consent {
        id: id.to_owned(),
        patient_id: "patient-001".to_owned(),
        purpose: "Research Study Participation".to_owned(),
        wallet_address: Some("0x742d35Cc6634C0532925a3b844Bc454e4438f44e".to_owned()),
        signature: Some("0xsig".to_owned()),
        status,
        created_at: Some(Timestamp::from("2024-01-15T10:30:00Z")),
        blockchain_tx_hash: None,
    }
}

pub fn transaction(id: &str, from: &str, to: &str) -> Transaction {
    Transaction {
        id: id.to_owned(),
        tx_type: "Consent Approval".to_owned(),
        status: "Confirmed".to_owned(),
        from: from.to_owned(),
        to: to.to_owned(),
        amount: Amount::Decimal(0.25),
        currency: None,
        timestamp: Some(Timestamp::from("2024-01-15T14:05:09Z")),
        blockchain_tx_hash: Some("0xabc".to_owned()),
        metadata: None,
    }
}
