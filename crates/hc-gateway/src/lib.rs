use async_trait::async_trait;
use hc_api_types::{
    Consent, ConsentStatus, CreateConsentRequest, MedicalRecord, Patient, PatientPage,
    PlatformStats, Transaction, UpdateConsentRequest, VerifySignatureRequest,
};
use thiserror::Error;

/// The only failure a gateway call reports. Status codes are folded into the
/// message; callers never branch on them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type GatewayResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
}

impl PatientQuery {
    pub fn new(page: u32, page_size: u32, search: &str) -> Self {
        let search = search.trim();
        Self {
            page,
            page_size,
            search: (!search.is_empty()).then(|| search.to_owned()),
        }
    }
}

/// Typed façade over the backend REST API.
///
/// Futures are `?Send`: the dashboard runs on one UI thread and the browser
/// fetch futures are not `Send`.
#[async_trait(?Send)]
pub trait Gateway {
    async fn list_patients(&self, query: &PatientQuery) -> GatewayResult<PatientPage>;
    async fn get_patient(&self, id: &str) -> GatewayResult<Patient>;
    async fn get_patient_records(&self, id: &str) -> GatewayResult<Vec<MedicalRecord>>;
    async fn list_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> GatewayResult<Vec<Consent>>;
    async fn create_consent(&self, request: &CreateConsentRequest) -> GatewayResult<Consent>;
    async fn update_consent(&self, id: &str, patch: &UpdateConsentRequest) -> GatewayResult<Consent>;
    async fn list_transactions(
        &self,
        wallet_address: Option<&str>,
        limit: u32,
    ) -> GatewayResult<Vec<Transaction>>;
    async fn get_stats(&self) -> GatewayResult<PlatformStats>;
    async fn verify_signature(&self, request: &VerifySignatureRequest) -> GatewayResult<bool>;
}
