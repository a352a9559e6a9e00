use async_trait::async_trait;
use hc_api_types::{
    Consent, ConsentStatus, CreateConsentRequest, MedicalRecord, Patient, PatientPage,
    PlatformStats, Transaction, UpdateConsentRequest, VerifySignatureRequest,
    VerifySignatureResponse,
};
use hc_gateway::{Gateway, GatewayResult, PatientQuery, RequestError};
use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Where the backend lives.
///
/// `from_env` reads `HEALTHCHAIN_API_URL` (default: `http://localhost:3001/api`).
/// The browser build has no environment and passes its own base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
        }
    }

    pub fn from_env() -> Self {
        std::env::var("HEALTHCHAIN_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }
}

/// JSON-over-HTTP gateway.
pub struct HttpGateway {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::from_env())
    }
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            endpoint: config.base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|err| RequestError::new(format!("invalid API URL {}: {err}", self.endpoint)))?;
        url.path_segments_mut()
            .map_err(|_| RequestError::new(format!("invalid API URL {}", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, op: &str, request: RequestBuilder) -> GatewayResult<Value> {
        let response = request.send().await.map_err(|err| {
            warn!("{op} transport failed: {err}");
            RequestError::new(format!("{op} failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{op} HTTP {status}");
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &text));
        }

        let text = response.text().await.map_err(|err| {
            warn!("{op} body read failed: {err}");
            RequestError::new(format!("{op}: reading response failed: {err}"))
        })?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|err| RequestError::new(format!("{op}: invalid JSON response: {err}")))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        op: &str,
        request: RequestBuilder,
        envelope_key: &str,
    ) -> GatewayResult<T> {
        debug!("{op}");
        let body = self.send(op, request).await?;
        decode(op, unwrap_envelope(body, envelope_key))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "message")]
    error: String,
}

fn error_from_body(status: reqwest::StatusCode, text: &str) -> RequestError {
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(text) {
        return RequestError::new(body.error);
    }
    if text.trim().is_empty() {
        return RequestError::new(status.to_string());
    }
    RequestError::new(format!("{status}: {text}"))
}

/// Accepts both `{"<key>": payload}` and the bare payload.
fn unwrap_envelope(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

fn decode<T: DeserializeOwned>(op: &str, value: Value) -> GatewayResult<T> {
    serde_json::from_value(value)
        .map_err(|err| RequestError::new(format!("{op}: unexpected response shape: {err}")))
}

/// Lists may come back bare or wrapped; `null` reads as empty.
fn decode_list<T: DeserializeOwned>(op: &str, value: Value) -> GatewayResult<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    decode(op, value)
}

#[async_trait(?Send)]
impl Gateway for HttpGateway {
    async fn list_patients(&self, query: &PatientQuery) -> GatewayResult<PatientPage> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.page_size.to_string()),
        ];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }

        let request = self.http.get(self.url(&["patients"])?).query(&params);
        debug!("list_patients page={} search={:?}", query.page, query.search);
        let body = self.send("list_patients", request).await?;

        // A bare array carries no pagination metadata.
        if body.is_array() {
            return Ok(PatientPage {
                patients: decode("list_patients", body)?,
                pagination: None,
            });
        }
        decode("list_patients", body)
    }

    async fn get_patient(&self, id: &str) -> GatewayResult<Patient> {
        let request = self.http.get(self.url(&["patients", id])?);
        self.fetch("get_patient", request, "patient").await
    }

    async fn get_patient_records(&self, id: &str) -> GatewayResult<Vec<MedicalRecord>> {
        let request = self.http.get(self.url(&["patients", id, "records"])?);
        debug!("get_patient_records {id}");
        let body = self.send("get_patient_records", request).await?;
        decode_list("get_patient_records", unwrap_envelope(body, "records"))
    }

    async fn list_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> GatewayResult<Vec<Consent>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(patient_id) = patient_id {
            params.push(("patientId", patient_id.to_owned()));
        }
        if let Some(status) = status {
            params.push(("status", status.as_str().to_owned()));
        }

        let request = self.http.get(self.url(&["consents"])?).query(&params);
        debug!("list_consents status={status:?}");
        let body = self.send("list_consents", request).await?;
        decode_list("list_consents", unwrap_envelope(body, "consents"))
    }

    async fn create_consent(&self, request: &CreateConsentRequest) -> GatewayResult<Consent> {
        let builder = self.http.post(self.url(&["consents"])?).json(request);
        self.fetch("create_consent", builder, "consent").await
    }

    async fn update_consent(&self, id: &str, patch: &UpdateConsentRequest) -> GatewayResult<Consent> {
        let builder = self
            .http
            .request(Method::PATCH, self.url(&["consents", id])?)
            .json(patch);
        self.fetch("update_consent", builder, "consent").await
    }

    async fn list_transactions(
        &self,
        wallet_address: Option<&str>,
        limit: u32,
    ) -> GatewayResult<Vec<Transaction>> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(addr) = wallet_address {
            params.push(("walletAddress", addr.to_owned()));
        }

        let request = self.http.get(self.url(&["transactions"])?).query(&params);
        debug!("list_transactions wallet={wallet_address:?} limit={limit}");
        let body = self.send("list_transactions", request).await?;
        decode_list("list_transactions", unwrap_envelope(body, "transactions"))
    }

    async fn get_stats(&self) -> GatewayResult<PlatformStats> {
        let request = self.http.get(self.url(&["stats"])?);
        self.fetch("get_stats", request, "stats").await
    }

    async fn verify_signature(&self, request: &VerifySignatureRequest) -> GatewayResult<bool> {
        let builder = self.http.post(self.url(&["verify-signature"])?).json(request);
        let response: VerifySignatureResponse =
            self.fetch("verify_signature", builder, "result").await?;
        Ok(response.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_is_unwrapped_only_when_key_present() {
        let wrapped = serde_json::json!({ "records": [1, 2] });
        assert_eq!(unwrap_envelope(wrapped, "records"), serde_json::json!([1, 2]));

        let bare = serde_json::json!({ "id": "p1" });
        assert_eq!(unwrap_envelope(bare.clone(), "patient"), bare);
    }

    #[test]
    fn error_body_message_wins_over_status() {
        let err = error_from_body(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"error":"Patient not found"}"#,
        );
        assert_eq!(err.message, "Patient not found");

        let err = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.message, "502 Bad Gateway: upstream down");
    }

    #[test]
    fn config_trims_trailing_slash() {
        assert_eq!(GatewayConfig::new("http://api.local/api/").base_url, "http://api.local/api");
    }

    #[test]
    fn ids_are_encoded_as_single_path_segments() -> Result<(), RequestError> {
        let gateway = HttpGateway::new(GatewayConfig::new("http://api.local/api/"));
        let url = gateway.url(&["patients", "patient 001/x", "records"])?;
        assert_eq!(url.as_str(), "http://api.local/api/patients/patient%20001%2Fx/records");
        Ok(())
    }

    #[test]
    fn malformed_endpoint_is_a_request_error() {
        let gateway = HttpGateway::new(GatewayConfig::new("not a url"));
        assert!(gateway.url(&["stats"]).is_err());
    }
}
