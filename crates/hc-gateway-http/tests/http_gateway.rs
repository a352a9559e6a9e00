use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use hc_api_types::{ConsentStatus, CreateConsentRequest, UpdateConsentRequest, VerifySignatureRequest};
use hc_gateway::{Gateway, PatientQuery};
use hc_gateway_http::{GatewayConfig, HttpGateway};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Captured {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn consent_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "patientId": "patient-001",
        "purpose": "Research Study Participation",
        "walletAddress": "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
        "signature": "0xsig",
        "status": status,
        "createdAt": "2024-01-15T10:30:00Z"
    })
}

async fn list_patients(
    State(captured): State<Captured>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    captured.queries.lock().unwrap().push(params);
    Json(json!({
        "patients": [{
            "id": "patient-001",
            "name": "John Doe",
            "email": "john@example.com",
            "dateOfBirth": "1985-03-15",
            "gender": "Male",
            "phone": "+1-555-0101"
        }],
        "pagination": { "page": 2, "limit": 10, "total": 11, "totalPages": 2 }
    }))
}

async fn get_patient(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match id.as_str() {
        "patient-001" => Ok(Json(json!({
            "patient": { "id": "patient-001", "name": "John Doe", "email": "john@example.com" }
        }))),
        "patient-002" => Ok(Json(json!({ "id": "patient-002", "name": "Jane Roe" }))),
        _ => Err((StatusCode::NOT_FOUND, Json(json!({ "error": "Patient not found" })))),
    }
}

async fn patient_records(Path(_id): Path<String>) -> Json<Value> {
    Json(json!([{
        "id": "rec-1",
        "type": "Lab Result",
        "title": "Blood panel",
        "date": "2024-01-10",
        "status": "Final",
        "blockchainTxHash": "0xfeed"
    }]))
}

async fn list_consents(
    State(captured): State<Captured>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    captured.queries.lock().unwrap().push(params);
    Json(json!({ "consents": [consent_json("consent-1", "pending")] }))
}

async fn create_consent(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    captured.bodies.lock().unwrap().push(body);
    Json(json!({ "consent": consent_json("consent-2", "pending") }))
}

async fn update_consent(
    State(captured): State<Captured>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.bodies.lock().unwrap().push(body);
    Json(consent_json(&id, "active"))
}

async fn list_transactions(
    State(captured): State<Captured>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    captured.queries.lock().unwrap().push(params);
    Json(json!({ "transactions": [] }))
}

async fn stats() -> Json<Value> {
    Json(json!({ "stats": { "totalPatients": 3, "activeConsents": 1 } }))
}

async fn verify(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "valid": body["signature"] == "0xgood" }))
}

async fn spawn_backend() -> anyhow::Result<(HttpGateway, Captured)> {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/patients", get(list_patients))
        .route("/api/patients/{id}", get(get_patient))
        .route("/api/patients/{id}/records", get(patient_records))
        .route("/api/consents", get(list_consents).post(create_consent))
        .route("/api/consents/{id}", patch(update_consent))
        .route("/api/transactions", get(list_transactions))
        .route("/api/stats", get(stats))
        .route("/api/verify-signature", post(verify))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let gateway = HttpGateway::new(GatewayConfig::new(format!("http://{addr}/api/")));
    Ok((gateway, captured))
}

#[tokio::test]
async fn list_patients_sends_paging_and_search() -> anyhow::Result<()> {
    let (gateway, captured) = spawn_backend().await?;

    let page = gateway
        .list_patients(&PatientQuery::new(2, 10, "john"))
        .await?;
    assert_eq!(page.patients.len(), 1);
    assert_eq!(page.patients[0].phone.as_deref(), Some("+1-555-0101"));
    let pagination = page.pagination.expect("pagination metadata");
    assert_eq!((pagination.total, pagination.total_pages), (11, 2));

    let queries = captured.queries.lock().unwrap();
    assert_eq!(queries[0].get("page").map(String::as_str), Some("2"));
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("10"));
    assert_eq!(queries[0].get("search").map(String::as_str), Some("john"));
    Ok(())
}

#[tokio::test]
async fn patient_accepts_wrapped_and_bare_shapes() -> anyhow::Result<()> {
    let (gateway, _) = spawn_backend().await?;

    assert_eq!(gateway.get_patient("patient-001").await?.name, "John Doe");
    assert_eq!(gateway.get_patient("patient-002").await?.name, "Jane Roe");

    let records = gateway.get_patient_records("patient-001").await?;
    assert_eq!(records[0].record_type, "Lab Result");
    assert_eq!(records[0].blockchain_tx_hash.as_deref(), Some("0xfeed"));
    Ok(())
}

#[tokio::test]
async fn server_error_message_is_surfaced() -> anyhow::Result<()> {
    let (gateway, _) = spawn_backend().await?;

    let err = gateway.get_patient("missing").await.unwrap_err();
    assert_eq!(err.message, "Patient not found");
    Ok(())
}

#[tokio::test]
async fn consent_filters_and_mutations_use_camel_case() -> anyhow::Result<()> {
    let (gateway, captured) = spawn_backend().await?;

    let consents = gateway
        .list_consents(None, Some(ConsentStatus::Pending))
        .await?;
    assert_eq!(consents[0].status, ConsentStatus::Pending);
    {
        let queries = captured.queries.lock().unwrap();
        assert_eq!(queries[0].get("status").map(String::as_str), Some("pending"));
        assert!(!queries[0].contains_key("patientId"));
    }

    let created = gateway
        .create_consent(&CreateConsentRequest {
            patient_id: "patient-001".into(),
            purpose: "Research Study Participation".into(),
            wallet_address: "0xABC".into(),
            signature: "0xsig".into(),
        })
        .await?;
    assert_eq!(created.id, "consent-2");

    let updated = gateway
        .update_consent(
            "consent-1",
            &UpdateConsentRequest {
                status: Some(ConsentStatus::Active),
                blockchain_tx_hash: Some("0xabc123".into()),
            },
        )
        .await?;
    assert_eq!(updated.status, ConsentStatus::Active);

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(
        bodies[0],
        json!({
            "patientId": "patient-001",
            "purpose": "Research Study Participation",
            "walletAddress": "0xABC",
            "signature": "0xsig"
        })
    );
    assert_eq!(bodies[1], json!({ "status": "active", "blockchainTxHash": "0xabc123" }));
    Ok(())
}

#[tokio::test]
async fn transactions_stats_and_signature_check() -> anyhow::Result<()> {
    let (gateway, captured) = spawn_backend().await?;

    let txs = gateway.list_transactions(Some("0xABC"), 20).await?;
    assert!(txs.is_empty());
    {
        let queries = captured.queries.lock().unwrap();
        assert_eq!(queries[0].get("walletAddress").map(String::as_str), Some("0xABC"));
        assert_eq!(queries[0].get("limit").map(String::as_str), Some("20"));
    }

    let stats = gateway.get_stats().await?;
    assert_eq!((stats.total_patients, stats.active_consents, stats.total_records), (3, 1, 0));

    let valid = gateway
        .verify_signature(&VerifySignatureRequest {
            message: "hello".into(),
            signature: "0xgood".into(),
            address: "0xABC".into(),
        })
        .await?;
    assert!(valid);
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let gateway = HttpGateway::new(GatewayConfig::new(format!("http://{addr}")));
    let err = gateway.get_stats().await.unwrap_err();
    assert!(err.message.starts_with("get_stats failed"), "{}", err.message);
    Ok(())
}

#[tokio::test]
async fn truncated_success_body_is_a_request_error() -> anyhow::Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n";
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(br#"{"consents": [{"id""#).await;
            let _ = socket.flush().await;
        }
    });

    let gateway = HttpGateway::new(GatewayConfig::new(format!("http://{addr}/api")));
    let err = gateway.list_consents(None, None).await.unwrap_err();
    assert!(err.message.starts_with("list_consents"), "{}", err.message);
    Ok(())
}
