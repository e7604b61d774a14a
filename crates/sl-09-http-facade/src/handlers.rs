//! Route handlers. Each one validates its input, then runs a single
//! [`LedgerConnector::with_ledger`](sl_08_lab_ledger::LedgerConnector::with_ledger)
//! scope.

use crate::errors::ApiError;
use crate::requests::{
    decode_base64, required, EditFieldRequest, LegacyImageQuery, LegacyTestQuery, StoreImageRequest,
    StoreModelRequest, StorePlanilhaRequest, StoreTestRequest, UpdateTestRequest,
};
use crate::router::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use sl_06_content_addressing::{model_from_base64, ContentDigest, KNOWN_MODEL_KEYS};
use sl_08_lab_ledger::LabError;
use tracing::info;

type ApiResult = Result<Json<Value>, ApiError>;

fn parse_digest(hex: &str) -> Result<ContentDigest, ApiError> {
    ContentDigest::parse(hex).map_err(|e| ApiError::from(LabError::from(e)))
}

fn found(result: Option<Value>, what: &str) -> ApiResult {
    result
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{what} not found")))
}

// =============================================================================
// STORE
// =============================================================================

pub async fn store_test(
    State(state): State<AppState>,
    payload: Result<Json<StoreTestRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let fallback = request.test_id.clone();
    let items = request.items()?;

    let stored = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.store_tests(&items, fallback.as_deref()).await }))
        .await?;

    let details: Vec<Value> = stored
        .iter()
        .map(|item| {
            json!({
                "index": item.index,
                "testID": item.test_id,
                "transactionId": item.transaction_id,
                "status": "ok",
            })
        })
        .collect();
    info!(total = details.len(), "Tests stored");

    Ok(Json(json!({
        "message": "Tests stored",
        "total": details.len(),
        "details": details,
    })))
}

pub async fn store_image(
    State(state): State<AppState>,
    payload: Result<Json<StoreImageRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let kit_id = required(&request.kit_id, "kitID")?.to_string();
    let image = decode_base64(required(&request.image, "image")?, "image")?;

    let ledger_kit = kit_id.clone();
    let digest = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.store_image(&ledger_kit, &image).await }))
        .await?;

    Ok(Json(json!({
        "message": "Image stored",
        "kitID": kit_id,
        "imageHash": digest.to_hex(),
    })))
}

pub async fn store_model(
    State(state): State<AppState>,
    payload: Result<Json<StoreModelRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let model_key = required(&request.model_key, "modelKey")?;
    if !KNOWN_MODEL_KEYS.contains(&model_key) {
        return Err(ApiError::bad_request(format!(
            "modelKey must be one of {}",
            KNOWN_MODEL_KEYS.join(", ")
        )));
    }
    let artifact = model_from_base64(model_key, required(&request.model, "model")?).map_err(LabError::from)?;
    let model_key = artifact.key.clone();

    let committed = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.store_model(&artifact).await }))
        .await?;

    Ok(Json(json!({
        "message": "Model stored",
        "modelKey": model_key,
        "transactionId": committed.transaction_id,
    })))
}

pub async fn store_planilha(
    State(state): State<AppState>,
    payload: Result<Json<StorePlanilhaRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let lote = required(&request.lote, "lote")?.to_string();

    let digest = match (&request.planilha_hash, &request.planilha) {
        (Some(hash), _) if !hash.trim().is_empty() => parse_digest(hash.trim())?,
        (_, Some(encoded)) if !encoded.trim().is_empty() => {
            sl_06_content_addressing::digest(&decode_base64(encoded, "planilha")?)
        }
        _ => return Err(ApiError::missing("planilhaHash")),
    };

    let ledger_lote = lote.clone();
    let ledger_digest = digest.clone();
    state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.store_planilha(&ledger_lote, &ledger_digest).await }))
        .await?;

    Ok(Json(json!({
        "message": "Spreadsheet stored",
        "lote": lote,
        "planilhaHash": digest.to_hex(),
    })))
}

// =============================================================================
// QUERY
// =============================================================================

pub async fn query_test_by_id(State(state): State<AppState>, Path(test_id): Path<String>) -> ApiResult {
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_test_by_id(&test_id).await }))
        .await?;
    found(result, "Test")
}

pub async fn query_tests_by_lote(State(state): State<AppState>, Path(lote): Path<String>) -> ApiResult {
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_tests_by_lote(&lote).await }))
        .await?;
    found(result, "Lot")
}

pub async fn query_image_by_hash(State(state): State<AppState>, Path(image_hash): Path<String>) -> ApiResult {
    let digest = parse_digest(&image_hash)?;
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_image_by_hash(&digest).await }))
        .await?;
    found(result, "Image")
}

pub async fn query_images_by_kit(State(state): State<AppState>, Path(kit_id): Path<String>) -> ApiResult {
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_images_by_kit(&kit_id).await }))
        .await?;
    found(result, "Images for kit")
}

pub async fn query_planilha_by_hash(State(state): State<AppState>, Path(planilha_hash): Path<String>) -> ApiResult {
    let digest = parse_digest(&planilha_hash)?;
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_planilha_by_hash(&digest).await }))
        .await?;
    found(result, "Spreadsheet")
}

pub async fn query_planilhas_by_lote(State(state): State<AppState>, Path(lote): Path<String>) -> ApiResult {
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_planilhas_by_lote(&lote).await }))
        .await?;
    found(result, "Spreadsheets for lot")
}

/// Body-based test lookup. An unknown id answers `null` with 200.
pub async fn legacy_query_test(
    State(state): State<AppState>,
    payload: Result<Json<LegacyTestQuery>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let test_id = required(&request.test_id, "testID")?.to_string();
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_test_by_id(&test_id).await }))
        .await?;
    Ok(Json(result.unwrap_or(Value::Null)))
}

/// Body-based image lookup. An unknown digest answers `null` with 200.
pub async fn legacy_query_image(
    State(state): State<AppState>,
    payload: Result<Json<LegacyImageQuery>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let digest = parse_digest(required(&request.image_hash, "imageHash")?)?;
    let result = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.query_image_by_hash(&digest).await }))
        .await?;
    Ok(Json(result.unwrap_or(Value::Null)))
}

// =============================================================================
// UPDATE
// =============================================================================

pub async fn update_test(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTestRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let test_id = required(&request.test_id, "testID")?.to_string();
    if request.data.is_null() {
        return Err(ApiError::missing("data"));
    }
    let record = request.data;

    let ledger_id = test_id.clone();
    let committed = state
        .connector
        .with_ledger(move |lab| Box::pin(async move { lab.update_test(&ledger_id, &record).await }))
        .await?;

    Ok(Json(json!({
        "message": "Test updated",
        "testID": test_id,
        "transactionId": committed.transaction_id,
    })))
}

pub async fn edit_test_field(
    State(state): State<AppState>,
    payload: Result<Json<EditFieldRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let test_id = required(&request.test_id, "testID")?.to_string();
    let field = required(&request.field, "field")?.to_string();
    let raw_value = request.raw_value()?;

    let ledger_id = test_id.clone();
    let record = state
        .connector
        .with_ledger(move |lab| {
            Box::pin(async move { lab.edit_test_field(&ledger_id, &field, &raw_value).await })
        })
        .await?;

    Ok(Json(json!({
        "message": "Test updated",
        "testID": test_id,
        "record": record,
    })))
}

// =============================================================================
// HEALTH
// =============================================================================

/// Opens and closes one ledger connection.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let outcome = state
        .connector
        .with_ledger(|_| Box::pin(async { Ok::<_, LabError>(()) }))
        .await;
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    match outcome {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": timestamp,
                "services": { "ledger": "connected", "server": "running" },
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "error": err.to_string(),
                "timestamp": timestamp,
            })),
        ),
    }
}
