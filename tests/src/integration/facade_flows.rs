//! # Facade Flows
//!
//! HTTP requests against the router and direct library calls observing
//! the same simulated network.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::{json, Value};
    use sl_06_content_addressing::digest;
    use sl_08_lab_ledger::{simulated_network, LedgerConnector, LedgerProfile};
    use sl_09_http_facade::{build_router, AppState, FacadeConfig};
    use std::sync::Arc;
    use tower::ServiceExt;

    // =============================================================================
    // FIXTURES
    // =============================================================================

    fn setup() -> (Router, LedgerConnector) {
        let profile = LedgerProfile::default();
        let ledger = Arc::new(simulated_network(&profile));
        let connector = LedgerConnector::in_memory(profile, ledger);
        let app = build_router(AppState::new(connector.clone()), &FacadeConfig::default());
        (app, connector)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_http_store_visible_to_library() {
        let (app, connector) = setup();
        let (status, _) = call(
            &app,
            json_request(
                Method::POST,
                "/store/test",
                json!({"testID": "T-1", "data": {"cassette_lot": "L1", "sample_pH": 7.0}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let found = connector
            .with_ledger(|lab| Box::pin(async move { lab.query_test_by_id("T-1").await }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["cassette_lot"], "L1");
        assert_eq!(found["version"], 0);
    }

    #[tokio::test]
    async fn test_patch_then_get_returns_edited_record() {
        let (app, connector) = setup();
        connector
            .with_ledger(|lab| {
                Box::pin(async move { lab.store_test("T-5", &json!({"cassette_lot": "L1", "qc": {"passed": false}})).await })
            })
            .await
            .unwrap();

        let (status, body) = call(
            &app,
            json_request(
                Method::PATCH,
                "/update/test/field",
                json!({"testID": "T-5", "field": "qc.passed", "value": "true"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["qc"]["passed"], true);

        let (status, body) = call(&app, get("/query/test/id/T-5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["qc"]["passed"], true);
        assert_eq!(body["version"], 1);
    }

    #[tokio::test]
    async fn test_image_upload_addressed_by_local_digest() {
        let (app, _) = setup();
        let image = b"\x89PNG\r\n\x1a\nstrip".to_vec();
        let expected = digest(&image).to_hex();

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/store/image",
                json!({"kitID": "KIT-7", "image": format!("data:image/png;base64,{}", STANDARD.encode(&image))}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imageHash"], expected);

        let (status, body) = call(&app, get(&format!("/query/image/hash/{expected}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["idKit"], "KIT-7");

        let (status, body) = call(&app, json_request(Method::POST, "/query/image", json!({"imageHash": expected}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hashData"], expected);
    }

    #[tokio::test]
    async fn test_planilha_upload_then_lot_query() {
        let (app, _) = setup();
        let sheet = b"lote;resultado\nL3;ok\n";

        let (status, body) = call(
            &app,
            json_request(
                Method::POST,
                "/store/planilha",
                json!({"lote": "L3", "planilha": STANDARD.encode(sheet)}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["planilhaHash"], digest(sheet).to_hex());

        let (status, body) = call(&app, get("/query/planilha/lote/L3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, body) = call(&app, get("/query/planilha/lote/L4")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_model_upload_rejects_unknown_key() {
        let (app, _) = setup();
        let model = STANDARD.encode(b"weights");

        let (status, body) = call(
            &app,
            json_request(Method::POST, "/store/model", json!({"modelKey": "result_class", "model": model})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modelKey"], "result_class");

        let (status, _) = call(
            &app,
            json_request(Method::POST, "/store/model", json!({"modelKey": "weights", "model": model})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_unknown_test_fails_without_commit() {
        let (app, connector) = setup();
        let (status, body) = call(
            &app,
            json_request(Method::PUT, "/update/test", json!({"testID": "T-404", "data": {"cassette_lot": "L1"}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let found = connector
            .with_ledger(|lab| Box::pin(async move { lab.query_test_by_id("T-404").await }))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
