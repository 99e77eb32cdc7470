//! Full router exercised in process over the in-memory stores.
//!
//! The handler-level unit tests live with the server crate; these cover the
//! owner workflow as a sequence of requests against one router instance.

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use gate_server::{
        build_router, AppState, NullNotifier, NullResolver, OwnerRegistry, ReportingService,
        ServerConfig,
    };
    use gate_store::{MemoryDirectory, MemoryLedger, MemoryWhitelist};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn state() -> AppState {
        let owners = Arc::new(OwnerRegistry::new());
        owners.insert("tok-owner", Uuid::new_v4());
        let service = Arc::new(ReportingService::new(
            Arc::new(MemoryDirectory::new()),
            Arc::new(MemoryWhitelist::new()),
            Arc::new(MemoryLedger::new()),
            Arc::new(NullResolver),
            Arc::new(NullNotifier),
            Duration::from_millis(50),
        ));
        AppState {
            service,
            owners,
            config: Arc::new(ServerConfig::default()),
        }
    }

    async fn json_of(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
        request
            .header("authorization", "Bearer tok-owner")
            .header("content-type", "application/json")
    }

    #[tokio::test]
    async fn test_owner_workflow_over_http() {
        let state = state();

        // Register a product.
        let response = build_router(state.clone())
            .oneshot(
                authed(Request::post("/api/products"))
                    .body(Body::from(
                        serde_json::json!({ "name": "Anti-Cheat Suite" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        let product_id = json["product"]["id"].as_str().unwrap().to_string();
        let product_key = json["product"]["product_key"].as_str().unwrap().to_string();

        // A client reports against the new key and is fail-open authorized.
        let response = build_router(state.clone())
            .oneshot(
                Request::post("/report")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "product_key": product_key.clone(),
                            "place_id": "42",
                            "game_name": "Castle Siege"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["authorized"], true);
        assert_eq!(json["status"], "pending");

        // The owner sees the auto-provisioned entry.
        let response = build_router(state.clone())
            .oneshot(
                authed(Request::get(format!("/api/whitelist/{product_id}")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_of(response).await;
        assert_eq!(json["whitelist"].as_array().unwrap().len(), 1);
        assert_eq!(json["whitelist"][0]["status"], "pending");

        // Unwhitelist the place; it is forced inactive.
        let response = build_router(state.clone())
            .oneshot(
                authed(Request::patch(format!(
                    "/api/whitelist/{product_id}/42/status"
                )))
                .body(Body::from(
                    serde_json::json!({ "status": "unwhitelisted" }).to_string(),
                ))
                .unwrap(),
            )
            .await
            .unwrap();
        let json = json_of(response).await;
        assert_eq!(json["active"], false);

        // The next report is denied but still logged.
        let response = build_router(state.clone())
            .oneshot(
                Request::post("/report")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "product_key": product_key.clone(),
                            "place_id": "42"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["authorized"], false);
        assert_eq!(json["status"], "unwhitelisted");

        // Usage summary counts both reports against the one place.
        let response = build_router(state.clone())
            .oneshot(
                authed(Request::get(format!("/api/usage/{product_id}/summary")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_of(response).await;
        assert_eq!(json["summary"]["total_reports"], 2);
        assert_eq!(json["summary"]["distinct_places"], 1);

        // Delete the product; the key stops resolving.
        let response = build_router(state.clone())
            .oneshot(
                authed(Request::delete(format!("/api/products/{product_id}")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = build_router(state)
            .oneshot(
                Request::post("/report")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "product_key": product_key,
                            "place_id": "42"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_of(response).await;
        assert_eq!(json, serde_json::json!({ "error": "invalid product key" }));
    }
}
