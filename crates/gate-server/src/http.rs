//! HTTP surface: routing, wire types, and handlers.
//!
//! The reporting routes (`/report`, `/check`) are public - the product key
//! inside the payload is the only credential clients hold. The `/api`
//! management routes require an owner bearer token.

use axum::extract::{ConnectInfo, Path, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use gate_core::{PlaceId, ProductKey, VerifiedUser, WhitelistStatus};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{authenticate, OwnerRegistry};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::{ClientMeta, ReportInput, ReportingService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReportingService>,
    pub owners: Arc<OwnerRegistry>,
    pub config: Arc<ServerConfig>,
}

/// Build the full router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Client-facing protocol surface.
        .route("/report", post(handle_report))
        .route("/check/:product_key/:place_id", get(handle_check))
        // Owner-facing management surface.
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/:product_id", delete(delete_product))
        .route(
            "/api/whitelist/:product_id",
            get(list_whitelist).post(add_whitelist),
        )
        .route(
            "/api/whitelist/:product_id/:place_id/status",
            patch(set_status),
        )
        .route(
            "/api/whitelist/:product_id/:place_id/toggle",
            patch(toggle_active),
        )
        .route(
            "/api/whitelist/:product_id/:place_id",
            delete(remove_whitelist),
        )
        .route("/api/usage/:product_id", get(list_usage))
        .route("/api/usage/:product_id/summary", get(usage_summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of `POST /report`.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub product_key: String,
    pub place_id: String,
    pub game_name: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Body of a `200` report/check response.
///
/// Field names and shapes are part of the deployed protocol; changing them
/// strands every client already in the field.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerdictResponse {
    pub authorized: bool,
    pub status: WhitelistStatus,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddWhitelistRequest {
    pub place_id: String,
    pub game_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: WhitelistStatus,
}

// ---------------------------------------------------------------------------
// Client-facing handlers
// ---------------------------------------------------------------------------

async fn handle_report(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<ReportRequest>,
) -> Result<Json<VerdictResponse>, ApiError> {
    if body.product_key.is_empty() || body.place_id.is_empty() {
        return Err(ApiError::bad_request("missing required fields"));
    }

    let verified_user = VerifiedUser::from_claims(body.user_id, body.username);

    let input = ReportInput {
        product_key: ProductKey::new(body.product_key),
        place_id: PlaceId::new(body.place_id),
        game_name: body.game_name,
        verified_user,
    };
    let meta = client_meta(connect, &headers);

    let outcome = state.service.report(input, meta).await?;
    Ok(Json(VerdictResponse {
        authorized: outcome.verdict.authorized,
        status: outcome.verdict.status,
        active: outcome.verdict.active,
        game_name: Some(outcome.game_name),
    }))
}

async fn handle_check(
    State(state): State<AppState>,
    Path((product_key, place_id)): Path<(String, String)>,
) -> Result<Json<VerdictResponse>, ApiError> {
    let verdict = state
        .service
        .check(&ProductKey::new(product_key), &PlaceId::new(place_id))
        .await?;
    Ok(Json(VerdictResponse {
        authorized: verdict.authorized,
        status: verdict.status,
        active: verdict.active,
        game_name: None,
    }))
}

fn client_meta(connect: Option<ConnectInfo<SocketAddr>>, headers: &HeaderMap) -> ClientMeta {
    let ip_address = connect
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    ClientMeta {
        ip_address,
        user_agent,
    }
}

// ---------------------------------------------------------------------------
// Owner-facing handlers
// ---------------------------------------------------------------------------

async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    let products = state.service.list_products(owner).await?;
    Ok(Json(serde_json::json!({ "products": products })))
}

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateProductRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    if body.name.is_empty() {
        return Err(ApiError::bad_request("product name is required"));
    }
    let product = state.service.register_product(owner, body.name).await?;
    Ok(Json(serde_json::json!({ "product": product })))
}

async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    state.service.delete_product(owner, product_id).await?;
    Ok(Json(serde_json::json!({ "message": "product deleted" })))
}

async fn list_whitelist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    let whitelist = state.service.list_whitelist(owner, product_id).await?;
    Ok(Json(serde_json::json!({ "whitelist": whitelist })))
}

async fn add_whitelist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
    Json(body): Json<AddWhitelistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    if body.place_id.is_empty() || body.game_name.is_empty() {
        return Err(ApiError::bad_request("place id and game name are required"));
    }
    let entry = state
        .service
        .add_whitelist(owner, product_id, PlaceId::new(body.place_id), body.game_name)
        .await?;
    Ok(Json(serde_json::json!({ "whitelist": entry })))
}

async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((product_id, place_id)): Path<(Uuid, String)>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    let (status, active) = state
        .service
        .set_status(owner, product_id, PlaceId::new(place_id), body.status)
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "status updated", "status": status, "active": active }),
    ))
}

async fn toggle_active(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((product_id, place_id)): Path<(Uuid, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    let active = state
        .service
        .toggle_active(owner, product_id, PlaceId::new(place_id))
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "status toggled", "active": active }),
    ))
}

async fn remove_whitelist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((product_id, place_id)): Path<(Uuid, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    state
        .service
        .remove_whitelist(owner, product_id, PlaceId::new(place_id))
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "removed from whitelist" }),
    ))
}

async fn list_usage(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    let logs = state
        .service
        .list_usage(owner, product_id, state.config.usage_page_limit)
        .await?;
    Ok(Json(serde_json::json!({ "logs": logs })))
}

async fn usage_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = authenticate(&state.owners, &headers)?;
    let summary = state.service.usage_summary(owner, product_id).await?;
    Ok(Json(serde_json::json!({ "summary": summary })))
}
