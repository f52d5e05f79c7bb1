use std::sync::Arc;

use alloy::primitives::Address;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use safe_staging_core::{
    ChainPort, StagedProposal, StagingError, StagingGateway, StagingStorePort,
};

type SharedGateway<S, C> = Arc<StagingGateway<S, C>>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Node failure. The gateway has already logged the cause.
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error while contacting the chain node".to_owned(),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StagingError> for ApiError {
    fn from(err: StagingError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    chains: Vec<u64>,
}

/// Routes for one gateway:
///
/// - `GET /health`
/// - `GET /{chainId}/{wallet}` lists staged proposals
/// - `POST /{chainId}/{wallet}` submits a proposal and returns the updated list
pub fn router<S, C>(gateway: SharedGateway<S, C>) -> Router
where
    S: StagingStorePort + 'static,
    C: ChainPort + 'static,
{
    Router::new()
        .route("/health", get(health::<S, C>))
        .route("/:chain_id/:wallet", get(list::<S, C>).post(submit::<S, C>))
        .with_state(gateway)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health<S, C>(State(gateway): State<SharedGateway<S, C>>) -> Json<Health>
where
    S: StagingStorePort + 'static,
    C: ChainPort + 'static,
{
    Json(Health {
        status: "ok",
        chains: gateway.supported_chains(),
    })
}

async fn list<S, C>(
    State(gateway): State<SharedGateway<S, C>>,
    Path((chain_id, wallet)): Path<(String, String)>,
) -> Result<Json<Vec<StagedProposal>>, ApiError>
where
    S: StagingStorePort + 'static,
    C: ChainPort + 'static,
{
    let (chain_id, wallet) = parse_key(&chain_id, &wallet)?;
    Ok(Json(gateway.list(chain_id, wallet)))
}

async fn submit<S, C>(
    State(gateway): State<SharedGateway<S, C>>,
    Path((chain_id, wallet)): Path<(String, String)>,
    body: Result<Json<StagedProposal>, JsonRejection>,
) -> Result<Json<Vec<StagedProposal>>, ApiError>
where
    S: StagingStorePort + 'static,
    C: ChainPort + 'static,
{
    let (chain_id, wallet) = parse_key(&chain_id, &wallet)?;
    let Json(proposal) = body?;
    let list = gateway.submit(chain_id, wallet, proposal).await?;
    Ok(Json(list))
}

fn parse_key(chain_id: &str, wallet: &str) -> Result<(u64, Address), ApiError> {
    let chain_id = chain_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid chain id {chain_id:?}")))?;
    let wallet = wallet
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid wallet address {wallet:?}")))?;
    Ok((chain_id, wallet))
}
