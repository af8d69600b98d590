//! HTTP request handlers.
//!
//! Every handler is generic over the engine's collaborators so the same
//! router serves the in-memory and the database-backed deployments. Path
//! identifiers arrive as strings and are parsed here, and bodies go through
//! [`ApiJson`], so a malformed id or body is a `400` with the usual error
//! body rather than a bare extractor rejection.
//!
//! Reads (`GET`) are for display. Mutations never trust anything the client
//! sends beyond the actor id and the target.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use sovereign_core::{
    ConquestError, DocumentStore, FoundingRequest, HistorySink, RandomSource, Rejection,
};
use sovereign_types::{CellCoord, NationId, PolicyCategory};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Entries returned by the history endpoints when no limit is given.
const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Upper bound on entries returned by the history endpoints.
const MAX_HISTORY_LIMIT: usize = 100;

/// Shared state handed to every handler.
type Shared<S, R, H> = State<Arc<AppState<S, R, H>>>;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/claim` and `POST /api/attack`.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// The acting nation.
    pub actor: NationId,
    /// Target cell as `"{row}_{col}"`.
    pub cell: String,
}

/// Body of `PUT /api/nations/{id}/policies`.
#[derive(Debug, Deserialize)]
pub struct PolicyRequest {
    /// Category wire name (`tax`, `conscription`, `economy`, `border`).
    pub category: String,
    /// Option key within the category.
    pub option: String,
}

/// Body of `POST /api/admin/seed`.
#[derive(Debug, Default, Deserialize)]
pub struct SeedRequest {
    /// Edge length of the map. Defaults to the configured world size.
    #[serde(default)]
    pub size: Option<u32>,
}

/// Query parameters of the history endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    /// Maximum number of entries, newest first.
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn resolved(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT)
    }
}

fn parse_nation_id(raw: &str) -> Result<NationId, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid nation id: {e}")))
}

fn parse_cell(raw: &str) -> Result<CellCoord, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid cell: {e}")))
}

/// An empty seed body means "use the configured size".
fn parse_seed_body(body: &[u8]) -> Result<SeedRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SeedRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid seed request: {e}")))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// `POST /api/claim` -- take an unowned land cell.
pub async fn claim<S, R, H>(
    State(state): Shared<S, R, H>,
    ApiJson(request): ApiJson<ActionRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let target = parse_cell(&request.cell)?;
    let outcome = state.engine.claim(request.actor, target).await?;
    Ok(Json(outcome))
}

/// `POST /api/attack` -- attack an enemy cell.
pub async fn attack<S, R, H>(
    State(state): Shared<S, R, H>,
    ApiJson(request): ApiJson<ActionRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let target = parse_cell(&request.cell)?;
    let outcome = state.engine.attack(request.actor, target).await?;
    Ok(Json(outcome))
}

/// `POST /api/nations` -- found a nation with a random capital.
pub async fn found_nation<S, R, H>(
    State(state): Shared<S, R, H>,
    ApiJson(request): ApiJson<FoundingRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let nation = state.engine.found_nation(request).await?;
    Ok((StatusCode::CREATED, Json(nation)))
}

/// `PUT /api/nations/{id}/policies` -- switch one policy category.
pub async fn change_policy<S, R, H>(
    State(state): Shared<S, R, H>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<PolicyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let nation_id = parse_nation_id(&id)?;
    let category = PolicyCategory::parse(&request.category).ok_or_else(|| {
        ApiError::from(ConquestError::from(Rejection::UnknownPolicy {
            category: request.category.clone(),
            option: request.option.clone(),
        }))
    })?;
    let nation = state
        .engine
        .change_policy(nation_id, category, &request.option)
        .await?;
    Ok(Json(nation))
}

/// `POST /api/nations/{id}/yield` -- run one yield tick.
pub async fn run_yield_tick<S, R, H>(
    State(state): Shared<S, R, H>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let nation_id = parse_nation_id(&id)?;
    let result = state.engine.run_yield_tick(nation_id).await?;
    Ok(Json(result))
}

/// `POST /api/admin/seed` -- fill missing cells of the map.
pub async fn seed_world<S, R, H>(
    State(state): Shared<S, R, H>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let request = parse_seed_body(&body)?;
    let summary = state.engine.seed_world(request.size).await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// `GET /api/nations/{id}`
pub async fn get_nation<S, R, H>(
    State(state): Shared<S, R, H>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let nation_id = parse_nation_id(&id)?;
    let nation = state
        .engine
        .nation(nation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("nation {nation_id}")))?;
    Ok(Json(nation))
}

/// `GET /api/cells/{cell}`
pub async fn get_cell<S, R, H>(
    State(state): Shared<S, R, H>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let coord = parse_cell(&raw)?;
    let cell = state
        .engine
        .cell(coord)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("cell {coord}")))?;
    Ok(Json(cell))
}

/// `GET /api/nations/{id}/logs?limit=N`
pub async fn nation_logs<S, R, H>(
    State(state): Shared<S, R, H>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let nation_id = parse_nation_id(&id)?;
    let logs = state
        .engine
        .history()
        .recent_logs(nation_id, query.resolved())
        .await?;
    Ok(Json(logs))
}

/// `GET /api/news?limit=N`
pub async fn news<S, R, H>(
    State(state): Shared<S, R, H>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let events = state.engine.history().recent_news(query.resolved()).await?;
    Ok(Json(events))
}

/// `GET /api/policies` -- the static policy catalog.
#[allow(clippy::unused_async)]
pub async fn policies() -> impl IntoResponse {
    Json(sovereign_economy::catalog())
}
