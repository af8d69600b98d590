//! Axum router construction for the game API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! browser client and request tracing from `tower-http`.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use sovereign_core::{DocumentStore, HistorySink, RandomSource};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// Commands:
/// - `POST /api/claim` -- claim an unowned cell
/// - `POST /api/attack` -- attack an enemy cell
/// - `POST /api/nations` -- found a nation
/// - `PUT /api/nations/{id}/policies` -- change one policy
/// - `POST /api/nations/{id}/yield` -- run one yield tick
/// - `POST /api/admin/seed` -- generate missing map cells
///
/// Reads:
/// - `GET /api/nations/{id}` and `GET /api/nations/{id}/logs`
/// - `GET /api/cells/{row}_{col}`
/// - `GET /api/policies` -- the policy catalog
/// - `GET /api/news` -- war news
pub fn build_router<S, R, H>(state: Arc<AppState<S, R, H>>) -> Router
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Commands
        .route("/api/claim", post(handlers::claim::<S, R, H>))
        .route("/api/attack", post(handlers::attack::<S, R, H>))
        .route("/api/nations", post(handlers::found_nation::<S, R, H>))
        .route(
            "/api/nations/{id}/policies",
            put(handlers::change_policy::<S, R, H>),
        )
        .route(
            "/api/nations/{id}/yield",
            post(handlers::run_yield_tick::<S, R, H>),
        )
        .route("/api/admin/seed", post(handlers::seed_world::<S, R, H>))
        // Reads
        .route("/api/nations/{id}", get(handlers::get_nation::<S, R, H>))
        .route(
            "/api/nations/{id}/logs",
            get(handlers::nation_logs::<S, R, H>),
        )
        .route("/api/cells/{cell}", get(handlers::get_cell::<S, R, H>))
        .route("/api/policies", get(handlers::policies))
        .route("/api/news", get(handlers::news::<S, R, H>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
