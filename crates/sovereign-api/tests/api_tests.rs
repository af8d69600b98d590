//! Integration tests for the game API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, against an in-memory store and history.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use sovereign_api::{AppState, build_router};
use sovereign_core::{
    DocumentStore, Engine, MemoryHistory, MemoryStore, ScriptedRandom, SovereignConfig, cell_key,
};
use sovereign_types::{Cell, CellCoord, CellResource, CellType, NationId};
use sovereign_world::neighbors;
use tower::ServiceExt;

/// Where the scripted random source seats every new capital.
const SEAT: CellCoord = CellCoord::new(3, 3);

async fn put_land(store: &MemoryStore, coord: CellCoord, cell_type: CellType) {
    let cell = Cell::unowned(coord, cell_type, CellResource::Food);
    store
        .set(&cell_key(coord), serde_json::to_value(&cell).unwrap())
        .await
        .unwrap();
}

/// A router whose store holds [`SEAT`] and its neighbors as plains, except
/// the last neighbor which is ocean.
async fn make_test_app() -> Router {
    let store = MemoryStore::new();
    put_land(&store, SEAT, CellType::Plains).await;
    let around = neighbors(SEAT);
    for (i, coord) in around.iter().enumerate() {
        let cell_type = if i == around.len() - 1 {
            CellType::Ocean
        } else {
            CellType::Plains
        };
        put_land(&store, *coord, cell_type).await;
    }
    put_land(&store, CellCoord::new(9, 9), CellType::Plains).await;

    let rng = ScriptedRandom::new().with_coordinates([SEAT]);
    let engine = Engine::new(
        store,
        rng,
        MemoryHistory::new(),
        &SovereignConfig::default(),
    );
    build_router(Arc::new(AppState::new(engine)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Send a body verbatim with the given content type.
async fn send_raw(app: &Router, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_owned()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn found(app: &Router, name: &str) -> String {
    let player = NationId::new();
    let (status, body) = send(
        app,
        Method::POST,
        "/api/nations",
        Some(json!({
            "player": player,
            "name": name,
            "ruler_title": "King",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
}

// =============================================================================
// Commands
// =============================================================================

#[tokio::test]
async fn founding_seats_the_capital_and_reads_back() {
    let app = make_test_app().await;
    let id = found(&app, "Goryeo").await;

    let (status, nation) = send(&app, Method::GET, &format!("/api/nations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nation["identity"]["name"], "Goryeo");
    assert_eq!(nation["status"]["is_alive"], true);

    let (status, cell) = send(&app, Method::GET, &format!("/api/cells/{}", SEAT.key()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell["owner"], id.as_str());
    assert_eq!(cell["cell_type"], "capital");
}

#[tokio::test]
async fn claim_takes_an_adjacent_cell() {
    let app = make_test_app().await;
    let id = found(&app, "Goryeo").await;
    let target = neighbors(SEAT)[0];

    let (status, outcome) = send(
        &app,
        Method::POST,
        "/api/claim",
        Some(json!({ "actor": id, "cell": target.key() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["cell"]["owner"], id.as_str());
    assert!(outcome["narrative"].as_str().unwrap().contains(&target.key()));

    let (_, logs) = send(&app, Method::GET, &format!("/api/nations/{id}/logs"), None).await;
    assert_eq!(logs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn claim_rejections_carry_code_and_message() {
    let app = make_test_app().await;
    let id = found(&app, "Goryeo").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/claim",
        Some(json!({ "actor": id, "cell": CellCoord::new(9, 9).key() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "not_adjacent");
    assert_eq!(body["status"], 409);
    assert!(!body["error"].as_str().unwrap().is_empty());

    let ocean = neighbors(SEAT)[5];
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/claim",
        Some(json!({ "actor": id, "cell": ocean.key() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ocean_cell");
}

#[tokio::test]
async fn attacking_an_unowned_cell_is_refused() {
    let app = make_test_app().await;
    let id = found(&app, "Goryeo").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/attack",
        Some(json!({ "actor": id, "cell": neighbors(SEAT)[1].key() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "target_unowned");
}

#[tokio::test]
async fn policy_change_is_stored() {
    let app = make_test_app().await;
    let id = found(&app, "Goryeo").await;

    let (status, nation) = send(
        &app,
        Method::PUT,
        &format!("/api/nations/{id}/policies"),
        Some(json!({ "category": "tax", "option": "heavy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{nation}");
    assert_eq!(nation["policies"]["tax"], "heavy");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/nations/{id}/policies"),
        Some(json!({ "category": "religion", "option": "heavy" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "unknown_policy");
}

#[tokio::test]
async fn yield_tick_reports_deltas() {
    let app = make_test_app().await;
    let id = found(&app, "Goryeo").await;

    let (status, result) = send(&app, Method::POST, &format!("/api/nations/{id}/yield"), None).await;
    assert_eq!(status, StatusCode::OK, "{result}");
    assert!(result["resource_deltas"].is_object());
    assert!(result["stat_snapshots"].is_object());
}

#[tokio::test]
async fn yield_tick_for_unknown_nation_is_refused() {
    let app = make_test_app().await;
    let uri = format!("/api/nations/{}/yield", NationId::new());

    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "nation_not_found");
}

#[tokio::test]
async fn seeding_fills_only_missing_cells() {
    let app = make_test_app().await;

    let (status, summary) = send(
        &app,
        Method::POST,
        "/api/admin/seed",
        Some(json!({ "size": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["size"], 4);
    let created = summary["created"].as_u64().unwrap();
    let skipped = summary["skipped"].as_u64().unwrap();
    assert_eq!(created + skipped, 16);
    assert!(skipped > 0);
}

#[tokio::test]
async fn seeding_with_zero_size_is_a_bad_request() {
    let app = make_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/seed",
        Some(json!({ "size": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn founding_without_a_name_is_a_bad_request() {
    let app = make_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/nations",
        Some(json!({ "player": NationId::new(), "name": "  ", "ruler_title": "King" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn malformed_actor_id_in_body_is_a_bad_request() {
    let app = make_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/claim",
        Some(json!({ "actor": "not-a-uuid", "cell": "1_1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["status"], 400);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_body_fields_are_bad_requests() {
    let app = make_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/attack",
        Some(json!({ "cell": "1_1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");

    let id = found(&app, "Goryeo").await;
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/nations/{id}/policies"),
        Some(json!({ "category": "tax" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn unparseable_bodies_are_bad_requests() {
    let app = make_test_app().await;

    let (status, body) = send_raw(&app, "/api/nations", "application/json", "{\"name\":").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");

    let (status, body) = send_raw(&app, "/api/claim", "text/plain", "claim 1_1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");

    let (status, body) = send_raw(&app, "/api/admin/seed", "application/json", "{\"size\":\"big\"}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn seeding_without_a_body_uses_the_configured_size() {
    let app = make_test_app().await;

    let (status, summary) = send(&app, Method::POST, "/api/admin/seed", None).await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["size"], SovereignConfig::default().world.size);
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn unknown_nation_is_not_found() {
    let app = make_test_app().await;
    let uri = format!("/api/nations/{}", NationId::new());

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn malformed_path_ids_are_bad_requests() {
    let app = make_test_app().await;

    let (status, _) = send(&app, Method::GET, "/api/nations/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/cells/3-3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn missing_cell_is_not_found() {
    let app = make_test_app().await;

    let (status, _) = send(&app, Method::GET, "/api/cells/40_40", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn policy_catalog_lists_every_category() {
    let app = make_test_app().await;

    let (status, catalog) = send(&app, Method::GET, "/api/policies", None).await;
    assert_eq!(status, StatusCode::OK);
    let categories: Vec<&str> = catalog
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, ["tax", "conscription", "economy", "border"]);
}

#[tokio::test]
async fn news_starts_empty() {
    let app = make_test_app().await;

    let (status, news) = send(&app, Method::GET, "/api/news?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(news, json!([]));
}
