//! HTTP server for the B+ tree index.
//!
//! Provides REST API endpoints for:
//! - Point lookups, upserts and bulk loads
//! - Ordered range scans
//! - Tree visualization export and invariant checks
//! - Resetting the tree with a new order

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use bptree_index::{Config, Index, IndexStats, TreeConfig, TreeNode};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

type Key = i64;

/// Application state shared across handlers
struct AppState {
    index: RwLock<Index<Key, String>>,
}

type SharedState = Arc<AppState>;

type ApiError = (StatusCode, Json<OperationResponse>);

/// Request to reset the tree
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequest {
    order: Option<usize>,
}

/// Request for key-value operations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutRequest {
    key: Key,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkInsertRequest {
    pairs: Vec<PutRequest>,
}

/// Bounds for a range scan (start inclusive, end exclusive)
#[derive(Debug, Deserialize)]
struct ScanQuery {
    start: Option<Key>,
    end: Option<Key>,
}

/// Response for get operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetResponse {
    key: Key,
    value: Option<String>,
    found: bool,
}

/// Response for operations that return success/failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanEntry {
    key: Key,
    value: String,
}

/// Tree visualization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeResponse {
    tree: Option<TreeNode>,
    stats: IndexStats,
}

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(OperationResponse {
            success: false,
            message,
        }),
    )
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let index = match Index::open(Config::new()) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("ERROR: Failed to create index: {}", e);
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState {
        index: RwLock::new(index),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/tree", post(reset_tree).get(get_tree))
        .route("/api/config", get(get_config))
        .route("/api/kv/:key", get(get_value))
        .route("/api/kv", post(put_value))
        .route("/api/keys", get(list_keys))
        .route("/api/scan", get(scan))
        .route("/api/stats", get(get_stats))
        .route("/api/bulk", post(bulk_insert))
        .route("/api/verify", get(verify))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    println!("B+ tree server running on http://localhost:3001");
    println!("API Endpoints:");
    println!("  POST   /api/tree     - Reset tree (optional new order)");
    println!("  GET    /api/tree     - Get tree structure for visualization");
    println!("  GET    /api/config   - Get tree config");
    println!("  GET    /api/kv/:key  - Get value by key");
    println!("  POST   /api/kv       - Put key-value pair");
    println!("  GET    /api/keys     - List all keys");
    println!("  GET    /api/scan     - Range scan (?start=&end=)");
    println!("  GET    /api/stats    - Get tree stats");
    println!("  POST   /api/bulk     - Bulk insert key-value pairs");
    println!("  GET    /api/verify   - Check tree invariants");
    axum::serve(listener, app).await
}

async fn reset_tree(
    State(state): State<SharedState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let mut index = state.index.write();
    let order = req.order.unwrap_or(index.tree_config().order);

    match Index::open(Config::new().tree_config(TreeConfig::new(order))) {
        Ok(fresh) => {
            *index = fresh;
            Ok(Json(OperationResponse {
                success: true,
                message: format!("Tree reset with order {}", order),
            }))
        }
        Err(e) => Err(bad_request(format!("Reset failed: {}", e))),
    }
}

async fn get_config(State(state): State<SharedState>) -> Json<TreeConfig> {
    Json(state.index.read().tree_config())
}

async fn get_value(State(state): State<SharedState>, Path(key): Path<Key>) -> Json<GetResponse> {
    let value = state.index.read().get(&key);
    Json(GetResponse {
        key,
        found: value.is_some(),
        value,
    })
}

async fn put_value(
    State(state): State<SharedState>,
    Json(req): Json<PutRequest>,
) -> Json<OperationResponse> {
    let previous = state.index.read().put(req.key, req.value);
    Json(OperationResponse {
        success: true,
        message: match previous {
            Some(_) => format!("Updated key {}", req.key),
            None => format!("Inserted key {}", req.key),
        },
    })
}

async fn list_keys(State(state): State<SharedState>) -> Json<Vec<Key>> {
    let keys = state
        .index
        .read()
        .iter()
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    Json(keys)
}

async fn scan(
    State(state): State<SharedState>,
    Query(query): Query<ScanQuery>,
) -> Json<Vec<ScanEntry>> {
    let entries = state
        .index
        .read()
        .range(query.start.as_ref(), query.end.as_ref())
        .into_iter()
        .map(|(key, value)| ScanEntry { key, value })
        .collect();
    Json(entries)
}

async fn get_tree(State(state): State<SharedState>) -> Json<TreeResponse> {
    let index = state.index.read();
    Json(TreeResponse {
        tree: index.export_tree(),
        stats: index.stats(),
    })
}

async fn get_stats(State(state): State<SharedState>) -> Json<IndexStats> {
    Json(state.index.read().stats())
}

async fn bulk_insert(
    State(state): State<SharedState>,
    Json(req): Json<BulkInsertRequest>,
) -> Json<OperationResponse> {
    let index = state.index.read();
    let count = req.pairs.len();
    for pair in req.pairs {
        index.put(pair.key, pair.value);
    }
    Json(OperationResponse {
        success: true,
        message: format!("Inserted {} key-value pairs", count),
    })
}

async fn verify(State(state): State<SharedState>) -> Result<Json<OperationResponse>, ApiError> {
    match state.index.read().verify() {
        Ok(()) => Ok(Json(OperationResponse {
            success: true,
            message: "All invariants hold".to_string(),
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(OperationResponse {
                success: false,
                message: e.to_string(),
            }),
        )),
    }
}
