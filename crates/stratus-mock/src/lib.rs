// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory mock of the Stratus API.
//!
//! Serves just enough of the real API surface for the SDK integration
//! tests: organizations and workspaces as JSON-API documents over in-memory
//! state, plus fault-injection routes (`/fail/{key}/{n}`, `/errors/{code}`)
//! and a raw download route. Every request under `/api/v2` increments a hit
//! counter so tests can assert on wire traffic.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};

const DOCUMENT_CONTENT_TYPE: &str = "application/vnd.api+json";
const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone, Debug)]
struct Organization {
    name: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
struct Workspace {
    id: String,
    organization: String,
    name: String,
    description: Option<String>,
    auto_apply: bool,
    locked: bool,
    created_at: DateTime<Utc>,
}

/// Shared server state. Vectors preserve insertion order so list responses
/// have a deterministic server order for tests to assert on.
#[derive(Default)]
pub struct ApiState {
    organizations: RwLock<Vec<Organization>>,
    workspaces: RwLock<Vec<Workspace>>,
    workspace_sequence: AtomicU64,
    flaky: Mutex<HashMap<String, u64>>,
    hits: AtomicU64,
}

/// A mock API server bound to an ephemeral local port.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<ApiState>,
}

impl MockApi {
    /// Bind to `127.0.0.1:0` and serve in a background task.
    pub async fn spawn() -> Self {
        let state = Arc::new(ApiState::default());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener addr");
        let router = app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "mock server exited");
            }
        });
        Self { addr, state }
    }

    /// Base address for a client config, e.g. `http://127.0.0.1:49152`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received under `/api/v2` so far.
    pub fn hits(&self) -> u64 {
        self.state.hits.load(Ordering::SeqCst)
    }
}

/// Build the router. Exposed for in-process testing without a listener.
pub fn app(state: Arc<ApiState>) -> Router {
    let api = Router::new()
        .route(
            "/organizations",
            get(list_organizations).post(create_organization),
        )
        .route(
            "/organizations/{name}",
            get(get_organization)
                .patch(update_organization)
                .delete(delete_organization),
        )
        .route(
            "/organizations/{org}/workspaces",
            get(list_workspaces).post(create_workspace),
        )
        .route(
            "/organizations/{org}/workspaces/{name}",
            get(get_workspace).patch(update_workspace).delete(delete_workspace),
        )
        .route("/workspaces/{id}/actions/{action}", post(toggle_lock))
        .route("/fail/{key}/{threshold}", get(flaky).post(flaky))
        .route("/errors/{code}", get(canned_error))
        .route("/download/raw", get(download_raw))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state);

    Router::new().nest("/api/v2", api)
}

/// Serve until the listener closes. Useful for manual poking via the bin.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app(Arc::new(ApiState::default()))).await
}

async fn count_hits(State(state): State<Arc<ApiState>>, request: Request, next: Next) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

// ============================================================================
// Documents
// ============================================================================

fn organization_resource(org: &Organization) -> Value {
    json!({
        "type": "organizations",
        "id": org.name,
        "attributes": {
            "name": org.name,
            "email": org.email,
            "created-at": org.created_at.to_rfc3339(),
        }
    })
}

fn workspace_resource(ws: &Workspace) -> Value {
    json!({
        "type": "workspaces",
        "id": ws.id,
        "attributes": {
            "name": ws.name,
            "description": ws.description,
            "auto-apply": ws.auto_apply,
            "locked": ws.locked,
            "created-at": ws.created_at.to_rfc3339(),
        },
        "relationships": {
            "organization": {
                "data": {"type": "organizations", "id": ws.organization}
            }
        }
    })
}

fn document(data: Value) -> Response {
    document_body(data).into_response()
}

fn errors_body(status: StatusCode, detail: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, DOCUMENT_CONTENT_TYPE)],
        Json(json!({"errors": [{"status": status.as_u16().to_string(), "detail": detail}]})),
    )
        .into_response()
}

/// Slice out one page and build the `meta.pagination` node.
fn paginate(resources: Vec<Value>, query: &HashMap<String, String>) -> Value {
    let page_number: usize = query
        .get("page[number]")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
        .max(1);
    let page_size: usize = query
        .get("page[size]")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1);

    let total_count = resources.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let start = (page_number - 1).saturating_mul(page_size);
    let page: Vec<Value> = resources
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    json!({
        "data": page,
        "meta": {
            "pagination": {
                "current-page": page_number,
                "prev-page": if page_number > 1 { Some(page_number - 1) } else { None },
                "next-page": if page_number < total_pages { Some(page_number + 1) } else { None },
                "total-pages": total_pages,
                "total-count": total_count,
            }
        }
    })
}

fn attributes(body: &Value) -> &Value {
    &body["data"]["attributes"]
}

fn string_attr(body: &Value, name: &str) -> Option<String> {
    attributes(body)[name].as_str().map(str::to_string)
}

// ============================================================================
// Organizations
// ============================================================================

async fn list_organizations(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let orgs = state.organizations.read().await;
    let resources = orgs.iter().map(organization_resource).collect();
    Json(paginate(resources, &query)).into_response()
}

async fn create_organization(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<Value>,
) -> Response {
    let Some(name) = string_attr(&body, "name") else {
        return errors_body(StatusCode::UNPROCESSABLE_ENTITY, "name is required");
    };
    let mut orgs = state.organizations.write().await;
    if orgs.iter().any(|o| o.name == name) {
        return errors_body(StatusCode::UNPROCESSABLE_ENTITY, "name has already been taken");
    }
    let org = Organization {
        name,
        email: string_attr(&body, "email"),
        created_at: Utc::now(),
    };
    let resource = organization_resource(&org);
    orgs.push(org);
    (StatusCode::CREATED, document_body(resource)).into_response()
}

async fn get_organization(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Response {
    let orgs = state.organizations.read().await;
    match orgs.iter().find(|o| o.name == name) {
        Some(org) => document(organization_resource(org)),
        None => errors_body(StatusCode::NOT_FOUND, "organization not found"),
    }
}

async fn update_organization(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut orgs = state.organizations.write().await;
    let Some(org) = orgs.iter_mut().find(|o| o.name == name) else {
        return errors_body(StatusCode::NOT_FOUND, "organization not found");
    };
    if let Some(new_name) = string_attr(&body, "name") {
        org.name = new_name;
    }
    if let Some(email) = string_attr(&body, "email") {
        org.email = Some(email);
    }
    document(organization_resource(org))
}

async fn delete_organization(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Response {
    let mut orgs = state.organizations.write().await;
    let before = orgs.len();
    orgs.retain(|o| o.name != name);
    if orgs.len() == before {
        return errors_body(StatusCode::NOT_FOUND, "organization not found");
    }
    state
        .workspaces
        .write()
        .await
        .retain(|w| w.organization != name);
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Workspaces
// ============================================================================

async fn list_workspaces(
    State(state): State<Arc<ApiState>>,
    Path(org): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let workspaces = state.workspaces.read().await;
    let search = query.get("search[name]").cloned().unwrap_or_default();
    let resources = workspaces
        .iter()
        .filter(|w| w.organization == org && w.name.contains(&search))
        .map(workspace_resource)
        .collect();
    Json(paginate(resources, &query)).into_response()
}

async fn create_workspace(
    State(state): State<Arc<ApiState>>,
    Path(org): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !state
        .organizations
        .read()
        .await
        .iter()
        .any(|o| o.name == org)
    {
        return errors_body(StatusCode::NOT_FOUND, "organization not found");
    }
    let Some(name) = string_attr(&body, "name") else {
        return errors_body(StatusCode::UNPROCESSABLE_ENTITY, "name is required");
    };
    let sequence = state.workspace_sequence.fetch_add(1, Ordering::SeqCst) + 1;
    let workspace = Workspace {
        id: format!("ws-{}", sequence),
        organization: org,
        name,
        description: string_attr(&body, "description"),
        auto_apply: attributes(&body)["auto-apply"].as_bool().unwrap_or(false),
        locked: false,
        created_at: Utc::now(),
    };
    let resource = workspace_resource(&workspace);
    state.workspaces.write().await.push(workspace);
    (StatusCode::CREATED, document_body(resource)).into_response()
}

async fn get_workspace(
    State(state): State<Arc<ApiState>>,
    Path((org, name)): Path<(String, String)>,
) -> Response {
    let workspaces = state.workspaces.read().await;
    match workspaces
        .iter()
        .find(|w| w.organization == org && w.name == name)
    {
        Some(ws) => document(workspace_resource(ws)),
        // 404 with an empty body, deliberately: clients must classify on
        // the status alone.
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_workspace(
    State(state): State<Arc<ApiState>>,
    Path((org, name)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut workspaces = state.workspaces.write().await;
    let Some(ws) = workspaces
        .iter_mut()
        .find(|w| w.organization == org && w.name == name)
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(new_name) = string_attr(&body, "name") {
        ws.name = new_name;
    }
    if let Some(description) = string_attr(&body, "description") {
        ws.description = Some(description);
    }
    if let Some(auto_apply) = attributes(&body)["auto-apply"].as_bool() {
        ws.auto_apply = auto_apply;
    }
    document(workspace_resource(ws))
}

async fn delete_workspace(
    State(state): State<Arc<ApiState>>,
    Path((org, name)): Path<(String, String)>,
) -> Response {
    let mut workspaces = state.workspaces.write().await;
    let before = workspaces.len();
    workspaces.retain(|w| !(w.organization == org && w.name == name));
    if workspaces.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn toggle_lock(
    State(state): State<Arc<ApiState>>,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    let locked = match action.as_str() {
        "lock" => true,
        "unlock" => false,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let mut workspaces = state.workspaces.write().await;
    let Some(ws) = workspaces.iter_mut().find(|w| w.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    ws.locked = locked;
    document(workspace_resource(ws))
}

// ============================================================================
// Fault injection
// ============================================================================

/// Returns 503 until the route has been hit `threshold` times, then 200.
async fn flaky(
    State(state): State<Arc<ApiState>>,
    Path((key, threshold)): Path<(String, u64)>,
) -> Response {
    let mut flaky = state.flaky.lock().await;
    let count = flaky.entry(key.clone()).or_insert(0);
    *count += 1;
    if *count <= threshold {
        return errors_body(StatusCode::SERVICE_UNAVAILABLE, "try again");
    }
    document(json!({"type": "pings", "id": key, "attributes": {}}))
}

/// Returns the requested status. 304 and 404 come back with empty bodies;
/// everything else carries a JSON-API errors body.
async fn canned_error(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match status {
        StatusCode::NOT_MODIFIED | StatusCode::NOT_FOUND => status.into_response(),
        _ => errors_body(status, "canned error"),
    }
}

async fn download_raw() -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from(&b"raw bytes through the pipeline\n"[..]),
    )
        .into_response()
}

fn document_body(data: Value) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, DOCUMENT_CONTENT_TYPE)],
        Json(json!({"data": data})),
    )
}
