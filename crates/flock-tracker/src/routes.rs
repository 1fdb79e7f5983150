//! Tracker HTTP surface
//!
//! Three routes, JSON bodies. Validation failures short-circuit with a
//! plain-text status line; nothing mutates state on an error path.

use crate::state::{RegisterOutcome, TrackerState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use flock_core::{RegisterRequest, StatusResponse, UpdateRequest};
use serde::Deserialize;
use std::sync::Arc;

/// Build the tracker router; wrong methods get 405 from the router itself
pub fn router(state: Arc<TrackerState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/updateStatus", post(update_status))
        .route("/getPeers", get(get_peers))
        .with_state(state)
}

fn status_ok(message: String) -> Response {
    Json(StatusResponse { status: message }).into_response()
}

async fn register(
    State(state): State<Arc<TrackerState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected register body: {rejection}");
            return (StatusCode::BAD_REQUEST, "Error parsing JSON").into_response();
        }
    };

    let ip = request.peer.ip;
    match state.register(request.peer, &request.files).await {
        RegisterOutcome::Registered => {
            tracing::info!(ip, files = request.files.len(), "Peer registered");
            status_ok(format!("Registration received of peer with IP {ip}"))
        }
        RegisterOutcome::AlreadyRegistered => {
            tracing::debug!(ip, "Duplicate registration");
            status_ok(format!("Peer {ip} Already Registered"))
        }
    }
}

async fn update_status(
    State(state): State<Arc<TrackerState>>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected update body: {rejection}");
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    match state.update(request.peer, &request.files).await {
        Ok(()) => {
            tracing::debug!(ip = request.peer.ip, "Peer status updated");
            status_ok("Peer status updated successfully".to_string())
        }
        Err(e) => {
            tracing::warn!(ip = request.peer.ip, "Update rejected: {e}");
            (StatusCode::NOT_FOUND, "Peer not registered").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetPeersParams {
    file: Option<String>,
}

async fn get_peers(
    State(state): State<Arc<TrackerState>>,
    Query(params): Query<GetPeersParams>,
) -> Response {
    let Some(file) = params.file.filter(|f| !f.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing file parameter").into_response();
    };

    match state.peers_for(&file).await {
        Ok(peers) => {
            tracing::debug!(file = %file, count = peers.len(), "Peer query served");
            Json(peers).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "No peers available for the file").into_response(),
    }
}
