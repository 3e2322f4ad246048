//! HTTP surface: login gate, device proxy endpoints, static front end.
//!
//! Routes:
//! - `POST /login`        — open; issues the session cookie
//! - `POST /logout`       — session-gated
//! - `GET  /api/state`    — session-gated shadow read
//! - `POST /api/command`  — session-gated command dispatch
//! - `GET  /`             — index page, redirects to the login page when
//!   no session is present
//! - everything else      — static assets from the configured directory

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::middleware::{self, Next};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use iotda_api::types::DeviceCommandRequest;

use crate::error::ApiError;
use crate::proxy::{CommandRequest, shadow_payload};
use crate::session::{SESSION_COOKIE, session_token};
use crate::state::AppState;

// ── Router ───────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/state", get(api_state))
        .route("/api/command", post(api_command))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let open = Router::new()
        .route("/", get(index))
        .route("/login", post(login));

    let permissive_cors = state.config.permissive_cors;
    let static_dir = state.config.static_dir.clone();

    let mut router = protected
        .merge(open)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state);

    if permissive_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

// ── Session gate ─────────────────────────────────────────────────────

/// Short-circuit with 401 before any handler (and thus any platform
/// call) when the session cookie is missing, unknown, or expired.
async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authed = session_token(req.headers())
        .is_some_and(|token| state.sessions.is_valid(&token));
    if !authed {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}

#[derive(Debug, Default, Deserialize)]
struct LoginBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

// POST /login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // A malformed body is treated as empty credentials, same 401 as a
    // wrong pair.
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let ok = body.username == state.config.username && body.password == state.config.password;
    if !ok {
        tracing::warn!(username = %body.username, "failed login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.sessions.create();
    let max_age = state.sessions.ttl().as_secs();
    let cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");

    tracing::info!(username = %body.username, "login ok");
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "ok": true })),
    ))
}

// POST /logout
async fn logout(State(state): State<AppState>, req: Request) -> impl IntoResponse {
    if let Some(token) = session_token(req.headers()) {
        state.sessions.remove(&token);
    }
    let clear = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    (
        AppendHeaders([(SET_COOKIE, clear)]),
        Json(json!({ "ok": true })),
    )
}

// ── Device proxy ─────────────────────────────────────────────────────

// GET /api/state
async fn api_state(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let shadow = state
        .client
        .show_device_shadow(&state.config.device_id)
        .await?;

    let payload = shadow_payload(&shadow, &state.config.service_id);
    let ts = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;

    Ok(Json(json!({
        "shadow": shadow,
        "payload": payload,
        "ts": ts,
    })))
}

// POST /api/command
async fn api_command(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let command = CommandRequest::parse(body)?;

    let request = DeviceCommandRequest {
        service_id: state.config.service_id.clone(),
        command_name: command.command_name.to_string(),
        paras: command.paras,
    };

    let result = state
        .client
        .create_command(&state.config.device_id, &request)
        .await;

    // Actuation audit trail: one event per dispatch attempt.
    match &result {
        Ok(resp) => tracing::info!(
            command = %command.command_name,
            command_id = resp.command_id.as_deref().unwrap_or("-"),
            "command dispatched"
        ),
        Err(err) => tracing::warn!(
            command = %command.command_name,
            error = %err,
            "command dispatch failed"
        ),
    }

    let resp = result?;
    Ok(Json(json!({ "ok": true, "resp": resp })))
}

// ── Front end ────────────────────────────────────────────────────────

// GET / — index for authenticated sessions, login redirect otherwise.
async fn index(State(state): State<AppState>, req: Request) -> Response {
    let authed = session_token(req.headers())
        .is_some_and(|token| state.sessions.is_valid(&token));
    if !authed {
        return Redirect::to("/login.html").into_response();
    }

    let path = std::path::Path::new(&state.config.static_dir).join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page).into_response(),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "index page unreadable");
            (StatusCode::NOT_FOUND, "index.html not found").into_response()
        }
    }
}
