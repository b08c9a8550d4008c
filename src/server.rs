use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::SkillHubError;
use crate::events::DisplayEvent;
use crate::session::{Hub, MenuChoice, SessionState};

/// Sessions untouched for this long are dropped when a new one opens
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

struct SessionSlot {
    state: Arc<Mutex<SessionState>>,
    last_used: Instant,
}

/// Hub plus the in-memory state of every open conversation
pub struct AppState {
    hub: Hub,
    sessions: Mutex<HashMap<String, SessionSlot>>,
    idle_timeout: Duration,
}

impl AppState {
    pub fn new(hub: Hub) -> Self {
        Self {
            hub,
            sessions: Mutex::new(HashMap::new()),
            idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Register a fresh conversation, evicting idle ones first
    async fn open_session(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, slot| now.duration_since(slot.last_used) < self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle chat sessions");
        }

        sessions.insert(
            session_id.clone(),
            SessionSlot {
                state: Arc::new(Mutex::new(SessionState::default())),
                last_used: now,
            },
        );
        session_id
    }

    async fn session(&self, id: &str) -> Result<Arc<Mutex<SessionState>>, ApiError> {
        let mut sessions = self.sessions.lock().await;
        let slot = sessions
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(format!("Session {id} not found")))?;
        slot.last_used = Instant::now();
        Ok(slot.state.clone())
    }

    async fn close_session(&self, id: &str) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub session_id: String,
    pub events: Vec<DisplayEvent>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<DisplayEvent>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }

    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

async fn start_session(State(state): State<Arc<AppState>>) -> Json<StartResponse> {
    let session_id = state.open_session().await;
    tracing::info!(session = %session_id, "Started chat session");

    Json(StartResponse {
        session_id,
        events: state.hub.start(),
    })
}

async fn choose(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChoiceRequest>,
) -> Result<Json<EventsResponse>, ApiError> {
    let choice: MenuChoice = req
        .value
        .parse()
        .map_err(|e: SkillHubError| ApiError::bad_request(e.to_string()))?;

    let session = state.session(&id).await?;
    let mut current = session.lock().await;
    let (next, events) = state.hub.select(*current, choice);
    *current = next;

    Ok(Json(EventsResponse { events }))
}

async fn message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<EventsResponse>, ApiError> {
    let session = state.session(&id).await?;
    // Held for the whole turn so a session handles one message at a time
    let mut current = session.lock().await;
    let (next, events) = state.hub.handle_user_message(*current, &req.text).await;
    *current = next;

    Ok(Json(EventsResponse { events }))
}

async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.close_session(&id).await {
        return Err(ApiError::not_found(format!("Session {id} not found")));
    }
    tracing::info!(session = %id, "Closed chat session");
    Ok(StatusCode::NO_CONTENT)
}

async fn require_bearer(
    State(expected): State<Arc<String>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }
    let headers: &HeaderMap = req.headers();
    let header_ok = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", expected.as_str()));
    // Fallback for clients that cannot set headers
    let query_ok = req.uri().query().is_some_and(|q| {
        q.split('&').any(|pair| {
            pair.split_once('=').is_some_and(|(k, v)| {
                (k == "access_token" || k == "token") && v == expected.as_str()
            })
        })
    });
    if !(header_ok || query_ok) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(req).await
}

pub fn router(state: Arc<AppState>, bearer_token: Option<String>) -> Router {
    let mut router = Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/:id", delete(end_session))
        .route("/sessions/:id/choice", post(choose))
        .route("/sessions/:id/messages", post(message))
        .with_state(state);

    if let Some(expected) = bearer_token {
        router = router.layer(middleware::from_fn_with_state(
            Arc::new(expected),
            require_bearer,
        ));
    }

    router.route("/health", get(|| async { "ok" }))
}

pub async fn serve(
    hub: Hub,
    bind: SocketAddr,
    bearer_token: Option<String>,
    idle_timeout: Duration,
) -> anyhow::Result<()> {
    let auth = if bearer_token.is_some() { "bearer" } else { "none" };
    let state = AppState::new(hub).with_idle_timeout(idle_timeout);
    let app = router(Arc::new(state), bearer_token);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, auth = %auth, "Starting chat HTTP server");

    axum::serve(listener, app).await?;
    Ok(())
}
