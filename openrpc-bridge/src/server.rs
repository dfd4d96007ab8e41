//! Bridge server core: shared state, HTTP dispatch, and the update path.
//!
//! A single axum fallback handler dispatches every request by method and
//! path, so the contract holds for arbitrary paths: any `POST` is a
//! presence update, any `OPTIONS` is a CORS preflight, and `GET` serves
//! `/health` and `/stats`. No queue and no background tasks sit between
//! the HTTP request and the presence client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use openrpc_proto::activity::ActivityRecord;
use openrpc_proto::update::PresenceUpdate;
use tokio::sync::Mutex;

use crate::client::{ClientError, PresenceClient};
use crate::config::BridgeConfig;

/// Shared bridge state: the presence client plus process-wide counters.
///
/// One instance per server, owned behind an [`Arc`] and handed to every
/// request. The mutex serializes all calls into the presence client; the
/// counters are atomic because axum handles requests concurrently.
pub struct BridgeState {
    config: BridgeConfig,
    client: Mutex<Box<dyn PresenceClient>>,
    connected: AtomicBool,
    update_count: AtomicU64,
    /// Epoch seconds at construction. Every activity reuses this as its
    /// elapsed-time anchor, so the presence shows time since the bridge
    /// started rather than time since the latest update.
    start_time: i64,
}

impl BridgeState {
    /// Creates bridge state around a presence client. The client starts
    /// disconnected; call [`Self::connect`] before serving.
    #[must_use]
    pub fn new(config: BridgeConfig, client: Box<dyn PresenceClient>) -> Self {
        Self {
            config,
            client: Mutex::new(client),
            connected: AtomicBool::new(false),
            update_count: AtomicU64::new(0),
            start_time: now_epoch(),
        }
    }

    /// Connects the presence client and marks the bridge connected.
    ///
    /// # Errors
    ///
    /// Propagates the client's connect failure; the caller treats this as
    /// fatal.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.client.lock().await.connect().await?;
        self.connected.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Maps an inbound update and pushes it to the presence client.
    ///
    /// The update counter is incremented only after the client accepts the
    /// activity, so failed updates leave it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] before [`Self::connect`], or
    /// whatever the client reports for the push.
    pub async fn apply_update(&self, update: &PresenceUpdate) -> Result<(), ClientError> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(ClientError::NotConnected);
        }

        let record = ActivityRecord::from_update(update, self.start_time);
        self.client.lock().await.update(&record).await?;

        let count = self.update_count.fetch_add(1, Ordering::Relaxed) + 1;
        if self.config.verbose {
            tracing::info!(count, details = %record.details, "presence updated");
        } else {
            tracing::debug!(count, details = %record.details, "presence updated");
        }
        Ok(())
    }

    /// Best-effort cleanup: clears the activity and closes the client.
    ///
    /// Errors are logged, never propagated, and never block shutdown.
    pub async fn shutdown(&self) {
        let mut client = self.client.lock().await;
        if let Err(e) = client.clear().await {
            tracing::warn!(error = %e, "failed to clear presence during shutdown");
        }
        if let Err(e) = client.close().await {
            tracing::warn!(error = %e, "failed to close presence client during shutdown");
        }
        self.connected.store(false, Ordering::Relaxed);
    }

    /// Whole seconds since the bridge started, clamped non-negative.
    fn uptime_secs(&self) -> i64 {
        (now_epoch() - self.start_time).max(0)
    }

    fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::Relaxed)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

/// Current time as whole epoch seconds.
#[allow(clippy::cast_possible_wrap)]
fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

// ---------------------------------------------------------------------------
// HTTP responses
// ---------------------------------------------------------------------------

/// Body of every `POST` response.
#[derive(Debug, serde::Serialize)]
struct UpdateResponse {
    success: bool,
}

/// Body of `GET /health`.
#[derive(Debug, serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    connected: bool,
    updates: u64,
    uptime: i64,
}

/// Body of `GET /stats`.
#[derive(Debug, serde::Serialize)]
struct StatsResponse<'a> {
    version: &'static str,
    port: u16,
    client_id: &'a str,
    update_count: u64,
    uptime: i64,
    connected: bool,
}

/// JSON response carrying the `Access-Control-Allow-Origin: *` header.
fn cors_json<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Request dispatch
// ---------------------------------------------------------------------------

/// Dispatches a request by method and path.
///
/// `POST` is an update regardless of path, matching clients that post to
/// arbitrary paths. `OPTIONS` answers the CORS preflight for any path.
async fn dispatch(
    State(state): State<Arc<BridgeState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    match method {
        Method::POST => handle_update(&state, &body).await,
        Method::OPTIONS => preflight(),
        Method::GET => match uri.path() {
            "/health" => handle_health(&state),
            "/stats" => handle_stats(&state),
            _ => StatusCode::NOT_FOUND.into_response(),
        },
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Parses the body (empty body means "all defaults") and applies the
/// update, reporting the outcome as `{"success": bool}`.
async fn handle_update(state: &BridgeState, body: &[u8]) -> Response {
    let update = if body.is_empty() {
        PresenceUpdate::default()
    } else {
        match serde_json::from_slice::<PresenceUpdate>(body) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed update body");
                return cors_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &UpdateResponse { success: false },
                );
            }
        }
    };

    match state.apply_update(&update).await {
        Ok(()) => cors_json(StatusCode::OK, &UpdateResponse { success: true }),
        Err(e) => {
            tracing::error!(error = %e, "presence update failed");
            cors_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &UpdateResponse { success: false },
            )
        }
    }
}

fn handle_health(state: &BridgeState) -> Response {
    cors_json(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            connected: state.is_connected(),
            updates: state.update_count(),
            uptime: state.uptime_secs(),
        },
    )
}

/// `/stats` intentionally carries no CORS header; it is a local
/// diagnostics endpoint, not part of the browser-facing surface.
fn handle_stats(state: &BridgeState) -> Response {
    (
        StatusCode::OK,
        Json(StatsResponse {
            version: env!("CARGO_PKG_VERSION"),
            port: state.config.port,
            client_id: &state.config.client_id,
            update_count: state.update_count(),
            uptime: state.uptime_secs(),
            connected: state.is_connected(),
        }),
    )
        .into_response()
}

/// Empty `200` answering the CORS preflight for any path.
fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Starts the bridge server with a pre-built [`BridgeState`], returning
/// the bound address and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code;
/// tests bind `127.0.0.1:0` for an OS-assigned port.
///
/// # Errors
///
/// Returns the I/O error if the TCP listener cannot bind to `addr`.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<BridgeState>,
) -> Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>), std::io::Error> {
    let app = axum::Router::new().fallback(dispatch).with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "bridge server error");
        }
    });

    Ok((bound_addr, handle))
}
