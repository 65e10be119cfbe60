//! Routes and per-connection handling

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use broadcaster::Broadcaster;
use contracts::Sample;
use futures::StreamExt;
use observability::{SessionMetricsAggregator, SessionSummary};
use session::{Session, SessionConfig, SessionReport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::sink::WsSink;

/// Shared state handed to every connection
#[derive(Clone)]
pub struct AppState {
    broadcasters: Arc<[Arc<Broadcaster<Sample>>]>,
    session: SessionConfig,
    connections: Arc<AtomicUsize>,
    shutdown: CancellationToken,
    finished: Arc<Mutex<SessionMetricsAggregator>>,
}

impl AppState {
    pub fn new(broadcasters: Vec<Arc<Broadcaster<Sample>>>, session: SessionConfig) -> Self {
        Self {
            broadcasters: broadcasters.into(),
            session,
            connections: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
            finished: Arc::new(Mutex::new(SessionMetricsAggregator::new())),
        }
    }

    /// Open connections
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    /// Summary of every session that has ended so far
    pub fn session_summary(&self) -> SessionSummary {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    /// Token cancelling every live session
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn record(&self, report: &SessionReport) {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(report.outcome.label(), report.flushes, report.samples_sent);
    }
}

/// Live connection counter, decremented on drop
struct ConnectionGuard {
    connections: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn open(connections: &Arc<AtomicUsize>) -> Self {
        let count = connections.fetch_add(1, Ordering::Relaxed) + 1;
        observability::record_connections(count);
        Self {
            connections: Arc::clone(connections),
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let count = self.connections.fetch_sub(1, Ordering::Relaxed) - 1;
        observability::record_connections(count);
    }
}

/// Build the router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let _guard = ConnectionGuard::open(&state.connections);
    let (sender, mut receiver) = socket.split();

    let session = Session::join(&state.broadcasters, WsSink::new("ws", sender), state.session);
    let id = session.id();
    info!(session = %id, connections = state.connections(), "Client connected");

    let disconnect = state.shutdown.child_token();
    let reader = {
        let disconnect = disconnect.clone();
        tokio::spawn(async move {
            // Inbound frames carry nothing; only the end of the stream matters.
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            debug!(session = %id, "Client read side closed");
            disconnect.cancel();
        })
    };

    let report = session.run(disconnect).await;
    reader.abort();
    state.record(&report);

    info!(
        session = %id,
        outcome = %report.outcome,
        flushes = report.flushes,
        samples_sent = report.samples_sent,
        "Client disconnected"
    );
}
