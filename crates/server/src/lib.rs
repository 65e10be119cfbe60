//! # Server
//!
//! WebSocket transport adapter.
//!
//! 负责：
//! - HTTP listener with `GET /` (WebSocket upgrade) and `GET /health`
//! - One `Session` per upgraded connection, joined to every broadcaster
//! - Client disconnect detection through a reader task
//! - Graceful shutdown that ends every live session

mod error;
mod router;
mod sink;

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

pub use error::{Result, ServerError};
pub use router::{build_router, AppState};
pub use sink::WsSink;

/// Bind the listening socket
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Serve connections until `shutdown` resolves
///
/// Live sessions are cancelled once `shutdown` fires.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    let sessions = state.shutdown_token();
    let router = build_router(state);

    info!(%addr, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            sessions.cancel();
        })
        .await
        .map_err(ServerError::Serve)?;

    info!(%addr, "Server stopped");
    Ok(())
}
