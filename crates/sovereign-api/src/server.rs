//! Listening socket and serve loop for the game API.
//!
//! The binary builds the engine and seeds the map before calling
//! [`start_server`]; from then on every request runs against the one shared
//! [`AppState`]. The host may be an IP literal or a resolvable name.

use std::sync::Arc;

use sovereign_core::{DocumentStore, HistorySink, RandomSource};
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Where the API listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface or host name to bind (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port. `0` asks the OS for a free one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` as written in logs and errors.
    pub fn display_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Open the listening socket described by `config`.
///
/// # Errors
///
/// [`ServerError::Bind`] if the host does not resolve or the port is taken.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.display_addr(),
            source,
        })
}

/// Bind and serve the game API until the process exits.
///
/// # Errors
///
/// [`ServerError::Bind`] when the socket cannot be opened and
/// [`ServerError::Serve`] when the accept loop fails.
pub async fn start_server<S, R, H>(
    config: &ServerConfig,
    state: Arc<AppState<S, R, H>>,
) -> Result<(), ServerError>
where
    S: DocumentStore + 'static,
    R: RandomSource + 'static,
    H: HistorySink + 'static,
{
    let listener = bind_listener(config).await?;
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    info!(addr = %local, "game API listening");

    axum::serve(listener, build_router(state))
        .await
        .map_err(ServerError::Serve)
}

/// Failures of the API server itself, as opposed to request errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be opened.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        /// The configured `host:port`.
        addr: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The accept loop stopped with an I/O error.
    #[error("API server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn loopback(port: u16) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_owned(),
            port,
        }
    }

    #[tokio::test]
    async fn port_zero_gets_an_ephemeral_port() {
        let listener = bind_listener(&loopback(0)).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn taken_port_is_a_bind_error_naming_the_address() {
        let first = bind_listener(&loopback(0)).await.unwrap();
        let port = first.local_addr().unwrap().port();

        let err = bind_listener(&loopback(port)).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { ref addr, .. } if *addr == format!("127.0.0.1:{port}")));
        assert!(err.to_string().starts_with("cannot listen on 127.0.0.1:"));
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_bind_error() {
        let config = ServerConfig {
            host: "no such host".to_owned(),
            port: 0,
        };
        assert!(matches!(
            bind_listener(&config).await,
            Err(ServerError::Bind { .. })
        ));
    }
}
