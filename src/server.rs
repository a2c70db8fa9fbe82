use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{
    Res, api,
    error::Error,
    management::SessionStore,
    openai::{Completion, OpenAiClient},
    spotify::{Catalog, SpotifyClient, auth::SpotifyAuth, auth::TokenExchange},
};

/// Everything a request handler needs. Cloning is cheap.
///
/// The backends sit behind traits so tests can swap them for in-memory fakes.
/// The session store is shared by every clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub auth: Arc<dyn TokenExchange>,
    pub completion: Arc<dyn Completion>,
    pub catalog: Arc<dyn Catalog>,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn TokenExchange>,
        completion: Arc<dyn Completion>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        AppState {
            sessions: SessionStore::new(),
            auth,
            completion,
            catalog,
        }
    }

    /// Wires the real Spotify and completion service clients from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client of the completion service cannot be
    /// built. Missing credentials are reported when a client is first used.
    pub fn from_env() -> Res<Self> {
        Ok(Self::new(
            Arc::new(SpotifyAuth::from_env()),
            Arc::new(OpenAiClient::from_env()?),
            Arc::new(SpotifyClient::from_env()),
        ))
    }
}

/// Builds the web surface.
///
/// # Routes
///
/// - `GET /` - login link or prompt form, depending on the session
/// - `GET /login` - redirect to the Spotify consent page
/// - `POST /logout` - forget the session's credential
/// - `GET /callback` - OAuth redirect target
/// - `POST /playlist` - run the prompt to playlist pipeline
/// - `GET /health` - status and version
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/login", get(api::login))
        .route("/logout", post(api::logout))
        .route("/callback", get(api::callback))
        .route("/playlist", post(api::create_playlist))
        .route("/health", get(api::health))
        .layer(Extension(state))
}

/// Binds the server socket without serving yet.
///
/// # Arguments
///
/// * `addr` - Socket address such as `127.0.0.1:8888`
///
/// # Errors
///
/// - [`Error::Config`] if `addr` is not a socket address
/// - [`Error::Server`] if the address cannot be bound, e.g. the port is taken
pub async fn bind(addr: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("invalid server address '{}': {}", addr, e)))?;

    TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Server(format!("cannot bind {}: {}", addr, e)))
}

/// Serves the router on an already bound listener until the task ends.
///
/// # Errors
///
/// Returns [`Error::Server`] if serving fails.
pub async fn serve(listener: TcpListener, state: AppState) -> Res<()> {
    axum::serve(listener, router(state))
        .await
        .map_err(|e| Error::Server(e.to_string()))
}

/// Binds `addr` and serves the web surface on it.
///
/// # Errors
///
/// See [`bind`] and [`serve`].
pub async fn start_api_server(state: AppState, addr: &str) -> Res<()> {
    let listener = bind(addr).await?;
    serve(listener, state).await
}
