use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use url::Url;

use crate::{
    Res, config,
    error::Error,
    management::{SessionOrigin, SessionStatus, SessionStore},
    server::{self, AppState},
    types::{Token, TokenResponse},
    utils, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// The identity provider side of the authorization-code flow.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Consent page URL carrying the given anti-forgery `state`.
    fn authorize_url(&self, state: &str) -> Res<String>;

    /// Exchanges a one-time authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Res<Token>;
}

/// Spotify accounts service client for a confidential application.
///
/// Client id, secret and redirect URI are checked when first used, so a
/// missing value shows up as [`Error::Config`] on the login attempt.
pub struct SpotifyAuth {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    scope: String,
    auth_url: String,
    token_url: String,
    client: Client,
}

impl SpotifyAuth {
    /// Creates a client for the given application credentials and endpoints.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Application client id, `None` if not configured
    /// * `client_secret` - Application client secret, `None` if not configured
    /// * `redirect_uri` - Redirect URI registered with the application
    /// * `scope` - Space separated scopes to request
    /// * `auth_url` - Consent page, e.g. `https://accounts.spotify.com/authorize`
    /// * `token_url` - Token endpoint, e.g. `https://accounts.spotify.com/api/token`
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
        scope: String,
        auth_url: String,
        token_url: String,
    ) -> Self {
        SpotifyAuth {
            client_id,
            client_secret,
            redirect_uri,
            scope,
            auth_url,
            token_url,
            client: Client::new(),
        }
    }

    /// Creates a client from the `SPOTIFY_API_*` variables.
    pub fn from_env() -> Self {
        Self::new(
            config::spotify_client_id().ok(),
            config::spotify_client_secret().ok(),
            config::spotify_redirect_uri().ok(),
            config::spotify_scope(),
            config::spotify_apiauth_url(),
            config::spotify_apitoken_url(),
        )
    }

    fn client_id(&self) -> Res<&str> {
        self.client_id
            .as_deref()
            .ok_or_else(|| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()))
    }

    fn client_secret(&self) -> Res<&str> {
        self.client_secret.as_deref().ok_or_else(|| {
            Error::Config("SPOTIFY_API_AUTH_CLIENT_SECRET must be set".to_string())
        })
    }

    fn redirect_uri(&self) -> Res<&str> {
        self.redirect_uri
            .as_deref()
            .ok_or_else(|| Error::Config("SPOTIFY_API_REDIRECT_URI must be set".to_string()))
    }
}

#[async_trait]
impl TokenExchange for SpotifyAuth {
    fn authorize_url(&self, state: &str) -> Res<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id()?),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri()?),
                ("scope", self.scope.as_str()),
                ("state", state),
                ("show_dialog", "true"),
            ],
        )?;

        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Res<Token> {
        let authorization = utils::basic_auth_header(self.client_id()?, self.client_secret()?);

        let res = self
            .client
            .post(&self.token_url)
            .header(header::AUTHORIZATION, authorization)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri()?),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token exchange rejected ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let json: TokenResponse = serde_json::from_str(&body)?;
        Ok(token_from_response(json, utils::now_timestamp()))
    }
}

pub fn token_from_response(response: TokenResponse, obtained_at: u64) -> Token {
    Token {
        access_token: response.access_token,
        scope: response.scope,
        expires_in: response.expires_in,
        obtained_at,
    }
}

/// Logs in from the terminal.
///
/// Creates a terminal session, starts the local callback server, opens the
/// consent page in the default browser and waits for the callback to finish
/// the exchange. The credential is only kept in this process.
///
/// # Errors
///
/// - [`Error::Server`] if the callback server cannot bind its address; the
///   browser is not opened in that case
/// - [`Error::Auth`] if the provider rejects the login or nothing arrives
///   within two minutes
pub async fn login(state: &AppState) -> Res<Token> {
    let session_id = state.sessions.create(SessionOrigin::Terminal).await;
    let auth_url = state
        .sessions
        .begin_login(&session_id, state.auth.as_ref())
        .await?;

    let listener = server::bind(&config::server_addr()).await?;
    let server_state = state.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(&state.sessions, &session_id).await;
    server.abort();
    token
}

/// Polls the session until the callback has stored a credential or failed.
async fn wait_for_token(sessions: &SessionStore, session_id: &str) -> Res<Token> {
    let start = Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        match sessions.status(session_id).await {
            SessionStatus::Authenticated => {
                return sessions
                    .credential(session_id)
                    .await
                    .ok_or_else(|| Error::Auth("received an already expired token".to_string()));
            }
            SessionStatus::Unauthenticated {
                last_error: Some(e),
            } => return Err(Error::Auth(e)),
            _ => {}
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Err(Error::Auth("login timed out".to_string()))
}
