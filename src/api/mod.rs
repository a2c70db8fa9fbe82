//! # API Module
//!
//! HTTP endpoints of the vibemaker web surface. Every page is rendered on the
//! server; the browser only needs to follow links and submit one form.
//!
//! ## Endpoints
//!
//! - [`index`] - `GET /`: login link for new visitors, the prompt form once logged in
//! - [`login`] - `GET /login`: binds a fresh OAuth state to the session and
//!   redirects to the Spotify consent page
//! - [`callback`] - `GET /callback`: exchanges the authorization code and
//!   redirects back to `/` so the code leaves the address bar
//! - [`create_playlist`] - `POST /playlist`: runs the prompt to playlist pipeline
//! - [`logout`] - `POST /logout`: forgets the session's credential
//! - [`health`] - `GET /health`: status and version for monitoring
//!
//! ## Sessions
//!
//! Sessions are identified by the `vibemaker_session` cookie (`HttpOnly`,
//! `SameSite=Lax` so it survives the redirect back from Spotify). A request
//! without a known cookie gets a new, unauthenticated session.

use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};

use crate::{
    management::{SESSION_COOKIE, SessionOrigin},
    server::AppState,
    utils,
};

mod callback;
mod health;
mod index;
mod page;
mod playlist;

pub use callback::callback;
pub use health::health;
pub use index::{index, login, logout};
pub use playlist::create_playlist;

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| utils::cookie_value(value, SESSION_COOKIE))
}

/// Resolves the request's session, creating one if needed.
///
/// Returns the session id and, for new sessions, the `Set-Cookie` value.
async fn resolve_session(state: &AppState, headers: &HeaderMap) -> (String, Option<HeaderValue>) {
    let cookie = session_cookie(headers);
    let (id, created) = state
        .sessions
        .resolve(cookie.as_deref(), SessionOrigin::Browser)
        .await;

    let set_cookie = if created {
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, id
        ))
        .ok()
    } else {
        None
    };

    (id, set_cookie)
}

fn with_cookie(response: impl IntoResponse, set_cookie: Option<HeaderValue>) -> Response {
    let mut response = response.into_response();
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
