use axum::{
    Extension,
    extract::Query,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{page, session_cookie},
    management::SessionOrigin,
    server::AppState,
    success, warning,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Handles the redirect back from the Spotify consent page.
///
/// Browser logins always end in a `303` to `/`, so the one-time code is
/// dropped from the address bar and a reload cannot submit it again. Terminal
/// logins get a small page telling the user to close the window.
///
/// A browser login is only completed for the session cookie that started it.
/// A callback carrying someone else's `state` is refused before the code is
/// sent anywhere, and the error shows on the sender's login page.
pub async fn callback(
    Extension(state): Extension<AppState>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Response {
    let cookie = session_cookie(&headers);

    let (Some(oauth_state), Some(code)) = (params.state.as_deref(), params.code.as_deref()) else {
        let reason = match params.error.as_deref() {
            Some(e) => format!("Spotify login was not completed: {}", e),
            None => "Spotify did not send an authorization code.".to_string(),
        };
        warning!("{}", reason);

        let failed = match params.state.as_deref() {
            Some(oauth_state) => state.sessions.fail_login(oauth_state, &reason).await,
            None => None,
        };
        if failed.map(|f| f.origin) == Some(SessionOrigin::Terminal) {
            return Html(page::message_page("Login failed", &reason)).into_response();
        }
        if let Some(id) = cookie {
            state.sessions.record_error(&id, &reason).await;
        }
        return Redirect::to("/").into_response();
    };

    match state
        .sessions
        .complete_login(cookie.as_deref(), oauth_state, code, state.auth.as_ref())
        .await
    {
        Ok(completion) => {
            success!("Spotify login completed");
            match completion.origin {
                SessionOrigin::Terminal => Html(page::message_page(
                    "Authentication successful",
                    "You can close this browser window and return to the terminal.",
                ))
                .into_response(),
                SessionOrigin::Browser => Redirect::to("/").into_response(),
            }
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            match cookie {
                Some(id) => {
                    state
                        .sessions
                        .record_error(&id, &format!("Spotify authentication failed: {}", e))
                        .await;
                    Redirect::to("/").into_response()
                }
                None => Html(page::message_page(
                    "Login failed",
                    &format!("Spotify authentication failed: {}", e),
                ))
                .into_response(),
            }
        }
    }
}
