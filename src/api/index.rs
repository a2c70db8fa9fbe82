use axum::{
    Extension,
    http::HeaderMap,
    response::{Html, Redirect, Response},
};

use crate::{
    api::{page, resolve_session, session_cookie, with_cookie},
    management::SessionStatus,
    server::AppState,
    warning,
};

pub async fn index(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    let (id, set_cookie) = resolve_session(&state, &headers).await;

    let body = match state.sessions.status(&id).await {
        SessionStatus::Authenticated => page::prompt_page(None, ""),
        SessionStatus::Exchanging => page::login_page(Some("Still finishing your login, reload in a moment.")),
        SessionStatus::Unauthenticated { last_error } => page::login_page(last_error.as_deref()),
    };

    with_cookie(Html(body), set_cookie)
}

pub async fn login(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    let (id, set_cookie) = resolve_session(&state, &headers).await;

    match state.sessions.begin_login(&id, state.auth.as_ref()).await {
        Ok(url) => with_cookie(Redirect::to(&url), set_cookie),
        Err(e) => {
            warning!("Cannot start Spotify login: {}", e);
            with_cookie(
                Html(page::login_page(Some(&format!(
                    "Spotify login is not available: {}",
                    e
                )))),
                set_cookie,
            )
        }
    }
}

pub async fn logout(Extension(state): Extension<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(id) = session_cookie(&headers) {
        state.sessions.logout(&id).await;
    }
    Redirect::to("/")
}
