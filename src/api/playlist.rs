use axum::{
    Extension, Form,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{page, page::Notice, session_cookie},
    pipeline::{self, NO_TRACKS_MESSAGE, RunOutcome, Silent},
    server::AppState,
    success, warning,
};

#[derive(Debug, Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    pub prompt: String,
}

/// Runs the pipeline for the submitted prompt and renders the outcome.
///
/// Without a valid credential nothing is called and the visitor is sent back
/// to `/`, which shows the login link.
pub async fn create_playlist(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Form(form): Form<PromptForm>,
) -> Response {
    let Some(id) = session_cookie(&headers) else {
        return Redirect::to("/").into_response();
    };
    let Some(token) = state.sessions.credential(&id).await else {
        return Redirect::to("/").into_response();
    };

    let result = pipeline::run(
        &form.prompt,
        &token,
        state.completion.as_ref(),
        state.catalog.as_ref(),
        &Silent,
    )
    .await;

    let notice = match result {
        Ok(RunOutcome::Created(run)) => {
            success!(
                "Playlist created: {} ({} tracks)",
                run.playlist.title,
                run.playlist.track_count
            );
            Notice::Created {
                title: run.playlist.title,
                url: run.playlist.url,
            }
        }
        Ok(RunOutcome::NoTracks { query }) => {
            warning!("No tracks found for query '{}'", query);
            Notice::Info(NO_TRACKS_MESSAGE.to_string())
        }
        Ok(RunOutcome::InvalidPrompt(message)) => Notice::Info(message),
        Err(e) => {
            warning!("Playlist generation failed: {}", e);
            if e.source.requires_login() {
                state.sessions.logout(&id).await;
                state
                    .sessions
                    .record_error(&id, &format!("Please log in to Spotify again: {}", e))
                    .await;
                return Redirect::to("/").into_response();
            }
            Notice::Failed {
                detail: e.to_string(),
            }
        }
    };

    Html(page::prompt_page(Some(&notice), &form.prompt)).into_response()
}
