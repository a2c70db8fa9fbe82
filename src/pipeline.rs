//! Prompt to playlist pipeline.
//!
//! ```text
//! prompt ─▶ translate ─▶ search ─┬─▶ title ─▶ publish ─▶ Created
//!                                └─▶ NoTracks
//! ```
//!
//! Stages run one after another and every stage waits for its remote call.
//! The first failing stage ends the run; nothing is retried.

use std::fmt;

use thiserror::Error;

use crate::{
    error::Error,
    info,
    openai::{Completion, title::generate_title, translator::translate_prompt},
    query::SearchQuery,
    spotify::{
        Catalog,
        playlist::publish,
        search::{SearchOutcome, search_tracks},
    },
    types::{PublishedPlaylist, Token, TrackRef},
};

pub const EMPTY_PROMPT_MESSAGE: &str = "Please describe the vibe you are going for first.";
pub const NO_TRACKS_MESSAGE: &str =
    "Sorry, couldn't find any songs for that vibe. Try rewording your prompt!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Translate,
    Search,
    Title,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Translate => write!(f, "query translation"),
            Stage::Search => write!(f, "catalog search"),
            Stage::Title => write!(f, "title generation"),
            Stage::Publish => write!(f, "playlist publishing"),
        }
    }
}

/// Receives progress notifications while a run is going.
pub trait StageObserver: Send + Sync {
    fn started(&self, _stage: Stage) {}
    fn finished(&self, _stage: Stage) {}
    fn failed(&self, _stage: Stage, _error: &Error) {}
}

/// Observer that ignores every notification.
pub struct Silent;

impl StageObserver for Silent {}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRun {
    pub query: SearchQuery,
    pub tracks: Vec<TrackRef>,
    pub playlist: PublishedPlaylist,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Created(PlaylistRun),
    /// The search found nothing; no title was generated and nothing published.
    NoTracks { query: SearchQuery },
    /// The prompt was rejected before any remote call.
    InvalidPrompt(String),
}

#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

async fn stage<T, F>(observer: &dyn StageObserver, stage: Stage, fut: F) -> Result<T, StageError>
where
    F: Future<Output = Result<T, Error>>,
{
    observer.started(stage);
    match fut.await {
        Ok(value) => {
            observer.finished(stage);
            Ok(value)
        }
        Err(source) => {
            observer.failed(stage, &source);
            Err(StageError { stage, source })
        }
    }
}

/// Turns a prompt into a published playlist.
///
/// # Errors
///
/// Returns the failing [`Stage`] together with its error. When the publish
/// stage fails after the playlist was created the source is
/// [`Error::PartialPublish`].
pub async fn run(
    prompt: &str,
    token: &Token,
    completion: &dyn Completion,
    catalog: &dyn Catalog,
    observer: &dyn StageObserver,
) -> Result<RunOutcome, StageError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Ok(RunOutcome::InvalidPrompt(EMPTY_PROMPT_MESSAGE.to_string()));
    }

    let query = stage(
        observer,
        Stage::Translate,
        translate_prompt(completion, prompt),
    )
    .await?;
    info!("Query string sent to Spotify: {}", query);

    let outcome = stage(
        observer,
        Stage::Search,
        search_tracks(catalog, &token.access_token, &query),
    )
    .await?;

    let tracks = match outcome {
        SearchOutcome::Tracks(tracks) => tracks,
        SearchOutcome::Empty => return Ok(RunOutcome::NoTracks { query }),
    };

    let title = stage(observer, Stage::Title, generate_title(completion, prompt)).await?;

    let playlist = stage(
        observer,
        Stage::Publish,
        publish(catalog, &token.access_token, &title, &tracks),
    )
    .await?;

    Ok(RunOutcome::Created(PlaylistRun {
        query,
        tracks,
        playlist,
    }))
}
