use tabled::Table;

use crate::{
    cli::progress::SpinnerObserver,
    error, info,
    pipeline::{self, EMPTY_PROMPT_MESSAGE, NO_TRACKS_MESSAGE, RunOutcome},
    server::AppState,
    spotify, success,
    types::TrackTableRow,
    warning,
};

pub async fn create(prompt: String, show_tracks: bool) {
    // Checked here as well so an empty prompt never triggers a login.
    if prompt.trim().is_empty() {
        warning!("{}", EMPTY_PROMPT_MESSAGE);
        return;
    }

    let state = match AppState::from_env() {
        Ok(state) => state,
        Err(e) => error!("Cannot set up clients: {}", e),
    };

    info!("Log in to Spotify in your browser to continue");
    let token = match spotify::auth::login(&state).await {
        Ok(token) => token,
        Err(e) => error!("Spotify authentication failed: {}", e),
    };
    success!("Logged in to Spotify");

    let observer = SpinnerObserver::default();
    let result = pipeline::run(
        &prompt,
        &token,
        state.completion.as_ref(),
        state.catalog.as_ref(),
        &observer,
    )
    .await;

    match result {
        Ok(RunOutcome::Created(run)) => {
            success!("Playlist created: {}", run.playlist.title);
            info!("Open on Spotify: {}", run.playlist.url);

            if show_tracks {
                let rows: Vec<TrackTableRow> = run
                    .tracks
                    .into_iter()
                    .map(|t| TrackTableRow {
                        name: t.name,
                        artists: t.artists,
                        uri: t.uri,
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }
        Ok(RunOutcome::NoTracks { query }) => {
            warning!("{} (searched for: {})", NO_TRACKS_MESSAGE, query);
        }
        Ok(RunOutcome::InvalidPrompt(message)) => warning!("{}", message),
        Err(e) => error!("Something went wrong while generating the playlist.\n{}", e),
    }
}
