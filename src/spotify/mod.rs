//! # Spotify Integration Module
//!
//! Thin layer over the Spotify accounts service and Web API:
//!
//! - [`auth`] - Authorization-code flow with client secret, plus the terminal login
//! - [`client`] - [`SpotifyClient`], the HTTP implementation of [`Catalog`]
//! - [`search`] - Track search with an explicit empty outcome
//! - [`playlist`] - Playlist creation and filling
//!
//! ## API Coverage
//!
//! - `GET /search` - Track search, up to 50 results
//! - `GET /me` - Current user id
//! - `POST /users/{user_id}/playlists` - Create a public playlist
//! - `POST /playlists/{playlist_id}/tracks` - Add tracks in one batch
//! - `DELETE /playlists/{playlist_id}/followers` - Remove an unfinished playlist
//! - `POST /api/token` - Authorization code exchange
//!
//! No call is retried and tokens are not refreshed. A `401` from any endpoint
//! sends the user back to the login page.

use async_trait::async_trait;

use crate::{
    Res,
    types::{CreatePlaylistResponse, TrackRef},
};

pub mod auth;
pub mod client;
pub mod playlist;
pub mod search;

pub use client::SpotifyClient;

/// The music catalog operations the pipeline needs.
///
/// Every method takes the bearer token of the session it runs for. Non-success
/// responses are returned as [`crate::error::Error::Api`] with the status and
/// body, transport failures as [`crate::error::Error::Http`].
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Searches tracks and returns them in the provider's relevance order.
    ///
    /// # Arguments
    ///
    /// * `token` - Access token of the session
    /// * `query` - Rendered filter query, e.g. `genre:jazz year:1959`
    /// * `limit` - Maximum number of tracks to return
    async fn search_tracks(&self, token: &str, query: &str, limit: u32) -> Res<Vec<TrackRef>>;

    /// Id of the user the token belongs to.
    async fn current_user_id(&self, token: &str) -> Res<String>;

    /// Creates an empty public playlist owned by `user_id`.
    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
    ) -> Res<CreatePlaylistResponse>;

    /// Appends all `uris` to the playlist in a single request.
    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Res<()>;

    /// Removes a playlist from the owner's library.
    async fn remove_playlist(&self, token: &str, playlist_id: &str) -> Res<()>;
}
