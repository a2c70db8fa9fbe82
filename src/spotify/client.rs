use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    Res, config,
    error::Error,
    spotify::Catalog,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CurrentUserResponse, SearchResponse, TrackRef,
    },
};

const PLAYLIST_DESCRIPTION: &str = "Made with vibemaker";

/// Spotify Web API client.
///
/// Holds no credential; every call takes the session's access token, so one
/// client serves all sessions of the web surface.
///
/// # Endpoints
///
/// - `GET /search` - track search
/// - `GET /me` - current user id
/// - `POST /users/{user_id}/playlists` - create a public playlist
/// - `POST /playlists/{playlist_id}/tracks` - add tracks in one batch
/// - `DELETE /playlists/{playlist_id}/followers` - remove an owned playlist
///
/// Path parameters are percent-encoded as single path segments.
pub struct SpotifyClient {
    api_url: String,
    client: Client,
}

impl SpotifyClient {
    /// Creates a client for the given API base URL.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL such as `https://api.spotify.com/v1`; a trailing
    ///   slash is ignored
    pub fn new(api_url: String) -> Self {
        SpotifyClient {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Creates a client for `SPOTIFY_API_URL`.
    pub fn from_env() -> Self {
        Self::new(config::spotify_apiurl())
    }

    /// Appends `segments` to the base URL, encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Res<Url> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("invalid Spotify API URL '{}'", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Res<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                service: "Spotify",
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Res<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_tracks(&self, token: &str, query: &str, limit: u32) -> Res<Vec<TrackRef>> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.endpoint(&["search"])?)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);

        let res: SearchResponse = self.send_json(request).await?;
        Ok(res.tracks.items.into_iter().map(TrackRef::from).collect())
    }

    async fn current_user_id(&self, token: &str) -> Res<String> {
        let request = self
            .client
            .get(self.endpoint(&["me"])?)
            .bearer_auth(token);

        let res: CurrentUserResponse = self.send_json(request).await?;
        Ok(res.id)
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
    ) -> Res<CreatePlaylistResponse> {
        let request = self
            .client
            .post(self.endpoint(&["users", user_id, "playlists"])?)
            .bearer_auth(token)
            .json(&CreatePlaylistRequest {
                name: name.to_string(),
                description: PLAYLIST_DESCRIPTION.to_string(),
                public: true,
            });

        self.send_json(request).await
    }

    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Res<()> {
        let request = self
            .client
            .post(self.endpoint(&["playlists", playlist_id, "tracks"])?)
            .bearer_auth(token)
            .json(&AddTrackToPlaylistRequest {
                uris: uris.to_vec(),
            });

        let _: AddTrackToPlaylistResponse = self.send_json(request).await?;
        Ok(())
    }

    async fn remove_playlist(&self, token: &str, playlist_id: &str) -> Res<()> {
        let request = self
            .client
            .delete(self.endpoint(&["playlists", playlist_id, "followers"])?)
            .bearer_auth(token);

        self.send(request).await.map(|_| ())
    }
}
