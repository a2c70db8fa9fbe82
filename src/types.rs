//! Data structures shared across vibemaker.
//!
//! Most types mirror the JSON bodies of the Spotify Web API and the chat
//! completion API. Fields the application does not read are left out; serde
//! ignores them. A missing field the application does read fails the whole
//! body with a deserialization error, which callers surface as
//! [`crate::error::Error::Parse`].

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Access credential of one authenticated session.
///
/// # Fields
///
/// * `access_token` - Bearer token sent to the Spotify Web API
/// * `scope` - Space separated scopes granted by the user
/// * `expires_in` - Lifetime in seconds, as reported by the token endpoint
/// * `obtained_at` - Unix timestamp (seconds) of the exchange
///
/// There is no refresh token: an expired credential sends the user back to
/// the login link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Body of a successful authorization-code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
}

/// Body of `GET /search?type=track`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

/// A track picked by the catalog search, in relevance order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRef {
    pub uri: String,
    pub name: String,
    pub artists: String,
}

impl From<Track> for TrackRef {
    fn from(track: Track) -> Self {
        TrackRef {
            uri: track.uri,
            name: track.name,
            artists: track
                .artists
                .into_iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub uri: String,
}

/// Body of `GET /me`. Only the user id is needed to create playlists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
}

/// Body of `POST /users/{user_id}/playlists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

/// The created playlist. `external_urls.spotify` is the public web link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

/// Body of `POST /playlists/{playlist_id}/tracks`; all URIs go in one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

/// The playlist a successful run leaves in the user's library.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPlaylist {
    pub id: String,
    pub title: String,
    pub url: String,
    pub track_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Body of `POST {OPENAI_API_URL}/chat/completions`.
///
/// `temperature` is omitted when unset so the service default applies.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion reply. Only `choices[0].message.content` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
