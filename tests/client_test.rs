use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, Uri, header},
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use url::Url;
use vibemaker::{
    error::Error,
    openai::{Completion, CompletionRequest, OpenAiClient, client::reply_text},
    server,
    spotify::{
        Catalog, SpotifyClient,
        auth::{SpotifyAuth, TokenExchange},
    },
    types::{ChatCompletionResponse, CreatePlaylistResponse, SearchResponse, TrackRef},
};

type Log = Arc<Mutex<Vec<(String, Value)>>>;

/// Serves `router` on a free local port and returns its base URL.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn record(log: &Log, name: &str, value: Value) {
    log.lock().unwrap().push((name.to_string(), value));
}

fn entries(log: &Log, name: &str) -> Vec<Value> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
        .collect()
}

fn auth_header(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn chat_reply(body: &str) -> ChatCompletionResponse {
    serde_json::from_str(body).unwrap()
}

// Completion replies

#[test]
fn test_reply_text_takes_first_line_of_first_choice() {
    let reply = chat_reply(
        r#"{"id":"chatcmpl-1","choices":[
            {"index":0,"message":{"role":"assistant","content":"\n genre:jazz year:1959 \nEnjoy!"}},
            {"index":1,"message":{"role":"assistant","content":"genre:rock"}}
        ]}"#,
    );

    assert_eq!(reply_text(reply).unwrap(), "genre:jazz year:1959");
}

#[test]
fn test_reply_text_without_choices() {
    let reply = chat_reply(r#"{"choices":[]}"#);
    assert!(matches!(reply_text(reply), Err(Error::Parse(_))));
}

#[test]
fn test_reply_text_without_content() {
    let null_content = chat_reply(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#);
    assert!(matches!(reply_text(null_content), Err(Error::Parse(_))));

    let missing_content = chat_reply(r#"{"choices":[{"message":{"role":"assistant"}}]}"#);
    assert!(matches!(reply_text(missing_content), Err(Error::Parse(_))));

    let blank_content = chat_reply(r#"{"choices":[{"message":{"content":"  \n "}}]}"#);
    assert!(matches!(reply_text(blank_content), Err(Error::Parse(_))));
}

#[test]
fn test_chat_reply_schema() {
    assert!(serde_json::from_str::<ChatCompletionResponse>(r#"{"id":"x"}"#).is_err());
    assert!(serde_json::from_str::<ChatCompletionResponse>(r#"{"choices":[{}]}"#).is_err());
}

// Spotify schemas

const SEARCH_FIXTURE: &str = r#"{
  "tracks": {
    "href": "https://api.spotify.com/v1/search?query=genre%3Ajazz&type=track",
    "limit": 50,
    "items": [
      {
        "id": "1YQWosTIljIvxAgHWTp7KP",
        "name": "So What",
        "uri": "spotify:track:1YQWosTIljIvxAgHWTp7KP",
        "popularity": 71,
        "artists": [
          {"id": "0kbYTNQb4Pb1rPbbaF0pT4", "name": "Miles Davis"},
          {"id": "2hGh5VOeeqimQFxqXvfCUf", "name": "John Coltrane"}
        ]
      },
      {
        "id": "4vLYewWIvqHfKtJDk8c8tq",
        "name": "Blue in Green",
        "uri": "spotify:track:4vLYewWIvqHfKtJDk8c8tq"
      }
    ]
  }
}"#;

#[test]
fn test_search_response_schema() {
    let response: SearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
    let tracks: Vec<TrackRef> = response
        .tracks
        .items
        .into_iter()
        .map(TrackRef::from)
        .collect();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].uri, "spotify:track:1YQWosTIljIvxAgHWTp7KP");
    assert_eq!(tracks[0].artists, "Miles Davis, John Coltrane");
    assert_eq!(tracks[1].artists, "");
}

#[test]
fn test_search_response_missing_fields() {
    let missing_uri = r#"{"tracks":{"items":[{"id":"1","name":"So What"}]}}"#;
    assert!(serde_json::from_str::<SearchResponse>(missing_uri).is_err());

    let missing_tracks = r#"{"albums":{"items":[]}}"#;
    assert!(serde_json::from_str::<SearchResponse>(missing_tracks).is_err());
}

#[test]
fn test_create_playlist_response_schema() {
    let created: CreatePlaylistResponse = serde_json::from_str(
        r#"{"id":"37i9dQZF1DX8Uebhn9wzrS","name":"Chill Study Vibes","public":true,
            "external_urls":{"spotify":"https://open.spotify.com/playlist/37i9dQZF1DX8Uebhn9wzrS"}}"#,
    )
    .unwrap();
    assert_eq!(
        created.external_urls.spotify,
        "https://open.spotify.com/playlist/37i9dQZF1DX8Uebhn9wzrS"
    );

    let missing_url = r#"{"id":"37i9dQZF1DX8Uebhn9wzrS","name":"Chill Study Vibes"}"#;
    assert!(serde_json::from_str::<CreatePlaylistResponse>(missing_url).is_err());
}

// Accounts service

fn spotify_auth(token_url: &str) -> SpotifyAuth {
    SpotifyAuth::new(
        Some("client-abc".to_string()),
        Some("secret-xyz".to_string()),
        Some("http://127.0.0.1:8888/callback".to_string()),
        "playlist-modify-public playlist-modify-private".to_string(),
        "https://accounts.spotify.com/authorize".to_string(),
        token_url.to_string(),
    )
}

#[test]
fn test_authorize_url_parameters() {
    let url = spotify_auth("http://unused").authorize_url("st4te").unwrap();
    let url = Url::parse(&url).unwrap();
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    assert_eq!(url.host_str(), Some("accounts.spotify.com"));
    assert_eq!(url.path(), "/authorize");
    assert_eq!(params["client_id"], "client-abc");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["redirect_uri"], "http://127.0.0.1:8888/callback");
    assert_eq!(params["scope"], "playlist-modify-public playlist-modify-private");
    assert_eq!(params["state"], "st4te");
    assert_eq!(params["show_dialog"], "true");
}

#[test]
fn test_authorize_url_needs_configuration() {
    let auth = SpotifyAuth::new(
        None,
        None,
        None,
        "playlist-modify-public".to_string(),
        "https://accounts.spotify.com/authorize".to_string(),
        "https://accounts.spotify.com/api/token".to_string(),
    );

    assert!(matches!(auth.authorize_url("s"), Err(Error::Config(_))));
}

async fn token_endpoint(
    Extension(log): Extension<Log>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    record(&log, "authorization", json!(auth_header(&headers)));
    record(&log, "form", json!(form));

    if form.get("code").map(String::as_str) == Some("expired-code") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid authorization code"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": "BQD-access",
            "token_type": "Bearer",
            "scope": "playlist-modify-public",
            "expires_in": 3600,
            "refresh_token": "AQD-refresh"
        })),
    )
}

#[tokio::test]
async fn test_exchange_code() {
    let log = Log::default();
    let base = spawn(
        Router::new()
            .route("/api/token", post(token_endpoint))
            .layer(Extension(log.clone())),
    )
    .await;
    let auth = spotify_auth(&format!("{}/api/token", base));

    let token = auth.exchange_code("good-code").await.unwrap();
    assert_eq!(token.access_token, "BQD-access");
    assert_eq!(token.expires_in, 3600);
    assert!(token.obtained_at > 0);

    // Basic client authentication with base64("client-abc:secret-xyz")
    assert_eq!(
        entries(&log, "authorization"),
        vec![json!("Basic Y2xpZW50LWFiYzpzZWNyZXQteHl6")]
    );
    let form = &entries(&log, "form")[0];
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "good-code");
    assert_eq!(form["redirect_uri"], "http://127.0.0.1:8888/callback");

    let rejected = auth.exchange_code("expired-code").await;
    match rejected {
        Err(Error::Auth(message)) => assert!(message.contains("invalid_grant")),
        other => panic!("unexpected result {:?}", other),
    }
}

// Web API

async fn search(
    Extension(log): Extension<Log>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    record(&log, "authorization", json!(auth_header(&headers)));
    record(&log, "search", json!(params));
    (
        [(header::CONTENT_TYPE, "application/json")],
        SEARCH_FIXTURE,
    )
}

async fn me() -> Json<Value> {
    Json(json!({"id": "dj nova/2", "display_name": "DJ Nova"}))
}

async fn create_playlist(
    Extension(log): Extension<Log>,
    uri: Uri,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&log, "create_path", json!(uri.path()));
    record(&log, "create_user", json!(user_id));
    record(&log, "create", body.clone());
    Json(json!({
        "id": "5ptnoy6lNmbH8Dy2GUEHgB",
        "name": body["name"],
        "public": true,
        "external_urls": {"spotify": "https://open.spotify.com/playlist/5ptnoy6lNmbH8Dy2GUEHgB"}
    }))
}

async fn add_tracks(
    Extension(log): Extension<Log>,
    Path(playlist_id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&log, "add", json!({"playlist": playlist_id, "body": body}));
    if playlist_id == "locked" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"status": 403, "message": "Forbidden"}})),
        );
    }
    (StatusCode::CREATED, Json(json!({"snapshot_id": "AAAAAg"})))
}

async fn unfollow(Extension(log): Extension<Log>, Path(playlist_id): Path<String>) -> StatusCode {
    record(&log, "unfollow", json!(playlist_id));
    StatusCode::OK
}

async fn spotify_stub() -> (SpotifyClient, Log) {
    let log = Log::default();
    let router = Router::new()
        .route("/v1/search", get(search))
        .route("/v1/me", get(me))
        .route("/v1/users/{user_id}/playlists", post(create_playlist))
        .route("/v1/playlists/{playlist_id}/tracks", post(add_tracks))
        .route("/v1/playlists/{playlist_id}/followers", delete(unfollow))
        .layer(Extension(log.clone()));
    let base = spawn(router).await;

    (SpotifyClient::new(format!("{}/v1/", base)), log)
}

#[tokio::test]
async fn test_search_tracks_request() {
    let (client, log) = spotify_stub().await;

    let tracks = client
        .search_tracks("BQD-access", "genre:jazz artist:\"Miles Davis\"", 50)
        .await
        .unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[1].name, "Blue in Green");

    let params = &entries(&log, "search")[0];
    assert_eq!(params["q"], "genre:jazz artist:\"Miles Davis\"");
    assert_eq!(params["type"], "track");
    assert_eq!(params["limit"], "50");
    assert_eq!(entries(&log, "authorization"), vec![json!("Bearer BQD-access")]);
}

#[tokio::test]
async fn test_create_playlist_encodes_user_id() {
    let (client, log) = spotify_stub().await;

    let user_id = client.current_user_id("BQD-access").await.unwrap();
    let created = client
        .create_playlist("BQD-access", &user_id, "Kind of Blue Mood")
        .await
        .unwrap();

    assert_eq!(created.id, "5ptnoy6lNmbH8Dy2GUEHgB");
    assert_eq!(
        entries(&log, "create_path"),
        vec![json!("/v1/users/dj%20nova%2F2/playlists")]
    );
    assert_eq!(entries(&log, "create_user"), vec![json!("dj nova/2")]);

    let body = &entries(&log, "create")[0];
    assert_eq!(body["name"], "Kind of Blue Mood");
    assert_eq!(body["public"], true);
}

#[tokio::test]
async fn test_add_tracks_sends_one_batch() {
    let (client, log) = spotify_stub().await;
    let uris: Vec<String> = (0..50)
        .map(|n| format!("spotify:track:{:022}", n))
        .collect();

    client
        .add_tracks("BQD-access", "5ptnoy6lNmbH8Dy2GUEHgB", &uris)
        .await
        .unwrap();

    let added = entries(&log, "add");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["playlist"], "5ptnoy6lNmbH8Dy2GUEHgB");
    assert_eq!(added[0]["body"]["uris"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn test_add_tracks_reports_status() {
    let (client, _log) = spotify_stub().await;

    let result = client
        .add_tracks("BQD-access", "locked", &["spotify:track:1".to_string()])
        .await;

    match result {
        Err(Error::Api {
            service,
            status,
            body,
        }) => {
            assert_eq!(service, "Spotify");
            assert_eq!(status, 403);
            assert!(body.contains("Forbidden"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_remove_playlist() {
    let (client, log) = spotify_stub().await;

    client
        .remove_playlist("BQD-access", "5ptnoy6lNmbH8Dy2GUEHgB")
        .await
        .unwrap();

    assert_eq!(entries(&log, "unfollow"), vec![json!("5ptnoy6lNmbH8Dy2GUEHgB")]);
}

// Completion service

async fn chat_completions(
    Extension(log): Extension<Log>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&log, "authorization", json!(auth_header(&headers)));
    record(&log, "chat", body);
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "genre:jazz\nHope you like it"}}]
    }))
}

async fn no_choices() -> Json<Value> {
    Json(json!({"id": "chatcmpl-2", "choices": []}))
}

async fn overloaded() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
}

async fn completion_stub() -> (String, Log) {
    let log = Log::default();
    let router = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/empty/chat/completions", post(no_choices))
        .route("/down/chat/completions", post(overloaded))
        .layer(Extension(log.clone()));
    (spawn(router).await, log)
}

fn completion_request(temperature: Option<f32>) -> CompletionRequest {
    CompletionRequest {
        system: "Turn the vibe into a search query.".to_string(),
        user: "smoky jazz bar".to_string(),
        temperature,
    }
}

#[tokio::test]
async fn test_completion_request_body() {
    let (base, log) = completion_stub().await;
    let client = OpenAiClient::new(
        Some("sk-test".to_string()),
        format!("{}/v1", base),
        "gpt-4o".to_string(),
    )
    .unwrap();

    let reply = client.complete(completion_request(Some(0.7))).await.unwrap();
    assert_eq!(reply, "genre:jazz");

    let reply = client.complete(completion_request(None)).await.unwrap();
    assert_eq!(reply, "genre:jazz");

    let bodies = entries(&log, "chat");
    assert_eq!(bodies[0]["model"], "gpt-4o");
    assert_eq!(bodies[0]["messages"][0]["role"], "system");
    assert_eq!(bodies[0]["messages"][1]["role"], "user");
    assert_eq!(bodies[0]["messages"][1]["content"], "smoky jazz bar");
    assert!((bodies[0]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert!(bodies[1].get("temperature").is_none());
    assert_eq!(entries(&log, "authorization")[0], json!("Bearer sk-test"));
}

#[tokio::test]
async fn test_completion_failures() {
    let (base, log) = completion_stub().await;
    let client = |path: &str, key: Option<&str>| {
        OpenAiClient::new(
            key.map(str::to_string),
            format!("{}{}", base, path),
            "gpt-4o".to_string(),
        )
        .unwrap()
    };

    let empty = client("/empty", Some("sk-test")).complete(completion_request(None)).await;
    assert!(matches!(empty, Err(Error::Parse(_))));

    let down = client("/down", Some("sk-test")).complete(completion_request(None)).await;
    assert!(matches!(down, Err(Error::Api { status: 503, .. })));

    // A missing key fails before any request is sent
    let unconfigured = client("/v1", None).complete(completion_request(None)).await;
    assert!(matches!(unconfigured, Err(Error::Config(_))));
    assert!(entries(&log, "chat").is_empty());
}

// Server socket

#[tokio::test]
async fn test_bind_reports_taken_port() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap().to_string();

    assert!(matches!(server::bind(&addr).await, Err(Error::Server(_))));
    assert!(matches!(
        server::bind("not-an-address").await,
        Err(Error::Config(_))
    ));
}
