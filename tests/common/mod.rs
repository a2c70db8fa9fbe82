#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use vibemaker::{
    Res,
    error::Error,
    openai::{Completion, CompletionRequest, prompts::QUERY_SYSTEM_PROMPT},
    server::AppState,
    spotify::{Catalog, auth::TokenExchange},
    types::{CreatePlaylistResponse, ExternalUrls, Token, TrackRef},
    utils,
};

pub fn valid_token() -> Token {
    Token {
        access_token: "access-123".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_in: 3600,
        obtained_at: utils::now_timestamp(),
    }
}

/// A credential that is already inside the expiry buffer.
pub fn short_lived_token() -> Token {
    Token {
        expires_in: 100,
        ..valid_token()
    }
}

pub fn track(n: usize) -> TrackRef {
    TrackRef {
        uri: format!("spotify:track:{:022}", n),
        name: format!("Track {}", n),
        artists: format!("Artist {}", n),
    }
}

pub fn tracks(count: usize) -> Vec<TrackRef> {
    (0..count).map(track).collect()
}

/// Answers query translations and title requests with fixed replies.
pub struct FakeCompletion {
    pub query_reply: String,
    pub title_reply: String,
    pub fail: bool,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn new(query_reply: &str, title_reply: &str) -> Self {
        FakeCompletion {
            query_reply: query_reply.to_string(),
            title_reply: title_reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        FakeCompletion {
            fail: true,
            ..Self::new("", "")
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for FakeCompletion {
    async fn complete(&self, request: CompletionRequest) -> Res<String> {
        let is_query = request.system == QUERY_SYSTEM_PROMPT;
        self.requests.lock().unwrap().push(request);

        if self.fail {
            return Err(Error::Api {
                service: "completion service",
                status: 429,
                body: "rate limited".to_string(),
            });
        }

        let reply = if is_query {
            &self.query_reply
        } else {
            &self.title_reply
        };
        utils::first_line(reply).ok_or_else(|| Error::Parse("empty reply".to_string()))
    }
}

/// In-memory catalog that records every call by name.
pub struct FakeCatalog {
    pub results: Vec<TrackRef>,
    pub fail_add: bool,
    pub fail_remove: bool,
    pub playlist_id: String,
    pub calls: Mutex<Vec<String>>,
    pub searched: Mutex<Vec<String>>,
    pub added: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_results(results: Vec<TrackRef>) -> Self {
        FakeCatalog {
            results,
            fail_add: false,
            fail_remove: false,
            playlist_id: "37i9dQZF1DX8Uebhn9wzrS".to_string(),
            calls: Mutex::new(Vec::new()),
            searched: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_tracks(&self, _token: &str, query: &str, limit: u32) -> Res<Vec<TrackRef>> {
        self.record("search");
        self.searched.lock().unwrap().push(query.to_string());
        Ok(self.results.iter().take(limit as usize).cloned().collect())
    }

    async fn current_user_id(&self, _token: &str) -> Res<String> {
        self.record("me");
        Ok("listener".to_string())
    }

    async fn create_playlist(
        &self,
        _token: &str,
        _user_id: &str,
        name: &str,
    ) -> Res<CreatePlaylistResponse> {
        self.record("create");
        Ok(CreatePlaylistResponse {
            id: self.playlist_id.clone(),
            name: name.to_string(),
            external_urls: ExternalUrls {
                spotify: format!("https://open.spotify.com/playlist/{}", self.playlist_id),
            },
        })
    }

    async fn add_tracks(&self, _token: &str, _playlist_id: &str, uris: &[String]) -> Res<()> {
        self.record("add");
        if self.fail_add {
            return Err(Error::Api {
                service: "Spotify",
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        self.added.lock().unwrap().extend(uris.iter().cloned());
        Ok(())
    }

    async fn remove_playlist(&self, _token: &str, _playlist_id: &str) -> Res<()> {
        self.record("remove");
        if self.fail_remove {
            return Err(Error::Api {
                service: "Spotify",
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

/// Token endpoint stand-in that counts exchanges.
pub struct FakeExchange {
    pub exchanges: AtomicUsize,
    pub reject: bool,
    pub token: Token,
}

impl FakeExchange {
    pub fn new() -> Self {
        FakeExchange {
            exchanges: AtomicUsize::new(0),
            reject: false,
            token: valid_token(),
        }
    }

    pub fn issuing(token: Token) -> Self {
        FakeExchange {
            token,
            ..Self::new()
        }
    }

    pub fn rejecting() -> Self {
        FakeExchange {
            reject: true,
            ..Self::new()
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for FakeExchange {
    fn authorize_url(&self, state: &str) -> Res<String> {
        Ok(format!(
            "https://accounts.spotify.test/authorize?client_id=test&state={}",
            state
        ))
    }

    async fn exchange_code(&self, code: &str) -> Res<Token> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(Error::Auth(format!("invalid_grant for code {}", code)));
        }
        Ok(Token {
            obtained_at: utils::now_timestamp(),
            ..self.token.clone()
        })
    }
}

pub fn state_param(url: &str) -> String {
    url.split("state=")
        .nth(1)
        .map(|rest| rest.split('&').next().unwrap_or_default().to_string())
        .expect("url carries a state parameter")
}

pub struct Harness {
    pub state: AppState,
    pub exchange: Arc<FakeExchange>,
    pub completion: Arc<FakeCompletion>,
    pub catalog: Arc<FakeCatalog>,
}

impl Harness {
    pub fn new(completion: FakeCompletion, catalog: FakeCatalog) -> Self {
        Self::with_exchange(FakeExchange::new(), completion, catalog)
    }

    pub fn with_exchange(
        exchange: FakeExchange,
        completion: FakeCompletion,
        catalog: FakeCatalog,
    ) -> Self {
        let exchange = Arc::new(exchange);
        let completion = Arc::new(completion);
        let catalog = Arc::new(catalog);
        let state = AppState::new(exchange.clone(), completion.clone(), catalog.clone());

        Harness {
            state,
            exchange,
            completion,
            catalog,
        }
    }

    pub fn chill() -> Self {
        Self::new(
            FakeCompletion::new("genre:chill genre:lo-fi", "Chill Study Vibes"),
            FakeCatalog::with_results(tracks(50)),
        )
    }
}
