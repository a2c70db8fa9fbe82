use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tokio::sync::Mutex;

use crate::{
    Res,
    error::Error,
    management::TokenManager,
    spotify::auth::TokenExchange,
    types::Token,
    utils,
};

pub const SESSION_COOKIE: &str = "vibemaker_session";

const SESSION_ID_LEN: usize = 48;
const STATE_LEN: usize = 32;
const MAX_IDLE_SECS: u64 = 24 * 60 * 60;

/// Where the login of a session was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// A browser holding the session cookie.
    Browser,
    /// The `create` command, which has no cookie and waits on the store.
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated { last_error: Option<String> },
    Exchanging,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCompletion {
    pub session_id: String,
    pub origin: SessionOrigin,
}

#[derive(Debug)]
enum AuthState {
    Unauthenticated { last_error: Option<String> },
    Exchanging,
    Authenticated(TokenManager),
}

#[derive(Debug)]
struct Session {
    origin: SessionOrigin,
    auth: AuthState,
    pending_state: Option<String>,
    consumed_codes: HashSet<String>,
    last_seen: u64,
}

impl Session {
    fn new(origin: SessionOrigin) -> Self {
        Session {
            origin,
            auth: AuthState::Unauthenticated { last_error: None },
            pending_state: None,
            consumed_codes: HashSet::new(),
            last_seen: utils::now_timestamp(),
        }
    }

    fn touch(&mut self) {
        self.last_seen = utils::now_timestamp();
    }

    // Drops an expired credential so the session falls back to the login page.
    fn expire_if_needed(&mut self) {
        if let AuthState::Authenticated(manager) = &self.auth {
            if manager.is_expired() {
                self.auth = AuthState::Unauthenticated {
                    last_error: Some("Your Spotify login has expired.".to_string()),
                };
            }
        }
    }
}

/// Per-session authorization state, keyed by session id.
///
/// Each session walks `Unauthenticated -> Exchanging -> Authenticated`. A
/// credential belongs to exactly one session and is never handed to another.
/// The store lock is only held for in-memory transitions, never across the
/// token exchange request.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh unauthenticated session and returns its id.
    ///
    /// Sessions idle for more than a day are pruned on the way.
    pub async fn create(&self, origin: SessionOrigin) -> String {
        let mut sessions = self.inner.lock().await;
        let now = utils::now_timestamp();
        sessions.retain(|_, session| session.last_seen + MAX_IDLE_SECS > now);

        let id = utils::generate_random_string(SESSION_ID_LEN);
        sessions.insert(id.clone(), Session::new(origin));
        id
    }

    /// Returns the id of a known session, or creates a new one.
    ///
    /// The flag is `true` when a new session was created.
    pub async fn resolve(&self, id: Option<&str>, origin: SessionOrigin) -> (String, bool) {
        if let Some(id) = id {
            let mut sessions = self.inner.lock().await;
            if let Some(session) = sessions.get_mut(id) {
                session.touch();
                return (id.to_string(), false);
            }
        }

        (self.create(origin).await, true)
    }

    pub async fn status(&self, id: &str) -> SessionStatus {
        let mut sessions = self.inner.lock().await;
        let Some(session) = sessions.get_mut(id) else {
            return SessionStatus::Unauthenticated { last_error: None };
        };

        session.touch();
        session.expire_if_needed();
        match &session.auth {
            AuthState::Unauthenticated { last_error } => SessionStatus::Unauthenticated {
                last_error: last_error.clone(),
            },
            AuthState::Exchanging => SessionStatus::Exchanging,
            AuthState::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    /// Returns the session's credential if it is present and not expired.
    pub async fn credential(&self, id: &str) -> Option<Token> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(id)?;

        session.touch();
        session.expire_if_needed();
        match &session.auth {
            AuthState::Authenticated(manager) => manager.valid_token().cloned(),
            _ => None,
        }
    }

    /// Starts a login for the session and returns the consent page URL.
    ///
    /// A new random `state` is bound to the session; any earlier pending state
    /// of the same session stops being accepted.
    pub async fn begin_login(&self, id: &str, auth: &dyn TokenExchange) -> Res<String> {
        let state = utils::generate_random_string(STATE_LEN);
        let url = auth.authorize_url(&state)?;

        let mut sessions = self.inner.lock().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| Error::Auth("unknown session".to_string()))?;

        session.touch();
        session.pending_state = Some(state);
        if let AuthState::Unauthenticated { last_error } = &mut session.auth {
            *last_error = None;
        }

        Ok(url)
    }

    /// Finishes the login bound to `state` by exchanging `code`.
    ///
    /// The state and the code are consumed before the exchange is attempted,
    /// so replaying the callback URL (a reload, a re-render) never reaches the
    /// token endpoint twice with the same code.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Session id the callback request carries (its cookie).
    ///   A browser login only completes for the session that started it;
    ///   terminal logins carry no cookie and skip this check.
    /// * `state` - The `state` query parameter of the callback
    /// * `code` - The one-time authorization code
    /// * `auth` - Token endpoint used for the exchange
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] if the state is unknown or already used, the state
    ///   belongs to another browser session, or the code was already consumed
    ///   in this session
    /// - Any error of the exchange itself; the session then returns to
    ///   unauthenticated with the error recorded
    pub async fn complete_login(
        &self,
        session_id: Option<&str>,
        state: &str,
        code: &str,
        auth: &dyn TokenExchange,
    ) -> Res<LoginCompletion> {
        let completion = {
            let mut sessions = self.inner.lock().await;
            let (id, session) = sessions
                .iter_mut()
                .find(|(_, s)| s.pending_state.as_deref() == Some(state))
                .ok_or_else(|| {
                    Error::Auth("unknown or already used authorization state".to_string())
                })?;

            // A browser login must come back to the browser that started it.
            if session.origin == SessionOrigin::Browser && session_id != Some(id.as_str()) {
                return Err(Error::Auth(
                    "authorization state belongs to another session".to_string(),
                ));
            }

            session.touch();
            session.pending_state = None;
            if !session.consumed_codes.insert(code.to_string()) {
                return Err(Error::Auth(
                    "authorization code was already used".to_string(),
                ));
            }
            session.auth = AuthState::Exchanging;

            LoginCompletion {
                session_id: id.clone(),
                origin: session.origin,
            }
        };

        let result = auth.exchange_code(code).await;

        let mut sessions = self.inner.lock().await;
        let Some(session) = sessions.get_mut(&completion.session_id) else {
            return Err(Error::Auth("session ended during login".to_string()));
        };

        match result {
            Ok(token) => {
                session.auth = AuthState::Authenticated(TokenManager::new(token));
                Ok(completion)
            }
            Err(e) => {
                session.auth = AuthState::Unauthenticated {
                    last_error: Some(e.to_string()),
                };
                Err(e)
            }
        }
    }

    /// Records a login failure reported by the provider for the given state.
    pub async fn fail_login(&self, state: &str, reason: &str) -> Option<LoginCompletion> {
        let mut sessions = self.inner.lock().await;
        let (id, session) = sessions
            .iter_mut()
            .find(|(_, s)| s.pending_state.as_deref() == Some(state))?;

        session.pending_state = None;
        session.auth = AuthState::Unauthenticated {
            last_error: Some(reason.to_string()),
        };

        Some(LoginCompletion {
            session_id: id.clone(),
            origin: session.origin,
        })
    }

    /// Shows an error on the session's login page.
    ///
    /// An authenticated session is left untouched, so a stale callback cannot
    /// log the user out.
    pub async fn record_error(&self, id: &str, reason: &str) {
        let mut sessions = self.inner.lock().await;
        if let Some(session) = sessions.get_mut(id) {
            if let AuthState::Unauthenticated { last_error } = &mut session.auth {
                *last_error = Some(reason.to_string());
            }
        }
    }

    /// Forgets the session's credential and any pending login.
    pub async fn logout(&self, id: &str) {
        let mut sessions = self.inner.lock().await;
        if let Some(session) = sessions.get_mut(id) {
            session.pending_state = None;
            session.auth = AuthState::Unauthenticated { last_error: None };
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
