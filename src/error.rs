//! Crate-wide error type.
//!
//! Every fallible operation in vibemaker returns [`crate::Res`], which uses
//! [`Error`] as its error side. The variants follow the cause of a failure
//! rather than the library that raised it, so the surfaces can decide what to
//! show the user (login again, reword, or a generic failure with detail).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Authorization failed or no usable credential is available.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// Transport level failure while talking to a remote service.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote service answered with a non-success status code.
    #[error("{service} answered with {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Input rejected before any remote call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A response did not match the expected schema.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// The playlist was created but the tracks could not be added.
    #[error(
        "playlist '{title}' ({playlist_id}) was created but adding tracks failed: {source}; {}",
        cleanup_note(.cleaned_up)
    )]
    PartialPublish {
        playlist_id: String,
        title: String,
        cleaned_up: bool,
        #[source]
        source: Box<Error>,
    },

    /// The local HTTP server could not be started.
    #[error("server error: {0}")]
    Server(String),
}

fn cleanup_note(cleaned_up: &bool) -> &'static str {
    if *cleaned_up {
        "the empty playlist was removed again"
    } else {
        "the empty playlist is still in the library"
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Config(format!("invalid url: {}", e))
    }
}

impl Error {
    /// Whether the user has to log in again to recover from this error.
    pub fn requires_login(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}
