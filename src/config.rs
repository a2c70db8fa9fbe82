//! Configuration management for vibemaker.
//!
//! Values come from environment variables, optionally seeded from `.env` files.
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/vibemaker/.env`)
//! 4. Application defaults (where applicable)
//!
//! Required values are not checked at startup. A missing value surfaces as
//! [`Error::Config`] the first time a client that needs it is used.

use std::{env, path::PathBuf};

use crate::{Res, error::Error};

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_SPOTIFY_SCOPE: &str =
    "user-library-read playlist-modify-public playlist-modify-private";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Loads environment variables from `.env` files.
///
/// Creates `<data_local_dir>/vibemaker/` if needed, then loads the `.env` file
/// from the working directory and the one from the data directory. Variables
/// already set in the environment are never overwritten, and missing files are
/// not an error since the environment alone may carry the configuration.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    for candidate in [PathBuf::from(".env"), path] {
        if !candidate.is_file() {
            continue;
        }
        dotenv::from_path(&candidate)
            .map_err(|e| format!("{}: {}", candidate.display(), e))?;
    }

    Ok(())
}

/// Location of the `.env` file in the local data directory.
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("vibemaker/.env");
    path
}

fn required(key: &str) -> Res<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::Config(format!("{} must be set", key))),
    }
}

fn with_default(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Required variables that are currently unset or empty.
pub fn missing_required() -> Vec<&'static str> {
    [
        "OPENAI_API_KEY",
        "SPOTIFY_API_AUTH_CLIENT_ID",
        "SPOTIFY_API_AUTH_CLIENT_SECRET",
        "SPOTIFY_API_REDIRECT_URI",
    ]
    .into_iter()
    .filter(|key| required(key).is_err())
    .collect()
}

/// Address the local HTTP server binds to, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> String {
    with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// API key for the chat completion service (`OPENAI_API_KEY`).
pub fn openai_api_key() -> Res<String> {
    required("OPENAI_API_KEY")
}

/// Base URL of the chat completion service, without trailing slash.
pub fn openai_api_url() -> String {
    with_default("OPENAI_API_URL", DEFAULT_OPENAI_API_URL)
        .trim_end_matches('/')
        .to_string()
}

pub fn openai_model() -> String {
    with_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL)
}

/// Spotify application client id (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Spotify application client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// Keep it out of logs and version control.
pub fn spotify_client_secret() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Redirect URI registered with the Spotify application, e.g.
/// `http://127.0.0.1:8888/callback`.
pub fn spotify_redirect_uri() -> Res<String> {
    required("SPOTIFY_API_REDIRECT_URI")
}

pub fn spotify_scope() -> String {
    with_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SPOTIFY_SCOPE)
}

/// Spotify consent page, e.g. `https://accounts.spotify.com/authorize`.
pub fn spotify_apiauth_url() -> String {
    with_default("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL)
}

/// Spotify token endpoint, e.g. `https://accounts.spotify.com/api/token`.
pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL)
}

/// Spotify Web API base URL, without trailing slash.
pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
        .trim_end_matches('/')
        .to_string()
}
