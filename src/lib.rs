//! Vibe Maker
//!
//! Turns a free-text description of a musical vibe into a public Spotify
//! playlist. A language model translates the prompt into a Spotify search
//! query, the search results become the playlist's tracks and a second model
//! call names it.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the web surface
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Crate-wide error type
//! - `management` - Per-session authorization state
//! - `openai` - Chat completion client, query translation and title generation
//! - `pipeline` - The prompt to playlist sequence
//! - `query` - Spotify search filter grammar
//! - `server` - HTTP server and shared application state
//! - `spotify` - Spotify accounts service and Web API client
//! - `types` - Data structures and wire schemas
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod openai;
pub mod pipeline;
pub mod query;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::Error;

/// Result type used throughout vibemaker.
///
/// # Example
///
/// ```
/// use vibemaker::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Error>;

/// Prints a status line with a blue `o` marker.
///
/// ```
/// info!("Query string sent to Spotify: {}", query);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a status line with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red error line to stderr and exits with status 1.
///
/// Only for fatal startup or command errors; request handlers report
/// failures to the user instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow warning line to stderr.
///
/// Used for failures that end one run or request but not the process, such
/// as a rejected login or a failed playlist run.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
