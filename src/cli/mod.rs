//! # CLI Module
//!
//! User-facing commands of vibemaker.
//!
//! - [`serve`] - Runs the web surface: login link, prompt form, playlist result
//! - [`create`] - Creates one playlist from the terminal. Logs in through the
//!   browser, keeps the credential in memory only, and shows a spinner per
//!   pipeline stage
//!
//! ## Usage
//!
//! ```bash
//! vibemaker serve                                   # http://127.0.0.1:8888
//! vibemaker create "I need some chill music to study to"
//! vibemaker create --show-tracks "songs for a rainy sunday"
//! ```
//!
//! Both commands read their configuration from the environment and `.env`
//! files; see [`crate::config`].

mod create;
mod progress;
mod serve;

pub use create::create;
pub use serve::serve;
