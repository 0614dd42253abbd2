//! # API Module
//!
//! HTTP surface for chat hosts that forward messages over a webhook instead
//! of embedding the library.
//!
//! ## Endpoints
//!
//! - [`messages`] - `POST /messages` with `{"conversation_id": "...", "text": "..."}`.
//!   Returns the outbound events for that message as a JSON array, or
//!   `204 No Content` when the message is not for the bot.
//! - [`health`] - `GET /health` with status, version and the number of
//!   pending search sessions.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::{get, post}};
//! use songpick::api::{health, messages};
//!
//! let app = Router::new()
//!     .route("/messages", post(messages))
//!     .route("/health", get(health))
//!     .layer(Extension(bot));
//! ```

mod health;
mod messages;

pub use health::health;
pub use messages::messages;
