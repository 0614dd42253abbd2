//! # Download Pipeline
//!
//! Everything between "the user picked a song" and "a file is attached to the
//! conversation":
//!
//! ```text
//! SongRecord.play_url
//!          ↓
//! guard   (protocol + host policy, no I/O)
//!          ↓
//! fetch   (streaming GET, size cap, prefixed temp file)
//!          ↓
//! player  (progress / attachment / failure events, delayed cleanup)
//! ```
//!
//! Temp files are always named with [`crate::utils::TEMP_FILE_PREFIX`] so the
//! janitor can find orphans without knowing which downloads produced them.

mod fetch;
mod guard;
mod player;

pub use fetch::Fetcher;
pub use guard::UrlPolicy;
pub use player::Player;
