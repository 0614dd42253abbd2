//! # Meting Catalog Integration
//!
//! The catalog is an opaque HTTP JSON endpoint in the style of the Meting API:
//! one URL, a `server` parameter naming the streaming service and a `type`
//! parameter choosing between keyword search and single-song lookup.
//!
//! - [`search`] holds [`CatalogClient`], which builds those requests and
//!   normalises the loosely shaped JSON into [`crate::types::SongRecord`]s.
//! - [`links`] holds [`LinkRecognizer`], which maps a pasted song URL to the
//!   `(source, id)` pair a lookup needs.
//!
//! Catalog calls sit on a user-facing path, so they use a short timeout
//! (`api_timeout_secs`) independent of the long download timeout.

pub mod links;
pub mod search;

pub use links::LinkRecognizer;
pub use search::CatalogClient;
