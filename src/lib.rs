//! Lookup Coordinator: debounced, cached, cancellable lookups
//!
//! Turns bursty user input into a small, well-ordered stream of calls to slow,
//! rate-limited place autocomplete, geocoding and image search APIs, keeping
//! results fresh and bounded in memory.

pub mod cache;
pub mod config;
pub mod lookup;
pub mod network;
pub mod query;
pub mod results;
pub mod services;
pub mod sources;
pub mod store;

pub use config::Settings;
pub use lookup::{Lookup, LookupSession, SourceFetcher};
pub use services::LookupServices;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default quiet window before a session dispatches a query, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;
