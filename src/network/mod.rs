//! HTTP networking module
//!
//! Provides HTTP client functionality for making requests to lookup providers.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{HttpRequest, HttpResponse};
