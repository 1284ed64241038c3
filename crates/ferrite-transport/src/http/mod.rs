//! HTTP transport.
//!
//! A thin JSON client used for request/response API calls.

mod client;
pub use client::{HttpClient, HttpResponse};
