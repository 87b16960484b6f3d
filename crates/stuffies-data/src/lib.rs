//! HTTP access to the Stuffies catalog and order API.
//!
//! This crate provides:
//! - `HttpTransport` - The seam requests go through (Spin outbound HTTP on `wasm32`, `reqwest` elsewhere)
//! - `ApiClient` - Base URL, bearer token from the stored session, opt-in GET retries
//! - `RetryPolicy` - Retry strategies
//! - `HttpCatalog` / `HttpOrders` - The commerce collaborators over HTTP

mod catalog;
mod client;
mod error;
mod orders;
mod retry;
mod transport;

pub use catalog::*;
pub use client::*;
pub use error::*;
pub use orders::*;
pub use retry::*;
pub use transport::*;
