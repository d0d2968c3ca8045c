//! REST API client module for Honeycomb.
//!
//! This module provides the `ApiClient` for fetching the team and dataset
//! list that back the local cache. Requests authenticate with a static API
//! key sent in the `X-Honeycomb-Team` header.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
