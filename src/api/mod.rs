//! Backend REST client.
//!
//! Thin wrapper over the overlay CRUD and stream lifecycle endpoints. Errors
//! carry the backend's message, or a per-operation fallback, as display text.

mod client;

pub use client::{
    Acknowledgement, ApiClient, ApiError, Operation, StreamStarted, StreamStatus, API_URL_ENV,
    DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT,
};
