//! Application state store.
//!
//! A single [`AppState`] lives behind a [`Store`]. The store is the only
//! writer: every change goes through [`reduce`], and observers read
//! snapshots through a `watch` channel.

mod action;
mod app_store;
mod state;

pub use action::{reduce, Action};
pub use state::AppState;
pub use app_store::Store;
