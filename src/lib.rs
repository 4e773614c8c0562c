//! stream-overlay library crate.
//!
//! Control surface for a livestream overlay backend: a REST client for
//! overlay CRUD and stream lifecycle, a state store, and the presentation
//! pieces (controls panel, overlay canvas, video player) built on top.

pub mod api;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod console;
pub mod draft;
pub mod overlay;
pub mod panel;
pub mod player;
pub mod store;
