//! Capability interface between the video player and a streaming engine.

use thiserror::Error;

/// Error taxonomy reported by a streaming engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Playlist or segment fetch failed.
    Network,
    /// Decoding failed.
    Media,
    Other,
}

/// An error raised by the engine during playback.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineError {
    pub kind: ErrorKind,
    /// Fatal errors stop playback unless recovered; non-fatal ones are
    /// handled inside the engine.
    pub fatal: bool,
    pub detail: String,
}

impl EngineError {
    pub fn fatal(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            fatal: true,
            detail: detail.into(),
        }
    }

    pub fn recoverable(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            fatal: false,
            detail: detail.into(),
        }
    }
}

/// Events an engine emits while a source is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The playlist was read and playback can start.
    ManifestParsed,
    Playing,
    Paused,
    Error(EngineError),
    /// The source finished cleanly.
    Ended,
}

/// An adaptive-streaming engine bound to one playback surface.
///
/// `attach` starts a session for a source and `release` frees everything the
/// session holds. Engines report progress through [`poll_event`], which the
/// player drains.
///
/// [`poll_event`]: StreamingEngine::poll_event
pub trait StreamingEngine {
    /// Whether this engine can play HLS on the current system.
    fn is_supported(&self) -> bool;

    fn attach(&mut self, source: &str) -> Result<(), PlayerError>;

    fn release(&mut self);

    /// Restart loading the attached source after a network failure.
    fn start_load(&mut self) -> Result<(), PlayerError>;

    /// Reset the decoder after a media failure.
    fn recover_media_error(&mut self) -> Result<(), PlayerError>;

    fn set_paused(&mut self, paused: bool) -> Result<(), PlayerError>;

    /// `volume` is already clamped to 0.0-1.0.
    fn set_volume(&mut self, volume: f32) -> Result<(), PlayerError>;

    fn poll_event(&mut self) -> Option<EngineEvent>;
}

/// A playback failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackFailure {
    pub message: String,
    /// The engine error that caused it, when there was one.
    pub cause: Option<EngineError>,
}

/// Callbacks the player invokes as playback progresses.
pub trait PlaybackObserver {
    fn on_ready(&mut self) {}

    /// A fatal engine error is being recovered from, or a non-fatal one was
    /// reported.
    fn on_recoverable_error(&mut self, _error: &EngineError) {}

    /// Playback stopped and will not resume without a new source.
    fn on_fatal_error(&mut self, _failure: &PlaybackFailure) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl PlaybackObserver for NoopObserver {}

/// Errors returned by player and engine operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("{0}")]
    Unsupported(String),

    #[error("Playback engine not found: {0}")]
    EngineNotFound(String),

    #[error("Failed to spawn playback engine: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("No stream loaded")]
    NotAttached,

    #[error("Playback control failed: {0}")]
    Control(String),
}
