//! Video player adapter.
//!
//! The player drives an external streaming engine through the
//! [`StreamingEngine`] trait: it attaches a source, drains engine events,
//! classifies errors into recoverable and terminal, and releases the session
//! when the source changes or the player is dropped.

mod engine;
mod ffplay;
mod video_player;

pub use engine::{
    EngineError, EngineEvent, ErrorKind, NoopObserver, PlaybackFailure, PlaybackObserver,
    PlayerError, StreamingEngine,
};
pub use ffplay::{find_program, FfplayEngine, DEFAULT_PLAYER_PROGRAM};
pub use video_player::{
    PlayerStatus, VideoPlayer, DEFAULT_MAX_RECOVERY_ATTEMPTS, FATAL_ERROR_MESSAGE,
    LOAD_ERROR_MESSAGE, MEDIA_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE, PLAY_ERROR_MESSAGE,
    UNSUPPORTED_MESSAGE,
};
