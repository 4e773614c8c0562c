//! VideoPlayer - attaches a streaming engine to a source and handles its errors.

use super::engine::{
    EngineError, EngineEvent, ErrorKind, NoopObserver, PlaybackFailure, PlaybackObserver,
    PlayerError, StreamingEngine,
};

/// Shown while a fatal network error is being recovered.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error - Unable to load stream";
/// Shown while a fatal media error is being recovered.
pub const MEDIA_ERROR_MESSAGE: &str = "Media error - Unable to play stream";
/// Shown for unrecoverable engine errors.
pub const FATAL_ERROR_MESSAGE: &str = "Fatal error - Unable to play stream";
/// Shown when the engine cannot play HLS at all.
pub const UNSUPPORTED_MESSAGE: &str = "HLS not supported on this system";
/// Shown when a source cannot be attached.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading stream";
/// Shown when resuming playback fails.
pub const PLAY_ERROR_MESSAGE: &str = "Unable to play video";

/// How many fatal errors in a row are retried before giving up.
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 3;

/// Lifecycle of the playback session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerStatus {
    /// No source attached.
    Idle,
    Loading,
    Ready,
    /// The source played to its end.
    Ended,
    /// Playback stopped on an unrecoverable error.
    Failed(String),
}

/// Player bound to one streaming engine.
///
/// Changing the source or dropping the player releases the engine session.
pub struct VideoPlayer<E: StreamingEngine> {
    engine: E,
    observer: Box<dyn PlaybackObserver + Send>,
    source: Option<String>,
    status: PlayerStatus,
    error: Option<String>,
    playing: bool,
    volume: f32,
    recovery_attempts: u32,
    max_recovery_attempts: u32,
}

impl<E: StreamingEngine> VideoPlayer<E> {
    pub fn new(engine: E) -> Self {
        Self::with_observer(engine, Box::new(NoopObserver))
    }

    pub fn with_observer(engine: E, observer: Box<dyn PlaybackObserver + Send>) -> Self {
        Self {
            engine,
            observer,
            source: None,
            status: PlayerStatus::Idle,
            error: None,
            playing: false,
            volume: 1.0,
            recovery_attempts: 0,
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
        }
    }

    pub fn set_max_recovery_attempts(&mut self, attempts: u32) {
        self.max_recovery_attempts = attempts;
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn status(&self) -> &PlayerStatus {
        &self.status
    }

    /// Message for the most recent playback problem, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Point the player at a new source, or detach with `None`.
    ///
    /// The previous session is always released first. Setting the source it
    /// already has is a no-op.
    pub fn set_source(&mut self, source: Option<&str>) -> Result<(), PlayerError> {
        if self.source.as_deref() == source {
            return Ok(());
        }

        self.release();

        let Some(source) = source else {
            return Ok(());
        };
        self.source = Some(source.to_string());

        if !self.engine.is_supported() {
            let failure = PlaybackFailure {
                message: UNSUPPORTED_MESSAGE.to_string(),
                cause: None,
            };
            self.fail(failure);
            return Err(PlayerError::Unsupported(UNSUPPORTED_MESSAGE.to_string()));
        }

        self.status = PlayerStatus::Loading;
        if let Err(e) = self.engine.attach(source) {
            log::error!("Failed to attach {}: {}", source, e);
            self.fail(PlaybackFailure {
                message: LOAD_ERROR_MESSAGE.to_string(),
                cause: None,
            });
            return Err(e);
        }

        log::info!("Attached playback source {}", source);
        Ok(())
    }

    /// Drain pending engine events.
    pub fn poll(&mut self) {
        while let Some(event) = self.engine.poll_event() {
            self.handle_event(event);
        }
    }

    /// Apply a single engine event.
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::ManifestParsed => {
                self.status = PlayerStatus::Ready;
                self.error = None;
                self.recovery_attempts = 0;
                self.observer.on_ready();
            }
            EngineEvent::Playing => self.playing = true,
            EngineEvent::Paused => self.playing = false,
            EngineEvent::Ended => {
                log::info!("Playback ended");
                self.playing = false;
                self.status = PlayerStatus::Ended;
            }
            EngineEvent::Error(error) if !error.fatal => {
                log::debug!("Recoverable playback error: {:?}", error);
                self.observer.on_recoverable_error(&error);
            }
            EngineEvent::Error(error) => self.handle_fatal(error),
        }
    }

    fn handle_fatal(&mut self, error: EngineError) {
        log::warn!("Fatal playback error ({:?}): {}", error.kind, error.detail);

        let message = match error.kind {
            ErrorKind::Network => NETWORK_ERROR_MESSAGE,
            ErrorKind::Media => MEDIA_ERROR_MESSAGE,
            ErrorKind::Other => FATAL_ERROR_MESSAGE,
        };
        self.error = Some(message.to_string());

        let can_recover = error.kind != ErrorKind::Other
            && self.recovery_attempts < self.max_recovery_attempts;
        if !can_recover {
            self.fail(PlaybackFailure {
                message: message.to_string(),
                cause: Some(error),
            });
            return;
        }

        self.recovery_attempts += 1;
        let recovered = match error.kind {
            ErrorKind::Network => self.engine.start_load(),
            _ => self.engine.recover_media_error(),
        };

        match recovered {
            Ok(()) => {
                log::info!(
                    "Recovering from {:?} error (attempt {}/{})",
                    error.kind,
                    self.recovery_attempts,
                    self.max_recovery_attempts
                );
                self.status = PlayerStatus::Loading;
                self.observer.on_recoverable_error(&error);
            }
            Err(e) => {
                log::error!("Recovery failed: {}", e);
                self.fail(PlaybackFailure {
                    message: message.to_string(),
                    cause: Some(error),
                });
            }
        }
    }

    fn fail(&mut self, failure: PlaybackFailure) {
        self.engine.release();
        self.playing = false;
        self.error = Some(failure.message.clone());
        self.status = PlayerStatus::Failed(failure.message.clone());
        self.observer.on_fatal_error(&failure);
    }

    pub fn play(&mut self) -> Result<(), PlayerError> {
        self.ensure_attached()?;
        if let Err(e) = self.engine.set_paused(false) {
            log::error!("Error playing video: {}", e);
            self.error = Some(PLAY_ERROR_MESSAGE.to_string());
            return Err(e);
        }
        self.playing = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlayerError> {
        self.ensure_attached()?;
        self.engine.set_paused(true)?;
        self.playing = false;
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<(), PlayerError> {
        if self.playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Set output volume, clamped to 0.0-1.0.
    pub fn set_volume(&mut self, volume: f32) -> Result<(), PlayerError> {
        let volume = if volume.is_nan() { 1.0 } else { volume.clamp(0.0, 1.0) };
        self.volume = volume;
        self.engine.set_volume(volume)
    }

    /// Release the engine session and forget the source.
    pub fn release(&mut self) {
        if self.source.take().is_some() {
            log::debug!("Releasing playback session");
            self.engine.release();
        }
        self.status = PlayerStatus::Idle;
        self.error = None;
        self.playing = false;
        self.recovery_attempts = 0;
    }

    fn ensure_attached(&self) -> Result<(), PlayerError> {
        match (&self.source, &self.status) {
            (Some(_), PlayerStatus::Loading | PlayerStatus::Ready) => Ok(()),
            _ => Err(PlayerError::NotAttached),
        }
    }
}

impl<E: StreamingEngine> Drop for VideoPlayer<E> {
    fn drop(&mut self) {
        self.release();
    }
}
