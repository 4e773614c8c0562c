//! FfplayEngine - plays HLS through an `ffplay` child process.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::engine::{EngineError, EngineEvent, ErrorKind, PlayerError, StreamingEngine};

/// Default player executable.
pub const DEFAULT_PLAYER_PROGRAM: &str = "ffplay";

/// Streaming engine backed by `ffplay`.
///
/// One process per attached source. The process is ready once ffplay has
/// printed the input description for the opened playlist; an exit before
/// that is a network failure (the playlist could not be loaded), an exit
/// afterwards a media failure.
pub struct FfplayEngine {
    program: String,
    low_latency: bool,
    volume: f32,
    child: Option<Child>,
    stderr_thread: Option<JoinHandle<()>>,
    source: Option<String>,
    input_opened: Arc<AtomicBool>,
    announced: bool,
    events: VecDeque<EngineEvent>,
}

impl FfplayEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            low_latency: true,
            volume: 1.0,
            child: None,
            stderr_thread: None,
            source: None,
            input_opened: Arc::new(AtomicBool::new(false)),
            announced: false,
            events: VecDeque::new(),
        }
    }

    pub fn with_low_latency(mut self, low_latency: bool) -> Self {
        self.low_latency = low_latency;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for playing `source`.
    pub fn build_args(&self, source: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-nostats".into(),
            "-loglevel".into(),
            "info".into(),
            "-volume".into(),
            format!("{}", (self.volume * 100.0).round() as u32),
        ];
        if self.low_latency {
            args.extend(
                ["-fflags", "nobuffer", "-flags", "low_delay", "-framedrop"]
                    .iter()
                    .map(|s| s.to_string()),
            );
        }
        args.extend([
            "-window_title".to_string(),
            "stream-overlay preview".to_string(),
            source.to_string(),
        ]);
        args
    }

    fn spawn(&mut self, source: &str) -> Result<(), PlayerError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(source))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::EngineNotFound(self.program.clone())
            } else {
                PlayerError::SpawnFailed(e)
            }
        })?;

        let input_opened = Arc::new(AtomicBool::new(false));
        self.input_opened = Arc::clone(&input_opened);
        self.stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines() {
                    match line {
                        Ok(l) => {
                            if is_input_banner(&l) {
                                input_opened.store(true, Ordering::SeqCst);
                            }
                            log::debug!("[ffplay] {}", l);
                        }
                        Err(_) => break,
                    }
                }
            })
        });

        log::debug!("Spawned {} (pid {}) for {}", self.program, child.id(), source);
        self.child = Some(child);
        self.announced = false;
        Ok(())
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            // SIGKILL also terminates a SIGSTOPped process.
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_thread.take() {
            let _ = handle.join();
        }
    }

    fn restart(&mut self) -> Result<(), PlayerError> {
        let source = self.source.clone().ok_or(PlayerError::NotAttached)?;
        self.stop_child();
        self.spawn(&source)
    }

    #[cfg(unix)]
    fn signal(&self, signal: libc::c_int) -> Result<(), PlayerError> {
        let child = self.child.as_ref().ok_or(PlayerError::NotAttached)?;
        let result = unsafe { libc::kill(child.id() as libc::pid_t, signal) };
        if result == 0 {
            Ok(())
        } else {
            Err(PlayerError::Control(
                std::io::Error::last_os_error().to_string(),
            ))
        }
    }
}

impl StreamingEngine for FfplayEngine {
    fn is_supported(&self) -> bool {
        find_program(&self.program).is_some()
    }

    fn attach(&mut self, source: &str) -> Result<(), PlayerError> {
        self.release();
        self.spawn(source)?;
        self.source = Some(source.to_string());
        Ok(())
    }

    fn release(&mut self) {
        self.stop_child();
        self.source = None;
        self.announced = false;
        self.events.clear();
    }

    fn start_load(&mut self) -> Result<(), PlayerError> {
        self.restart()
    }

    /// ffplay has no decoder reset; a fresh process is the closest equivalent.
    fn recover_media_error(&mut self) -> Result<(), PlayerError> {
        self.restart()
    }

    #[cfg(unix)]
    fn set_paused(&mut self, paused: bool) -> Result<(), PlayerError> {
        self.signal(if paused { libc::SIGSTOP } else { libc::SIGCONT })?;
        self.events.push_back(if paused {
            EngineEvent::Paused
        } else {
            EngineEvent::Playing
        });
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_paused(&mut self, _paused: bool) -> Result<(), PlayerError> {
        Err(PlayerError::Control(
            "pause is not supported on this platform".to_string(),
        ))
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), PlayerError> {
        self.volume = volume.clamp(0.0, 1.0);
        if self.child.is_some() {
            log::info!("Volume {:.1} applies from the next reload", self.volume);
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        if let Some(event) = self.events.pop_front() {
            return Some(event);
        }

        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(None) => {
                if self.announced || !self.input_opened.load(Ordering::SeqCst) {
                    None
                } else {
                    self.announced = true;
                    self.events.push_back(EngineEvent::Playing);
                    Some(EngineEvent::ManifestParsed)
                }
            }
            Ok(Some(status)) => {
                self.stop_child();
                // The stderr reader has been joined, so the flag is final.
                let was_ready = self.announced || self.input_opened.load(Ordering::SeqCst);
                if status.success() {
                    Some(EngineEvent::Ended)
                } else {
                    let kind = if was_ready {
                        ErrorKind::Media
                    } else {
                        ErrorKind::Network
                    };
                    Some(EngineEvent::Error(EngineError::fatal(
                        kind,
                        format!("{} exited with {}", self.program, status),
                    )))
                }
            }
            Err(e) => Some(EngineEvent::Error(EngineError::fatal(
                ErrorKind::Other,
                e.to_string(),
            ))),
        }
    }
}

impl Drop for FfplayEngine {
    fn drop(&mut self) {
        self.stop_child();
    }
}

/// ffplay prints `Input #0, hls, from '<url>':` once the playlist has been
/// opened and its streams identified.
fn is_input_banner(line: &str) -> bool {
    line.trim_start().starts_with("Input #")
}

/// Resolve `program` to an executable path, searching `PATH` for bare names.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}
