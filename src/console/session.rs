//! Interactive console session.
//!
//! Reads commands from stdin on a background thread and applies them to the
//! store, the controls panel and the preview player. The player follows the
//! stream URL in state: whenever it changes the player is re-pointed.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;

use super::command::{parse_input, ConsoleCommand, HELP_TEXT};
use crate::canvas;
use crate::panel::ControlsPanel;
use crate::player::{
    EngineError, PlaybackFailure, PlaybackObserver, PlayerStatus, StreamingEngine, VideoPlayer,
};
use crate::store::Store;

/// How often the preview player is polled for engine events.
pub const PLAYER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Keep going, printing the given text (may be empty).
    Continue(String),
    Quit,
}

/// Prints playback notifications as they happen.
pub struct ConsoleObserver;

impl PlaybackObserver for ConsoleObserver {
    fn on_ready(&mut self) {
        print_status("Preview ready");
    }

    fn on_recoverable_error(&mut self, error: &EngineError) {
        print_status(&format!("Preview hiccup ({:?}), retrying...", error.kind));
    }

    fn on_fatal_error(&mut self, failure: &PlaybackFailure) {
        print_status(&format!("Error: {}", failure.message));
    }
}

/// One console session over a store, a panel and a preview player.
pub struct ConsoleSession<E: StreamingEngine> {
    store: Store,
    panel: ControlsPanel,
    player: VideoPlayer<E>,
}

impl<E: StreamingEngine> ConsoleSession<E> {
    pub fn new(store: Store, player: VideoPlayer<E>) -> Self {
        Self {
            store,
            panel: ControlsPanel::new(),
            player,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn panel(&self) -> &ControlsPanel {
        &self.panel
    }

    pub fn player(&self) -> &VideoPlayer<E> {
        &self.player
    }

    /// Re-point the player when the stream URL in state has changed.
    ///
    /// Returns a message when attaching failed.
    pub fn sync_player(&mut self) -> Option<String> {
        let url = self.store.state().stream_url;
        if self.player.source() == url.as_deref() {
            return None;
        }
        match self.player.set_source(url.as_deref()) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("Preview unavailable: {}", e);
                Some(format!(
                    "Error: {}",
                    self.player.error().unwrap_or("Error loading stream")
                ))
            }
        }
    }

    /// Drain pending player events.
    pub fn poll_player(&mut self) {
        self.player.poll();
    }

    /// Apply one command and report what to print.
    pub async fn execute(&mut self, command: ConsoleCommand) -> Step {
        let output = match command {
            ConsoleCommand::Quit => return Step::Quit,
            ConsoleCommand::Help => HELP_TEXT.to_string(),
            ConsoleCommand::SelectTab(tab) => {
                self.panel.select_tab(tab);
                self.render()
            }
            ConsoleCommand::Show => self.render(),
            ConsoleCommand::Set { field, value } => match self.panel.edit(&field, &value) {
                Ok(()) => self.render(),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Content(text) => match self.panel.edit("content", &text) {
                Ok(()) => format!("{}: {}", self.panel.draft().content_label(), text),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Add => match self.panel.submit(&self.store) {
                Ok(overlay) => format!("Added overlay '{}'", overlay.name),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Save => match self.panel.save_current(&self.store).await {
                Ok(saved) => format!("Overlay '{}' saved successfully!", saved.name),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Load(index) => match self.panel.load_saved(&self.store, index) {
                Ok(overlay) => format!("Loaded overlay '{}'", overlay.name),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Delete(index) => {
                match self.panel.delete_saved(&self.store, index).await {
                    Ok(overlay) => format!("Deleted overlay '{}'", overlay.name),
                    Err(e) => format!("Error: {}", e),
                }
            }
            ConsoleCommand::Remove(index) => match self.panel.remove_current(&self.store, index) {
                Ok(overlay) => format!("Removed overlay '{}'", overlay.name),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Clear => {
                self.panel.clear(&self.store);
                "Cleared current overlays".to_string()
            }
            ConsoleCommand::Start(rtsp_url) => match self.store.start_stream(&rtsp_url).await {
                Ok(started) => {
                    // A restarted stream reuses the playlist URL, so a finished
                    // preview has to be dropped before it can re-attach.
                    if matches!(
                        self.player.status(),
                        PlayerStatus::Failed(_) | PlayerStatus::Ended
                    ) {
                        self.player.release();
                    }
                    format!("Stream started: {}", started.hls_url)
                }
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Stop => match self.store.stop_stream().await {
                Ok(()) => "Stream stopped".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Status => match self.store.check_stream_status().await {
                Ok(status) if status.is_active => format!(
                    "Stream active: {}",
                    status.hls_url.as_deref().unwrap_or("(no url)")
                ),
                Ok(_) => "Stream inactive".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Refresh => match self.store.fetch_saved_overlays().await {
                Ok(overlays) => format!("{} saved overlays", overlays.len()),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Play => match self.player.play() {
                Ok(()) => "Playing".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Pause => match self.player.pause() {
                Ok(()) => "Paused".to_string(),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Volume(volume) => match self.player.set_volume(volume) {
                Ok(()) => format!("Volume set to {}%", (self.player.volume() * 100.0).round()),
                Err(e) => format!("Error: {}", e),
            },
            ConsoleCommand::Canvas => self.render_canvas(),
            ConsoleCommand::Click { x, y } => {
                let state = self.store.state();
                match canvas::hit_test(&state.overlays, x, y) {
                    Some(index) => {
                        format!("Selected overlay {}: {}", index, state.overlays[index].name)
                    }
                    None => format!("No overlay at ({}%, {}%)", x, y),
                }
            }
        };

        match self.sync_player() {
            Some(message) if output.is_empty() => Step::Continue(message),
            Some(message) => Step::Continue(format!("{}\n{}", output, message)),
            None => Step::Continue(output),
        }
    }

    /// Panel plus a one-line stream/preview summary.
    pub fn render(&self) -> String {
        let state = self.store.state();
        let mut out = self.panel.render(&state);
        let stream = match (&state.stream_url, state.is_stream_active) {
            (Some(url), true) => format!("Stream: active ({})", url),
            (None, true) => "Stream: active".to_string(),
            _ => "Stream: inactive".to_string(),
        };
        out.push_str(&stream);
        out.push_str(&format!("  Preview: {}", describe_status(self.player.status())));
        out
    }

    fn render_canvas(&self) -> String {
        let state = self.store.state();
        let elements = canvas::layout(&state.overlays);
        if elements.is_empty() {
            return "No current overlays".to_string();
        }
        elements
            .iter()
            .map(|element| element.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run until `/quit`, end of input or Ctrl+C.
    pub async fn run(mut self) {
        self.store.initialize().await;
        if let Some(message) = self.sync_player() {
            print_status(&message);
        }
        print_status(&self.render());
        print_status("Type /help for commands.");

        let mut lines = spawn_stdin_reader();
        let mut ticker = tokio::time::interval(PLAYER_POLL_INTERVAL);

        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else {
                        log::debug!("stdin closed");
                        break;
                    };
                    match parse_input(&line) {
                        Ok(Some(command)) => match self.execute(command).await {
                            Step::Quit => break,
                            Step::Continue(output) if !output.is_empty() => print_status(&output),
                            Step::Continue(_) => {}
                        },
                        Ok(None) => {}
                        Err(usage) => print_status(&usage),
                    }
                    print_prompt();
                }
                _ = ticker.tick() => self.poll_player(),
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    log::info!("Interrupted");
                    break;
                }
            }
        }

        self.player.release();
    }
}

fn describe_status(status: &PlayerStatus) -> String {
    match status {
        PlayerStatus::Idle => "idle".to_string(),
        PlayerStatus::Loading => "loading".to_string(),
        PlayerStatus::Ready => "ready".to_string(),
        PlayerStatus::Ended => "ended".to_string(),
        PlayerStatus::Failed(message) => format!("failed ({})", message),
    }
}

/// Forward stdin lines to the async loop. The thread ends at EOF or when the
/// receiver is dropped.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        print_prompt();
        for line in io::stdin().lock().lines() {
            match line {
                Ok(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

pub fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn print_status(message: &str) {
    println!("{}", message);
}
