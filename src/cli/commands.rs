//! Subcommand handlers.

use std::path::Path;

use thiserror::Error;

use super::args::{ConfigAction, OverlayAction, OverlayFields};
use crate::api::{ApiClient, ApiError};
use crate::canvas;
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TOML};
use crate::console::{ConsoleObserver, ConsoleSession};
use crate::draft::{DraftError, DraftOverlay};
use crate::overlay::{Overlay, Position, Size};
use crate::player::{FfplayEngine, VideoPlayer};
use crate::store::Store;

/// Errors reported by subcommands. `main` prints them and exits non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("Failed to encode overlay: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file already exists: {0}")]
    ConfigExists(String),

    #[error("Error writing config file '{path}': {source}")]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build a store talking to the configured backend.
pub fn build_store(config: &Config) -> Result<Store, ApiError> {
    let api = ApiClient::with_timeouts(
        &config.api.base_url,
        config.api.timeout(),
        config.api.connect_timeout(),
    )?;
    log::debug!("Using backend {}", api.base_url());
    Ok(Store::new(api))
}

/// Turn command-line overlay fields into a validated overlay.
pub fn overlay_from_fields(fields: &OverlayFields) -> Result<Overlay, DraftError> {
    let mut draft = DraftOverlay {
        name: fields.name.clone(),
        kind: fields.kind,
        content: fields.content.clone(),
        position: Position {
            x: fields.x,
            y: fields.y,
        },
        size: Size {
            width: fields.width,
            height: fields.height,
        },
        ..DraftOverlay::default()
    };
    if let Some(color) = &fields.color {
        draft.set("color", color)?;
    }
    if let Some(font_size) = &fields.font_size {
        draft.set("fontSize", font_size)?;
    }
    if let Some(z_index) = fields.z_index {
        draft.style.z_index = z_index;
    }
    draft.build()
}

pub async fn show_status(store: &Store) -> Result<(), CliError> {
    let status = store.check_stream_status().await?;
    if status.is_active {
        println!("Stream: active");
        if let Some(url) = status.hls_url {
            println!("HLS URL: {}", url);
        }
    } else {
        println!("Stream: inactive");
    }
    Ok(())
}

pub async fn start_stream(store: &Store, rtsp_url: &str) -> Result<(), CliError> {
    let started = store.start_stream(rtsp_url).await?;
    if let Some(message) = &started.message {
        println!("{}", message);
    }
    println!("HLS URL: {}", started.hls_url);
    Ok(())
}

pub async fn stop_stream(store: &Store) -> Result<(), CliError> {
    store.stop_stream().await?;
    println!("Stream stopped.");
    Ok(())
}

/// Handle `overlays` subcommand actions.
pub async fn handle_overlay_action(store: &Store, action: OverlayAction) -> Result<(), CliError> {
    match action {
        OverlayAction::List => {
            let overlays = store.fetch_saved_overlays().await?;
            if overlays.is_empty() {
                println!("No saved overlays found.");
            }
            for overlay in &overlays {
                println!("{}", describe(overlay));
            }
        }
        OverlayAction::Get { id } => {
            let overlay = store.api().get_overlay(&id).await?;
            println!("{}", serde_json::to_string_pretty(&overlay)?);
        }
        OverlayAction::Add(fields) => {
            let overlay = overlay_from_fields(&fields)?;
            let saved = store.save_overlay(&overlay).await?;
            println!("Overlay saved successfully!");
            println!("{}", describe(&saved));
        }
        OverlayAction::Update { id, fields } => {
            let overlay = overlay_from_fields(&fields)?;
            let updated = store.update_overlay(&id, &overlay).await?;
            println!("Overlay updated.");
            println!("{}", describe(&updated));
        }
        OverlayAction::Delete { id } => {
            store.delete_overlay(&id).await?;
            println!("Overlay {} deleted.", id);
        }
    }
    Ok(())
}

/// Print saved overlays as canvas elements, or as an ffmpeg filter graph.
pub async fn render(store: &Store, filter: bool, width: u32, height: u32) -> Result<(), CliError> {
    let overlays = store.fetch_saved_overlays().await?;
    if filter {
        let graph = canvas::ffmpeg_filter(&overlays, width, height);
        if graph.is_empty() {
            eprintln!("No saved overlays to render.");
        } else {
            println!("{}", graph);
        }
        return Ok(());
    }
    for element in canvas::layout(&overlays) {
        println!("{}", element);
        println!("    style=\"{}\"", element.css());
    }
    Ok(())
}

/// Run the interactive console with an ffplay preview.
pub async fn run_console(store: Store, config: &Config) {
    let engine = FfplayEngine::new(config.player.program.clone())
        .with_low_latency(config.player.low_latency)
        .with_volume(config.player.volume);
    let mut player = VideoPlayer::with_observer(engine, Box::new(ConsoleObserver));
    if let Err(e) = player.set_volume(config.player.volume) {
        log::warn!("Failed to apply configured volume: {}", e);
    }
    ConsoleSession::new(store, player).run().await;
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    path: Option<&Path>,
) -> Result<(), CliError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  API base URL: {}", config.api.base_url);
            println!("  Request timeout: {}s", config.api.timeout_secs);
            println!("  Connect timeout: {}s", config.api.connect_timeout_secs);
            println!("  Player: {}", config.player.program);
            println!("  Volume: {}", config.player.volume);
            println!(
                "  Low latency: {}",
                if config.player.low_latency { "yes" } else { "no" }
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(CliError::ConfigExists(config_path.display().to_string()));
            }
            let write_error = |source| CliError::ConfigWrite {
                path: config_path.display().to_string(),
                source,
            };
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).map_err(write_error)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG_TOML).map_err(write_error)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

fn describe(overlay: &Overlay) -> String {
    format!(
        "{}  {} ({}) Position: ({}%, {}%) Size: {}% x {}% z={}",
        overlay.id.as_deref().unwrap_or("-"),
        overlay.name,
        overlay.kind,
        overlay.position.x,
        overlay.position.y,
        overlay.size.width,
        overlay.size.height,
        overlay.style.z_index
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayKind;

    fn fields() -> OverlayFields {
        OverlayFields {
            name: "Title".to_string(),
            kind: OverlayKind::Text,
            content: "Hello".to_string(),
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 10.0,
            color: None,
            font_size: None,
            z_index: None,
        }
    }

    #[test]
    fn test_overlay_from_fields() {
        let mut f = fields();
        f.color = Some("#FF0000".to_string());
        f.font_size = Some("48px".to_string());
        f.z_index = Some(4);

        let overlay = overlay_from_fields(&f).unwrap();
        assert_eq!(overlay.position.x, 10.0);
        assert_eq!(overlay.size.width, 30.0);
        assert_eq!(overlay.style.font_size, "48px");
        assert_eq!(overlay.style.z_index, 4);
        assert!(overlay.id.is_none());
    }

    #[test]
    fn test_overlay_from_fields_rejects_out_of_range() {
        let mut f = fields();
        f.x = 140.0;
        assert!(matches!(
            overlay_from_fields(&f),
            Err(DraftError::OutOfRange { .. })
        ));

        let mut f = fields();
        f.z_index = Some(11);
        assert!(overlay_from_fields(&f).is_err());
    }

    #[test]
    fn test_overlay_from_fields_rejects_bad_font_size() {
        let mut f = fields();
        f.font_size = Some("huge".to_string());
        assert!(matches!(
            overlay_from_fields(&f),
            Err(DraftError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_config_init_writes_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::default();

        handle_config_action(ConfigAction::Init, &config, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, DEFAULT_CONFIG_TOML);

        let err = handle_config_action(ConfigAction::Init, &config, Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::ConfigExists(_)));
    }

    #[test]
    fn test_build_store_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(
            build_store(&config),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }
}
