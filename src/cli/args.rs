//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::overlay::{OverlayKind, Position, Size};

/// Control surface for a livestream overlay backend
#[derive(Parser, Debug)]
#[command(name = "stream-overlay")]
#[command(version, about = "Manage livestream overlays and stream lifecycle", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Backend API base URL (overrides config and STREAM_OVERLAY_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether the stream is active
    Status,
    /// Start converting an RTSP feed to HLS
    Start {
        /// RTSP source URL
        rtsp_url: String,
    },
    /// Stop the stream
    Stop,
    /// Manage saved overlays
    Overlays {
        #[command(subcommand)]
        action: OverlayAction,
    },
    /// Render saved overlays as canvas elements or an ffmpeg filter
    Render {
        /// Print an ffmpeg filter graph instead of element styles
        #[arg(long)]
        filter: bool,
        /// Frame width in pixels for --filter
        #[arg(long, default_value = "1920", value_parser = parse_dimension)]
        width: u32,
        /// Frame height in pixels for --filter
        #[arg(long, default_value = "1080", value_parser = parse_dimension)]
        height: u32,
    },
    /// Interactive controls panel with stream preview (default)
    Console,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum OverlayAction {
    /// List saved overlays
    List,
    /// Show one saved overlay as JSON
    Get { id: String },
    /// Save a new overlay
    Add(OverlayFields),
    /// Replace a saved overlay
    Update {
        id: String,
        #[command(flatten)]
        fields: OverlayFields,
    },
    /// Delete a saved overlay
    Delete { id: String },
}

/// Overlay properties accepted on the command line.
#[derive(ClapArgs, Debug, Clone)]
pub struct OverlayFields {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Overlay type
    #[arg(long = "type", default_value = "text", value_parser = parse_kind)]
    pub kind: OverlayKind,
    /// Text content or image URL
    #[arg(long)]
    pub content: String,
    /// Left edge, percent of frame width
    #[arg(long, default_value_t = Position::default().x)]
    pub x: f64,
    /// Top edge, percent of frame height
    #[arg(long, default_value_t = Position::default().y)]
    pub y: f64,
    /// Width, percent of frame width
    #[arg(long, default_value_t = Size::default().width)]
    pub width: f64,
    /// Height, percent of frame height
    #[arg(long, default_value_t = Size::default().height)]
    pub height: f64,
    /// Text color (#rrggbb)
    #[arg(long)]
    pub color: Option<String>,
    /// Font size (16px, 24px, 32px, 48px)
    #[arg(long)]
    pub font_size: Option<String>,
    /// Stacking order (1-10)
    #[arg(long)]
    pub z_index: Option<u8>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

fn parse_kind(s: &str) -> Result<OverlayKind, String> {
    OverlayKind::from_str(s).ok_or_else(|| format!("Unknown overlay type '{}'. Use text or image", s))
}

/// Parse and validate a frame dimension in pixels.
fn parse_dimension(s: &str) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if value == 0 || value > 7680 {
        return Err(format!("Dimension must be between 1 and 7680, got {}", value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["stream-overlay"]);
        assert!(args.command.is_none());
        assert!(args.api_url.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["stream-overlay", "--config", "/tmp/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));

        let args = Args::parse_from(["stream-overlay", "status", "-c", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_args_api_url_is_global() {
        let args = Args::parse_from(["stream-overlay", "stop", "--api-url", "http://backend/api"]);
        assert_eq!(args.api_url.as_deref(), Some("http://backend/api"));
        assert!(matches!(args.command, Some(Command::Stop)));
    }

    #[test]
    fn test_args_start_subcommand() {
        let args = Args::parse_from(["stream-overlay", "start", "rtsp://camera.local/live"]);
        match args.command {
            Some(Command::Start { rtsp_url }) => assert_eq!(rtsp_url, "rtsp://camera.local/live"),
            _ => panic!("Expected Start subcommand"),
        }
    }

    #[test]
    fn test_args_start_requires_url() {
        assert!(Args::try_parse_from(["stream-overlay", "start"]).is_err());
    }

    #[test]
    fn test_args_overlay_add_defaults() {
        let args = Args::parse_from([
            "stream-overlay",
            "overlays",
            "add",
            "--name",
            "Title",
            "--content",
            "Hello",
        ]);
        match args.command {
            Some(Command::Overlays {
                action: OverlayAction::Add(fields),
            }) => {
                assert_eq!(fields.kind, OverlayKind::Text);
                assert_eq!(fields.x, 50.0);
                assert_eq!(fields.y, 50.0);
                assert_eq!(fields.width, 20.0);
                assert_eq!(fields.height, 10.0);
                assert!(fields.color.is_none());
            }
            _ => panic!("Expected Overlays Add subcommand"),
        }
    }

    #[test]
    fn test_args_overlay_update() {
        let args = Args::parse_from([
            "stream-overlay",
            "overlays",
            "update",
            "abc123",
            "--name",
            "Logo",
            "--type",
            "image",
            "--content",
            "https://example.com/logo.png",
            "--z-index",
            "5",
        ]);
        match args.command {
            Some(Command::Overlays {
                action: OverlayAction::Update { id, fields },
            }) => {
                assert_eq!(id, "abc123");
                assert_eq!(fields.kind, OverlayKind::Image);
                assert_eq!(fields.z_index, Some(5));
            }
            _ => panic!("Expected Overlays Update subcommand"),
        }
    }

    #[test]
    fn test_args_overlay_bad_type() {
        let result = Args::try_parse_from([
            "stream-overlay",
            "overlays",
            "add",
            "--name",
            "x",
            "--content",
            "y",
            "--type",
            "video",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_render_filter() {
        let args = Args::parse_from(["stream-overlay", "render", "--filter", "--width", "1280"]);
        match args.command {
            Some(Command::Render {
                filter,
                width,
                height,
            }) => {
                assert!(filter);
                assert_eq!(width, 1280);
                assert_eq!(height, 1080);
            }
            _ => panic!("Expected Render subcommand"),
        }
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("720"), Ok(720));
        assert!(parse_dimension("0").is_err());
        assert!(parse_dimension("8000").is_err());
        assert!(parse_dimension("wide").is_err());
    }

    #[test]
    fn test_args_config_init_subcommand() {
        let args = Args::parse_from(["stream-overlay", "config", "init"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Init,
            }) => (),
            _ => panic!("Expected Config Init subcommand"),
        }
    }
}
