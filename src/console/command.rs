//! Console command parsing.

use crate::panel::Tab;

/// Commands accepted by the interactive console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    SelectTab(Tab),
    /// Edit a draft field: `/set <field> <value>`.
    Set { field: String, value: String },
    /// Plain text sets the draft content.
    Content(String),
    Add,
    Save,
    Load(usize),
    Delete(usize),
    Remove(usize),
    Clear,
    Start(String),
    Stop,
    Status,
    Refresh,
    Play,
    Pause,
    Volume(f32),
    Show,
    Canvas,
    /// Click on the canvas at a point in percent of the frame.
    Click { x: f64, y: f64 },
    Help,
    Quit,
}

/// One line per command, shown by `/help`.
pub const HELP_TEXT: &str = "\
Commands:
  /tab add|saved|current   switch panel tab
  /set <field> <value>     edit draft (name, type, content, x, y, width, height, color, fontSize, zIndex)
  <text>                   set draft content
  /add                     add draft to current overlays
  /save                    save the most recent overlay
  /load <n>                load saved overlay n
  /delete <n>              delete saved overlay n
  /remove <n>              remove current overlay n
  /clear                   remove all current overlays
  /start <rtsp-url>        start the stream
  /stop                    stop the stream
  /status                  query stream status
  /refresh                 re-fetch saved overlays
  /play, /pause            control preview playback
  /volume <0.0-1.0>        set preview volume
  /click <x> <y>           select the overlay under a point (percent)
  /show                    render the panel
  /canvas                  render current overlays
  /quit                    exit";

/// Parse a line of console input.
///
/// Returns `Ok(None)` for blank input and `Err` with a usage message for
/// malformed commands.
pub fn parse_input(input: &str) -> Result<Option<ConsoleCommand>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !trimmed.starts_with('/') {
        return Ok(Some(ConsoleCommand::Content(trimmed.to_string())));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "/tab" => ConsoleCommand::SelectTab(
            Tab::from_str(rest).ok_or("Usage: /tab add|saved|current")?,
        ),
        "/set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("Usage: /set <field> <value>")?;
            ConsoleCommand::Set {
                field: field.to_string(),
                value: value.trim().to_string(),
            }
        }
        "/add" => ConsoleCommand::Add,
        "/save" => ConsoleCommand::Save,
        "/load" => ConsoleCommand::Load(parse_index(rest, "/load")?),
        "/delete" => ConsoleCommand::Delete(parse_index(rest, "/delete")?),
        "/remove" => ConsoleCommand::Remove(parse_index(rest, "/remove")?),
        "/clear" => ConsoleCommand::Clear,
        "/start" => {
            if rest.is_empty() {
                return Err("Usage: /start <rtsp-url>".to_string());
            }
            ConsoleCommand::Start(rest.to_string())
        }
        "/stop" => ConsoleCommand::Stop,
        "/status" => ConsoleCommand::Status,
        "/refresh" => ConsoleCommand::Refresh,
        "/play" => ConsoleCommand::Play,
        "/pause" => ConsoleCommand::Pause,
        "/volume" => {
            let volume = rest
                .parse::<f32>()
                .map_err(|_| "Usage: /volume <0.0-1.0>".to_string())?;
            if !(0.0..=1.0).contains(&volume) {
                return Err("Volume must be between 0.0 and 1.0".to_string());
            }
            ConsoleCommand::Volume(volume)
        }
        "/click" => {
            let coords: Vec<f64> = rest
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| "Usage: /click <x> <y>".to_string())?;
            match coords.as_slice() {
                [x, y] => ConsoleCommand::Click { x: *x, y: *y },
                _ => return Err("Usage: /click <x> <y>".to_string()),
            }
        }
        "/show" => ConsoleCommand::Show,
        "/canvas" => ConsoleCommand::Canvas,
        "/help" => ConsoleCommand::Help,
        "/quit" | "/exit" => ConsoleCommand::Quit,
        other => return Err(format!("Unknown command: {} (try /help)", other)),
    };
    Ok(Some(command))
}

fn parse_index(value: &str, command: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("Usage: {} <n>", command))
}
