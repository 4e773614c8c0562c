//! Typed draft of an overlay being edited in the controls panel.
//!
//! Form input arrives as strings. Each field is parsed once when it is set,
//! and the whole draft is checked in [`DraftOverlay::build`] before it becomes
//! an [`Overlay`].

use thiserror::Error;

use crate::overlay::{
    FontSizePreset, Overlay, OverlayKind, OverlayStyle, Position, Size, PERCENT_MAX,
    POSITION_MIN, SIZE_MIN, Z_INDEX_MAX, Z_INDEX_MIN,
};

/// Errors raised while editing or submitting a draft.
#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("Please fill in all required fields (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Editable fields, addressed by the dotted names the form uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Kind,
    Content,
    PositionX,
    PositionY,
    Width,
    Height,
    Color,
    FontSize,
    ZIndex,
}

impl DraftField {
    pub const ALL: [DraftField; 10] = [
        DraftField::Name,
        DraftField::Kind,
        DraftField::Content,
        DraftField::PositionX,
        DraftField::PositionY,
        DraftField::Width,
        DraftField::Height,
        DraftField::Color,
        DraftField::FontSize,
        DraftField::ZIndex,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Kind => "type",
            DraftField::Content => "content",
            DraftField::PositionX => "position.x",
            DraftField::PositionY => "position.y",
            DraftField::Width => "size.width",
            DraftField::Height => "size.height",
            DraftField::Color => "color",
            DraftField::FontSize => "fontSize",
            DraftField::ZIndex => "zIndex",
        }
    }

    /// Look a field up by its form key. Short aliases (`x`, `width`, `z`) are accepted.
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        if let Some(field) = Self::ALL.into_iter().find(|f| f.key().eq_ignore_ascii_case(key)) {
            return Some(field);
        }
        match key.to_lowercase().as_str() {
            "kind" => Some(DraftField::Kind),
            "x" => Some(DraftField::PositionX),
            "y" => Some(DraftField::PositionY),
            "width" | "w" => Some(DraftField::Width),
            "height" | "h" => Some(DraftField::Height),
            "font" | "font-size" | "fontsize" => Some(DraftField::FontSize),
            "z" | "z-index" | "zindex" | "layer" => Some(DraftField::ZIndex),
            _ => None,
        }
    }
}

/// Overlay under construction. Numeric fields are already typed.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOverlay {
    pub name: String,
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
    pub style: OverlayStyle,
}

impl Default for DraftOverlay {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: OverlayKind::Text,
            content: String::new(),
            position: Position::default(),
            size: Size::default(),
            style: OverlayStyle::default(),
        }
    }
}

impl DraftOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a draft from an existing overlay, e.g. to edit a saved one.
    pub fn from_overlay(overlay: &Overlay) -> Self {
        Self {
            name: overlay.name.clone(),
            kind: overlay.kind,
            content: overlay.content.clone(),
            position: overlay.position,
            size: overlay.size,
            style: overlay.style.clone(),
        }
    }

    /// Set a field from its form key and raw string value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let field = DraftField::parse(key).ok_or_else(|| DraftError::UnknownField(key.to_string()))?;
        self.set_field(field, value)
    }

    /// Set a field from a raw string value, parsing numbers and enums.
    pub fn set_field(&mut self, field: DraftField, value: &str) -> Result<(), DraftError> {
        match field {
            DraftField::Name => self.name = value.to_string(),
            DraftField::Content => self.content = value.to_string(),
            DraftField::Kind => {
                self.kind = OverlayKind::from_str(value).ok_or_else(|| DraftError::InvalidValue {
                    field: field.key(),
                    value: value.to_string(),
                })?;
            }
            DraftField::PositionX => self.position.x = parse_number(field, value)?,
            DraftField::PositionY => self.position.y = parse_number(field, value)?,
            DraftField::Width => self.size.width = parse_number(field, value)?,
            DraftField::Height => self.size.height = parse_number(field, value)?,
            DraftField::Color => self.style.color = parse_color(value)?,
            DraftField::FontSize => {
                let preset = FontSizePreset::parse(value).ok_or_else(|| DraftError::InvalidValue {
                    field: field.key(),
                    value: value.to_string(),
                })?;
                self.style.font_size = preset.css().to_string();
            }
            DraftField::ZIndex => {
                self.style.z_index =
                    value
                        .trim()
                        .parse::<u8>()
                        .map_err(|_| DraftError::InvalidValue {
                            field: field.key(),
                            value: value.to_string(),
                        })?;
            }
        }
        Ok(())
    }

    /// Validate the draft and produce an unsaved overlay.
    ///
    /// `name` and `content` are required. Placement, size and stacking order
    /// must fall within their percentage/layer bounds.
    pub fn build(&self) -> Result<Overlay, DraftError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.content.trim().is_empty() {
            missing.push("content");
        }
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        check_range("position.x", self.position.x, POSITION_MIN, PERCENT_MAX)?;
        check_range("position.y", self.position.y, POSITION_MIN, PERCENT_MAX)?;
        check_range("size.width", self.size.width, SIZE_MIN, PERCENT_MAX)?;
        check_range("size.height", self.size.height, SIZE_MIN, PERCENT_MAX)?;
        check_range(
            "zIndex",
            self.style.z_index as f64,
            Z_INDEX_MIN as f64,
            Z_INDEX_MAX as f64,
        )?;

        // Text styling is meaningless for images; keep the defaults on the wire.
        let style = match self.kind {
            OverlayKind::Text => self.style.clone(),
            OverlayKind::Image => OverlayStyle {
                z_index: self.style.z_index,
                ..OverlayStyle::default()
            },
        };

        Ok(Overlay {
            id: None,
            name: self.name.trim().to_string(),
            kind: self.kind,
            content: self.content.trim().to_string(),
            position: self.position,
            size: self.size,
            style,
        })
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Label for the content field, which depends on the overlay kind.
    pub fn content_label(&self) -> &'static str {
        match self.kind {
            OverlayKind::Text => "Text Content",
            OverlayKind::Image => "Image URL",
        }
    }
}

fn parse_number(field: DraftField, value: &str) -> Result<f64, DraftError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DraftError::InvalidValue {
            field: field.key(),
            value: value.to_string(),
        })
}

fn parse_color(value: &str) -> Result<String, DraftError> {
    let trimmed = value.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(DraftError::InvalidValue {
            field: "color",
            value: value.to_string(),
        });
    }
    Ok(format!("#{}", hex.to_lowercase()))
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), DraftError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DraftError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
