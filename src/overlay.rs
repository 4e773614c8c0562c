//! Overlay data model shared by the API client, the store and the renderers.
//!
//! Field names follow the backend's JSON shape (`_id`, `type`, `fontSize`,
//! `zIndex`), so an `Overlay` can be sent and received without a separate
//! wire type.

use serde::{Deserialize, Deserializer, Serialize};

/// Lower bound for position percentages.
pub const POSITION_MIN: f64 = 0.0;
/// Upper bound for position and size percentages.
pub const PERCENT_MAX: f64 = 100.0;
/// Lower bound for size percentages.
pub const SIZE_MIN: f64 = 1.0;
/// Lowest stacking order.
pub const Z_INDEX_MIN: u8 = 1;
/// Highest stacking order.
pub const Z_INDEX_MAX: u8 = 10;

/// Default text color.
pub const DEFAULT_COLOR: &str = "#ffffff";
/// Default CSS font size.
pub const DEFAULT_FONT_SIZE: &str = "24px";

/// What an overlay draws: literal text or an image fetched from a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    #[default]
    Text,
    Image,
}

impl OverlayKind {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayKind::Text => "text",
            OverlayKind::Image => "image",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(OverlayKind::Text),
            "image" => Some(OverlayKind::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-left corner of an overlay, in percent of the video frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

/// Overlay extent, in percent of the video frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 10.0,
        }
    }
}

/// Named font size presets offered by the controls panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSizePreset {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl FontSizePreset {
    pub const ALL: [FontSizePreset; 4] = [
        FontSizePreset::Small,
        FontSizePreset::Medium,
        FontSizePreset::Large,
        FontSizePreset::ExtraLarge,
    ];

    pub fn css(&self) -> &'static str {
        match self {
            FontSizePreset::Small => "16px",
            FontSizePreset::Medium => "24px",
            FontSizePreset::Large => "32px",
            FontSizePreset::ExtraLarge => "48px",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontSizePreset::Small => "Small",
            FontSizePreset::Medium => "Medium",
            FontSizePreset::Large => "Large",
            FontSizePreset::ExtraLarge => "Extra Large",
        }
    }

    /// Accepts a preset label (`small`, `extra-large`, ...) or its CSS value.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        Self::ALL.into_iter().find(|p| {
            p.css() == normalized || p.label().to_lowercase().replace(' ', "") == normalized
        })
    }
}

/// Presentation attributes. `color` and `font_size` only matter for text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(rename = "fontSize", default = "default_font_size")]
    pub font_size: String,
    #[serde(
        rename = "zIndex",
        default = "default_z_index",
        deserialize_with = "deserialize_z_index"
    )]
    pub z_index: u8,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_font_size() -> String {
    DEFAULT_FONT_SIZE.to_string()
}

fn default_z_index() -> u8 {
    Z_INDEX_MIN
}

/// Any JSON shape the backend may have stored for `zIndex`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawZIndex {
    Number(f64),
    Text(String),
    #[allow(dead_code)]
    Other(serde::de::IgnoredAny),
}

/// Stored documents are not validated, so decode `zIndex` leniently: numbers
/// are rounded and clamped, numeric strings parsed, anything unusable becomes
/// the lowest layer.
fn deserialize_z_index<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawZIndex::deserialize(deserializer)? {
        RawZIndex::Number(n) => Some(n),
        RawZIndex::Text(s) => s.trim().parse::<f64>().ok(),
        RawZIndex::Other(_) => None,
    };
    Ok(value
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.round().min(u8::MAX as f64) as u8)
        .unwrap_or(Z_INDEX_MIN))
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: default_color(),
            font_size: default_font_size(),
            z_index: default_z_index(),
        }
    }
}

impl OverlayStyle {
    /// Font size in pixels, falling back to the default when the CSS value
    /// is not a plain `<n>px`.
    pub fn font_size_px(&self) -> u32 {
        self.font_size
            .trim()
            .trim_end_matches("px")
            .parse::<f64>()
            .ok()
            .filter(|v| *v > 0.0)
            .map(|v| v.round() as u32)
            .unwrap_or(24)
    }
}

/// A positioned text or image element composited over the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub style: OverlayStyle,
}

/// A bound that an overlay field falls outside of.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsViolation {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for BoundsViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} must be between {} and {}, got {}",
            self.field, self.min, self.max, self.value
        )
    }
}

impl Overlay {
    /// Create a text overlay with default placement and style.
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: OverlayKind::Text,
            content: content.into(),
            position: Position::default(),
            size: Size::default(),
            style: OverlayStyle::default(),
        }
    }

    /// Create an image overlay with default placement and style.
    pub fn image(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: OverlayKind::Image,
            ..Self::text(name, url)
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Size { width, height };
        self
    }

    /// Check every bounded field. Returns the first violation found.
    pub fn validate(&self) -> Result<(), BoundsViolation> {
        let checks = [
            ("position.x", self.position.x, POSITION_MIN, PERCENT_MAX),
            ("position.y", self.position.y, POSITION_MIN, PERCENT_MAX),
            ("size.width", self.size.width, SIZE_MIN, PERCENT_MAX),
            ("size.height", self.size.height, SIZE_MIN, PERCENT_MAX),
            (
                "style.zIndex",
                self.style.z_index as f64,
                Z_INDEX_MIN as f64,
                Z_INDEX_MAX as f64,
            ),
        ];
        for (field, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(BoundsViolation {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// True when `other` describes the same overlay, ignoring the persisted id.
    pub fn same_content(&self, other: &Overlay) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.content == other.content
            && self.position == other.position
            && self.size == other.size
            && self.style == other.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_serializes_with_backend_field_names() {
        let overlay = Overlay::text("Title", "Hello").at(10.0, 10.0).sized(30.0, 10.0);
        let json = serde_json::to_value(&overlay).unwrap();

        assert_eq!(json["type"], "text");
        assert_eq!(json["style"]["fontSize"], "24px");
        assert_eq!(json["style"]["zIndex"], 1);
        assert_eq!(json["position"]["x"], 10.0);
        assert!(json.get("_id").is_none(), "unsaved overlay has no _id");
    }

    #[test]
    fn test_overlay_deserializes_backend_document() {
        let json = r##"{
            "_id": "65f0c0ffee",
            "name": "Logo",
            "type": "image",
            "content": "https://example.com/logo.png",
            "position": {"x": 80, "y": 5},
            "size": {"width": 15, "height": 15},
            "style": {"color": "#ff0000", "fontSize": "32px", "zIndex": 3}
        }"##;
        let overlay: Overlay = serde_json::from_str(json).unwrap();

        assert_eq!(overlay.id.as_deref(), Some("65f0c0ffee"));
        assert_eq!(overlay.kind, OverlayKind::Image);
        assert_eq!(overlay.position, Position { x: 80.0, y: 5.0 });
        assert_eq!(overlay.style.z_index, 3);
    }

    #[test]
    fn test_missing_style_uses_defaults() {
        let json = r#"{"name":"A","type":"text","content":"B",
            "position":{"x":1,"y":2},"size":{"width":3,"height":4}}"#;
        let overlay: Overlay = serde_json::from_str(json).unwrap();
        assert_eq!(overlay.style, OverlayStyle::default());
    }

    #[test]
    fn test_z_index_decodes_leniently() {
        let decode = |z: &str| {
            let json = format!(r##"{{"color":"#fff","fontSize":"24px","zIndex":{}}}"##, z);
            serde_json::from_str::<OverlayStyle>(&json).unwrap().z_index
        };
        assert_eq!(decode("3"), 3);
        assert_eq!(decode("2.0"), 2);
        assert_eq!(decode("\"4\""), 4);
        assert_eq!(decode("-1"), 1);
        assert_eq!(decode("0"), 1);
        assert_eq!(decode("1000"), 255);
        assert_eq!(decode("null"), 1);
        assert_eq!(decode("\"top\""), 1);
        assert_eq!(decode("{}"), 1);
    }

    #[test]
    fn test_validate_accepts_bounds() {
        let overlay = Overlay::text("a", "b").at(0.0, 100.0).sized(1.0, 100.0);
        assert!(overlay.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let overlay = Overlay::text("a", "b").at(101.0, 0.0);
        let err = overlay.validate().unwrap_err();
        assert_eq!(err.field, "position.x");

        let overlay = Overlay::text("a", "b").sized(0.0, 10.0);
        assert_eq!(overlay.validate().unwrap_err().field, "size.width");

        let mut overlay = Overlay::text("a", "b");
        overlay.style.z_index = 11;
        assert_eq!(overlay.validate().unwrap_err().field, "style.zIndex");
    }

    #[test]
    fn test_font_size_px() {
        let mut style = OverlayStyle::default();
        assert_eq!(style.font_size_px(), 24);
        style.font_size = "48px".to_string();
        assert_eq!(style.font_size_px(), 48);
        style.font_size = "large".to_string();
        assert_eq!(style.font_size_px(), 24);
    }

    #[test]
    fn test_font_size_preset_parse() {
        assert_eq!(FontSizePreset::parse("small"), Some(FontSizePreset::Small));
        assert_eq!(FontSizePreset::parse("32px"), Some(FontSizePreset::Large));
        assert_eq!(
            FontSizePreset::parse("extra-large"),
            Some(FontSizePreset::ExtraLarge)
        );
        assert_eq!(FontSizePreset::parse("huge"), None);
    }

    #[test]
    fn test_same_content_ignores_id() {
        let a = Overlay::text("a", "b");
        let mut b = a.clone();
        b.id = Some("x".to_string());
        assert!(a.same_content(&b));
        b.content = "c".to_string();
        assert!(!a.same_content(&b));
    }
}
