//! Overlay canvas - lays overlays out over the video frame.
//!
//! Rendering is pure: the same overlay list always produces the same
//! elements. Two outputs are supported: absolutely positioned elements (with
//! a CSS style string each) and an ffmpeg filter graph that burns the overlays
//! into a video.

use std::fmt;

use crate::overlay::{Overlay, OverlayKind};

/// Percent-based box relative to the video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Whether a point (in percent of the frame) falls inside the box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// What a placed element shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementBody {
    Text {
        content: String,
        color: String,
        font_size: String,
    },
    Image {
        src: String,
        alt: String,
    },
}

/// One overlay positioned on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    /// Index into the overlay list, forwarded on click.
    pub index: usize,
    pub rect: Rect,
    pub z_index: u8,
    pub body: ElementBody,
}

impl PlacedElement {
    pub fn from_overlay(index: usize, overlay: &Overlay) -> Self {
        let rect = Rect {
            left: overlay.position.x,
            top: overlay.position.y,
            width: overlay.size.width,
            height: overlay.size.height,
        };
        let body = match overlay.kind {
            OverlayKind::Text => ElementBody::Text {
                content: overlay.content.clone(),
                color: overlay.style.color.clone(),
                font_size: overlay.style.font_size.clone(),
            },
            OverlayKind::Image => ElementBody::Image {
                src: overlay.content.clone(),
                alt: if overlay.name.is_empty() {
                    "Overlay".to_string()
                } else {
                    overlay.name.clone()
                },
            },
        };
        Self {
            index,
            rect,
            z_index: overlay.style.z_index.max(1),
            body,
        }
    }

    /// Inline CSS for the element.
    pub fn css(&self) -> String {
        let mut css = format!(
            "position:absolute;left:{}%;top:{}%;width:{}%;height:{}%;z-index:{}",
            self.rect.left, self.rect.top, self.rect.width, self.rect.height, self.z_index
        );
        match &self.body {
            ElementBody::Text {
                color, font_size, ..
            } => {
                css.push_str(&format!(";color:{};font-size:{}", color, font_size));
            }
            ElementBody::Image { .. } => css.push_str(";object-fit:contain"),
        }
        css
    }
}

impl fmt::Display for PlacedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, payload) = match &self.body {
            ElementBody::Text { content, .. } => ("text", content),
            ElementBody::Image { src, .. } => ("image", src),
        };
        write!(
            f,
            "#{} [{}] left:{}% top:{}% {}%x{}% z:{} \"{}\"",
            self.index,
            kind,
            self.rect.left,
            self.rect.top,
            self.rect.width,
            self.rect.height,
            self.z_index,
            payload
        )
    }
}

/// Lay out every overlay, in list order.
pub fn layout(overlays: &[Overlay]) -> Vec<PlacedElement> {
    overlays
        .iter()
        .enumerate()
        .map(|(i, o)| PlacedElement::from_overlay(i, o))
        .collect()
}

/// Index of the topmost overlay under the point `(x, y)` (percent of frame).
///
/// Higher z-index wins; on equal z-index the later overlay is on top.
pub fn hit_test(overlays: &[Overlay], x: f64, y: f64) -> Option<usize> {
    layout(overlays)
        .into_iter()
        .filter(|e| e.rect.contains(x, y))
        .max_by_key(|e| (e.z_index, e.index))
        .map(|e| e.index)
}

/// Build an ffmpeg `-filter_complex` graph compositing `overlays` over input
/// `[0:v]` at the given frame resolution. The final label is `[out]`.
///
/// Returns an empty string when there is nothing to draw.
///
/// Overlays are drawn in ascending z-index, so higher layers end up on top.
/// Text uses `drawtext`; images are pulled in with `movie` and scaled to
/// their box before `overlay`.
pub fn ffmpeg_filter(overlays: &[Overlay], width: u32, height: u32) -> String {
    let mut elements = layout(overlays);
    if elements.is_empty() {
        return String::new();
    }
    // Stable sort keeps list order within a layer.
    elements.sort_by_key(|e| e.z_index);

    let px = |percent: f64, total: u32| ((percent / 100.0) * total as f64).round() as u32;
    let last = elements.len() - 1;
    let mut input = "0:v".to_string();
    let mut chains = Vec::with_capacity(elements.len());

    for (step, element) in elements.iter().enumerate() {
        let output = if step == last {
            "out".to_string()
        } else {
            format!("v{}", step)
        };
        let x = px(element.rect.left, width);
        let y = px(element.rect.top, height);

        let chain = match &element.body {
            ElementBody::Text {
                content, color, ..
            } => {
                let font_px = overlays[element.index].style.font_size_px();
                format!(
                    "[{}]drawtext=text={}:x={}:y={}:fontsize={}:fontcolor={}[{}]",
                    input,
                    escape_filter_value(&escape_drawtext(content)),
                    x,
                    y,
                    font_px,
                    color,
                    output
                )
            }
            ElementBody::Image { src, .. } => {
                let w = px(element.rect.width, width).max(1);
                let h = px(element.rect.height, height).max(1);
                format!(
                    "movie={},scale={}:{}[img{}];[{}][img{}]overlay={}:{}[{}]",
                    escape_filter_value(src),
                    w,
                    h,
                    step,
                    input,
                    step,
                    x,
                    y,
                    output
                )
            }
        };
        chains.push(chain);
        input = output;
    }

    chains.join(";")
}

/// Characters the option parser splits on or unquotes.
const OPTION_SPECIAL: &[char] = &['\\', '\'', ':'];
/// Characters the graph parser splits on or unquotes.
const GRAPH_SPECIAL: &[char] = &['\\', '\'', '[', ']', ',', ';'];
/// Characters drawtext expands inside its `text` option.
const DRAWTEXT_SPECIAL: &[char] = &['\\', '%'];

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a filter option value so it survives both parsing passes: the graph
/// parser strips one level of escaping before the option parser splits the
/// arguments on `:` and strips the next.
fn escape_filter_value(value: &str) -> String {
    escape_chars(&escape_chars(value, OPTION_SPECIAL), GRAPH_SPECIAL)
}

/// Make drawtext print `text` literally instead of expanding `%{...}`.
fn escape_drawtext(text: &str) -> String {
    escape_chars(text, DRAWTEXT_SPECIAL)
}
