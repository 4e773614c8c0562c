//! Controls panel - tabbed overlay editor driving the store.
//!
//! The panel owns only presentation state: the selected tab and the draft
//! being edited. Everything else is read from [`AppState`] and changed through
//! [`Store`] actions.

use std::fmt::Write as _;

use thiserror::Error;

use crate::api::ApiError;
use crate::draft::{DraftError, DraftOverlay};
use crate::overlay::{Overlay, OverlayKind};
use crate::store::{AppState, Store};

/// Panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Add,
    Saved,
    Current,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Add, Tab::Saved, Tab::Current];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "add" => Some(Tab::Add),
            "saved" => Some(Tab::Saved),
            "current" => Some(Tab::Current),
            _ => None,
        }
    }

    /// Tab caption. The current tab shows the session overlay count.
    pub fn label(&self, state: &AppState) -> String {
        match self {
            Tab::Add => "Add Overlay".to_string(),
            Tab::Saved => "Saved Overlays".to_string(),
            Tab::Current => format!("Current ({})", state.overlays.len()),
        }
    }
}

/// Errors surfaced by panel handlers.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("No overlays to save")]
    NothingToSave,

    #[error("No saved overlay at position {0}")]
    NoSavedOverlay(usize),

    #[error("No current overlay at position {0}")]
    NoCurrentOverlay(usize),

    #[error("Saved overlay '{0}' has no id")]
    MissingId(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Tabbed overlay editor.
#[derive(Debug, Default)]
pub struct ControlsPanel {
    active_tab: Tab,
    draft: DraftOverlay,
}

impl ControlsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn draft(&self) -> &DraftOverlay {
        &self.draft
    }

    /// Edit one draft field from raw form input.
    pub fn edit(&mut self, field: &str, value: &str) -> Result<(), PanelError> {
        self.draft.set(field, value)?;
        Ok(())
    }

    /// Validate the draft, append it to the session list and reset the form.
    ///
    /// On a validation error the draft is kept so the user can fix it.
    pub fn submit(&mut self, store: &Store) -> Result<Overlay, PanelError> {
        let overlay = self.draft.build()?;
        store.load_overlay(overlay.clone());
        self.draft.reset();
        Ok(overlay)
    }

    /// Persist the most recently added session overlay.
    pub async fn save_current(&self, store: &Store) -> Result<Overlay, PanelError> {
        let overlay = store
            .state()
            .last_overlay()
            .cloned()
            .ok_or(PanelError::NothingToSave)?;
        Ok(store.save_overlay(&overlay).await?)
    }

    /// Copy a saved overlay into the session list.
    pub fn load_saved(&self, store: &Store, index: usize) -> Result<Overlay, PanelError> {
        let overlay = store
            .state()
            .saved_overlays
            .get(index)
            .cloned()
            .ok_or(PanelError::NoSavedOverlay(index))?;
        store.load_overlay(overlay.clone());
        Ok(overlay)
    }

    /// Delete a saved overlay from the backend.
    pub async fn delete_saved(&self, store: &Store, index: usize) -> Result<Overlay, PanelError> {
        let overlay = store
            .state()
            .saved_overlays
            .get(index)
            .cloned()
            .ok_or(PanelError::NoSavedOverlay(index))?;
        let id = overlay
            .id
            .clone()
            .ok_or_else(|| PanelError::MissingId(overlay.name.clone()))?;
        store.delete_overlay(&id).await?;
        Ok(overlay)
    }

    pub fn remove_current(&self, store: &Store, index: usize) -> Result<Overlay, PanelError> {
        store
            .remove_overlay(index)
            .ok_or(PanelError::NoCurrentOverlay(index))
    }

    pub fn clear(&self, store: &Store) {
        store.clear_overlays();
    }

    /// Render the tab bar and the active tab as plain text.
    pub fn render(&self, state: &AppState) -> String {
        let mut out = String::new();

        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|tab| {
                let label = tab.label(state);
                if *tab == self.active_tab {
                    format!("[{}]", label)
                } else {
                    format!(" {} ", label)
                }
            })
            .collect();
        let _ = writeln!(out, "{}", tabs.join(" "));

        match self.active_tab {
            Tab::Add => self.render_form(&mut out),
            Tab::Saved => {
                if state.saved_overlays.is_empty() {
                    let _ = writeln!(out, "No saved overlays found");
                }
                for (i, overlay) in state.saved_overlays.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "{:>3}. {} ({}) Position: ({}%, {}%) Size: {}% x {}%",
                        i,
                        overlay.name,
                        overlay.kind,
                        overlay.position.x,
                        overlay.position.y,
                        overlay.size.width,
                        overlay.size.height
                    );
                }
            }
            Tab::Current => {
                if state.overlays.is_empty() {
                    let _ = writeln!(out, "No current overlays");
                }
                for (i, overlay) in state.overlays.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "{:>3}. {} ({}) Position: ({}%, {}%)",
                        i, overlay.name, overlay.kind, overlay.position.x, overlay.position.y
                    );
                }
            }
        }

        if state.loading {
            let _ = writeln!(out, "Loading...");
        }
        if let Some(error) = &state.error {
            let _ = writeln!(out, "Error: {}", error);
        }
        out
    }

    fn render_form(&self, out: &mut String) {
        let d = &self.draft;
        let _ = writeln!(out, "  Name: {}", d.name);
        let _ = writeln!(out, "  Type: {}", d.kind);
        let _ = writeln!(out, "  {}: {}", d.content_label(), d.content);
        let _ = writeln!(out, "  Position: x={}% y={}%", d.position.x, d.position.y);
        let _ = writeln!(out, "  Size: {}% x {}%", d.size.width, d.size.height);
        if d.kind == OverlayKind::Text {
            let _ = writeln!(
                out,
                "  Text Color: {}  Font Size: {}",
                d.style.color, d.style.font_size
            );
        }
        let _ = writeln!(out, "  Layer Order (Z-Index): {}", d.style.z_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;

    fn store() -> Store {
        Store::new(ApiClient::new("http://localhost:5001/api").unwrap())
    }

    #[test]
    fn test_submit_requires_fields() {
        let store = store();
        let mut panel = ControlsPanel::new();
        panel.edit("name", "Title").unwrap();

        let err = panel.submit(&store).unwrap_err();
        assert!(matches!(err, PanelError::Draft(DraftError::MissingFields(_))));
        assert!(store.state().overlays.is_empty());
        assert_eq!(panel.draft().name, "Title", "draft kept after failed submit");
    }

    #[test]
    fn test_submit_appends_and_resets() {
        let store = store();
        let mut panel = ControlsPanel::new();
        panel.edit("name", "Title").unwrap();
        panel.edit("content", "Hello").unwrap();
        panel.edit("position.x", "10").unwrap();

        let overlay = panel.submit(&store).unwrap();
        assert_eq!(overlay.position.x, 10.0);
        assert_eq!(store.state().overlays, vec![overlay]);
        assert_eq!(panel.draft(), &DraftOverlay::default());
    }

    #[tokio::test]
    async fn test_save_with_empty_session() {
        let store = store();
        let panel = ControlsPanel::new();
        assert!(matches!(
            panel.save_current(&store).await,
            Err(PanelError::NothingToSave)
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let store = store();
        let panel = ControlsPanel::new();
        store.load_overlay(Overlay::text("a", "1"));
        store.load_overlay(Overlay::text("b", "2"));

        assert!(matches!(
            panel.remove_current(&store, 7),
            Err(PanelError::NoCurrentOverlay(7))
        ));
        assert_eq!(panel.remove_current(&store, 0).unwrap().name, "a");
        panel.clear(&store);
        assert!(store.state().overlays.is_empty());
    }

    #[test]
    fn test_load_saved_out_of_range() {
        let store = store();
        let panel = ControlsPanel::new();
        assert!(matches!(
            panel.load_saved(&store, 0),
            Err(PanelError::NoSavedOverlay(0))
        ));
    }

    #[test]
    fn test_tab_labels_and_render() {
        let store = store();
        let mut panel = ControlsPanel::new();
        store.load_overlay(Overlay::text("Title", "Hello").at(10.0, 10.0));

        let rendered = panel.render(&store.state());
        assert!(rendered.starts_with("[Add Overlay]  Saved Overlays   Current (1) "));
        assert!(rendered.contains("Text Content:"));

        panel.select_tab(Tab::Current);
        let rendered = panel.render(&store.state());
        assert!(rendered.contains("Title (text) Position: (10%, 10%)"));

        panel.select_tab(Tab::Saved);
        assert!(panel.render(&store.state()).contains("No saved overlays found"));
    }

    #[test]
    fn test_image_form_hides_text_style() {
        let mut panel = ControlsPanel::new();
        panel.edit("type", "image").unwrap();
        let rendered = panel.render(&AppState::default());
        assert!(rendered.contains("Image URL:"));
        assert!(!rendered.contains("Text Color"));
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!(Tab::from_str("Saved"), Some(Tab::Saved));
        assert_eq!(Tab::from_str("other"), None);
    }
}
