//! State held by the store.

use crate::overlay::Overlay;

/// Everything the control surface renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Overlays added in this session. Not persisted.
    pub overlays: Vec<Overlay>,
    /// Overlays stored by the backend, as of the last fetch.
    pub saved_overlays: Vec<Overlay>,
    /// HLS playlist URL of the running stream.
    pub stream_url: Option<String>,
    pub is_stream_active: bool,
    /// True while a backend action is in flight.
    pub loading: bool,
    /// User-facing message of the last failed action.
    pub error: Option<String>,
}

impl AppState {
    /// Most recently added session overlay.
    pub fn last_overlay(&self) -> Option<&Overlay> {
        self.overlays.last()
    }

    /// Saved overlay by its persisted id.
    pub fn saved_by_id(&self, id: &str) -> Option<&Overlay> {
        self.saved_overlays
            .iter()
            .find(|o| o.id.as_deref() == Some(id))
    }
}
