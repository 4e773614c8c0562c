//! Named state transitions.

use super::state::AppState;
use crate::overlay::Overlay;

/// The fixed set of mutations the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetOverlays(Vec<Overlay>),
    AppendOverlay(Overlay),
    /// Out-of-range indices are ignored.
    RemoveOverlay(usize),
    ClearOverlays,
    SetStreamUrl(Option<String>),
    SetSavedOverlays(Vec<Overlay>),
    SetStreamStatus(bool),
    SetLoading(bool),
    SetError(String),
    ClearError,
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetOverlays(overlays) => state.overlays = overlays,
        Action::AppendOverlay(overlay) => state.overlays.push(overlay),
        Action::RemoveOverlay(index) => {
            if index < state.overlays.len() {
                state.overlays.remove(index);
            }
        }
        Action::ClearOverlays => state.overlays.clear(),
        Action::SetStreamUrl(url) => state.stream_url = url,
        Action::SetSavedOverlays(overlays) => state.saved_overlays = overlays,
        Action::SetStreamStatus(active) => state.is_stream_active = active,
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetError(message) => state.error = Some(message),
        Action::ClearError => state.error = None,
    }
}
