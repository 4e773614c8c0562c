//! Store - owns the application state and orchestrates backend calls.

use std::future::Future;

use tokio::sync::watch;

use super::action::{reduce, Action};
use super::state::AppState;
use crate::api::{ApiClient, ApiError, StreamStarted, StreamStatus};
use crate::overlay::Overlay;

/// State container with the action set the presentation layer calls into.
///
/// Backend actions follow one cycle: set `loading`, clear the previous error,
/// call the API, update the affected slice (or record the error message),
/// clear `loading`. Failures are also returned to the caller so it can react
/// without re-deriving the message.
pub struct Store {
    api: ApiClient,
    state: watch::Sender<AppState>,
}

impl Store {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self { api, state }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Receive a fresh snapshot after every dispatched action.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: Action) {
        log::trace!("dispatch {:?}", action);
        self.state.send_modify(|state| reduce(state, action));
    }

    /// Probe stream status and fetch saved overlays, concurrently.
    ///
    /// A failed status check is only logged. A failed fetch is recorded in
    /// state like any other action.
    pub async fn initialize(&self) {
        let (status, saved) =
            futures_util::future::join(self.check_stream_status(), self.fetch_saved_overlays())
                .await;
        if let Err(e) = status {
            log::warn!("Failed to check stream status: {}", e);
        }
        if let Err(e) = saved {
            log::warn!("Failed to fetch saved overlays: {}", e);
        }
    }

    /// Query the backend for the stream state without touching `loading`/`error`.
    pub async fn check_stream_status(&self) -> Result<StreamStatus, ApiError> {
        let status = self.api.stream_status().await?;
        self.dispatch(Action::SetStreamStatus(status.is_active));
        match (&status.hls_url, status.is_active) {
            (Some(url), true) => self.dispatch(Action::SetStreamUrl(Some(url.clone()))),
            (_, false) => self.dispatch(Action::SetStreamUrl(None)),
            (None, true) => {}
        }
        Ok(status)
    }

    pub async fn start_stream(&self, rtsp_url: &str) -> Result<StreamStarted, ApiError> {
        self.track(async {
            let started = self.api.start_stream(rtsp_url).await?;
            log::info!("Stream started: {}", started.hls_url);
            self.dispatch(Action::SetStreamUrl(Some(started.hls_url.clone())));
            self.dispatch(Action::SetStreamStatus(true));
            Ok(started)
        })
        .await
    }

    pub async fn stop_stream(&self) -> Result<(), ApiError> {
        self.track(async {
            self.api.stop_stream().await?;
            log::info!("Stream stopped");
            self.dispatch(Action::SetStreamUrl(None));
            self.dispatch(Action::SetStreamStatus(false));
            Ok(())
        })
        .await
    }

    pub async fn fetch_saved_overlays(&self) -> Result<Vec<Overlay>, ApiError> {
        self.track(self.refresh_saved()).await
    }

    /// Persist `overlay`, then refresh the saved list. Returns the stored copy.
    pub async fn save_overlay(&self, overlay: &Overlay) -> Result<Overlay, ApiError> {
        self.track(async {
            let saved = self.api.create_overlay(overlay).await?;
            log::info!("Saved overlay '{}' ({:?})", saved.name, saved.id);
            self.refresh_saved().await?;
            Ok(saved)
        })
        .await
    }

    pub async fn update_overlay(&self, id: &str, overlay: &Overlay) -> Result<Overlay, ApiError> {
        self.track(async {
            let updated = self.api.update_overlay(id, overlay).await?;
            log::info!("Updated overlay {}", id);
            self.refresh_saved().await?;
            Ok(updated)
        })
        .await
    }

    pub async fn delete_overlay(&self, id: &str) -> Result<(), ApiError> {
        self.track(async {
            self.api.delete_overlay(id).await?;
            log::info!("Deleted overlay {}", id);
            self.refresh_saved().await?;
            Ok(())
        })
        .await
    }

    /// Append an overlay to the session list.
    pub fn load_overlay(&self, overlay: Overlay) {
        self.dispatch(Action::AppendOverlay(overlay));
    }

    /// Remove the session overlay at `index`. Returns it, or `None` when the
    /// index is out of range (in which case nothing changes).
    pub fn remove_overlay(&self, index: usize) -> Option<Overlay> {
        let removed = self.state.borrow().overlays.get(index).cloned();
        if removed.is_some() {
            self.dispatch(Action::RemoveOverlay(index));
        }
        removed
    }

    pub fn clear_overlays(&self) {
        self.dispatch(Action::ClearOverlays);
    }

    pub fn clear_error(&self) {
        self.dispatch(Action::ClearError);
    }

    async fn refresh_saved(&self) -> Result<Vec<Overlay>, ApiError> {
        let overlays = self.api.list_overlays().await?;
        log::debug!("Fetched {} saved overlays", overlays.len());
        self.dispatch(Action::SetSavedOverlays(overlays.clone()));
        Ok(overlays)
    }

    async fn track<T, F>(&self, action: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.dispatch(Action::SetLoading(true));
        self.dispatch(Action::ClearError);

        let result = action.await;
        if let Err(e) = &result {
            self.dispatch(Action::SetError(e.to_string()));
        }

        self.dispatch(Action::SetLoading(false));
        result
    }
}
