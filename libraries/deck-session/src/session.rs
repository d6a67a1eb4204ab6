//! The session: single owner of all reconcilable client state.
//!
//! Presentation code never touches the tracked-instance map or the
//! currently-playing index directly; it calls session methods and reads
//! [`PlaybackView`] projections. The only writers of playback state are
//! the polling task and the play/stop entry points here, and writes are
//! last-snapshot-wins.

use crate::error::{Result, SessionError};
use crate::events::{self, HostNotification, SessionEvent};
use crate::poller::{self, Shared, POLL_INTERVAL};
use crate::search::{self, SearchIndex};
use crate::tabs;
use deck_client::{ConnectionStatus, DeckClient};
use deck_core::{InstanceId, PlayingInstance, Sound, SoundId, Tab, TabId};
use deck_settings::SettingsStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

/// Rendering-safe snapshot of playback state.
#[derive(Debug, Clone)]
pub struct PlaybackView {
    /// At least one instance is playing unpaused
    pub any_playing: bool,
    /// Maximum progress percentage across active instances
    pub max_progress_percent: f64,
    /// The user paused via the global toggle
    pub paused_by_toggle: bool,
    /// Talk-through is active on the backend host
    pub talk_through: bool,
    /// Every tracked instance, unordered
    pub instances: Vec<PlayingInstance>,
}

/// A connected remote-control session.
pub struct Session {
    client: Arc<DeckClient>,
    settings: SettingsStore,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<SessionEvent>,
    poll_task: Option<JoinHandle<()>>,
    poll_interval: Duration,
    tabs: Vec<Tab>,
    active_tab: Option<TabId>,
    sounds: Vec<Sound>,
    search_index: Option<SearchIndex>,
}

impl Session {
    /// Create a session over a backend client and a settings store.
    pub fn new(client: DeckClient, settings: SettingsStore) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            client: Arc::new(client),
            settings,
            shared: Arc::new(Mutex::new(Shared::new())),
            events,
            poll_task: None,
            poll_interval: POLL_INTERVAL,
            tabs: Vec::new(),
            active_tab: None,
            sounds: Vec::new(),
            search_index: None,
        }
    }

    /// Override the poll cadence (tests mostly).
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Subscribe to session events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Subscribe to the connectivity indicator.
    pub fn connection_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.client.subscribe_status()
    }

    /// The backend client.
    pub fn client(&self) -> &DeckClient {
        &self.client
    }

    /// The settings store.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Mutable settings store access.
    ///
    /// After `import_settings` or `reset`, call [`Session::load_tabs`] to
    /// re-derive the tab and sound state — the store does not notify.
    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    // ========================================================================
    // Liveness
    // ========================================================================

    /// Probe the backend.
    pub async fn check_connection(&self) -> Result<()> {
        self.client.status().await.map_err(SessionError::from)
    }

    // ========================================================================
    // Tabs and sounds
    // ========================================================================

    /// All tabs, favorites first.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// The active tab, once one was activated.
    pub fn active_tab(&self) -> Option<&TabId> {
        self.active_tab.as_ref()
    }

    /// The display list of the active tab, in merged order.
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// Fetch the tab list, synthesize the favorites pseudo-tab, and
    /// activate the persisted last tab (falling back to favorites when
    /// it no longer exists).
    pub async fn load_tabs(&mut self) -> Result<()> {
        let server_tabs = self.client.tabs().await?;
        let mut all = Vec::with_capacity(server_tabs.len() + 1);
        all.push(Tab::favorites());
        all.extend(server_tabs);
        self.tabs = all;

        let startup = tabs::resolve_startup_tab(&self.tabs, self.settings.last_tab());
        self.activate_tab(startup).await
    }

    /// Switch the active tab.
    ///
    /// A no-op when the tab is already active (canonical-id identity).
    pub async fn switch_tab(&mut self, tab: &TabId) -> Result<()> {
        if self.active_tab.as_ref() == Some(tab) {
            return Ok(());
        }
        self.activate_tab(tab.clone()).await
    }

    /// Rebuild the active tab's display list from the backend.
    ///
    /// Part of the reload sequence after a settings import/reset or a
    /// layout change.
    pub async fn reload_sounds(&mut self) -> Result<()> {
        match self.active_tab.clone() {
            Some(tab) => self.load_sounds(&tab).await,
            None => Ok(()),
        }
    }

    /// Persist a user-customized order for the active tab's current
    /// layout and update the display list to match.
    pub fn record_tab_order(&mut self, order: Vec<String>) {
        let Some(tab) = self.active_tab.clone() else {
            return;
        };
        let layout = self.settings.current_layout(&tab);
        self.settings.set_tab_order(&tab, layout, order.clone());
        self.sounds = tabs::merge_with_persisted_order(
            std::mem::take(&mut self.sounds),
            Some(order.as_slice()),
        );
    }

    async fn activate_tab(&mut self, tab: TabId) -> Result<()> {
        self.active_tab = Some(tab.clone());
        self.settings.set_last_tab(&tab);
        // Dependent views must hear about the tab before its sound list
        // arrives, so they can prepare layout state first
        let _ = self.events.send(SessionEvent::TabChanged { tab: tab.clone() });
        self.load_sounds(&tab).await
    }

    async fn load_sounds(&mut self, tab: &TabId) -> Result<()> {
        let live = if tab.is_favorites() {
            self.client.favorites().await?
        } else {
            self.client.tab_sounds(tab).await?
        };

        let layout = self.settings.current_layout(tab);
        let order = self.settings.tab_order(tab, layout);
        self.sounds = tabs::merge_with_persisted_order(live, order.as_deref());

        let _ = self.events.send(SessionEvent::SoundsLoaded {
            tab: tab.clone(),
            count: self.sounds.len(),
        });
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Play a sound and start tracking the resulting instance.
    ///
    /// On a failed or malformed response no tracking state is left
    /// behind — the currently-playing entry for the sound is removed if
    /// present.
    pub async fn play_sound(&mut self, sound: SoundId) -> Result<InstanceId> {
        let response = match self.client.play_sound(sound).await {
            Ok(response) => response,
            Err(e) => {
                self.rollback_play(sound).await;
                return Err(e.into());
            }
        };

        match (response.success, response.playing_id) {
            (true, Some(instance)) => {
                {
                    let mut state = self.shared.lock().await;
                    // A snapshot fetched before this play must not finish
                    // the instance it does not yet contain
                    state.epoch += 1;
                    state.tracker.record_play(sound, instance, response.length_ms);
                    events::forward(state.tracker.drain_events(), &self.events);
                }
                self.ensure_polling();
                info!(%sound, %instance, "Playing");
                Ok(instance)
            }
            _ => {
                self.rollback_play(sound).await;
                Err(SessionError::PlayRejected(sound))
            }
        }
    }

    async fn rollback_play(&mut self, sound: SoundId) {
        let mut state = self.shared.lock().await;
        state.tracker.rollback_play(sound);
        events::forward(state.tracker.drain_events(), &self.events);
    }

    /// Stop everything.
    ///
    /// Local state is forced to quiescent even when the request fails:
    /// polling halts immediately and both the instance map and the
    /// currently-playing index are cleared. UI predictability over
    /// short-term consistency — without polling there is no later
    /// correction until the next play.
    pub async fn stop_all_sounds(&mut self) -> Result<()> {
        let outcome = self.client.stop_all().await;

        self.halt_polling();
        {
            let mut state = self.shared.lock().await;
            // In-flight poll responses from the halted cycle are stale now
            state.epoch += 1;
            state.tracker.clear_all();
            events::forward(state.tracker.drain_events(), &self.events);
        }

        outcome.map_err(SessionError::from)
    }

    /// Fetch one snapshot immediately and adopt whatever is playing.
    ///
    /// Covers the app-start case where another client already triggered
    /// playback: discovered instances are tracked (with conservative
    /// defaults until the next snapshot) and polling resumes when
    /// anything was found.
    pub async fn resync(&mut self) -> Result<()> {
        let snapshot = self.client.progress().await?;
        let tracking = {
            let mut state = self.shared.lock().await;
            state.epoch += 1;
            state.tracker.apply_snapshot(&snapshot);
            events::forward(state.tracker.drain_events(), &self.events);
            !state.tracker.is_empty()
        };
        if tracking {
            self.ensure_polling();
        }
        Ok(())
    }

    /// Toggle global pause/resume.
    ///
    /// The real effect is only observed via later polls or a host
    /// notification; locally only the pause-toggle flag is recorded.
    pub async fn toggle_playback(&mut self) -> Result<()> {
        self.client.toggle_playback().await?;

        let mut state = self.shared.lock().await;
        let was_playing = state.tracker.any_playing();
        state.tracker.set_paused_by_toggle(was_playing);
        Ok(())
    }

    /// Start talk-through on the backend host.
    pub async fn start_talk_through(&self) -> Result<()> {
        self.client.start_talk_through().await.map_err(SessionError::from)
    }

    /// Stop talk-through.
    pub async fn stop_talk_through(&self) -> Result<()> {
        self.client.stop_talk_through().await.map_err(SessionError::from)
    }

    /// Apply an inbound push notification from the backend's embedded
    /// runtime. Updates the same derived flags the poller maintains.
    pub async fn apply_notification(&self, notification: HostNotification) {
        let mut state = self.shared.lock().await;
        match notification {
            HostNotification::PlaybackState(change) => {
                state.tracker.apply_host_playback_state(change);
            }
            HostNotification::TalkThrough(active) => state.tracker.apply_talk_through(active),
        }
        events::forward(state.tracker.drain_events(), &self.events);
    }

    /// Snapshot playback state for rendering.
    pub async fn playback_view(&self) -> PlaybackView {
        let state = self.shared.lock().await;
        PlaybackView {
            any_playing: state.tracker.any_playing(),
            max_progress_percent: state.tracker.max_progress_percent(),
            paused_by_toggle: state.tracker.paused_by_toggle(),
            talk_through: state.tracker.talk_through(),
            instances: state.tracker.instances().cloned().collect(),
        }
    }

    /// Whether the polling task is currently running.
    pub fn is_polling(&self) -> bool {
        self.poll_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn ensure_polling(&mut self) {
        if !self.is_polling() {
            self.poll_task = Some(poller::spawn(
                Arc::clone(&self.client),
                Arc::clone(&self.shared),
                self.events.clone(),
                self.poll_interval,
            ));
        }
    }

    fn halt_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }

    // ========================================================================
    // Per-sound customization (applied locally only after backend success)
    // ========================================================================

    /// Set or clear a sound's favorite flag, mirrored locally by path.
    pub async fn set_favorite(&mut self, sound: &Sound, favorite: bool) -> Result<()> {
        self.client.set_favorite(sound.id, favorite).await?;
        self.settings.set_favorite(&sound.path, favorite);
        Ok(())
    }

    /// Set a custom volume for a sound.
    pub async fn set_volume(&mut self, sound: &Sound, volume: u32) -> Result<()> {
        self.client.set_volume(sound.id, volume).await?;
        self.settings.set_has_custom_volume(&sound.path, true);
        Ok(())
    }

    /// Reset a sound's volume to the global default.
    pub async fn reset_volume(&mut self, sound: &Sound) -> Result<()> {
        self.client.reset_volume(sound.id).await?;
        self.settings.set_has_custom_volume(&sound.path, false);
        Ok(())
    }

    /// Preview a sound locally on the backend host.
    pub async fn preview(&self, sound: SoundId) -> Result<()> {
        self.client.preview(sound).await.map_err(SessionError::from)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Build the cross-tab search index.
    ///
    /// Fetched once and cached for the session; returns the number of
    /// indexed sounds.
    pub async fn build_search_index(&mut self) -> Result<usize> {
        if let Some(index) = &self.search_index {
            return Ok(index.len());
        }
        let sounds = self.client.all_sounds().await?;
        let index = SearchIndex::build(sounds);
        let count = index.len();
        self.search_index = Some(index);
        Ok(count)
    }

    /// Query the search index.
    ///
    /// `None` means "no active search" (empty term) — callers restore the
    /// plain tab view. Queries before [`Session::build_search_index`]
    /// return empty results.
    pub fn search(&self, term: &str) -> Option<Vec<Sound>> {
        search::query(self.search_index.as_ref(), term)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.halt_polling();
    }
}
