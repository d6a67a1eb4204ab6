//! End-to-end session tests against a mock backend.

use deck_client::DeckClient;
use deck_core::{SoundId, TabId};
use deck_session::{
    HostNotification, PlaybackStateChange, Session, SessionError, SessionEvent,
};
use deck_settings::SettingsStore;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FAST_POLL: Duration = Duration::from_millis(25);

fn session_for(server: &MockServer, dir: &TempDir) -> Session {
    let client = DeckClient::new(server.uri()).unwrap();
    let settings = SettingsStore::open(dir.path().join("settings.json"));
    let mut session = Session::new(client, settings);
    session.set_poll_interval(FAST_POLL);
    session
}

/// Wait for `predicate` to become true, panicking after two seconds.
async fn wait_for<F: Fn() -> bool>(what: &str, predicate: F) {
    for _ in 0..80 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("Timed out waiting for {what}");
}

async fn mount_play(server: &MockServer, sound: i64, playing_id: i64, length_ms: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/api/sounds/{sound}/play")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "playingId": playing_id,
            "lengthInMs": length_ms,
            "name": "Airhorn"
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Playback reconciliation
// =============================================================================

mod reconciliation {
    use super::*;

    #[tokio::test]
    async fn test_play_progress_finish_cycle() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_play(&server, 42, 7, 1000).await;

        // Two polls see the instance halfway through, then it vanishes
        Mock::given(method("GET"))
            .and(path("/api/sounds/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "soundId": 42, "readInMs": 500, "lengthInMs": 1000,
                 "paused": false, "repeat": false, "name": "Airhorn"}
            ])))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/sounds/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        let mut events = session.subscribe_events();

        let instance = session.play_sound(SoundId::new(42)).await.unwrap();
        assert_eq!(instance.get(), 7);

        // Seeded immediately: index entry, zeroed cursor, known length
        let view = session.playback_view().await;
        assert_eq!(view.instances.len(), 1);
        assert_eq!(view.instances[0].read_ms, 0);
        assert_eq!(view.instances[0].length_ms, 1000);
        assert!(view.any_playing);
        assert!(session.is_polling());

        // Follow the event stream: the 50% snapshot is observed, then the
        // empty snapshot finishes the sound and drops the global flag
        let mut saw_progress_50 = false;
        let outcome = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await.expect("event stream closed") {
                    SessionEvent::ProgressChanged { percent } if percent == 50.0 => {
                        saw_progress_50 = true;
                    }
                    SessionEvent::SoundFinished { sound } => {
                        assert_eq!(sound.get(), 42);
                        break;
                    }
                    _ => {}
                }
            }
        })
        .await;
        assert!(outcome.is_ok(), "never saw the finished signal");
        assert!(saw_progress_50, "never observed the 50% snapshot");

        let view = session.playback_view().await;
        assert!(view.instances.is_empty());
        assert!(!view.any_playing);
        wait_for("polling to stop", || !session.is_polling()).await;

        // Exactly once: no second finished signal for the same instance
        let mut extra_finishes = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, SessionEvent::SoundFinished { .. }) {
                extra_finishes += 1;
            }
        }
        assert_eq!(extra_finishes, 0);
    }

    #[tokio::test]
    async fn test_error_budget_forces_reset() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_play(&server, 42, 7, 1000).await;
        Mock::given(method("GET"))
            .and(path("/api/sounds/progress"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend on fire"))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        let mut events = session.subscribe_events();
        session.play_sound(SoundId::new(42)).await.unwrap();

        // Five consecutive failures reset everything
        let sync_error = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::SyncError) => break,
                    Ok(_) => {}
                    Err(e) => panic!("event stream closed: {e}"),
                }
            }
        })
        .await;
        assert!(sync_error.is_ok(), "never saw the sync error");

        let view = session.playback_view().await;
        assert!(view.instances.is_empty());
        assert!(!view.any_playing);
        wait_for("polling to stop", || !session.is_polling()).await;
    }

    #[tokio::test]
    async fn test_rejected_play_leaves_no_state() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/api/sounds/42/play"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})),
            )
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        match session.play_sound(SoundId::new(42)).await.unwrap_err() {
            SessionError::PlayRejected(sound) => assert_eq!(sound.get(), 42),
            e => panic!("Expected PlayRejected, got: {e:?}"),
        }

        let view = session.playback_view().await;
        assert!(view.instances.is_empty());
        assert!(!session.is_polling());
    }

    #[tokio::test]
    async fn test_stop_all_clears_even_when_request_fails() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_play(&server, 42, 7, 1000).await;
        Mock::given(method("GET"))
            .and(path("/api/sounds/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "soundId": 42, "readInMs": 100, "lengthInMs": 1000, "paused": false}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/sounds/stop"))
            .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.play_sound(SoundId::new(42)).await.unwrap();

        // The request fails but local state still goes quiescent
        assert!(session.stop_all_sounds().await.is_err());
        let view = session.playback_view().await;
        assert!(view.instances.is_empty());
        assert!(!view.any_playing);
        wait_for("polling to stop", || !session.is_polling()).await;
    }

    #[tokio::test]
    async fn test_resync_adopts_instances_played_elsewhere() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/sounds/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 9, "soundId": 77, "readInMs": 100, "lengthInMs": 2000, "paused": false}
            ])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.resync().await.unwrap();

        let view = session.playback_view().await;
        assert_eq!(view.instances.len(), 1);
        assert_eq!(view.instances[0].sound_id.get(), 77);
        assert!(view.any_playing);
        assert!(session.is_polling());
    }

    #[tokio::test]
    async fn test_resync_with_nothing_playing_stays_idle() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/sounds/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.resync().await.unwrap();

        assert!(session.playback_view().await.instances.is_empty());
        assert!(!session.is_polling());
    }

    #[tokio::test]
    async fn test_host_notifications_drive_the_same_flags() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let session = session_for(&server, &dir);
        let mut events = session.subscribe_events();

        session
            .apply_notification(HostNotification::PlaybackState(PlaybackStateChange::Playing))
            .await;
        assert!(session.playback_view().await.any_playing);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::PlayingChanged { any_playing: true }
        );

        session
            .apply_notification(HostNotification::TalkThrough(true))
            .await;
        assert!(session.playback_view().await.talk_through);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::TalkThroughChanged { active: true }
        );
    }
}

// =============================================================================
// Tabs, ordering, search
// =============================================================================

mod tabs {
    use super::*;

    async fn mount_tabs(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/tabs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 0, "name": "Memes"},
                {"id": 1, "name": "Music"}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/favorites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_load_tabs_synthesizes_favorites_first() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;

        let mut session = session_for(&server, &dir);
        session.load_tabs().await.unwrap();

        let tabs = session.tabs();
        assert_eq!(tabs.len(), 3);
        assert!(tabs[0].id.is_favorites());
        assert_eq!(tabs[1].name, "Memes");
        // Nothing persisted: favorites is the startup tab
        assert!(session.active_tab().unwrap().is_favorites());
    }

    #[tokio::test]
    async fn test_stale_persisted_tab_falls_back_to_favorites() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;

        let mut session = session_for(&server, &dir);
        session.settings_mut().set_last_tab(&TabId::new("99"));
        session.load_tabs().await.unwrap();

        assert!(session.active_tab().unwrap().is_favorites());
    }

    #[tokio::test]
    async fn test_valid_persisted_tab_is_restored() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/tabs/1/sounds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.settings_mut().set_last_tab(&TabId::new("1"));
        session.load_tabs().await.unwrap();

        assert_eq!(session.active_tab().unwrap(), &TabId::new("1"));
    }

    #[tokio::test]
    async fn test_tab_change_event_precedes_sound_list() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/tabs/0/sounds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "A", "path": "/a.mp3"}
            ])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.load_tabs().await.unwrap();

        let mut events = session.subscribe_events();
        session.switch_tab(&TabId::new("0")).await.unwrap();

        // Layout observers must hear about the tab before its sounds
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::TabChanged { tab: TabId::new("0") }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SoundsLoaded { tab: TabId::new("0"), count: 1 }
        );
        assert_eq!(session.settings().last_tab(), Some(TabId::new("0")));
    }

    #[tokio::test]
    async fn test_switching_to_the_active_tab_is_a_noop() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;

        let mut session = session_for(&server, &dir);
        session.load_tabs().await.unwrap();

        let mut events = session.subscribe_events();
        session.switch_tab(&TabId::favorites()).await.unwrap();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_display_list_merges_persisted_order() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/tabs/0/sounds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "A", "path": "/a.mp3"},
                {"id": 2, "name": "B", "path": "/b.mp3"}
            ])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        // Persisted order references B first plus a sound that is gone
        let tab = TabId::new("0");
        let layout = session.settings().current_layout(&tab);
        session.settings_mut().set_tab_order(
            &tab,
            layout,
            vec!["/b.mp3".to_string(), "/c.mp3".to_string()],
        );

        session.load_tabs().await.unwrap();
        session.switch_tab(&tab).await.unwrap();

        let paths: Vec<_> = session.sounds().iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/b.mp3", "/a.mp3"]);
    }

    #[tokio::test]
    async fn test_recorded_order_persists_and_reorders_the_display_list() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/tabs/0/sounds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "A", "path": "/a.mp3"},
                {"id": 2, "name": "B", "path": "/b.mp3"}
            ])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.load_tabs().await.unwrap();
        let tab = TabId::new("0");
        session.switch_tab(&tab).await.unwrap();

        session.record_tab_order(vec!["/b.mp3".to_string(), "/a.mp3".to_string()]);

        let paths: Vec<_> = session.sounds().iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/b.mp3", "/a.mp3"]);

        let layout = session.settings().current_layout(&tab);
        assert_eq!(
            session.settings().tab_order(&tab, layout).unwrap(),
            vec!["/b.mp3".to_string(), "/a.mp3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_settings_import_then_reload_rederives_the_display_list() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        mount_tabs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/tabs/0/sounds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "A", "path": "/a.mp3"},
                {"id": 2, "name": "B", "path": "/b.mp3"}
            ])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);
        session.load_tabs().await.unwrap();
        let tab = TabId::new("0");
        session.switch_tab(&tab).await.unwrap();

        // A donor store produces the exported envelope with a custom order
        let mut donor = SettingsStore::open(dir.path().join("donor.json"));
        let layout = donor.current_layout(&tab);
        donor.set_tab_order(&tab, layout, vec!["/b.mp3".to_string(), "/a.mp3".to_string()]);
        let exported = donor.export_settings();

        // The store does not notify: the reload sequence is the caller's job
        session.settings_mut().import_settings(&exported).unwrap();
        session.reload_sounds().await.unwrap();

        let paths: Vec<_> = session.sounds().iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/b.mp3", "/a.mp3"]);
    }
}

mod search {
    use super::*;

    #[tokio::test]
    async fn test_search_over_the_cross_tab_collection() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/sounds/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Airhorn", "path": "/a.mp3", "tabId": 0},
                {"id": 2, "name": "Trombone", "path": "/t.mp3", "tabId": 1}
            ])))
            .mount(&server)
            .await;

        let mut session = session_for(&server, &dir);

        // Before the index exists: a termed query is an empty no-op,
        // an empty term still means "no active search"
        assert_eq!(session.search("air"), Some(Vec::new()));
        assert!(session.search("").is_none());

        assert_eq!(session.build_search_index().await.unwrap(), 2);
        let results = session.search("airhorn").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Airhorn");

        // Cached: building again does not refetch (the mock would panic
        // on a second call if it were limited; assert on count instead)
        assert_eq!(session.build_search_index().await.unwrap(), 2);
    }
}
