//! Main backend client.

use crate::error::{ClientError, Result};
use crate::status::{ConnectionStatus, StatusPublisher};
use crate::types::{InstanceProgress, PlayResponse, SoundDto, TabDto};
use deck_core::{Sound, SoundId, Tab, TabId};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Client for the soundboard backend's local HTTP API.
///
/// Stateless apart from the connectivity indicator: every call is one
/// request, there are no retries and no client-side timeouts beyond the
/// transport defaults. Hold it in an `Arc` when multiple owners need it.
///
/// # Example
///
/// ```ignore
/// use deck_client::DeckClient;
///
/// let client = DeckClient::new("http://127.0.0.1:8080")?;
/// client.status().await?;
/// let tabs = client.tabs().await?;
/// println!("{} tabs", tabs.len());
/// ```
pub struct DeckClient {
    http: reqwest::Client,
    base_url: String,
    status: StatusPublisher,
}

impl DeckClient {
    /// Create a client for the backend at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        let base_url = url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("SounddeckRemote/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            base_url,
            status: StatusPublisher::new(),
        })
    }

    /// The normalized backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Subscribe to the connectivity indicator.
    ///
    /// Flipped as a side effect of every request outcome.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    // ========================================================================
    // Liveness
    // ========================================================================

    /// Probe the backend. Any non-error response means "connected".
    pub async fn status(&self) -> Result<()> {
        self.get_value("/api/status").await.map(|_| ())
    }

    // ========================================================================
    // Tabs and sounds
    // ========================================================================

    /// Fetch the ordered tab list.
    ///
    /// The synthetic favorites tab is NOT part of this list; callers
    /// prepend it.
    pub async fn tabs(&self) -> Result<Vec<Tab>> {
        let value = self.get_value("/api/tabs").await?;
        let dtos: Vec<TabDto> = decode_items(value, "tab")?;
        Ok(dtos.into_iter().map(Tab::from).collect())
    }

    /// Fetch the favorites collection.
    pub async fn favorites(&self) -> Result<Vec<Sound>> {
        let value = self.get_value("/api/favorites").await?;
        let dtos: Vec<SoundDto> = decode_items(value, "sound")?;
        let tab = TabId::favorites();
        Ok(dtos.into_iter().map(|d| d.into_sound(&tab)).collect())
    }

    /// Fetch the sound collection of one tab.
    pub async fn tab_sounds(&self, tab: &TabId) -> Result<Vec<Sound>> {
        let value = self.get_value(&format!("/api/tabs/{tab}/sounds")).await?;
        let dtos: Vec<SoundDto> = decode_items(value, "sound")?;
        Ok(dtos.into_iter().map(|d| d.into_sound(tab)).collect())
    }

    /// Fetch every sound across every tab, tagged with its owning tab.
    ///
    /// Used to build the search index.
    pub async fn all_sounds(&self) -> Result<Vec<Sound>> {
        let value = self.get_value("/api/sounds/all").await?;
        let dtos: Vec<SoundDto> = decode_items(value, "sound")?;
        Ok(dtos
            .into_iter()
            .filter_map(|d| {
                let path = d.path.clone();
                let sound = d.into_tagged_sound();
                if sound.is_none() {
                    warn!(path = %path, "Skipping sound without tab id in cross-tab listing");
                }
                sound
            })
            .collect())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Request playback of a sound.
    pub async fn play_sound(&self, sound: SoundId) -> Result<PlayResponse> {
        let value = self
            .post_value(&format!("/api/sounds/{sound}/play"), None)
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse play response: {e}")))
    }

    /// Stop every active instance.
    pub async fn stop_all(&self) -> Result<()> {
        self.post_value("/api/sounds/stop", None).await.map(|_| ())
    }

    /// Fetch the full active-instance snapshot.
    ///
    /// Authoritative and complete; never a delta.
    pub async fn progress(&self) -> Result<Vec<InstanceProgress>> {
        let value = self.get_value("/api/sounds/progress").await?;
        decode_items(value, "instance")
    }

    /// Toggle global pause/resume.
    ///
    /// The effect is only observed via later progress polls or a host
    /// notification, not this call's response.
    pub async fn toggle_playback(&self) -> Result<()> {
        self.post_value("/api/playback/toggle", None)
            .await
            .map(|_| ())
    }

    /// Start talk-through.
    pub async fn start_talk_through(&self) -> Result<()> {
        self.post_value("/api/talkthrough/start", None)
            .await
            .map(|_| ())
    }

    /// Stop talk-through.
    pub async fn stop_talk_through(&self) -> Result<()> {
        self.post_value("/api/talkthrough/stop", None)
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Per-sound customization
    // ========================================================================

    /// Set or clear the backend-side favorite flag.
    pub async fn set_favorite(&self, sound: SoundId, favorite: bool) -> Result<()> {
        self.post_value(
            &format!("/api/sounds/{sound}/favorite"),
            Some(serde_json::json!({ "favorite": favorite })),
        )
        .await
        .map(|_| ())
    }

    /// Set a custom volume for a sound.
    pub async fn set_volume(&self, sound: SoundId, volume: u32) -> Result<()> {
        self.post_value(
            &format!("/api/sounds/{sound}/volume"),
            Some(serde_json::json!({ "volume": volume })),
        )
        .await
        .map(|_| ())
    }

    /// Reset a sound's volume to the global default.
    pub async fn reset_volume(&self, sound: SoundId) -> Result<()> {
        self.post_value(&format!("/api/sounds/{sound}/volume/reset"), None)
            .await
            .map(|_| ())
    }

    /// Preview a sound locally on the backend host.
    pub async fn preview(&self, sound: SoundId) -> Result<()> {
        self.post_value(&format!("/api/sounds/{sound}/preview"), None)
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    async fn get_value(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");
        let outcome = self.execute(self.http.get(&url)).await;
        self.publish_outcome(&outcome);
        outcome
    }

    async fn post_value(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");
        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let outcome = self.execute(request).await;
        self.publish_outcome(&outcome);
        outcome
    }

    fn publish_outcome(&self, outcome: &Result<Value>) {
        self.status.set(match outcome {
            Ok(_) => ConnectionStatus::Connected,
            Err(_) => ConnectionStatus::Disconnected,
        });
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::ServerUnreachable(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ClientError::Unauthorized);
        }

        let body = response.text().await.map_err(ClientError::Request)?;
        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body)
                .map_err(|e| ClientError::ParseError(format!("Invalid JSON body: {e}")))
        } else {
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: extract_error_message(&body, status.as_u16()),
            })
        }
    }
}

/// Resolve a human-readable message from an error response body:
/// a JSON `message`/`error` string field, then the truncated text body,
/// then a generic status line.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.chars().take(120).collect()
    }
}

/// Decode a JSON array item by item, skipping malformed entries with a
/// warning instead of failing the whole collection.
fn decode_items<T: DeserializeOwned>(value: Value, what: &str) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(ClientError::ParseError(format!(
            "Expected a JSON array of {what}s"
        )));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(kind = what, error = %e, "Skipping malformed item");
                None
            }
        })
        .collect())
}
