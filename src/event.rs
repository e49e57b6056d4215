//! Pre-fetched game feed input.
//!
//! The feed is a JSON array of event objects in play order, as served by the game feed API with
//! `sort=1`. Only `type` and `description` drive rendering; other fields are carried for
//! diagnostics and unknown fields are ignored.

use std::path::Path;

use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::palette::Side;

/// One entry of the game feed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameEvent {
    /// Event type tag; one value marks a half-inning transition.
    #[serde(rename = "type")]
    pub kind: i64,
    /// Play-by-play text encoded into the frame.
    #[serde(default)]
    pub description: String,
    /// Feed timestamp, as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Team ids involved, away first.
    #[serde(default, rename = "teamTags", skip_serializing_if = "Vec::is_empty")]
    pub team_tags: Vec<String>,
}

impl GameEvent {
    pub fn new(kind: i64, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            created: None,
            team_tags: Vec::new(),
        }
    }
}

/// Ordered, immutable event sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFeed {
    events: Vec<GameEvent>,
}

impl EventFeed {
    pub fn new(events: Vec<GameEvent>) -> Self {
        Self { events }
    }

    pub fn from_json_str(s: &str) -> QrfeedResult<Self> {
        let events: Vec<GameEvent> = serde_json::from_str(s)
            .map_err(|e| QrfeedError::serde(format!("invalid event feed: {e}")))?;
        Ok(Self { events })
    }

    pub fn from_path(path: &Path) -> QrfeedResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            QrfeedError::Other(anyhow::anyhow!(
                "failed to read event feed '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&s)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Team ids of the first event (away, home), when the feed carries them.
    pub fn team_tags(&self) -> Option<(&str, &str)> {
        let first = self.events.first()?;
        match first.team_tags.as_slice() {
            [away, home, ..] => Some((away.as_str(), home.as_str())),
            _ => None,
        }
    }
}

/// Side metadata for one game: side A is the away team, side B the home team.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SidePair {
    #[serde(alias = "away")]
    pub side_a: Side,
    #[serde(alias = "home")]
    pub side_b: Side,
}

impl SidePair {
    pub fn from_json_str(s: &str) -> QrfeedResult<Self> {
        serde_json::from_str(s).map_err(|e| QrfeedError::serde(format!("invalid side metadata: {e}")))
    }

    pub fn from_path(path: &Path) -> QrfeedResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            QrfeedError::Other(anyhow::anyhow!(
                "failed to read side metadata '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&s)
    }
}
