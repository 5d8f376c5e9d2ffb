//! Catalog DTOs as decoded from the content API.
//!
//! Field names follow the API's snake_case JSON. Every list defaults to empty
//! so partially populated objects still decode.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonList {
    #[serde(default, rename = "objects")]
    pub seasons: Vec<Season>,
}

/// One championship year ("2021 Season").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
    #[serde(default)]
    pub year: u16,
    #[serde(default, rename = "self")]
    pub self_url: String,
    #[serde(default, rename = "eventoccurrence_urls")]
    pub event_ids: Vec<String>,
}

/// A race weekend (Australian GP, Bahrain GP, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub official_name: String,
    #[serde(default, rename = "self")]
    pub self_url: String,
    #[serde(default, rename = "sessionoccurrence_urls")]
    pub session_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Live,
    Upcoming,
    Expired,
    Replay,
    #[default]
    #[serde(other)]
    Other,
}

/// A timed segment of an event (FP1, qualifying, race, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub slug: String,
    #[serde(default, rename = "content_urls")]
    pub bonus_content_ids: Vec<String>,
}

impl Session {
    pub fn is_live(&self) -> bool {
        self.status == SessionStatus::Live
    }

    /// Upcoming and expired sessions have no streams to offer.
    pub fn has_streams(&self) -> bool {
        !matches!(self.status, SessionStatus::Upcoming | SessionStatus::Expired)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamsBundle {
    #[serde(default, rename = "objects")]
    pub groups: Vec<StreamGroup>,
}

impl StreamsBundle {
    /// Perspectives of the first stream group, empty when the bundle has none.
    pub fn perspectives(&self) -> &[Perspective] {
        self.groups
            .first()
            .map(|g| g.perspectives.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamGroup {
    #[serde(default, rename = "channel_urls")]
    pub perspectives: Vec<Perspective>,
}

/// One camera or data feed of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub name: String,
    #[serde(default, rename = "self")]
    pub self_url: String,
    #[serde(default, rename = "driver_urls")]
    pub drivers: Vec<DriverRef>,
}

impl Perspective {
    pub fn driver_number(&self) -> Option<u32> {
        self.drivers.first().map(|d| d.racing_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverRef {
    #[serde(rename = "driver_racingnumber")]
    pub racing_number: u32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// An archived programme. `items` holds the playable asset ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default)]
    pub uid: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, rename = "data_source_id")]
    pub data_source_id: String,
}

/// Archive category ("Full Race Replays", "Documentaries", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VodType {
    pub name: String,
    #[serde(default, rename = "content_urls")]
    pub content_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VodTypeList {
    #[serde(default, rename = "objects")]
    pub vod_types: Vec<VodType>,
}

// ── Homepage feed ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomepageContent {
    #[serde(default)]
    pub objects: Vec<HomeObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeObject {
    #[serde(default)]
    pub items: Vec<HomeItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeItem {
    #[serde(default)]
    pub content_url: HomeSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeSet {
    #[serde(default)]
    pub items: Vec<HomeSetItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeSetItem {
    #[serde(default)]
    pub content_url: ContentRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRef {
    #[serde(default, rename = "self")]
    pub self_url: String,
}

impl HomepageContent {
    /// The leading content reference of the feed: first object, first item,
    /// first entry of its set.
    pub fn first_content_url(&self) -> Option<&str> {
        let url = &self
            .objects
            .first()?
            .items
            .first()?
            .content_url
            .items
            .first()?
            .content_url
            .self_url;
        (!url.is_empty()).then_some(url.as_str())
    }
}
