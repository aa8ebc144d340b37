//! Channel and programme records shared by the guide pipeline and the UI.

use serde::{Deserialize, Serialize};

use crate::api::{get_id_str, Category, Stream, XtreamClient};
use crate::time_codec::MINUTE_MS;

/// One scheduled guide entry. `start`/`end` are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Programme {
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "icon", default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub start: i64,
    pub end: i64,
}

impl Programme {
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start) as f64 / MINUTE_MS as f64
    }

    /// Airing at `now` (already offset-adjusted)
    pub fn is_current(&self, now: i64) -> bool {
        now >= self.start && now < self.end
    }
}

/// A tunable live stream plus its guide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(rename = "tvg_id", default, skip_serializing_if = "Option::is_none")]
    pub external_guide_id: Option<String>,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "cat_name", default)]
    pub category_name: String,
    #[serde(rename = "cat_id", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "stream", default)]
    pub stream_url: String,
    /// Sorted ascending by start, unique starts
    #[serde(rename = "epg", default)]
    pub programmes: Vec<Programme>,
    /// True once an ingestion pass finished for this channel, even with no matches
    #[serde(rename = "epgLoaded", default)]
    pub guide_loaded: bool,
}

impl Channel {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external_guide_id: None,
            display_name: display_name.into(),
            category_name: String::new(),
            category_id: None,
            num: None,
            logo: None,
            stream_url: String::new(),
            programmes: Vec::new(),
            guide_loaded: false,
        }
    }

    pub fn with_guide_id(mut self, guide_id: impl Into<String>) -> Self {
        self.external_guide_id = Some(guide_id.into());
        self
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.category_name = name.into();
        self
    }

    /// Build a channel from a live stream record
    pub fn from_stream(stream: &Stream, categories: &[Category], client: &XtreamClient) -> Self {
        let id = get_id_str(&stream.stream_id);
        let guide_id = stream
            .epg_channel_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        let category_name = stream
            .category_id
            .as_ref()
            .and_then(|cid| categories.iter().find(|c| &c.category_id == cid))
            .map(|c| c.category_name.clone())
            .unwrap_or_else(|| "General".to_string());

        Self {
            stream_url: client.get_stream_url(&id),
            external_guide_id: Some(guide_id),
            display_name: stream.name.clone(),
            category_name,
            category_id: stream.category_id.clone(),
            num: stream.number(),
            logo: stream.stream_icon.clone().filter(|s| !s.is_empty()),
            programmes: Vec::new(),
            guide_loaded: false,
            id,
        }
    }

    /// Programme airing at `now`, if any
    pub fn current_programme(&self, now: i64) -> Option<&Programme> {
        self.programmes.iter().find(|p| p.is_current(now))
    }
}

/// Map live streams to channels, ordered by provider number (unnumbered last)
pub fn build_channel_list(streams: &[Stream], categories: &[Category], client: &XtreamClient) -> Vec<Channel> {
    let mut channels: Vec<Channel> = streams
        .iter()
        .map(|s| Channel::from_stream(s, categories, client))
        .collect();
    channels.sort_by_key(|c| c.num.unwrap_or(i64::MAX));
    channels
}
