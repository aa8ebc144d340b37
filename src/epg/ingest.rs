use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::XtreamClient;
use crate::channel::Channel;
use crate::epg::index::IdentityIndex;
use crate::epg::merge::merge_guide;
use crate::epg::parser::scan_programmes;
use crate::errors::{GuideError, Result};
use crate::time_codec::{now_ms, HOUR_MS};

/// Time range a programme must intersect to be kept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideWindow {
    pub start: i64,
    pub end: i64,
}

impl GuideWindow {
    pub const DEFAULT_HOURS_BEFORE: u32 = 4;
    pub const DEFAULT_HOURS_AFTER: u32 = 8;

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn around(now: i64, hours_before: u32, hours_after: u32) -> Self {
        Self {
            start: now - hours_before as i64 * HOUR_MS,
            end: now + hours_after as i64 * HOUR_MS,
        }
    }

    /// 4 hours back, 8 hours ahead
    pub fn default_around(now: i64) -> Self {
        Self::around(now, Self::DEFAULT_HOURS_BEFORE, Self::DEFAULT_HOURS_AFTER)
    }

    pub fn intersects(&self, start: i64, end: i64) -> bool {
        !(end <= self.start || start >= self.end)
    }
}

/// Counters for one ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IngestStats {
    pub scanned: usize,
    pub malformed: usize,
    pub unmatched: usize,
    pub out_of_window: usize,
    pub kept: usize,
}

/// Parse `xml`, match it against `channels` and return the updated list.
///
/// Pure with respect to its inputs: the caller owns replacing its channel
/// collection with the result.
pub fn ingest(channels: &[Channel], xml: &str, window: GuideWindow) -> Vec<Channel> {
    ingest_with_stats(channels, xml, window).0
}

pub fn ingest_with_stats(channels: &[Channel], xml: &str, window: GuideWindow) -> (Vec<Channel>, IngestStats) {
    let mut index = IdentityIndex::build(channels);
    let mut stats = IngestStats::default();
    // One fallback instant per pass so a doubly-broken element collapses to an
    // empty interval instead of a sliver between two clock reads.
    let now = now_ms();

    for element in scan_programmes(xml) {
        stats.scanned += 1;
        let raw = match element {
            Ok(raw) => raw,
            Err(_) => {
                stats.malformed += 1;
                continue;
            }
        };

        let hit = index.resolve_ref(raw.channel);
        if !hit.is_match() {
            stats.unmatched += 1;
            continue;
        }

        let (start, end) = raw.interval(now);
        if end <= start {
            stats.malformed += 1;
            continue;
        }
        if !window.intersects(start, end) {
            stats.out_of_window += 1;
            continue;
        }

        index.attach(&hit, raw.to_programme(start, end));
        stats.kept += 1;
    }

    debug!(
        scanned = stats.scanned,
        kept = stats.kept,
        malformed = stats.malformed,
        unmatched = stats.unmatched,
        out_of_window = stats.out_of_window,
        "guide scan finished"
    );

    (merge_guide(channels, &index), stats)
}

/// Download the provider's XMLTV document and ingest it.
///
/// Parsing runs on the blocking pool. Cancellation is checked around the
/// download and before returning, so a cancelled cycle never yields channels.
pub async fn fetch_and_ingest(
    client: &XtreamClient,
    channels: Vec<Channel>,
    window: GuideWindow,
    token: &CancellationToken,
) -> Result<Vec<Channel>> {
    info!(channels = channels.len(), "fetching guide");

    let xml = tokio::select! {
        _ = token.cancelled() => return Err(GuideError::Cancelled),
        xml = client.fetch_xmltv() => xml?,
    };
    debug!(bytes = xml.len(), "guide downloaded");

    let parsed = tokio::task::spawn_blocking(move || ingest_with_stats(&channels, &xml, window));
    let (updated, stats) = tokio::select! {
        _ = token.cancelled() => return Err(GuideError::Cancelled),
        joined = parsed => joined.map_err(|e| GuideError::Parse(e.to_string()))?,
    };

    if token.is_cancelled() {
        return Err(GuideError::Cancelled);
    }
    info!(kept = stats.kept, "guide ingested");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 60_000;

    #[test]
    fn test_window_intersection() {
        let w = GuideWindow::new(1_000, 2_000);
        assert!(w.intersects(500, 1_500));
        assert!(w.intersects(1_900, 3_000));
        assert!(w.intersects(0, 5_000));
        assert!(!w.intersects(0, 1_000));
        assert!(!w.intersects(2_000, 2_500));
    }

    #[test]
    fn test_default_window() {
        let w = GuideWindow::default_around(10 * HOUR_MS);
        assert_eq!(w.start, 6 * HOUR_MS);
        assert_eq!(w.end, 18 * HOUR_MS);
    }

    #[test]
    fn test_stats_by_reason() {
        let xml = r#"<tv>
<programme start="202401010800" stop="202401010830" channel="a"><title>Kept</title></programme>
<programme start="202401010800" stop="202401010830" channel="nobody"><title>Unmatched</title></programme>
<programme start="202401010830" stop="202401010800" channel="a"><title>Backwards</title></programme>
<programme start="202401020800" stop="202401020830" channel="a"><title>Tomorrow</title></programme>
<programme stop="202401010830" channel="a"><title>No start</title></programme>
</tv>"#;
        let channels = vec![Channel::new("1", "A").with_guide_id("a")];
        let day_start = 1_704_067_200_000; // 2024-01-01T00:00:00Z
        let window = GuideWindow::new(day_start, day_start + 12 * 60 * MIN);

        let (out, stats) = ingest_with_stats(&channels, xml, window);
        assert_eq!(
            stats,
            IngestStats { scanned: 5, malformed: 2, unmatched: 1, out_of_window: 1, kept: 1 }
        );
        assert_eq!(out[0].programmes.len(), 1);
        assert_eq!(out[0].programmes[0].title, "Kept");
    }
}
