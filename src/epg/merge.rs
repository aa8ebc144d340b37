use std::collections::HashSet;

use crate::channel::{Channel, Programme};
use crate::epg::index::{GuideMatch, IdentityIndex};

/// Drop repeated start times (first seen wins), then sort by start.
pub fn dedup_and_sort(candidates: &[Programme]) -> Vec<Programme> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut unique: Vec<Programme> = candidates
        .iter()
        .filter(|p| seen.insert(p.start))
        .cloned()
        .collect();
    unique.sort_by_key(|p| p.start);
    unique
}

/// Replace every channel's guide with its matched candidates.
///
/// Runs for every channel, matched or not; all come back with
/// `guide_loaded = true`.
pub fn merge_guide(channels: &[Channel], index: &IdentityIndex) -> Vec<Channel> {
    channels
        .iter()
        .map(|channel| {
            let programmes = match index.lookup(channel) {
                GuideMatch::Exact(list) | GuideMatch::Normalized(list) => dedup_and_sort(list),
                GuideMatch::Empty | GuideMatch::Unregistered => Vec::new(),
            };
            Channel {
                programmes,
                guide_loaded: true,
                ..channel.clone()
            }
        })
        .collect()
}
