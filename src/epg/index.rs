use std::collections::HashMap;

use crate::channel::{Channel, Programme};
use crate::text::normalize_name_key;

/// Per-cycle lookup from guide channel refs to candidate programmes.
///
/// Every channel registers its exact guide id and its normalized name. A
/// key shared by several channels has one candidate list, so a programme
/// attached through it fans out to all of them at merge time.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    exact: HashMap<String, Vec<Programme>>,
    by_name: HashMap<String, Vec<Programme>>,
}

/// Which keys a guide `channel` attribute hit
#[derive(Debug, Clone, PartialEq)]
pub struct RefMatch<'r> {
    pub exact: Option<&'r str>,
    pub name_key: Option<String>,
}

impl RefMatch<'_> {
    pub fn is_match(&self) -> bool {
        self.exact.is_some() || self.name_key.is_some()
    }
}

/// Result of looking a channel up after parsing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideMatch<'a> {
    /// Candidates registered under the channel's guide id
    Exact(&'a [Programme]),
    /// No exact candidates; found through the normalized name
    Normalized(&'a [Programme]),
    /// Registered under at least one key, but nothing was attached
    Empty,
    /// Channel has neither a guide id nor a usable name
    Unregistered,
}

impl<'a> GuideMatch<'a> {
    pub fn programmes(&self) -> &'a [Programme] {
        match self {
            GuideMatch::Exact(p) | GuideMatch::Normalized(p) => p,
            GuideMatch::Empty | GuideMatch::Unregistered => &[],
        }
    }
}

fn guide_id(channel: &Channel) -> Option<&str> {
    channel.external_guide_id.as_deref().filter(|id| !id.is_empty())
}

// Names that normalize to nothing ("---", non-Latin only) would otherwise
// collect every ref that also normalizes to nothing.
fn name_key(channel: &Channel) -> Option<String> {
    Some(normalize_name_key(&channel.display_name)).filter(|key| !key.is_empty())
}

impl IdentityIndex {
    pub fn build(channels: &[Channel]) -> Self {
        let mut index = Self::default();
        for channel in channels {
            if let Some(id) = guide_id(channel) {
                index.exact.entry(id.to_string()).or_default();
            }
            if let Some(key) = name_key(channel) {
                index.by_name.entry(key).or_default();
            }
        }
        index
    }

    /// Resolve a guide `channel` attribute against both key spaces
    pub fn resolve_ref<'r>(&self, channel_ref: &'r str) -> RefMatch<'r> {
        let exact = self.exact.contains_key(channel_ref).then_some(channel_ref);
        let key = normalize_name_key(channel_ref);
        let name_key = self.by_name.contains_key(&key).then_some(key);
        RefMatch { exact, name_key }
    }

    /// Attach a parsed programme to every list the ref matched
    pub fn attach(&mut self, hit: &RefMatch<'_>, programme: Programme) {
        match (hit.exact, hit.name_key.as_deref()) {
            (Some(id), Some(key)) => {
                if let Some(list) = self.by_name.get_mut(key) {
                    list.push(programme.clone());
                }
                if let Some(list) = self.exact.get_mut(id) {
                    list.push(programme);
                }
            }
            (Some(id), None) => {
                if let Some(list) = self.exact.get_mut(id) {
                    list.push(programme);
                }
            }
            (None, Some(key)) => {
                if let Some(list) = self.by_name.get_mut(key) {
                    list.push(programme);
                }
            }
            (None, None) => {}
        }
    }

    /// Exact id first, then normalized name
    pub fn lookup(&self, channel: &Channel) -> GuideMatch<'_> {
        let exact = guide_id(channel).and_then(|id| self.exact.get(id));
        if let Some(list) = exact.filter(|l| !l.is_empty()) {
            return GuideMatch::Exact(list);
        }
        let named = name_key(channel).and_then(|key| self.by_name.get(&key));
        if let Some(list) = named.filter(|l| !l.is_empty()) {
            return GuideMatch::Normalized(list);
        }
        if exact.is_some() || named.is_some() {
            GuideMatch::Empty
        } else {
            GuideMatch::Unregistered
        }
    }

    pub fn key_count(&self) -> (usize, usize) {
        (self.exact.len(), self.by_name.len())
    }
}
