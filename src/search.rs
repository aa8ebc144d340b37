use crate::channel::{Channel, Programme};

/// A guide entry that matched a search, with the channel it airs on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgrammeHit<'a> {
    pub channel: &'a Channel,
    pub programme: &'a Programme,
}

pub fn search_channels<'a>(channels: &'a [Channel], query: &str) -> Vec<&'a Channel> {
    let lower = query.to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    channels
        .iter()
        .filter(|c| c.display_name.to_lowercase().contains(&lower))
        .collect()
}

/// Programmes whose title contains `query` and that haven't ended yet,
/// earliest first
pub fn search_programmes<'a>(channels: &'a [Channel], query: &str, now_adjusted: i64) -> Vec<ProgrammeHit<'a>> {
    let lower = query.to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<ProgrammeHit<'a>> = channels
        .iter()
        .flat_map(|channel| {
            channel
                .programmes
                .iter()
                .filter(|p| p.end > now_adjusted && p.title.to_lowercase().contains(&lower))
                .map(move |programme| ProgrammeHit { channel, programme })
        })
        .collect();
    hits.sort_by_key(|h| h.programme.start);
    hits
}
