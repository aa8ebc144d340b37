//! XMLTV programme extraction without building a DOM.
//!
//! Guide documents run to tens of megabytes and only `<programme>` elements
//! matter, so elements are located by pattern and only the children needed
//! for display are pulled out of each one.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::channel::Programme;
use crate::text::{decode_entities, truncate_description};
use crate::time_codec::parse_compact_timestamp_or;

static PROGRAMME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<programme\b([^>]*?)(?:/>|>(.*?)</programme>)").unwrap());
static ATTR_START: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:^|\s)start="([^"]*)""#).unwrap());
static ATTR_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:^|\s)stop="([^"]*)""#).unwrap());
static ATTR_CHANNEL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?:^|\s)channel="([^"]*)""#).unwrap());
static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<title[^>]*>([^<]*)</title>").unwrap());
static DESC: Lazy<Regex> = Lazy::new(|| Regex::new(r"<desc[^>]*>([^<]*)</desc>").unwrap());
static ICON: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<icon[^>]*src="([^"]*)""#).unwrap());

pub const DEFAULT_TITLE: &str = "No Title";

/// One `<programme>` element as found in the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawProgramme<'a> {
    pub start: &'a str,
    pub stop: &'a str,
    pub channel: &'a str,
    pub inner: &'a str,
}

/// A `<programme>` element that is missing a required attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MalformedElement {
    pub offset: usize,
}

fn attr<'a>(re: &Regex, attrs: &'a str) -> Option<&'a str> {
    re.captures(attrs).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Lazily scan `xml` for programme elements, in document order.
///
/// Attribute order is free, but `start`, `stop` and `channel` must all be
/// present and double-quoted.
pub fn scan_programmes(xml: &str) -> impl Iterator<Item = Result<RawProgramme<'_>, MalformedElement>> + '_ {
    PROGRAMME.captures_iter(xml).map(|caps| {
        let whole = caps.get(0).map(|m| m.start()).unwrap_or_default();
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let inner = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        match (attr(&ATTR_START, attrs), attr(&ATTR_STOP, attrs), attr(&ATTR_CHANNEL, attrs)) {
            (Some(start), Some(stop), Some(channel)) => Ok(RawProgramme { start, stop, channel, inner }),
            _ => Err(MalformedElement { offset: whole }),
        }
    })
}

impl RawProgramme<'_> {
    /// Parsed `(start, end)`; unparseable stamps fall back to `now`
    pub fn interval(&self, now: i64) -> (i64, i64) {
        (
            parse_compact_timestamp_or(Some(self.start), || now),
            parse_compact_timestamp_or(Some(self.stop), || now),
        )
    }

    /// Build the display record from the element's children
    pub fn to_programme(&self, start: i64, end: i64) -> Programme {
        let title = TITLE
            .captures(self.inner)
            .and_then(|c| c.get(1))
            .map(|m| decode_entities(m.as_str()))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let description = DESC
            .captures(self.inner)
            .and_then(|c| c.get(1))
            .map(|m| truncate_description(decode_entities(m.as_str())))
            .unwrap_or_default();
        let icon_url = ICON
            .captures(self.inner)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty());

        Programme {
            title,
            description,
            icon_url,
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple() {
        let xml = r#"<?xml version="1.0"?>
<tv>
  <channel id="ch1"><display-name>One</display-name></channel>
  <programme start="202401010800 +0000" stop="202401010830 +0000" channel="ch1">
    <title lang="en">News</title>
    <desc>Headlines &amp; weather</desc>
    <icon src="http://img/news.png" />
  </programme>
</tv>"#;
        let found: Vec<_> = scan_programmes(xml).collect();
        assert_eq!(found.len(), 1);
        let raw = found[0].unwrap();
        assert_eq!(raw.channel, "ch1");
        assert_eq!(raw.start, "202401010800 +0000");

        let (s, e) = raw.interval(0);
        let p = raw.to_programme(s, e);
        assert_eq!(p.title, "News");
        assert_eq!(p.description, "Headlines & weather");
        assert_eq!(p.icon_url.as_deref(), Some("http://img/news.png"));
        assert_eq!(p.duration_minutes(), 30.0);
    }

    #[test]
    fn test_attribute_order_is_free() {
        let xml = r#"<programme channel="c" stop="202401010900" start="202401010800"><title>X</title></programme>"#;
        let raw = scan_programmes(xml).next().unwrap().unwrap();
        assert_eq!((raw.start, raw.stop, raw.channel), ("202401010800", "202401010900", "c"));
    }

    #[test]
    fn test_missing_attribute_is_malformed() {
        let xml = r#"<tv>
<programme start="202401010800" channel="c"><title>No stop</title></programme>
<programme start="202401010800" stop="202401010900" channel="c"><title>Ok</title></programme>
</tv>"#;
        let found: Vec<_> = scan_programmes(xml).collect();
        assert_eq!(found.len(), 2);
        assert!(found[0].is_err());
        assert_eq!(found[1].unwrap().to_programme(0, 1).title, "Ok");
    }

    #[test]
    fn test_lookalike_attributes_ignored() {
        // data-start must not satisfy start
        let xml = r#"<programme data-start="202401010800" stop="202401010900" channel="c"></programme>"#;
        assert!(scan_programmes(xml).next().unwrap().is_err());
    }

    #[test]
    fn test_self_closing_element() {
        let xml = r#"<programme start="202401010800" stop="202401010900" channel="c"/>
<programme start="202401010900" stop="202401011000" channel="c"><title>Next</title></programme>"#;
        let found: Vec<_> = scan_programmes(xml).map(|r| r.unwrap()).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].to_programme(0, 1).title, DEFAULT_TITLE);
        assert_eq!(found[1].to_programme(0, 1).title, "Next");
    }

    #[test]
    fn test_defaults_and_first_child_wins() {
        let raw = RawProgramme {
            start: "",
            stop: "",
            channel: "c",
            inner: "<desc>first</desc><desc>second</desc>",
        };
        let p = raw.to_programme(0, 1);
        assert_eq!(p.title, DEFAULT_TITLE);
        assert_eq!(p.description, "first");
        assert_eq!(p.icon_url, None);
    }

    #[test]
    fn test_long_description_truncated() {
        let inner = format!("<title>T</title><desc>{}</desc>", "d".repeat(300));
        let raw = RawProgramme { start: "", stop: "", channel: "c", inner: &inner };
        let p = raw.to_programme(0, 1);
        assert_eq!(p.description, format!("{}...", "d".repeat(200)));
    }

    #[test]
    fn test_bad_timestamps_use_now() {
        let raw = RawProgramme { start: "bad", stop: "2024", channel: "c", inner: "" };
        assert_eq!(raw.interval(777), (777, 777));
    }
}
