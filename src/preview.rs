use crate::channel::{Channel, Programme};
use crate::text::{clean_display_name, decode_entities};
use crate::time_codec::format_time_range;
use crate::timeline::{LOADING_LABEL, NO_DATA_LABEL};

/// Text shown in the preview pane above the grid
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewCard {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub logo: Option<String>,
    pub time: String,
}

/// Card for whatever is airing on `channel` at `now_adjusted`
pub fn channel_preview(channel: &Channel, now_adjusted: i64, offset_hours: i32) -> PreviewCard {
    if let Some(current) = channel.current_programme(now_adjusted) {
        return programme_card(channel, current, offset_hours, String::new());
    }

    // Same label as the grid placeholder for this row
    let description = if channel.guide_loaded {
        NO_DATA_LABEL
    } else {
        LOADING_LABEL
    };
    PreviewCard {
        title: clean_display_name(&channel.display_name),
        description: description.to_string(),
        image: channel.logo.clone(),
        logo: channel.logo.clone(),
        time: String::new(),
    }
}

/// Card for a programme the user picked explicitly
pub fn programme_preview(channel: &Channel, programme: &Programme, offset_hours: i32) -> PreviewCard {
    programme_card(channel, programme, offset_hours, "No description.".to_string())
}

fn programme_card(channel: &Channel, programme: &Programme, offset_hours: i32, empty_desc: String) -> PreviewCard {
    let description = decode_entities(&programme.description);
    PreviewCard {
        title: decode_entities(&programme.title),
        description: if description.is_empty() { empty_desc } else { description },
        image: programme.icon_url.clone().or_else(|| channel.logo.clone()),
        logo: channel.logo.clone(),
        time: format_time_range(programme.start, programme.end, offset_hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_704_096_000_000; // 2024-01-01T08:00:00Z

    fn news() -> Programme {
        Programme {
            title: "News".into(),
            description: String::new(),
            icon_url: None,
            start: T0,
            end: T0 + 1_800_000,
        }
    }

    #[test]
    fn test_current_programme_card() {
        let mut ch = Channel::new("1", "UK - Channel One (HD)");
        ch.logo = Some("http://logo".into());
        ch.programmes = vec![news()];
        ch.guide_loaded = true;

        let card = channel_preview(&ch, T0 + 60_000, 0);
        assert_eq!(card.title, "News");
        assert_eq!(card.time, "08:00 - 08:30");
        assert_eq!(card.image.as_deref(), Some("http://logo"));
        assert_eq!(card.description, "");
    }

    #[test]
    fn test_nothing_airing() {
        let mut ch = Channel::new("1", "UK - Channel One (HD)");
        let card = channel_preview(&ch, T0, 0);
        assert_eq!(card.title, "Channel One");
        assert_eq!(card.description, LOADING_LABEL);

        ch.guide_loaded = true;
        assert_eq!(channel_preview(&ch, T0, 0).description, NO_DATA_LABEL);
    }

    #[test]
    fn test_selected_programme_card() {
        let ch = Channel::new("1", "One");
        let mut p = news();
        p.icon_url = Some("http://poster".into());
        let card = programme_preview(&ch, &p, 2);
        assert_eq!(card.description, "No description.");
        assert_eq!(card.image.as_deref(), Some("http://poster"));
        assert_eq!(card.time, "10:00 - 10:30");
    }
}
