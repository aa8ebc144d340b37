//! Channel-grid geometry: where each programme block sits for a viewport.

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, Programme};
use crate::time_codec::{format_clock_time, snap_to_half_hour, HALF_HOUR_MS, MINUTE_MS};

pub const PIXELS_PER_MIN: f64 = 12.0;
/// Minutes moved by the grid's left/right arrows
pub const SHIFT_STEP_MINUTES: i64 = 30;
/// Labels rendered in the timeline header
pub const HEADER_MARKERS: usize = 8;

const LABEL_INSET_PX: f64 = 10.0;

pub const LOADING_LABEL: &str = "Loading Guide...";
pub const NO_DATA_LABEL: &str = "No Program Information";

/// Visible time window of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub view_start: i64,
    pub pixels_per_minute: f64,
}

impl Viewport {
    pub fn new(view_start: i64, pixels_per_minute: f64) -> Self {
        Self {
            view_start,
            pixels_per_minute,
        }
    }

    /// Viewport starting at the half-hour containing `now_adjusted`
    pub fn at_now(now_adjusted: i64) -> Self {
        Self::new(snap_to_half_hour(now_adjusted), PIXELS_PER_MIN)
    }

    pub fn reset(&mut self, now_adjusted: i64) {
        self.view_start = snap_to_half_hour(now_adjusted);
    }

    pub fn shift(&mut self, minutes: i64) {
        self.view_start += minutes * MINUTE_MS;
    }

    pub fn shift_forward(&mut self) {
        self.shift(SHIFT_STEP_MINUTES);
    }

    pub fn shift_back(&mut self) {
        self.shift(-SHIFT_STEP_MINUTES);
    }

    /// Jump so that `start` is at the left edge
    pub fn focus(&mut self, start: i64) {
        self.view_start = start;
    }

    /// Horizontal pixel position of an instant
    pub fn x_of(&self, instant: i64) -> f64 {
        (instant - self.view_start) as f64 / MINUTE_MS as f64 * self.pixels_per_minute
    }
}

/// Culling bounds in pixels relative to the viewport's left edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderMargin {
    pub before: f64,
    pub after: f64,
}

impl Default for RenderMargin {
    fn default() -> Self {
        Self {
            before: 50.0,
            after: 4000.0,
        }
    }
}

/// A programme placed on the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgrammeBlock<'a> {
    pub programme: &'a Programme,
    pub left_px: f64,
    pub width_px: f64,
    pub is_current: bool,
    /// Keeps the label readable when the block starts off-screen left
    pub label_inset_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Loading,
    NoData,
}

impl Placeholder {
    pub fn label(&self) -> &'static str {
        match self {
            Placeholder::Loading => LOADING_LABEL,
            Placeholder::NoData => NO_DATA_LABEL,
        }
    }
}

/// What one channel row renders
#[derive(Debug, Clone, PartialEq)]
pub enum RowLayout<'a> {
    Blocks(Vec<ProgrammeBlock<'a>>),
    /// Single full-width block for channels without programmes
    Placeholder(Placeholder),
}

pub fn layout_programme<'a>(programme: &'a Programme, viewport: &Viewport, now_adjusted: i64) -> ProgrammeBlock<'a> {
    let left_px = viewport.x_of(programme.start);
    let width_px = programme.duration_minutes() * viewport.pixels_per_minute;
    let label_inset_px = if left_px < 0.0 {
        left_px.abs() + LABEL_INSET_PX
    } else {
        LABEL_INSET_PX
    };
    ProgrammeBlock {
        programme,
        left_px,
        width_px,
        is_current: programme.is_current(now_adjusted),
        label_inset_px,
    }
}

/// Lay out a channel row, culling blocks outside `margin`
pub fn layout_row<'a>(
    channel: &'a Channel,
    viewport: &Viewport,
    now_adjusted: i64,
    margin: RenderMargin,
) -> RowLayout<'a> {
    if channel.programmes.is_empty() {
        return RowLayout::Placeholder(if channel.guide_loaded {
            Placeholder::NoData
        } else {
            Placeholder::Loading
        });
    }

    let blocks = channel
        .programmes
        .iter()
        .map(|p| layout_programme(p, viewport, now_adjusted))
        .filter(|b| b.left_px + b.width_px >= -margin.before && b.left_px <= margin.after)
        .collect();
    RowLayout::Blocks(blocks)
}

/// Header tick: a time label every half hour from the viewport start
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMarker {
    pub instant: i64,
    pub left_px: f64,
    pub label: String,
}

pub fn time_markers(viewport: &Viewport, offset_hours: i32, count: usize) -> Vec<TimeMarker> {
    (0..count as i64)
        .map(|i| {
            let instant = viewport.view_start + i * HALF_HOUR_MS;
            TimeMarker {
                instant,
                left_px: viewport.x_of(instant),
                label: format_clock_time(instant, offset_hours),
            }
        })
        .collect()
}

/// Pixel position of the vertical "now" line
pub fn now_line_px(viewport: &Viewport, now_adjusted: i64) -> f64 {
    viewport.x_of(now_adjusted)
}
