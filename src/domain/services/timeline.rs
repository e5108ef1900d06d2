//! Timeline - events in chronological order
//!
//! The non-spatial view of a model: every event, including the ones the
//! projection cannot place, ordered on the signed-year axis.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::aggregates::WorldModel;
use crate::domain::entities::{ParticipantRef, TimeInterval, WorldEvent};
use crate::domain::services::time_codec;
use crate::domain::value_objects::EventId;

/// One row of the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub event_id: EventId,
    pub event_type: String,
    /// Parsed anchor in signed years; `None` when the event has no anchor
    pub at: Option<f64>,
    /// Short label of `at`
    pub label: Option<String>,
    /// The interval as written: the instant, or `start > end`
    pub interval: String,
    pub participants: Vec<ParticipantRef>,
    pub effects: Vec<String>,
    pub branched: bool,
}

impl TimelineEntry {
    fn from_event(event: &WorldEvent) -> Self {
        let at = event.time_interval.anchor().map(time_codec::parse);
        Self {
            event_id: event.event_id.clone(),
            event_type: event.event_type.clone(),
            at,
            label: at.map(time_codec::format_short),
            interval: describe_interval(&event.time_interval),
            participants: event.participant_refs.clone(),
            effects: event.effects.clone(),
            branched: event.is_branched(),
        }
    }
}

fn describe_interval(interval: &TimeInterval) -> String {
    match interval.instant.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(instant) => instant.to_string(),
        None => format!(
            "{} > {}",
            interval.start.as_deref().unwrap_or("..."),
            interval.end.as_deref().unwrap_or("...")
        ),
    }
}

/// Every event of the model, earliest first
///
/// Events at the same instant keep their insertion order; events without an
/// anchor come last.
pub fn timeline(model: &WorldModel) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = model.events.iter().map(TimelineEntry::from_event).collect();
    // stable sort keeps insertion order on ties
    entries.sort_by(|a, b| match (a.at, b.at) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    entries
}
