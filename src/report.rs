use chrono::{Datelike, NaiveDateTime};
use std::borrow::Cow;

use crate::classify::Category;
use crate::connpass::Event;

const WEEKDAY_LABELS: [(&str, &str); 7] = [
    ("Sun", "日"),
    ("Mon", "月"),
    ("Tue", "火"),
    ("Wed", "水"),
    ("Thu", "木"),
    ("Fri", "金"),
    ("Sat", "土"),
];

const LAST_UPDATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Japanese single-character label for an English weekday abbreviation.
/// Unknown input is returned unchanged.
pub fn weekday_label(abbrev: &str) -> Cow<'_, str> {
    WEEKDAY_LABELS
        .iter()
        .find(|(en, _)| *en == abbrev)
        .map_or(Cow::Borrowed(abbrev), |(_, ja)| Cow::Borrowed(*ja))
}

/// Display-ready form of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// `M/D(曜)`, e.g. `10/20(火)`
    pub date: String,
    /// `HH:MM - HH:MM`
    pub time: String,
    pub title: String,
    pub title_link: String,
    pub group: String,
    pub group_link: String,
}

impl EventRecord {
    pub fn start_time(&self) -> &str {
        self.time.split(" - ").next().unwrap_or_default()
    }

    pub fn end_time(&self) -> &str {
        self.time.split(" - ").nth(1).unwrap_or_default()
    }
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        let start = event.started_at;
        let weekday = start.format("%a").to_string();

        Self {
            date: format!("{}/{}({})", start.month(), start.day(), weekday_label(&weekday)),
            time: format!(
                "{} - {}",
                start.format("%H:%M"),
                event.ended_at.format("%H:%M")
            ),
            title: event.title.clone(),
            title_link: event.url.clone(),
            group: event.series.title.clone(),
            group_link: event.series.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub last_update: String,
    pub morning: Vec<EventRecord>,
    pub lunchtime: Vec<EventRecord>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.lunchtime.is_empty()
    }
}

/// Collects classified events in arrival order.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    morning: Vec<EventRecord>,
    lunchtime: Vec<EventRecord>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &Event, categories: &[Category]) {
        for category in categories {
            let bucket = match category {
                Category::Morning => &mut self.morning,
                Category::Lunchtime => &mut self.lunchtime,
            };
            bucket.push(EventRecord::from(event));
        }
    }

    pub fn finish(self, now: NaiveDateTime) -> Report {
        Report {
            last_update: now.format(LAST_UPDATE_FORMAT).to_string(),
            morning: self.morning,
            lunchtime: self.lunchtime,
        }
    }
}
