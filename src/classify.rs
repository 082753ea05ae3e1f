use chrono::Timelike;

use crate::connpass::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Morning,
    Lunchtime,
}

/// Events starting at or after `earliest_start_hour` and ending no later
/// than hour `latest_end_hour` (minutes ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub earliest_start_hour: u32,
    pub latest_end_hour: u32,
}

impl HourWindow {
    pub const fn new(earliest_start_hour: u32, latest_end_hour: u32) -> Self {
        Self {
            earliest_start_hour,
            latest_end_hour,
        }
    }

    fn contains(&self, event: &Event) -> bool {
        event.started_at.hour() >= self.earliest_start_hour
            && event.ended_at.hour() <= self.latest_end_hour
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    pub morning: HourWindow,
    pub lunchtime: HourWindow,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            morning: HourWindow::new(6, 10),
            lunchtime: HourWindow::new(11, 14),
        }
    }
}

impl Classifier {
    /// Categories the event falls into. Each window is checked on its own,
    /// so overlapping windows yield both.
    pub fn classify(&self, event: &Event) -> Vec<Category> {
        if !is_single_day(event) {
            return Vec::new();
        }

        let mut categories = Vec::with_capacity(2);
        if self.morning.contains(event) {
            categories.push(Category::Morning);
        }
        if self.lunchtime.contains(event) {
            categories.push(Category::Lunchtime);
        }
        categories
    }
}

/// Start and end fall on the same calendar date, in the offset the API reports.
/// Month-spanning events with equal day-of-month are multi-day here, unlike a
/// plain day-of-month comparison.
pub fn is_single_day(event: &Event) -> bool {
    event.started_at.date_naive() == event.ended_at.date_naive()
}
