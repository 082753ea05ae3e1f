use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Maximum page size the connpass API accepts.
pub const PAGE_SIZE: u32 = 100;

/// Number of days (starting today) covered by a run.
pub const WINDOW_DAYS: u64 = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("count must be between 1 and 100, got {0}")]
    InvalidCount(u32),

    #[error("start offset is 1-based, got {0}")]
    InvalidStart(u32),

    #[error("parameter `{0}` given more than once")]
    Duplicate(&'static str),
}

/// Sort order codes understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    UpdatedAt = 1,
    Date = 2,
    New = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Count(u32),
    Order(Order),
    YearMonthDay(NaiveDate),
    Start(u32),
}

impl Param {
    fn key(&self) -> &'static str {
        match self {
            Param::Count(_) => "count",
            Param::Order(_) => "order",
            Param::YearMonthDay(_) => "ymd",
            Param::Start(_) => "start",
        }
    }

    fn value(&self) -> String {
        match self {
            Param::Count(n) | Param::Start(n) => n.to_string(),
            Param::Order(order) => (*order as u8).to_string(),
            Param::YearMonthDay(date) => date.format("%Y%m%d").to_string(),
        }
    }
}

/// The part of the query shared by every page request: page size, date
/// ordering and one `ymd` selector per day of the window.
pub fn base_params(today: NaiveDate) -> Vec<Param> {
    let mut params = vec![Param::Count(PAGE_SIZE), Param::Order(Order::Date)];
    params.extend(
        (0..WINDOW_DAYS)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .map(Param::YearMonthDay),
    );
    params
}

/// A validated, ordered set of search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    entries: Vec<Param>,
}

impl SearchParams {
    pub fn new(entries: Vec<Param>) -> Result<Self, QueryError> {
        let mut seen_count = false;
        let mut seen_order = false;
        let mut seen_start = false;

        for entry in &entries {
            let seen = match entry {
                Param::Count(n) => {
                    if *n == 0 || *n > PAGE_SIZE {
                        return Err(QueryError::InvalidCount(*n));
                    }
                    &mut seen_count
                }
                Param::Start(n) => {
                    if *n == 0 {
                        return Err(QueryError::InvalidStart(*n));
                    }
                    &mut seen_start
                }
                Param::Order(_) => &mut seen_order,
                Param::YearMonthDay(_) => continue,
            };
            if *seen {
                return Err(QueryError::Duplicate(entry.key()));
            }
            *seen = true;
        }

        Ok(Self { entries })
    }

    /// Base parameters plus the page offset.
    pub fn with_start(base: &[Param], start: u32) -> Result<Self, QueryError> {
        let mut entries = base.to_vec();
        entries.push(Param::Start(start));
        Self::new(entries)
    }

    pub fn entries(&self) -> &[Param] {
        &self.entries
    }

    pub fn start(&self) -> Option<u32> {
        self.entries.iter().find_map(|p| match p {
            Param::Start(n) => Some(*n),
            _ => None,
        })
    }

    /// Query-string form, e.g. `count=100&order=2&ymd=20261019&start=1`.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for entry in &self.entries {
            serializer.append_pair(entry.key(), &entry.value());
        }
        serializer.finish()
    }
}
