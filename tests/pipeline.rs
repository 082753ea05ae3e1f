use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use connpass_digest::{
    collect_report, publish, Classifier, Event, FetchError, Param, RenderError, RenderOutcome,
    Renderer, Report, SearchParams, SearchResult, Searcher, Series, Sleeper, CRAWL_DELAY,
};

/// Shared log of requests and sleeps, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Search(String),
    Sleep(Duration),
}

type CallLog = RefCell<Vec<Call>>;

struct ScriptedSearcher<'a> {
    pages: RefCell<VecDeque<Result<SearchResult, FetchError>>>,
    log: &'a CallLog,
}

impl<'a> ScriptedSearcher<'a> {
    fn new(log: &'a CallLog, pages: Vec<Result<SearchResult, FetchError>>) -> Self {
        Self {
            pages: RefCell::new(pages.into()),
            log,
        }
    }
}

impl Searcher for ScriptedSearcher<'_> {
    fn search(&self, params: &SearchParams) -> Result<SearchResult, FetchError> {
        self.log.borrow_mut().push(Call::Search(params.encode()));
        self.pages
            .borrow_mut()
            .pop_front()
            .expect("request issued after the last page")
    }
}

struct RecordingSleeper<'a>(&'a CallLog);

impl Sleeper for RecordingSleeper<'_> {
    fn sleep(&mut self, duration: Duration) {
        self.0.borrow_mut().push(Call::Sleep(duration));
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn now() -> NaiveDateTime {
    today().and_hms_opt(5, 30, 0).unwrap()
}

fn event(title: &str, start: &str, end: &str) -> Event {
    Event {
        title: title.to_string(),
        url: format!("https://example.connpass.com/event/{title}/"),
        started_at: DateTime::parse_from_rfc3339(start).unwrap(),
        ended_at: DateTime::parse_from_rfc3339(end).unwrap(),
        series: Series {
            title: "group".to_string(),
            url: "https://group.connpass.com/".to_string(),
        },
    }
}

fn evening(title: &str) -> Event {
    event(title, "2026-10-20T19:00:00+09:00", "2026-10-20T21:00:00+09:00")
}

fn page(start: u32, events: Vec<Event>, available: u32) -> Result<SearchResult, FetchError> {
    Ok(SearchResult {
        results_start: start,
        results_returned: events.len() as u32,
        results_available: available,
        events,
    })
}

fn run(log: &CallLog, pages: Vec<Result<SearchResult, FetchError>>) -> Result<Report, FetchError> {
    let searcher = ScriptedSearcher::new(log, pages);
    collect_report(
        &searcher,
        RecordingSleeper(log),
        &Classifier::default(),
        today(),
        now(),
    )
}

fn searches(log: &CallLog) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Search(q) => Some(q.clone()),
            Call::Sleep(_) => None,
        })
        .collect()
}

#[test]
fn single_page_morning_and_lunchtime() {
    let log = CallLog::default();
    let report = run(
        &log,
        vec![page(
            1,
            vec![
                event("A", "2026-10-20T09:00:00+09:00", "2026-10-20T09:45:00+09:00"),
                event("B", "2026-10-20T12:00:00+09:00", "2026-10-20T13:30:00+09:00"),
            ],
            2,
        )],
    )
    .unwrap();

    assert_eq!(report.morning.len(), 1);
    assert_eq!(report.morning[0].title, "A");
    assert_eq!(report.morning[0].date, "10/20(火)");
    assert_eq!(report.morning[0].time, "09:00 - 09:45");
    assert_eq!(report.lunchtime.len(), 1);
    assert_eq!(report.lunchtime[0].title, "B");
    assert_eq!(report.last_update, "2026/10/19 05:30");

    let calls = log.borrow();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::Search(q) if q.starts_with("count=100&order=2&ymd=20261019&")));
}

#[test]
fn request_carries_fourteen_day_window() {
    let log = CallLog::default();
    run(&log, vec![page(1, Vec::new(), 0)]).unwrap();

    let query = &searches(&log)[0];
    assert_eq!(query.matches("ymd=").count(), 14);
    assert!(query.contains("ymd=20261101"));
    assert!(!query.contains("ymd=20261102"));
    assert!(query.ends_with("&start=1"));
}

#[test]
fn two_pages_sleep_once_between_requests() {
    let log = CallLog::default();
    let first: Vec<Event> = (0..100).map(|i| evening(&format!("e{i}"))).collect();
    let mut second: Vec<Event> = (100..149).map(|i| evening(&format!("e{i}"))).collect();
    second.push(event("late", "2026-10-31T07:00:00+09:00", "2026-10-31T08:00:00+09:00"));

    let report = run(&log, vec![page(1, first, 150), page(101, second, 150)]).unwrap();

    let calls = log.borrow();
    assert_eq!(calls.len(), 3);
    assert!(matches!(&calls[0], Call::Search(q) if q.ends_with("start=1")));
    assert_eq!(calls[1], Call::Sleep(CRAWL_DELAY));
    assert!(matches!(&calls[2], Call::Search(q) if q.ends_with("start=101")));
    assert_eq!(CRAWL_DELAY, Duration::from_secs(5));

    assert_eq!(report.morning.len(), 1);
    assert_eq!(report.morning[0].title, "late");
    assert!(report.lunchtime.is_empty());
}

#[test]
fn request_count_bounded_by_available() {
    let log = CallLog::default();
    let pages = (0..3u32)
        .map(|p| {
            let returned = if p == 2 { 50 } else { 100 };
            let events = (0..returned).map(|i| evening(&format!("{p}-{i}"))).collect();
            page(p * 100 + 1, events, 250)
        })
        .collect();

    run(&log, pages).unwrap();

    assert_eq!(searches(&log).len(), 3);
    let sleeps = log.borrow().iter().filter(|c| matches!(c, Call::Sleep(_))).count();
    assert_eq!(sleeps, 2);
    assert!(matches!(log.borrow().last(), Some(Call::Search(_))));
}

#[test]
fn empty_first_page_gives_empty_report() {
    let log = CallLog::default();
    let report = run(&log, vec![page(1, Vec::new(), 0)]).unwrap();

    assert!(report.is_empty());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn empty_page_after_full_page_stops() {
    let log = CallLog::default();
    let first: Vec<Event> = (0..100).map(|i| evening(&format!("e{i}"))).collect();

    // Total shrank between requests
    run(&log, vec![page(1, first, 180), page(101, Vec::new(), 100)]).unwrap();

    assert_eq!(searches(&log).len(), 2);
    assert!(matches!(log.borrow().last(), Some(Call::Search(_))));
}

#[test]
fn multi_day_event_lands_in_neither_list() {
    let log = CallLog::default();
    let report = run(
        &log,
        vec![page(
            1,
            vec![event("C", "2026-10-20T23:00:00+09:00", "2026-10-21T01:00:00+09:00")],
            1,
        )],
    )
    .unwrap();

    assert!(report.is_empty());
}

#[test]
fn buckets_preserve_api_order_across_pages() {
    let log = CallLog::default();
    let mut first: Vec<Event> = (0..98).map(|i| evening(&format!("e{i}"))).collect();
    first.insert(0, event("m2", "2026-10-25T07:00:00+09:00", "2026-10-25T08:00:00+09:00"));
    first.push(event("l1", "2026-10-22T12:00:00+09:00", "2026-10-22T13:00:00+09:00"));
    let second = vec![
        event("m1", "2026-10-20T07:00:00+09:00", "2026-10-20T08:00:00+09:00"),
        event("l2", "2026-10-21T11:30:00+09:00", "2026-10-21T12:30:00+09:00"),
    ];

    let report = run(&log, vec![page(1, first, 102), page(101, second, 102)]).unwrap();

    let morning: Vec<_> = report.morning.iter().map(|r| r.title.as_str()).collect();
    let lunchtime: Vec<_> = report.lunchtime.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(morning, ["m2", "m1"]);
    assert_eq!(lunchtime, ["l1", "l2"]);
}

#[test]
fn fetch_error_aborts_without_further_requests() {
    let log = CallLog::default();
    let first: Vec<Event> = (0..100).map(|i| evening(&format!("e{i}"))).collect();
    let result = run(
        &log,
        vec![
            page(1, first, 300),
            Err(FetchError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }),
        ],
    );

    assert!(matches!(result, Err(FetchError::Api { status: 503, .. })));
    assert_eq!(searches(&log).len(), 2);
}

#[test]
fn repeated_runs_do_not_share_state() {
    let pages = || {
        vec![page(
            1,
            vec![event("A", "2026-10-20T09:00:00+09:00", "2026-10-20T09:45:00+09:00")],
            1,
        )]
    };

    let first = run(&CallLog::default(), pages()).unwrap();
    let second = run(&CallLog::default(), pages()).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.morning.len(), 1);
}

struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&mut self, _report: &Report) -> Result<(), RenderError> {
        Err(RenderError::Console(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "closed",
        )))
    }
}

#[test]
fn render_failure_is_reported_not_fatal() {
    let log = CallLog::default();
    let report = run(
        &log,
        vec![page(
            1,
            vec![event("B", "2026-10-20T12:00:00+09:00", "2026-10-20T13:30:00+09:00")],
            1,
        )],
    )
    .unwrap();

    assert_eq!(publish(&report, &mut FailingRenderer), RenderOutcome::Failed);
    assert_eq!(report.lunchtime.len(), 1);
}

#[test]
fn html_report_written_to_disk() {
    let log = CallLog::default();
    let report = run(
        &log,
        vec![page(
            1,
            vec![event("A", "2026-10-20T09:00:00+09:00", "2026-10-20T09:45:00+09:00")],
            1,
        )],
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("index.html");
    let mut renderer = connpass_digest::HtmlRenderer::new(&output);

    assert_eq!(publish(&report, &mut renderer), RenderOutcome::Written);
    let page = std::fs::read_to_string(&output).unwrap();
    assert!(page.contains("https://example.connpass.com/event/A/"));
    assert!(page.contains("10/20(火)"));
}

#[test]
fn base_params_are_fixed_for_the_run() {
    let base = connpass_digest::query::base_params(today());
    let first = SearchParams::with_start(&base, 1).unwrap();
    let second = SearchParams::with_start(&base, 101).unwrap();

    assert_eq!(first.entries()[..16], second.entries()[..16]);
    assert_eq!(first.entries()[16], Param::Start(1));
    assert_eq!(second.entries()[16], Param::Start(101));
}
