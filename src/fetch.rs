use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;

use crate::connpass::{Event, FetchError, Searcher};
use crate::query::{Param, SearchParams, PAGE_SIZE};

/// connpass.com/robots.txt: `Crawl-delay: 5`
pub const CRAWL_DELAY: Duration = Duration::from_secs(5);

pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

impl<Z: Sleeper + ?Sized> Sleeper for &mut Z {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

enum State {
    /// Next request goes out immediately.
    Ready,
    /// Current page drained; wait out the crawl delay before the next request.
    Throttled,
    Done,
}

/// Lazily walks every page of a search, yielding events in API order.
///
/// Holds at most one page in memory. A failed request is yielded once and
/// ends the sequence.
pub struct Paginator<'a, S, Z> {
    searcher: &'a S,
    sleeper: Z,
    base: Vec<Param>,
    start: u32,
    buffered: VecDeque<Event>,
    state: State,
    requests: usize,
}

impl<'a, S: Searcher, Z: Sleeper> Paginator<'a, S, Z> {
    pub fn new(searcher: &'a S, sleeper: Z, base: Vec<Param>) -> Self {
        Self {
            searcher,
            sleeper,
            base,
            start: 1,
            buffered: VecDeque::new(),
            state: State::Ready,
            requests: 0,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    fn fetch_page(&mut self) -> Result<(), FetchError> {
        let params = SearchParams::with_start(&self.base, self.start)?;
        info!(
            action = "request",
            component = "paginator",
            start = self.start,
            params = %params.encode(),
            "Searching events"
        );

        self.requests += 1;
        let page = self.searcher.search(&params)?;
        info!(
            action = "page",
            component = "paginator",
            results_start = page.results_start,
            results_returned = page.results_returned,
            results_available = page.results_available,
            event_count = page.events.len(),
            "Received page"
        );

        if page.events.is_empty() {
            self.state = State::Done;
            return Ok(());
        }

        self.state = if page.is_last_page() {
            State::Done
        } else {
            self.start += PAGE_SIZE;
            State::Throttled
        };
        self.buffered.extend(page.events);
        Ok(())
    }
}

impl<S: Searcher, Z: Sleeper> Iterator for Paginator<'_, S, Z> {
    type Item = Result<Event, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.buffered.pop_front() {
                return Some(Ok(event));
            }

            match self.state {
                State::Done => return None,
                State::Throttled => {
                    self.sleeper.sleep(CRAWL_DELAY);
                    self.state = State::Ready;
                }
                State::Ready => {}
            }

            if let Err(e) = self.fetch_page() {
                self.state = State::Done;
                return Some(Err(e));
            }
        }
    }
}
