pub mod args;
pub mod classify;
pub mod connpass;
pub mod fetch;
pub mod pipeline;
pub mod query;
pub mod render;
pub mod report;
pub mod utils;

pub use args::{Args, OutputFormat};
pub use classify::{Category, Classifier, HourWindow};
pub use connpass::{ConnpassClient, Event, FetchError, SearchResult, Searcher, Series};
pub use fetch::{Paginator, Sleeper, ThreadSleeper, CRAWL_DELAY};
pub use pipeline::{collect_report, publish, RenderOutcome};
pub use query::{Param, SearchParams};
pub use render::{ConsoleRenderer, HtmlRenderer, RenderError, Renderer};
pub use report::{EventRecord, Report, ReportAssembler};
