use chrono::{NaiveDate, NaiveDateTime};
use std::time::Instant;
use tracing::{info, warn};

use crate::classify::Classifier;
use crate::connpass::{FetchError, Searcher};
use crate::fetch::{Paginator, Sleeper};
use crate::query;
use crate::render::Renderer;
use crate::report::{Report, ReportAssembler};

/// Fetches every event in the window starting at `today` and sorts the
/// matching ones into a report. Any fetch error aborts the whole run.
pub fn collect_report<S: Searcher, Z: Sleeper>(
    searcher: &S,
    sleeper: Z,
    classifier: &Classifier,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Result<Report, FetchError> {
    let start_time = Instant::now();
    info!(action = "start", component = "pipeline", today = %today, "Collecting events");

    let mut paginator = Paginator::new(searcher, sleeper, query::base_params(today));
    let mut assembler = ReportAssembler::new();
    let mut seen = 0usize;

    for event in paginator.by_ref() {
        let event = event?;
        seen += 1;
        assembler.push(&event, &classifier.classify(&event));
    }

    let report = assembler.finish(now);
    info!(
        action = "complete",
        component = "pipeline",
        requests = paginator.requests(),
        events_seen = seen,
        morning = report.morning.len(),
        lunchtime = report.lunchtime.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Event collection completed"
    );
    Ok(report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Written,
    Failed,
}

/// Hands the report to a renderer. A render failure is logged and reported,
/// but the report itself stays valid and the run is still considered
/// successful.
pub fn publish<R: Renderer + ?Sized>(report: &Report, renderer: &mut R) -> RenderOutcome {
    match renderer.render(report) {
        Ok(()) => RenderOutcome::Written,
        Err(e) => {
            warn!(action = "render", component = "pipeline", error = %e, "Failed to render report");
            RenderOutcome::Failed
        }
    }
}
