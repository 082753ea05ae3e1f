use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::Path;
use tracing::{error, info};

use connpass_digest::render::init_default_template;
use connpass_digest::utils::{setup_logging, validate_args};
use connpass_digest::{
    collect_report, publish, Args, Classifier, ConnpassClient, ConsoleRenderer, HtmlRenderer,
    OutputFormat, RenderOutcome, Renderer, ThreadSleeper,
};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    if args.init {
        return init_default_template(Path::new("template/index.html"));
    }

    validate_args(&args)?;

    // Build the renderer up front so a bad template fails before any request
    let mut renderer: Box<dyn Renderer> = match args.format {
        OutputFormat::Html => match &args.template {
            Some(path) => Box::new(HtmlRenderer::with_template_file(&args.output, path)?),
            None => Box::new(HtmlRenderer::new(&args.output)),
        },
        OutputFormat::Console => Box::new(ConsoleRenderer::new(std::io::stdout().lock())),
    };

    let client = ConnpassClient::new(args.endpoint.as_str())
        .context("Failed to build HTTP client")?;

    let now = Local::now();
    let report = match collect_report(
        &client,
        ThreadSleeper,
        &Classifier::default(),
        now.date_naive(),
        now.naive_local(),
    ) {
        Ok(report) => report,
        Err(e) => {
            error!(action = "fetch", component = "main", error = %e, "Event search failed");
            std::process::exit(1);
        }
    };

    match publish(&report, renderer.as_mut()) {
        RenderOutcome::Written => info!(action = "complete", component = "main", "Report published"),
        RenderOutcome::Failed => info!(
            action = "complete",
            component = "main",
            "Report collected but not published"
        ),
    }

    Ok(())
}
