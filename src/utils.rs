use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    let endpoint = url::Url::parse(&args.endpoint)
        .map_err(|e| anyhow::anyhow!("--endpoint is not a valid URL: {}", e))?;
    if !matches!(endpoint.scheme(), "http" | "https") {
        anyhow::bail!("--endpoint must be an http(s) URL");
    }
    if endpoint.query().is_some() {
        anyhow::bail!("--endpoint must not carry a query string");
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("--output must not be empty");
    }

    Ok(())
}
