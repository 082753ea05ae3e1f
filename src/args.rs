use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::connpass::DEFAULT_ENDPOINT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Console,
}

#[derive(Parser, Debug)]
#[command(
    name = "connpass-digest",
    about = "List morning and lunchtime connpass events for the next two weeks",
    version,
    long_about = None
)]
pub struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Path of the generated HTML page
    #[arg(short, long, default_value = "index.html")]
    pub output: PathBuf,

    /// Path to a custom page template
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Event search endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the default template to template/index.html and exit
    #[arg(long)]
    pub init: bool,
}
