use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::report::{EventRecord, Report};

// Include the default page template at compile time
const DEFAULT_TEMPLATE: &str = include_str!("../templates/index.html");

const PLACEHOLDERS: [&str; 3] = ["{{LastUpdate}}", "{{MorningEvents}}", "{{LunchtimeEvents}}"];

const SEPARATOR: &str = "----------------------------------------";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template is missing placeholder {0}")]
    Template(&'static str),

    #[error("console write failed: {0}")]
    Console(#[from] io::Error),
}

pub trait Renderer {
    fn render(&mut self, report: &Report) -> Result<(), RenderError>;
}

/// Fills the page template and writes it to `output`.
pub struct HtmlRenderer {
    template: String,
    output: PathBuf,
}

impl HtmlRenderer {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            output: output.into(),
        }
    }

    pub fn with_template_file(output: impl Into<PathBuf>, template: &Path) -> Result<Self> {
        info!(action = "load", component = "template_file", file_path = ?template, "Loading page template");
        if !template.exists() {
            anyhow::bail!("Template file not found: {:?}", template);
        }
        let template = fs::read_to_string(template)
            .with_context(|| format!("Failed to read template {:?}", template))?;
        check_placeholders(&template)?;

        Ok(Self {
            template,
            output: output.into(),
        })
    }

    pub fn render_to_string(&self, report: &Report) -> Result<String, RenderError> {
        check_placeholders(&self.template)?;

        let values = [
            html_escape(&report.last_update),
            table_rows(&report.morning),
            table_rows(&report.lunchtime),
        ];
        Ok(fill_template(&self.template, &values))
    }
}

fn check_placeholders(template: &str) -> Result<(), RenderError> {
    match PLACEHOLDERS.iter().find(|p| !template.contains(**p)) {
        Some(missing) => Err(RenderError::Template(*missing)),
        None => Ok(()),
    }
}

/// Substitutes every placeholder in a single left-to-right pass over the
/// template. Inserted values are never scanned again.
fn fill_template(template: &str, values: &[String; 3]) -> String {
    let extra: usize = values.iter().map(String::len).sum();
    let mut page = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some((at, idx)) = PLACEHOLDERS
        .iter()
        .enumerate()
        .filter_map(|(idx, p)| rest.find(*p).map(|at| (at, idx)))
        .min()
    {
        page.push_str(&rest[..at]);
        page.push_str(&values[idx]);
        rest = &rest[at + PLACEHOLDERS[idx].len()..];
    }

    page.push_str(rest);
    page
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, report: &Report) -> Result<(), RenderError> {
        let page = self.render_to_string(report)?;
        let io_err = |source| RenderError::Io {
            path: self.output.clone(),
            source,
        };

        let file = fs::File::create(&self.output).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(page.as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        info!(action = "write", component = "html_renderer", path = ?self.output, bytes = page.len(), "Wrote report page");
        Ok(())
    }
}

fn table_rows(records: &[EventRecord]) -> String {
    if records.is_empty() {
        return r#"<tr><td colspan="4">該当するイベントはありません</td></tr>"#.to_string();
    }

    records
        .iter()
        .map(|r| {
            format!(
                r#"<tr><td class="date">{}</td><td class="time">{}</td><td><a href="{}">{}</a></td><td><a href="{}">{}</a></td></tr>"#,
                html_escape(&r.date),
                html_escape(&r.time),
                html_escape(&r.title_link),
                html_escape(&r.title),
                html_escape(&r.group_link),
                html_escape(&r.group),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Plain-text listing: lunchtime events first, then morning events.
pub struct ConsoleRenderer<W> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn section(&mut self, label: &str, records: &[EventRecord]) -> io::Result<()> {
        writeln!(self.out, "[{}]", label)?;
        for r in records {
            writeln!(self.out, "Date:  {}", r.date)?;
            writeln!(self.out, "Start: {}", r.start_time())?;
            writeln!(self.out, "End:   {}", r.end_time())?;
            writeln!(self.out, "Title: {}", r.title)?;
            writeln!(self.out, "Link:  {}", r.title_link)?;
            writeln!(self.out, "{}", SEPARATOR)?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, report: &Report) -> Result<(), RenderError> {
        self.section("Lunchtime", &report.lunchtime)?;
        writeln!(self.out)?;
        self.section("Morning", &report.morning)?;
        writeln!(self.out, "\nLast update: {}", report.last_update)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes the embedded template to `path` so it can be customised.
pub fn init_default_template(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{:?} already exists. Remove it first if you want to reinitialize.",
            path
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_TEMPLATE)?;
    println!("Created {} with the default template", path.display());

    Ok(())
}
