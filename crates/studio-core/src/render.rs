//! Turn API responses into terminal output.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use comfy_table::{Table, modifiers, presets};
use uuid::Uuid;

use crate::error::RenderError;
use crate::ir::{Command, HttpMethod};

use crate::client::HttpResponse;

/// Analytics endpoints that answer with CSV.
pub const CSV_COMMANDS: [&str; 2] = [
    "show_perspectives_insights_overview",
    "show_perspectives_insights_users",
];

/// Table styles for CSV responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Plain,
    Simple,
    Grid,
    FancyGrid,
    Github,
    Psql,
    RoundedGrid,
}

impl TableFormat {
    pub const ALL: [TableFormat; 7] = [
        TableFormat::Plain,
        TableFormat::Simple,
        TableFormat::Grid,
        TableFormat::FancyGrid,
        TableFormat::Github,
        TableFormat::Psql,
        TableFormat::RoundedGrid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableFormat::Plain => "plain",
            TableFormat::Simple => "simple",
            TableFormat::Grid => "grid",
            TableFormat::FancyGrid => "fancy_grid",
            TableFormat::Github => "github",
            TableFormat::Psql => "psql",
            TableFormat::RoundedGrid => "rounded_grid",
        }
    }

    fn apply(&self, table: &mut Table) {
        match self {
            TableFormat::Plain => {
                table.load_preset(presets::NOTHING);
            }
            TableFormat::Simple => {
                table.load_preset(presets::ASCII_HORIZONTAL_ONLY);
            }
            TableFormat::Grid => {
                table.load_preset(presets::ASCII_FULL);
            }
            TableFormat::FancyGrid => {
                table.load_preset(presets::UTF8_FULL);
            }
            TableFormat::Github => {
                table.load_preset(presets::ASCII_MARKDOWN);
            }
            TableFormat::Psql => {
                table.load_preset(presets::ASCII_FULL_CONDENSED);
            }
            TableFormat::RoundedGrid => {
                table
                    .load_preset(presets::UTF8_FULL)
                    .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
            }
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableFormat::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown table format: {s}"))
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub table_format: Option<TableFormat>,
    /// Where downloaded media is written.
    pub output_dir: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table_format: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Render a successful response for `command`.
///
/// Checked in order: JSON bodies, `download_*` commands, CSV analytics with a
/// table format, empty non-GET bodies, then raw text.
pub fn render(
    command: &Command,
    response: &HttpResponse,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let content_type = response.content_type();

    if content_type == "application/json" {
        let value: serde_json::Value = serde_json::from_slice(&response.body)?;
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    if command.name.starts_with("download_") {
        return save_download(content_type, response, options);
    }

    if let Some(format) = options.table_format {
        if CSV_COMMANDS.contains(&command.name.as_str()) {
            return csv_table(&response.body, format);
        }
    }

    if command.method != HttpMethod::Get && response.body.is_empty() {
        let status = response.status.as_u16();
        let description = command
            .operation
            .response(status)
            .map(|r| r.description.as_str())
            .unwrap_or("");
        return Ok(format!("{status}: {description}"));
    }

    Ok(response.text())
}

fn save_download(
    content_type: &str,
    response: &HttpResponse,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let extension = match content_type {
        "video/mp4" | "audio/mp4" => "mp4",
        // captions come back as text/plain
        _ => "str",
    };

    let path = options
        .output_dir
        .join(format!("{}.{extension}", Uuid::new_v4()));
    fs::write(&path, &response.body).map_err(|source| RenderError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(format!(
        "Downloaded {content_type} content to {}",
        path.display()
    ))
}

/// Render CSV (first row is the header) as a table.
pub fn csv_table(body: &[u8], format: TableFormat) -> Result<String, RenderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    let mut table = Table::new();
    format.apply(&mut table);
    table.set_header(reader.headers()?.iter());
    for record in reader.records() {
        table.add_row(record?.iter());
    }

    Ok(table.to_string())
}
