//! Report file commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archfx_reports::{format_timestamp, FlexibleDictionaryReport, Report};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_info, print_output, print_single, print_success, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to a msgpack report (`.mp`).
    file: PathBuf,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Path to a msgpack report (`.mp`).
    file: PathBuf,
}

#[derive(Debug, Serialize, Tabled)]
struct ReadingRow {
    stream: String,
    reading_id: u64,
    timestamp: String,
    value: f64,
}

fn read_report(file: &Path) -> Result<FlexibleDictionaryReport> {
    FlexibleDictionaryReport::read(file)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to read report {:?}", file))
}

/// Upload a report file.
pub async fn upload(ctx: CommandContext, args: UploadArgs) -> Result<()> {
    let report = read_report(&args.file)?;
    print_info(&format!(
        "Uploading {} readings from {}",
        report.visible_data().len(),
        report.origin()
    ));

    let session = ctx.session().await?;
    let count = report.upload(&session.api).await.map_err(CliError::from)?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({ "count": count })),
        OutputFormat::Table => print_success(&format!("{count} new readings accepted.")),
    }

    ctx.finish(session).await
}

/// Decode a report file and list its readings.
pub fn inspect(ctx: CommandContext, args: InspectArgs) -> Result<()> {
    let report = read_report(&args.file)?;

    match ctx.format {
        OutputFormat::Json => print_single(&report.to_value().map_err(CliError::from)?),
        OutputFormat::Table => {
            println!("{report}");
            println!("  Device:   {}", report.origin());
            if let Some(sent) = report.sent_timestamp() {
                println!("  Sent:     {sent}");
            }
            if let Some(streamer) = report.origin_streamer() {
                println!("  Streamer: {streamer:#x}");
            }
            println!();

            let rows: Vec<ReadingRow> = report
                .visible_data()
                .iter()
                .map(|point| ReadingRow {
                    stream: point.stream().to_string(),
                    reading_id: point.reading_id(),
                    timestamp: format_timestamp(&point.timestamp()),
                    value: point.value(),
                })
                .collect();
            print_output(&rows, ctx.format);
        }
    }
    Ok(())
}
