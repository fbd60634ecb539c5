// SPDX-License-Identifier: Apache-2.0

//! Output rendering for the run report.
//!
//! Supports text, JSON, and YAML formats. The pipeline returns data; this
//! module handles presentation.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clarity_core::{RunReport, Verdict};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use console::style;
use serde::Serialize;

use crate::cli::{OutputContext, OutputFormat};

/// Trait for types that can be rendered in multiple output formats.
pub trait Renderable: Serialize {
    /// Render as human-readable text to the given writer.
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()>;
}

/// Generic render function - handles JSON/YAML via serde, delegates text to the trait.
pub fn render<T: Renderable>(result: &T, ctx: &OutputContext) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(result).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_saphyr::to_string(result).context("Failed to serialize to YAML")?;
            println!("{yaml}");
        }
        OutputFormat::Text => {
            result
                .render_text(&mut io::stdout(), ctx)
                .context("Failed to render text")?;
        }
    }
    Ok(())
}

/// Builds the vulnerability counts table.
fn counts_table(report: &RunReport) -> Table {
    let counts = &report.summary.data;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Severity", "Count"]);
    for (severity, count) in [
        ("critical", counts.number_of_critical),
        ("high", counts.number_of_high),
        ("medium", counts.number_of_medium),
        ("low", counts.number_of_low),
        ("none", counts.number_of_none),
    ] {
        table.add_row(vec![Cell::new(severity), Cell::new(count)]);
    }
    table
}

impl Renderable for RunReport {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "  {} {}", style("project:").dim(), style(&self.project_id).cyan())?;
        if self.imported {
            writeln!(w, "  {}", style("(imported by this run)").dim())?;
        }
        writeln!(w, "  {} {}", style("analysis:").dim(), style(&self.analysis_id).cyan())?;
        // Non-200 summaries always show their status.
        let status = self.summary.status_code;
        if ctx.verbose || status != 200 {
            writeln!(w, "  {} {}", style("status:").dim(), style(status).yellow())?;
        }
        writeln!(w)?;
        writeln!(w, "{}", counts_table(self))?;
        writeln!(w)?;

        match &self.verdict {
            Verdict::Pass => writeln!(
                w,
                "{} No critical or high vulnerabilities",
                style("PASS").green().bold()
            )?,
            Verdict::Fail(severity) => writeln!(
                w,
                "{} There is a {} vulnerability",
                style("FAIL").red().bold(),
                style(severity.to_string()).red()
            )?,
        }
        writeln!(w)?;
        Ok(())
    }
}
