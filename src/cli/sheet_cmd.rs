//! Spreadsheet mirror CLI commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use super::output::Output;
use crate::domain::ModelType;
use crate::sheet::{column_keys, SheetRow};
use crate::storage::{Project, Store};

/// Fingerprint bucket used for sheet pulls
pub const DEFAULT_BUCKET: &str = "sheet";

#[derive(Subcommand)]
pub enum SheetCommands {
    /// Show tabs and the column keys derived from their headers
    Status,

    /// Pull a tab into the file store, skipping rows whose fingerprint is unchanged
    Pull {
        model_type: ModelType,

        /// Fingerprint bucket
        #[arg(long, default_value = DEFAULT_BUCKET)]
        bucket: String,

        /// Ignore stored fingerprints and diff every row
        #[arg(long)]
        force: bool,
    },
}

pub fn run(cmd: SheetCommands, output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    match cmd {
        SheetCommands::Status => status(&project, output),
        SheetCommands::Pull {
            model_type,
            bucket,
            force,
        } => with_model!(model_type, M => pull::<M>(&project, output, &bucket, force)),
    }
}

#[derive(Serialize)]
struct TabStatus {
    title: String,
    model_type: Option<&'static str>,
    frozen_rows: usize,
    column_count: usize,
    column_keys: Vec<String>,
}

fn status(project: &Project, output: &Output) -> Result<()> {
    let source = project.sheet_source()?;
    let namer = project.namer();
    let sheet = source.spreadsheet()?;

    let mut tabs = Vec::with_capacity(sheet.tabs.len());
    for tab in &sheet.tabs {
        let rows = source.rows(&tab.title)?;
        let headers = &rows[..tab.frozen_rows.min(rows.len())];
        tabs.push(TabStatus {
            title: tab.title.clone(),
            model_type: ModelType::from_tab_title(&tab.title).map(|t| t.type_name()),
            frozen_rows: tab.frozen_rows,
            column_count: tab.column_count,
            column_keys: column_keys(headers, tab.column_count, &namer),
        });
    }

    if output.is_json() {
        output.data(&serde_json::json!({ "title": sheet.title, "tabs": tabs }));
        return Ok(());
    }

    println!("Spreadsheet: {}", sheet.title);
    if tabs.is_empty() {
        println!("No tabs found.");
    }
    for tab in &tabs {
        println!();
        println!(
            "{} ({}): {} frozen rows, {} columns",
            tab.title,
            tab.model_type.unwrap_or("unmapped"),
            tab.frozen_rows,
            tab.column_count
        );
        for key in &tab.column_keys {
            println!("  {}", if key.is_empty() { "(blank)" } else { key });
        }
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct PullReport {
    read: usize,
    written: usize,
    unchanged: usize,
    unidentified: usize,
}

fn pull<M: SheetRow>(project: &Project, output: &Output, bucket: &str, force: bool) -> Result<()> {
    let type_name = M::MODEL_TYPE.type_name();
    let sheet = project.sheet_store::<M>()?;
    let files = project.file_store::<M>();
    let mut prints = project.fingerprint_store::<M>(bucket);
    output.verbose_ctx("pull", &format!("Fingerprints: {}", prints.path().display()));

    let mut report = PullReport::default();
    for record in sheet.stream() {
        let model = record?;
        report.read += 1;

        let id = match files.id_from_model(&model) {
            Ok(id) => id,
            Err(e) if e.is_identity() => {
                tracing::warn!(type_name, "skipping row without identity");
                report.unidentified += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !force && !prints.has_changed(&model)? {
            report.unchanged += 1;
            continue;
        }

        let outcome = files.save_if_changed_quiet(&model)?;
        if outcome.written {
            report.written += 1;
            output.raw(&format!("~~~ {}/{}\n{}", type_name, id, outcome.listing));
        } else {
            report.unchanged += 1;
        }
        prints.update_fingerprint(&model)?;
    }

    tracing::info!(type_name, written = report.written, unchanged = report.unchanged, "sheet pull finished");
    if output.is_json() {
        output.data(&serde_json::json!({
            "type": type_name,
            "bucket": bucket,
            "report": report,
        }));
    } else {
        output.success(&format!(
            "Pulled {} {} rows: {} written, {} unchanged, {} without identity",
            report.read, type_name, report.written, report.unchanged, report.unidentified
        ));
    }
    Ok(())
}
