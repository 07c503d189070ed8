//! Record CLI commands

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::output::Output;
use crate::domain::{decode_as, DiffEngine, Model, ModelType};
use crate::storage::{Config, Project, Store, StoreError};

pub fn list<M: Model>(project: &Project, output: &Output) -> Result<()> {
    let store = project.file_store::<M>();
    output.verbose_ctx("list", &format!("Reading {}", store.dir().display()));

    let mut items = Vec::new();
    for record in store.stream() {
        let record = record?;
        let id = store.id_from_model(&record)?;
        items.push((id, record));
    }

    if output.is_json() {
        let items: Vec<_> = items
            .iter()
            .map(|(id, record)| serde_json::json!({ "id": id, "record": record }))
            .collect();
        output.data(&items);
    } else if items.is_empty() {
        println!("No {} records found.", M::MODEL_TYPE.type_name());
    } else {
        for (id, record) in &items {
            output.row(&[id.as_str(), record.summary().as_str()]);
        }
    }

    Ok(())
}

pub fn show<M: Model>(project: &Project, output: &Output, id: &str) -> Result<()> {
    let store = project.file_store::<M>();
    let record = store.find_by_id(id)?.ok_or_else(|| StoreError::NotFound {
        type_name: M::MODEL_TYPE.type_name(),
        id: id.to_string(),
    })?;

    if output.is_json() {
        output.data(&record);
        return Ok(());
    }

    println!("{}", record.summary());
    println!("{}", "-".repeat(60));
    for attr in M::schema().attributes() {
        if let Some(value) = attr.value(&record) {
            println!("{:<20} {}", attr.name, value);
        }
    }
    Ok(())
}

/// Reads a JSON document from a file, or stdin for `-`
fn read_json(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON from {}", source))
}

pub fn put<M: Model>(project: &Project, output: &Output, source: &str) -> Result<()> {
    let doc = read_json(source)?;
    let model: M = decode_as(&doc)?;
    let store = project.file_store::<M>();

    if !output.is_json() {
        store.save_if_changed(&model)?;
        return Ok(());
    }

    let outcome = store.save_if_changed_quiet(&model)?;
    output.data(&serde_json::json!({
        "type": M::MODEL_TYPE.type_name(),
        "id": outcome.id,
        "written": outcome.written,
        "listing": outcome.listing,
    }));
    Ok(())
}

pub fn diff(output: &Output, model_type: ModelType, before: &Path, after: &Path) -> Result<()> {
    let engine = match Config::find_project_root() {
        Some(root) => Project::open(root)?.diff_engine(),
        None => DiffEngine::default(),
    };

    let before_doc = read_json(&before.to_string_lossy())?;
    let after_doc = read_json(&after.to_string_lossy())?;
    let diff = engine.diff_json(model_type.type_name(), Some(&before_doc), Some(&after_doc))?;

    if output.is_json() {
        let changes: Vec<_> = diff
            .changed()
            .map(|change| {
                serde_json::json!({
                    "attribute": change.attribute,
                    "operation": change.operation.as_str(),
                    "before": change.before.as_ref().map(|v| v.canonical()),
                    "after": change.after.as_ref().map(|v| v.canonical()),
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "changed": diff.has_changed(),
            "changes": changes,
        }));
    } else if diff.has_changed() {
        output.raw(&diff.render());
    } else {
        println!("No changes.");
    }
    Ok(())
}
