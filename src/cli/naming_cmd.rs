//! Identity and label helpers

use anyhow::Result;

use super::output::Output;
use crate::domain::{file_token, Namer};
use crate::storage::{Config, Project};

pub fn token(output: &Output, parts: &[String]) {
    let token = file_token(parts);
    if output.is_json() {
        output.data(&serde_json::json!({ "parts": parts, "token": token }));
    } else {
        println!("{}", token);
    }
}

/// Uses the project's replacement table when run inside a project
pub fn label(output: &Output, texts: &[String]) -> Result<()> {
    let namer = match Config::find_project_root() {
        Some(root) => Project::open(root)?.namer(),
        None => {
            output.verbose_ctx("label", "Not in a project, using no replacements");
            Namer::default().into()
        }
    };

    let label = namer.field_label(texts);
    if output.is_json() {
        output.data(&serde_json::json!({ "texts": texts, "label": label }));
    } else {
        println!("{}", label);
    }
    Ok(())
}
