//! Fingerprint CLI command

use anyhow::Result;

use super::output::Output;
use crate::domain::Model;
use crate::storage::{identity_of, take_fingerprint, Project, Store, StoreError};

pub fn show<M: Model>(project: &Project, output: &Output, id: &str, bucket: &str) -> Result<()> {
    let record = project.file_store::<M>().find_by_id(id)?.ok_or_else(|| StoreError::NotFound {
        type_name: M::MODEL_TYPE.type_name(),
        id: id.to_string(),
    })?;

    let id = identity_of(&record)?;
    let mut prints = project.fingerprint_store::<M>(bucket);
    let fingerprint = take_fingerprint(&record);
    let stored = prints.stored(&id)?;
    let changed = prints.has_changed(&record)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "bucket": bucket,
            "fingerprint": fingerprint,
            "stored": stored,
            "changed": changed,
        }));
        return Ok(());
    }

    println!("{}", fingerprint);
    let state = match (&stored, changed) {
        (None, _) => "not in bucket",
        (Some(_), true) => "differs from bucket",
        (Some(_), false) => "matches bucket",
    };
    println!("{} ({})", state, prints.path().display());
    Ok(())
}
