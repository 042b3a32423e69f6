use crate::output::print_json;
use anyhow::Context;
use provider_gcp_core::store::{FileStore, RecordStore};
use std::path::Path;

/// Mark a record for deletion. The next reconcile deletes the external
/// object and then removes the record.
pub fn run(records: &Path, name: &str, json: bool) -> anyhow::Result<()> {
    let store = FileStore::new(records);
    let mut mg = store
        .get(name)
        .with_context(|| format!("failed to read record '{name}'"))?;

    let already = mg.metadata().deletion_requested;
    if !already {
        mg.metadata_mut().deletion_requested = true;
        store
            .update(&mg)
            .with_context(|| format!("failed to save record '{name}'"))?;
    }

    if json {
        print_json(&serde_json::json!({
            "name": name,
            "deletion_requested": true,
            "changed": !already,
        }))?;
    } else if already {
        println!("Deletion of '{name}' was already requested.");
    } else {
        println!("Deletion of '{name}' requested; run `reconcile` to apply it.");
    }
    Ok(())
}
