use crate::cmd::{observed_status, reason};
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use provider_gcp_core::condition::{Condition, ConditionType};
use provider_gcp_core::meta::external_name;
use provider_gcp_core::resource::Managed;
use provider_gcp_core::store::{FileStore, RecordStore};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct StatusRow<'a> {
    name: &'a str,
    kind: &'static str,
    external_name: &'a str,
    ready: Option<&'static str>,
    synced: Option<&'static str>,
    status: &'a str,
    deletion_requested: bool,
}

#[derive(Serialize)]
struct RecordStatus<'a> {
    #[serde(flatten)]
    summary: StatusRow<'a>,
    conditions: Vec<&'a Condition>,
}

fn summarize(mg: &Managed) -> StatusRow<'_> {
    StatusRow {
        name: mg.name(),
        kind: mg.kind(),
        external_name: external_name(mg.metadata()),
        ready: reason(mg.conditions(), ConditionType::Ready),
        synced: reason(mg.conditions(), ConditionType::Synced),
        status: observed_status(mg),
        deletion_requested: mg.metadata().deletion_requested,
    }
}

pub fn run(records: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = FileStore::new(records);
    match name {
        Some(name) => {
            let mg = store
                .get(name)
                .with_context(|| format!("failed to read record '{name}'"))?;
            show(&mg, json)
        }
        None => {
            let all = store
                .list()
                .with_context(|| format!("failed to list records in {}", records.display()))?;
            list(&all, json)
        }
    }
}

fn list(all: &[Managed], json: bool) -> anyhow::Result<()> {
    let rows: Vec<StatusRow> = all.iter().map(summarize).collect();
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No records.");
        return Ok(());
    }
    let table = rows
        .iter()
        .map(|r| {
            vec![
                r.name.to_string(),
                r.kind.to_string(),
                r.external_name.to_string(),
                or_dash(r.ready),
                or_dash(r.synced),
                or_dash(Some(r.status)),
                if r.deletion_requested { "yes" } else { "-" }.to_string(),
            ]
        })
        .collect();
    print_table(
        &["NAME", "KIND", "EXTERNAL-NAME", "READY", "SYNCED", "STATUS", "DELETING"],
        table,
    );
    Ok(())
}

fn show(mg: &Managed, json: bool) -> anyhow::Result<()> {
    let record = RecordStatus {
        summary: summarize(mg),
        conditions: mg.conditions().iter().collect(),
    };
    if json {
        return print_json(&record);
    }

    let s = &record.summary;
    println!("Name:          {}", s.name);
    println!("Kind:          {}", s.kind);
    println!("External name: {}", s.external_name);
    println!("Status:        {}", or_dash(Some(s.status)));
    if s.deletion_requested {
        println!("Deletion:      requested");
    }
    println!();
    if record.conditions.is_empty() {
        println!("No conditions recorded.");
        return Ok(());
    }
    let table = record
        .conditions
        .iter()
        .map(|c| {
            vec![
                c.kind.to_string(),
                c.status.to_string(),
                c.reason.to_string(),
                c.last_transition_time.to_rfc3339(),
                or_dash(c.message.as_deref()),
            ]
        })
        .collect();
    print_table(&["TYPE", "STATUS", "REASON", "SINCE", "MESSAGE"], table);
    Ok(())
}
