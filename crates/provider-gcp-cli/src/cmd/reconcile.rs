use crate::cmd::{load_config, observed_status, reason, runtime, select};
use crate::output::{or_dash, print_json, print_table};
use provider_gcp_core::condition::ConditionType;
use provider_gcp_core::connector::{AddressConnector, Connector};
use provider_gcp_core::reconciler::{last_error, reconcile_once, ReconcileAction, ReconcileOptions};
use provider_gcp_core::resource::{downcast_mut, Address, Managed};
use provider_gcp_core::store::{FileStore, RecordStore};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

pub fn options(short_wait: u64, poll_interval: u64) -> ReconcileOptions {
    ReconcileOptions {
        short_wait: Duration::from_secs(short_wait),
        poll_interval: Duration::from_secs(poll_interval),
    }
}

#[derive(Serialize)]
struct ReconcileRow {
    name: String,
    action: &'static str,
    requeue_after_secs: Option<u64>,
    ready: Option<&'static str>,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(
    records: &Path,
    config: &Path,
    name: Option<&str>,
    opts: ReconcileOptions,
    json: bool,
) -> anyhow::Result<()> {
    let connector = AddressConnector::new(load_config(config)?);
    let store = FileStore::new(records);
    let rt = runtime()?;

    let mut rows = Vec::new();
    for mut mg in select(&store, name)? {
        let record = mg.name().to_string();
        let row = match rt.block_on(reconcile_one(&connector, &mut mg, &opts)) {
            Ok(ReconcileAction::Deleted) => {
                let error = store
                    .delete(&record)
                    .err()
                    .map(|e| format!("failed to remove record: {e}"));
                ReconcileRow {
                    name: record,
                    action: "deleted",
                    requeue_after_secs: None,
                    ready: None,
                    status: String::new(),
                    error,
                }
            }
            // External changes already happened; a failed save is reported
            // for this record and the batch carries on.
            Ok(ReconcileAction::Requeue(after)) => {
                let error = match store.update(&mg) {
                    Ok(_) => last_error(mg.conditions()).map(str::to_string),
                    Err(e) => Some(format!("failed to save record: {e}")),
                };
                ReconcileRow {
                    name: record,
                    action: "requeue",
                    requeue_after_secs: Some(after.as_secs()),
                    ready: reason(mg.conditions(), ConditionType::Ready),
                    status: observed_status(&mg).to_string(),
                    error,
                }
            }
            // Connect failed; nothing was attempted, so the record is left as is.
            Err(e) => ReconcileRow {
                name: record,
                action: "skipped",
                requeue_after_secs: None,
                ready: reason(mg.conditions(), ConditionType::Ready),
                status: observed_status(&mg).to_string(),
                error: Some(e.to_string()),
            },
        };
        rows.push(row);
    }

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    if json {
        print_json(&rows)?;
    } else if rows.is_empty() {
        println!("No records.");
    } else {
        let table = rows
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.action.to_string(),
                    r.requeue_after_secs
                        .map_or("-".to_string(), |s| format!("{s}s")),
                    or_dash(r.ready),
                    or_dash(Some(r.status.as_str())),
                    or_dash(r.error.as_deref()),
                ]
            })
            .collect();
        print_table(&["NAME", "ACTION", "REQUEUE", "READY", "STATUS", "ERROR"], table);
    }

    if failed > 0 {
        anyhow::bail!("{failed} record(s) failed to reconcile");
    }
    Ok(())
}

async fn reconcile_one(
    connector: &AddressConnector,
    mg: &mut Managed,
    opts: &ReconcileOptions,
) -> provider_gcp_core::Result<ReconcileAction> {
    let client = connector.connect(mg)?;
    let addr = downcast_mut::<Address>(mg)?;
    Ok(reconcile_once(&client, addr, opts).await)
}
