use crate::cmd::{load_config, observed_status, reason, runtime, select};
use crate::output::{or_dash, print_json, print_table};
use provider_gcp_core::condition::ConditionType;
use provider_gcp_core::connector::{AddressConnector, Connector};
use provider_gcp_core::external::{ExternalObservation, ManagedClient};
use provider_gcp_core::resource::Managed;
use provider_gcp_core::store::{FileStore, RecordStore};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ObserveRow {
    name: String,
    kind: &'static str,
    exists: Option<bool>,
    ready: Option<&'static str>,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(records: &Path, config: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let connector = AddressConnector::new(load_config(config)?);
    let store = FileStore::new(records);
    let rt = runtime()?;

    let mut rows = Vec::new();
    for mut mg in select(&store, name)? {
        let observed = rt.block_on(observe_one(&connector, &mut mg));
        let (exists, error) = match observed {
            Ok(obs) => match store.update(&mg) {
                Ok(_) => (Some(obs.resource_exists), None),
                Err(e) => (
                    Some(obs.resource_exists),
                    Some(format!("failed to save record: {e}")),
                ),
            },
            Err(e) => (None, Some(e.to_string())),
        };
        rows.push(ObserveRow {
            name: mg.name().to_string(),
            kind: mg.kind(),
            exists,
            ready: reason(mg.conditions(), ConditionType::Ready),
            status: observed_status(&mg).to_string(),
            error,
        });
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
                    r.kind.to_string(),
                    r.exists.map_or("-".to_string(), |e| e.to_string()),
                    or_dash(r.ready),
                    or_dash(Some(r.status.as_str())),
                    or_dash(r.error.as_deref()),
                ]
            })
            .collect();
        print_table(&["NAME", "KIND", "EXISTS", "READY", "STATUS", "ERROR"], table);
    }

    if failed > 0 {
        anyhow::bail!("{failed} record(s) could not be observed");
    }
    Ok(())
}

async fn observe_one(
    connector: &AddressConnector,
    mg: &mut Managed,
) -> provider_gcp_core::Result<ExternalObservation> {
    let client = ManagedClient::new(connector.connect(mg)?);
    client.observe(mg).await
}
