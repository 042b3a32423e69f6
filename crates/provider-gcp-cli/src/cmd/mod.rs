pub mod config;
pub mod delete;
pub mod observe;
pub mod reconcile;
pub mod status;

use anyhow::Context;
use provider_gcp_core::condition::{ConditionType, Conditions};
use provider_gcp_core::config::ProviderConfig;
use provider_gcp_core::resource::{Address, Managed, ManagedKind};
use provider_gcp_core::store::{FileStore, RecordStore};
use std::path::Path;

pub(crate) fn load_config(path: &Path) -> anyhow::Result<ProviderConfig> {
    ProviderConfig::load(path)
        .with_context(|| format!("failed to load provider config from {}", path.display()))
}

/// The named record, or every Address record when no name is given.
///
/// Naming a record of another kind is allowed; the connector rejects it.
pub(crate) fn select(store: &FileStore, name: Option<&str>) -> anyhow::Result<Vec<Managed>> {
    match name {
        Some(name) => Ok(vec![store
            .get(name)
            .with_context(|| format!("failed to read record '{name}'"))?]),
        None => Ok(store
            .list()
            .with_context(|| format!("failed to list records in {}", store.dir().display()))?
            .into_iter()
            .filter(|mg| mg.kind() == Address::KIND)
            .collect()),
    }
}

/// Current reason of a condition type, e.g. `Available`.
pub(crate) fn reason(conditions: &Conditions, kind: ConditionType) -> Option<&'static str> {
    conditions.current(kind).map(|c| c.reason.as_str())
}

/// Status string last reported by the external API.
pub(crate) fn observed_status(mg: &Managed) -> &str {
    match mg {
        Managed::Address(addr) => &addr.status.at_provider.status,
        Managed::Subnetwork(_) => "",
    }
}

pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}
