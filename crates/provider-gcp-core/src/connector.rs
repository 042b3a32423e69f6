use gcp_compute::{ClientOptions, ComputeClient};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::external::{AddressExternal, ExternalClient};
use crate::resource::{downcast, Address, Managed};

/// Produces a fresh [`ExternalClient`] for one record.
///
/// Connectors hold configuration only; nothing is shared between the
/// clients they hand out, so records can be reconciled concurrently.
pub trait Connector {
    type Client: ExternalClient;

    fn connect(&self, mg: &Managed) -> Result<Self::Client>;
}

pub struct AddressConnector {
    config: ProviderConfig,
}

impl AddressConnector {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl Connector for AddressConnector {
    type Client = AddressExternal;

    fn connect(&self, mg: &Managed) -> Result<AddressExternal> {
        downcast::<Address>(mg)?;
        if self.config.project_id.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "project_id is required".to_string(),
            ));
        }

        let client = ComputeClient::new(ClientOptions {
            endpoint: self.config.endpoint.clone(),
            project: self.config.project_id.clone(),
            access_token: self.config.credentials.access_token()?,
            timeout: self.config.timeout(),
        })
        .map_err(ProviderError::Connect)?;

        tracing::debug!(
            record = %mg.name(),
            project = %self.config.project_id,
            endpoint = %self.config.endpoint,
            "connected compute client"
        );
        Ok(AddressExternal::new(
            client.addresses(),
            self.config.default_region.clone(),
        ))
    }
}
