use gcp_compute::{Address as ComputeAddress, Addresses, Operation};
use std::collections::BTreeMap;
use std::future::Future;

use crate::address::{generate_address, generate_observation, region};
use crate::classify::{classify, ApiCall, Outcome};
use crate::condition::{ConditionReason, ConditionType};
use crate::error::{ProviderError, Result};
use crate::meta::external_name;
use crate::resource::{downcast_mut, Address, Managed, ManagedKind};
use crate::status::{Lifecycle, Transition};

/// Secrets a create or update may surface. Addresses have none.
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalObservation {
    pub resource_exists: bool,
    pub resource_up_to_date: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalCreation {
    pub connection_details: ConnectionDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalUpdate {
    pub connection_details: ConnectionDetails,
}

// ---------------------------------------------------------------------------
// ExternalClient
// ---------------------------------------------------------------------------

/// The four operations a reconcile loop drives for one managed kind.
///
/// Each call is safe to repeat: the loop re-invokes them on its own backoff
/// and nothing is retried in here.
pub trait ExternalClient: Send + Sync {
    type Resource: ManagedKind;

    fn observe(
        &self,
        res: &mut Self::Resource,
    ) -> impl Future<Output = Result<ExternalObservation>> + Send;

    fn create(
        &self,
        res: &mut Self::Resource,
    ) -> impl Future<Output = Result<ExternalCreation>> + Send;

    fn update(
        &self,
        res: &mut Self::Resource,
    ) -> impl Future<Output = Result<ExternalUpdate>> + Send;

    fn delete(&self, res: &mut Self::Resource) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// AddressApi
// ---------------------------------------------------------------------------

/// The slice of the Compute API the address client calls.
pub trait AddressApi: Send + Sync {
    fn get(
        &self,
        region: &str,
        name: &str,
    ) -> impl Future<Output = gcp_compute::Result<ComputeAddress>> + Send;

    fn insert(
        &self,
        region: &str,
        address: &ComputeAddress,
    ) -> impl Future<Output = gcp_compute::Result<Operation>> + Send;

    fn delete(
        &self,
        region: &str,
        name: &str,
    ) -> impl Future<Output = gcp_compute::Result<Operation>> + Send;
}

impl AddressApi for Addresses {
    fn get(
        &self,
        region: &str,
        name: &str,
    ) -> impl Future<Output = gcp_compute::Result<ComputeAddress>> + Send {
        Addresses::get(self, region, name)
    }

    fn insert(
        &self,
        region: &str,
        address: &ComputeAddress,
    ) -> impl Future<Output = gcp_compute::Result<Operation>> + Send {
        Addresses::insert(self, region, address)
    }

    fn delete(
        &self,
        region: &str,
        name: &str,
    ) -> impl Future<Output = gcp_compute::Result<Operation>> + Send {
        Addresses::delete(self, region, name)
    }
}

// ---------------------------------------------------------------------------
// AddressExternal
// ---------------------------------------------------------------------------

/// External client for [`Address`] records, bound to one project.
pub struct AddressExternal<A = Addresses> {
    api: A,
    default_region: String,
}

impl<A: AddressApi> AddressExternal<A> {
    pub fn new(api: A, default_region: impl Into<String>) -> Self {
        Self {
            api,
            default_region: default_region.into(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: AddressApi> ExternalClient for AddressExternal<A> {
    type Resource = Address;

    async fn observe(&self, addr: &mut Address) -> Result<ExternalObservation> {
        let name = external_name(&addr.metadata).to_string();
        let region = region(&addr.spec.for_provider, &self.default_region).to_string();

        let observed = match self.api.get(&region, &name).await {
            Ok(observed) => observed,
            Err(e) => {
                return match classify(ApiCall::Get, &e) {
                    Outcome::GoalReached => {
                        tracing::debug!(%name, %region, "address does not exist");
                        Ok(ExternalObservation::default())
                    }
                    _ => Err(ProviderError::GetFailed { name, source: e }),
                };
            }
        };

        addr.status.at_provider = generate_observation(&observed);
        let status = addr.status.at_provider.status.as_str();
        // A pending delete keeps Ready=Deleting until the object is gone.
        let deleting = addr.metadata.deletion_requested
            && addr
                .status
                .conditions
                .current(ConditionType::Ready)
                .is_some_and(|c| c.reason == ConditionReason::Deleting);
        if !deleting {
            let current = Lifecycle::current(&addr.status.conditions);
            let transition = Lifecycle::transition(current, status);
            if let Transition::Changed { from, to } = transition {
                tracing::info!(%name, status, ?from, %to, "address lifecycle changed");
            }
            addr.status.conditions.set(transition.target().condition());
        }
        tracing::debug!(%name, status, deleting, "observed address");

        // Parameters are immutable once the address exists, so there is
        // nothing to drift towards.
        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: true,
        })
    }

    async fn create(&self, addr: &mut Address) -> Result<ExternalCreation> {
        let name = external_name(&addr.metadata).to_string();
        let region = region(&addr.spec.for_provider, &self.default_region).to_string();
        let payload = generate_address(&name, &addr.spec.for_provider);

        let op = self
            .api
            .insert(&region, &payload)
            .await
            .map_err(|source| ProviderError::CreateFailed {
                name: name.clone(),
                source,
            })?;
        tracing::info!(%name, %region, operation = %op.name, "address insert issued");
        Ok(ExternalCreation::default())
    }

    async fn update(&self, _addr: &mut Address) -> Result<ExternalUpdate> {
        // Compute has no update call for addresses.
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, addr: &mut Address) -> Result<()> {
        let name = external_name(&addr.metadata).to_string();
        let region = region(&addr.spec.for_provider, &self.default_region).to_string();

        match self.api.delete(&region, &name).await {
            Ok(op) => {
                tracing::info!(%name, %region, operation = %op.name, "address delete issued");
                Ok(())
            }
            Err(e) => match classify(ApiCall::Delete, &e) {
                Outcome::GoalReached => {
                    tracing::warn!(%name, %region, "address already gone");
                    Ok(())
                }
                _ => Err(ProviderError::DeleteFailed { name, source: e }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ManagedClient
// ---------------------------------------------------------------------------

/// Entry point for callers holding an untyped [`Managed`] record.
///
/// Checks the record's kind before anything else; a mismatch is
/// [`ProviderError::WrongType`] and the record is left untouched.
pub struct ManagedClient<C> {
    inner: C,
}

impl<C: ExternalClient> ManagedClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub async fn observe(&self, mg: &mut Managed) -> Result<ExternalObservation> {
        let res = downcast_mut::<C::Resource>(mg)?;
        self.inner.observe(res).await
    }

    pub async fn create(&self, mg: &mut Managed) -> Result<ExternalCreation> {
        let res = downcast_mut::<C::Resource>(mg)?;
        self.inner.create(res).await
    }

    pub async fn update(&self, mg: &mut Managed) -> Result<ExternalUpdate> {
        let res = downcast_mut::<C::Resource>(mg)?;
        self.inner.update(res).await
    }

    pub async fn delete(&self, mg: &mut Managed) -> Result<()> {
        let res = downcast_mut::<C::Resource>(mg)?;
        self.inner.delete(res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionReason, ConditionType};
    use crate::meta::set_external_name;
    use crate::resource::{AddressParameters, Subnetwork};
    use crate::status::{STATUS_RESERVED, STATUS_RESERVING};
    use gcp_compute::{ClientOptions, ComputeClient, ComputeError};
    use mockito::{Matcher, Server, ServerGuard};

    const TEST_NAME: &str = "test-name";
    const PATH: &str = "/projects/test-project/regions/us-central1/addresses";

    fn address_obj() -> Address {
        let mut addr = Address::new("test-address", AddressParameters::default());
        set_external_name(&mut addr.metadata, TEST_NAME);
        addr
    }

    fn external(server: &ServerGuard) -> AddressExternal {
        let client = ComputeClient::new(ClientOptions {
            endpoint: server.url(),
            project: "test-project".into(),
            ..Default::default()
        })
        .unwrap();
        AddressExternal::new(client.addresses(), "us-central1")
    }

    fn address_body(status: &str) -> String {
        serde_json::to_string(&ComputeAddress {
            status: Some(status.to_string()),
            ..generate_address(TEST_NAME, &AddressParameters::default())
        })
        .unwrap()
    }

    fn item_path() -> String {
        format!("{PATH}/{TEST_NAME}")
    }

    // ---------------------------------------------------------------------
    // Observe
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn observe_not_found_is_absent_without_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", item_path().as_str())
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let mut addr = address_obj();
        let obs = external(&server).observe(&mut addr).await.unwrap();
        mock.assert_async().await;
        assert_eq!(obs, ExternalObservation::default());
        assert_eq!(addr, address_obj());
    }

    #[tokio::test]
    async fn observe_get_failed_wraps_cause() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", item_path().as_str())
            .with_status(400)
            .with_body("{}")
            .create_async()
            .await;

        let mut addr = address_obj();
        let err = external(&server).observe(&mut addr).await.unwrap_err();
        let ProviderError::GetFailed { name, source } = &err else {
            panic!("expected GetFailed, got {err:?}")
        };
        assert_eq!(name, TEST_NAME);
        assert_eq!(source.status_code(), Some(400));
        assert!(!err.is_retryable());
        assert_eq!(addr, address_obj());
    }

    #[tokio::test]
    async fn observe_reserving_sets_creating() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", item_path().as_str())
            .with_status(200)
            .with_body(address_body(STATUS_RESERVING))
            .create_async()
            .await;

        let mut addr = address_obj();
        let obs = external(&server).observe(&mut addr).await.unwrap();
        assert_eq!(
            obs,
            ExternalObservation {
                resource_exists: true,
                resource_up_to_date: true
            }
        );
        assert_eq!(addr.status.at_provider.status, STATUS_RESERVING);
        let ready = addr.status.conditions.current(ConditionType::Ready).unwrap();
        assert_eq!(ready.reason, ConditionReason::Creating);
        assert_eq!(addr.status.conditions.len(), 1);
    }

    #[tokio::test]
    async fn observe_reserved_sets_available() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", item_path().as_str())
            .with_status(200)
            .with_body(address_body(STATUS_RESERVED))
            .create_async()
            .await;

        let mut addr = address_obj();
        external(&server).observe(&mut addr).await.unwrap();
        assert_eq!(addr.status.at_provider.status, STATUS_RESERVED);
        let ready = addr.status.conditions.current(ConditionType::Ready).unwrap();
        assert_eq!(ready.reason, ConditionReason::Available);
    }

    #[tokio::test]
    async fn observe_twice_appends_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", item_path().as_str())
            .with_status(200)
            .with_body(address_body(STATUS_RESERVED))
            .expect(2)
            .create_async()
            .await;

        let ext = external(&server);
        let mut addr = address_obj();
        ext.observe(&mut addr).await.unwrap();
        ext.observe(&mut addr).await.unwrap();
        mock.assert_async().await;
        assert_eq!(addr.status.conditions.len(), 1);
    }

    #[tokio::test]
    async fn observe_uses_record_region() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/projects/test-project/regions/europe-west4/addresses/test-name",
            )
            .with_status(200)
            .with_body(address_body(STATUS_RESERVED))
            .create_async()
            .await;

        let mut addr = address_obj();
        addr.spec.for_provider.region = Some("europe-west4".into());
        external(&server).observe(&mut addr).await.unwrap();
        mock.assert_async().await;
    }

    // ---------------------------------------------------------------------
    // Create
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn create_success_returns_empty_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(serde_json::json!({ "name": TEST_NAME })))
            .with_status(200)
            .with_body(r#"{"name":"op-1"}"#)
            .create_async()
            .await;

        let mut addr = address_obj();
        let cre = external(&server).create(&mut addr).await.unwrap();
        mock.assert_async().await;
        assert_eq!(cre, ExternalCreation::default());
        assert!(cre.connection_details.is_empty());
        assert_eq!(addr, address_obj());
    }

    #[tokio::test]
    async fn create_already_exists_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(409)
            .with_body("{}")
            .create_async()
            .await;

        let mut addr = address_obj();
        let err = external(&server).create(&mut addr).await.unwrap_err();
        let ProviderError::CreateFailed { source, .. } = &err else {
            panic!("expected CreateFailed, got {err:?}")
        };
        assert!(source.is_conflict());
        assert!(!err.is_retryable());
        assert_eq!(addr, address_obj());
    }

    #[tokio::test]
    async fn create_failed_wraps_cause() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(400)
            .with_body("{}")
            .create_async()
            .await;

        let mut addr = address_obj();
        let err = external(&server).create(&mut addr).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::CreateFailed {
                source: ComputeError::Api { code: 400, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn create_server_error_is_retryable() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(503)
            .create_async()
            .await;

        let mut addr = address_obj();
        let err = external(&server).create(&mut addr).await.unwrap_err();
        assert!(err.is_retryable());
    }

    // ---------------------------------------------------------------------
    // Delete
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn delete_success_issues_one_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", item_path().as_str())
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let mut addr = address_obj();
        external(&server).delete(&mut addr).await.unwrap();
        mock.assert_async().await;
        assert_eq!(addr, address_obj());
    }

    #[tokio::test]
    async fn delete_already_gone_is_success() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", item_path().as_str())
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let mut addr = address_obj();
        external(&server).delete(&mut addr).await.unwrap();
        assert_eq!(addr, address_obj());
    }

    #[tokio::test]
    async fn delete_failed_wraps_cause() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", item_path().as_str())
            .with_status(400)
            .with_body("{}")
            .create_async()
            .await;

        let mut addr = address_obj();
        let err = external(&server).delete(&mut addr).await.unwrap_err();
        assert!(matches!(err, ProviderError::DeleteFailed { .. }));
        assert!(err.to_string().contains("cannot delete GCP Address 'test-name'"));
    }

    // ---------------------------------------------------------------------
    // Update
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn update_is_a_noop() {
        // No mocks registered: any request would fail the call.
        let server = Server::new_async().await;
        let mut addr = address_obj();
        addr.spec.for_provider.description = Some("drifted".into());
        let before = addr.clone();
        let upd = external(&server).update(&mut addr).await.unwrap();
        assert_eq!(upd, ExternalUpdate::default());
        assert_eq!(addr, before);
    }

    // ---------------------------------------------------------------------
    // Wrong kind
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn wrong_kind_fails_every_operation() {
        let server = Server::new_async().await;
        let client = ManagedClient::new(external(&server));
        let original = Managed::Subnetwork(Subnetwork::default());
        let mut mg = original.clone();

        let is_wrong = |e: ProviderError| matches!(e, ProviderError::WrongType { .. });
        assert!(is_wrong(client.observe(&mut mg).await.unwrap_err()));
        assert!(is_wrong(client.create(&mut mg).await.unwrap_err()));
        assert!(is_wrong(client.update(&mut mg).await.unwrap_err()));
        assert!(is_wrong(client.delete(&mut mg).await.unwrap_err()));
        assert_eq!(mg, original);
    }

    #[tokio::test]
    async fn managed_client_dispatches_addresses() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", item_path().as_str())
            .with_status(200)
            .with_body(address_body(STATUS_RESERVED))
            .create_async()
            .await;

        let client = ManagedClient::new(external(&server));
        let mut mg = address_obj().into_managed();
        let obs = client.observe(&mut mg).await.unwrap();
        assert!(obs.resource_exists);
        assert_eq!(
            mg.conditions().current(ConditionType::Ready).unwrap().reason,
            ConditionReason::Available
        );
    }
}
