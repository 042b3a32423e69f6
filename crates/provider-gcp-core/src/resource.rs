use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::condition::Conditions;
use crate::error::{ProviderError, Result};

/// Finalizer that keeps a record around until its external object is gone.
pub const FINALIZER: &str = "finalizer.managedresource.crossplane.io";

// ---------------------------------------------------------------------------
// ObjectMeta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Bumped by the record store on every successful write.
    #[serde(default)]
    pub resource_version: u64,
    /// Set by whoever wants the external object gone.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deletion_requested: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.finalizers.iter().any(|f| f == finalizer)
    }

    pub fn add_finalizer(&mut self, finalizer: &str) {
        if !self.has_finalizer(finalizer) {
            self.finalizers.push(finalizer.to_string());
        }
    }

    pub fn remove_finalizer(&mut self, finalizer: &str) {
        self.finalizers.retain(|f| f != finalizer);
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Desired configuration of a regional address. Immutable once the
/// external object exists: Compute has no update call for addresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressParameters {
    /// Static IP to reserve. Omit to let GCP pick one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// `INTERNAL` or `EXTERNAL` (default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// `PREMIUM` or `STANDARD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Falls back to the provider's default region when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnetwork: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpec {
    pub for_provider: AddressParameters,
}

/// Fields mirrored from the live object on every observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressStatus {
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
    #[serde(default)]
    pub at_provider: AddressObservation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub metadata: ObjectMeta,
    pub spec: AddressSpec,
    #[serde(default)]
    pub status: AddressStatus,
}

impl Address {
    pub fn new(name: impl Into<String>, params: AddressParameters) -> Self {
        Self {
            metadata: ObjectMeta::new(name),
            spec: AddressSpec {
                for_provider: params,
            },
            status: AddressStatus::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Subnetwork
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetworkParameters {
    pub ip_cidr_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_google_access: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetworkSpec {
    pub for_provider: SubnetworkParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetworkStatus {
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subnetwork {
    pub metadata: ObjectMeta,
    pub spec: SubnetworkSpec,
    #[serde(default)]
    pub status: SubnetworkStatus,
}

// ---------------------------------------------------------------------------
// Managed
// ---------------------------------------------------------------------------

/// Every managed kind this provider knows how to store. Typed clients only
/// ever see their own variant; [`downcast_mut`] is the single place where a
/// mismatch can surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Managed {
    Address(Address),
    Subnetwork(Subnetwork),
}

impl Managed {
    pub fn kind(&self) -> &'static str {
        match self {
            Managed::Address(_) => Address::KIND,
            Managed::Subnetwork(_) => Subnetwork::KIND,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Managed::Address(r) => &r.metadata,
            Managed::Subnetwork(r) => &r.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Managed::Address(r) => &mut r.metadata,
            Managed::Subnetwork(r) => &mut r.metadata,
        }
    }

    pub fn conditions(&self) -> &Conditions {
        match self {
            Managed::Address(r) => &r.status.conditions,
            Managed::Subnetwork(r) => &r.status.conditions,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }
}

/// A concrete variant of [`Managed`].
pub trait ManagedKind: Sized + Send {
    const KIND: &'static str;

    fn from_managed(mg: &Managed) -> Option<&Self>;
    fn from_managed_mut(mg: &mut Managed) -> Option<&mut Self>;
    fn into_managed(self) -> Managed;

    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
    fn conditions(&self) -> &Conditions;
    fn conditions_mut(&mut self) -> &mut Conditions;
}

impl ManagedKind for Address {
    const KIND: &'static str = "Address";

    fn from_managed(mg: &Managed) -> Option<&Self> {
        match mg {
            Managed::Address(r) => Some(r),
            _ => None,
        }
    }

    fn from_managed_mut(mg: &mut Managed) -> Option<&mut Self> {
        match mg {
            Managed::Address(r) => Some(r),
            _ => None,
        }
    }

    fn into_managed(self) -> Managed {
        Managed::Address(self)
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn conditions(&self) -> &Conditions {
        &self.status.conditions
    }

    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.status.conditions
    }
}

impl ManagedKind for Subnetwork {
    const KIND: &'static str = "Subnetwork";

    fn from_managed(mg: &Managed) -> Option<&Self> {
        match mg {
            Managed::Subnetwork(r) => Some(r),
            _ => None,
        }
    }

    fn from_managed_mut(mg: &mut Managed) -> Option<&mut Self> {
        match mg {
            Managed::Subnetwork(r) => Some(r),
            _ => None,
        }
    }

    fn into_managed(self) -> Managed {
        Managed::Subnetwork(self)
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn conditions(&self) -> &Conditions {
        &self.status.conditions
    }

    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.status.conditions
    }
}

pub fn downcast<R: ManagedKind>(mg: &Managed) -> Result<&R> {
    R::from_managed(mg).ok_or(ProviderError::WrongType {
        expected: R::KIND,
        actual: mg.kind(),
    })
}

pub fn downcast_mut<R: ManagedKind>(mg: &mut Managed) -> Result<&mut R> {
    let actual = mg.kind();
    R::from_managed_mut(mg).ok_or(ProviderError::WrongType {
        expected: R::KIND,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS_YAML: &str = r#"
kind: Address
metadata:
  name: test-address
  annotations:
    crossplane.io/external-name: test-name
spec:
  forProvider:
    region: us-central1
    networkTier: PREMIUM
"#;

    #[test]
    fn parses_address_record() {
        let mg: Managed = serde_yaml::from_str(ADDRESS_YAML).unwrap();
        assert_eq!(mg.kind(), "Address");
        assert_eq!(mg.name(), "test-address");
        let addr = downcast::<Address>(&mg).unwrap();
        assert_eq!(
            addr.spec.for_provider.network_tier.as_deref(),
            Some("PREMIUM")
        );
        assert!(addr.status.conditions.is_empty());
        assert_eq!(addr.metadata.resource_version, 0);
    }

    #[test]
    fn downcast_wrong_kind_reports_both_kinds() {
        let mut mg = Managed::Subnetwork(Subnetwork::default());
        let err = downcast_mut::<Address>(&mut mg).unwrap_err();
        let ProviderError::WrongType { expected, actual } = err else {
            panic!("expected WrongType")
        };
        assert_eq!(expected, "Address");
        assert_eq!(actual, "Subnetwork");
    }

    #[test]
    fn finalizers_are_a_set() {
        let mut meta = ObjectMeta::new("a");
        meta.add_finalizer(FINALIZER);
        meta.add_finalizer(FINALIZER);
        assert_eq!(meta.finalizers.len(), 1);
        meta.remove_finalizer(FINALIZER);
        assert!(!meta.has_finalizer(FINALIZER));
    }

    #[test]
    fn kind_tag_round_trips_through_yaml() {
        let mg = Address::new("a", AddressParameters::default()).into_managed();
        let yaml = serde_yaml::to_string(&mg).unwrap();
        assert!(yaml.starts_with("kind: Address"));
        let back: Managed = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, mg);
    }
}
