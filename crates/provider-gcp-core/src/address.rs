//! Conversions between the record's parameters and the Compute wire type.

use gcp_compute::Address as ComputeAddress;

use crate::resource::{AddressObservation, AddressParameters};

/// Build the insert payload for an address called `name`.
pub fn generate_address(name: &str, params: &AddressParameters) -> ComputeAddress {
    ComputeAddress {
        name: name.to_string(),
        address: params.address.clone(),
        address_type: params.address_type.clone(),
        description: params.description.clone(),
        ip_version: params.ip_version.clone(),
        network: params.network.clone(),
        network_tier: params.network_tier.clone(),
        prefix_length: params.prefix_length,
        purpose: params.purpose.clone(),
        region: params.region.clone(),
        subnetwork: params.subnetwork.clone(),
        ..Default::default()
    }
}

/// Project the live object onto the record's observation fields.
///
/// Compute encodes the numeric id as a decimal string; a malformed id is
/// dropped rather than failing the whole observation.
pub fn generate_observation(observed: &ComputeAddress) -> AddressObservation {
    AddressObservation {
        creation_timestamp: observed.creation_timestamp.clone(),
        id: observed.id.as_deref().and_then(|id| id.parse().ok()),
        self_link: observed.self_link.clone(),
        status: observed.status.clone().unwrap_or_default(),
        users: observed.users.clone(),
    }
}

/// Region the address lives in: its own, or the provider default.
pub fn region<'a>(params: &'a AddressParameters, default_region: &'a str) -> &'a str {
    params
        .region
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(default_region)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AddressParameters {
        AddressParameters {
            address: Some("10.0.0.5".into()),
            address_type: Some("INTERNAL".into()),
            network_tier: Some("PREMIUM".into()),
            prefix_length: Some(16),
            region: Some("europe-west1".into()),
            subnetwork: Some("projects/p/regions/europe-west1/subnetworks/s".into()),
            ..Default::default()
        }
    }

    #[test]
    fn payload_carries_name_and_parameters() {
        let payload = generate_address("test-name", &params());
        assert_eq!(payload.name, "test-name");
        assert_eq!(payload.address.as_deref(), Some("10.0.0.5"));
        assert_eq!(payload.address_type.as_deref(), Some("INTERNAL"));
        assert_eq!(payload.prefix_length, Some(16));
        assert!(payload.status.is_none());
        assert!(payload.id.is_none());
    }

    #[test]
    fn payload_is_deterministic() {
        assert_eq!(
            generate_address("n", &params()),
            generate_address("n", &params())
        );
    }

    #[test]
    fn observation_copies_output_fields() {
        let observed = ComputeAddress {
            id: Some("4242".into()),
            status: Some("IN_USE".into()),
            self_link: Some("https://compute/addresses/n".into()),
            users: vec!["vm-1".into()],
            ..Default::default()
        };
        let obs = generate_observation(&observed);
        assert_eq!(obs.id, Some(4242));
        assert_eq!(obs.status, "IN_USE");
        assert_eq!(obs.users, vec!["vm-1".to_string()]);
    }

    #[test]
    fn malformed_id_is_dropped() {
        let observed = ComputeAddress {
            id: Some("not-a-number".into()),
            ..Default::default()
        };
        assert_eq!(generate_observation(&observed).id, None);
    }

    #[test]
    fn region_falls_back_to_default() {
        assert_eq!(region(&params(), "us-central1"), "europe-west1");
        assert_eq!(
            region(&AddressParameters::default(), "us-central1"),
            "us-central1"
        );
    }
}
