//! Attestation catalogue and community entry attestations.

use reqwest::Method;

use super::FailSoft;
use crate::client::Body;
use crate::error::Error;
use crate::model::ApiResponse;
use crate::model::Attestation;
use crate::model::CommunityAttestation;
use crate::AdminClient;

impl AdminClient {
    /// Lists the attestations bound to a community.
    ///
    /// Fails soft: transport and parse errors yield an empty list.
    pub async fn community_attestations(
        &self,
        community_id: i64,
    ) -> Result<Vec<CommunityAttestation>, Error> {
        let path = format!("/v1/admin/communities/{}/attestations", community_id);
        let url = self.endpoint(&path)?;
        self.get_json::<ApiResponse<Vec<CommunityAttestation>>>(url)
            .await
            .map(ApiResponse::into_data_or_default)
            .or_empty(&path)
    }

    /// Lists the global attestation catalogue.
    ///
    /// Fails soft: transport and parse errors yield an empty list.
    pub async fn list_attestations(&self) -> Result<Vec<Attestation>, Error> {
        let path = "/v1/admin/attestations";
        let url = self.endpoint(path)?;
        self.get_json::<ApiResponse<Vec<Attestation>>>(url)
            .await
            .map(ApiResponse::into_data_or_default)
            .or_empty(path)
    }

    /// Makes an attestation an entry requirement of a community.
    pub async fn add_entry_attestation(
        &self,
        community_id: i64,
        attestation_id: i64,
    ) -> Result<(), Error> {
        let url = self.endpoint(&format!(
            "/v1/admin/communities/{}/addEntryAttestation/{}",
            community_id, attestation_id
        ))?;
        self.send_unit(Method::POST, url, Body::None).await
    }

    /// Removes an entry attestation from a community.
    pub async fn remove_entry_attestation(
        &self,
        community_id: i64,
        attestation_id: i64,
    ) -> Result<(), Error> {
        let url = self.endpoint(&format!(
            "/v1/admin/communities/{}/removeEntryAttestation/{}",
            community_id, attestation_id
        ))?;
        self.send_unit(Method::POST, url, Body::None).await
    }

    /// Flips whether an entry attestation is required.
    pub async fn toggle_entry_attestation_requirement(
        &self,
        community_id: i64,
        entry_id: i64,
    ) -> Result<(), Error> {
        let url = self.endpoint(&format!(
            "/v1/admin/communities/{}/toggleEntryAttestation/{}",
            community_id, entry_id
        ))?;
        self.send_unit(Method::POST, url, Body::None).await
    }
}
