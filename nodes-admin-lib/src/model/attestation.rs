//! Attestations and their community bindings.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// An attestation bound to a community, as listed on the community page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityAttestation {
    pub id: i64,
    pub entry_attestation_id: Option<i64>,
    pub attestation_id: i64,
    pub community_id: i64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub description: String,
    pub protected: bool,
    pub is_required: bool,
    pub is_external: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    pub community_name: String,
}

impl CommunityAttestation {
    /// Returns `true` when the attestation is an entry requirement of the community.
    pub fn is_entry(&self) -> bool {
        self.entry_attestation_id.is_some()
    }
}

/// Name of the community owning an attestation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityName {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
}

/// An attestation in the global catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attestation {
    pub id: i64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    pub community_id: i64,
    #[serde(deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(rename = "image_url", deserialize_with = "super::null_as_default")]
    pub image_url: String,
    #[serde(rename = "verified_image_url")]
    pub verified_image_url: Option<String>,
    pub template_id: Option<serde_json::Value>,
    pub protected: bool,
    pub can_mint_doi: bool,
    pub can_update_orcid: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub community: CommunityName,
    #[serde(rename = "CommunityEntryAttestation", deserialize_with = "super::null_as_default")]
    pub entry_attestations: Vec<serde_json::Value>,
}
