//! Communities and their members.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Role of a community member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl MemberRole {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            other => Err(format!("unknown member role '{}'", other)),
        }
    }
}

/// An organization a member belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
}

/// The user behind a community membership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUser {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_organizations: Vec<Organization>,
}

/// A membership row of a community.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMember {
    pub id: i64,
    #[serde(default)]
    pub role: MemberRole,
    pub user_id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user: MemberUser,
}

/// The attestation version an entry attestation points at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttestationVersion {
    pub id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub image_url: String,
}

/// An attestation a node must carry to enter the community.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryAttestation {
    pub id: i64,
    pub attestation_version: AttestationVersion,
}

/// Engagement totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagements {
    pub reactions: u64,
    pub annotations: u64,
    pub verifications: u64,
}

impl Engagements {
    /// Sum of every engagement kind.
    pub fn total(&self) -> u64 {
        self.reactions + self.annotations + self.verifications
    }
}

/// A curated community.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Community {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub slug: String,
    #[serde(rename = "image_url", deserialize_with = "super::null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub member_string: Vec<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub links: Vec<String>,
    pub hidden: bool,
    #[serde(rename = "CommunityMember", deserialize_with = "super::null_as_default")]
    pub members: Vec<CommunityMember>,
    #[serde(rename = "CommunityEntryAttestation", deserialize_with = "super::null_as_default")]
    pub entry_attestations: Vec<EntryAttestation>,
    pub engagements: Engagements,
    pub verified_engagements: Engagements,
}

impl Community {
    /// Members holding the admin role.
    pub fn admins(&self) -> impl Iterator<Item = &CommunityMember> {
        self.members.iter().filter(|m| m.role == MemberRole::Admin)
    }
}
