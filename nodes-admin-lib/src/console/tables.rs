//! Column sets for the console's tables

use crate::model::Attestation;
use crate::model::Community;
use crate::model::CommunityAttestation;
use crate::model::UserProfile;
use crate::table::CellValue;
use crate::table::Column;
use crate::table::DataTable;
use crate::table::FilterKind;

/// Columns of the users table.
///
/// `name` takes a text filter and `isAdmin` a role facet; the role column
/// cannot be hidden.
pub fn user_columns() -> Vec<Column<UserProfile>> {
    vec![
        Column::new("name", "Name", |u: &UserProfile| u.name.as_str().into())
            .filter(FilterKind::Text)
            .hideable(false),
        Column::new("email", "Email", |u: &UserProfile| u.email.as_str().into())
            .filter(FilterKind::Text),
        Column::new("orcid", "ORCID", |u: &UserProfile| u.orcid.as_deref().into()),
        Column::new("isAdmin", "Role", |u: &UserProfile| u.is_admin.into())
            .filter(FilterKind::Facet)
            .hideable(false),
        Column::new("createdAt", "Joined", |u: &UserProfile| u.created_at.into()),
    ]
}

/// Columns of the communities table.
pub fn community_columns() -> Vec<Column<Community>> {
    vec![
        Column::new("id", "ID", |c: &Community| c.id.into()).visible(false),
        Column::new("name", "Name", |c: &Community| c.name.as_str().into())
            .filter(FilterKind::Text)
            .hideable(false),
        Column::new("slug", "Slug", |c: &Community| c.slug.as_str().into())
            .filter(FilterKind::Text),
        Column::new("members", "Members", |c: &Community| count(c.members.len())),
        Column::new("entryAttestations", "Entry attestations", |c: &Community| {
            count(c.entry_attestations.len())
        }),
        Column::new("engagements", "Engagements", |c: &Community| {
            count(c.engagements.total())
        }),
        Column::new("hidden", "Hidden", |c: &Community| c.hidden.into()).filter(FilterKind::Facet),
    ]
}

/// Columns of the global attestations table.
pub fn attestation_columns() -> Vec<Column<Attestation>> {
    vec![
        Column::new("id", "ID", |a: &Attestation| a.id.into()).visible(false),
        Column::new("name", "Name", |a: &Attestation| a.name.as_str().into())
            .filter(FilterKind::Text)
            .hideable(false),
        Column::new("community", "Community", |a: &Attestation| {
            a.community.name.as_str().into()
        })
        .filter(FilterKind::Facet),
        Column::new("protected", "Protected", |a: &Attestation| a.protected.into())
            .filter(FilterKind::Facet),
        Column::new("canMintDoi", "Mints DOI", |a: &Attestation| a.can_mint_doi.into()),
        Column::new("canUpdateOrcid", "Updates ORCID", |a: &Attestation| {
            a.can_update_orcid.into()
        }),
        Column::new("createdAt", "Created", |a: &Attestation| a.created_at.into()),
    ]
}

/// Columns of a community's attestations table.
pub fn community_attestation_columns() -> Vec<Column<CommunityAttestation>> {
    vec![
        Column::new("attestationId", "ID", |a: &CommunityAttestation| {
            a.attestation_id.into()
        })
        .visible(false),
        Column::new("name", "Name", |a: &CommunityAttestation| a.name.as_str().into())
            .filter(FilterKind::Text)
            .hideable(false),
        Column::new("communityName", "Community", |a: &CommunityAttestation| {
            a.community_name.as_str().into()
        }),
        Column::new("isRequired", "Required", |a: &CommunityAttestation| {
            a.is_required.into()
        })
        .filter(FilterKind::Facet),
        Column::new("entry", "Entry", |a: &CommunityAttestation| a.is_entry().into())
            .filter(FilterKind::Facet),
        Column::new("isExternal", "External", |a: &CommunityAttestation| {
            a.is_external.into()
        }),
        Column::new("protected", "Protected", |a: &CommunityAttestation| {
            a.protected.into()
        }),
    ]
}

/// The users table over fetched profiles.
pub fn users_table(rows: Vec<UserProfile>) -> DataTable<UserProfile> {
    DataTable::new(user_columns(), rows)
}

/// The communities table over fetched communities.
pub fn communities_table(rows: Vec<Community>) -> DataTable<Community> {
    DataTable::new(community_columns(), rows)
}

/// The attestations table over the catalogue.
pub fn attestations_table(rows: Vec<Attestation>) -> DataTable<Attestation> {
    DataTable::new(attestation_columns(), rows)
}

/// The attestations table of one community.
pub fn community_attestations_table(
    rows: Vec<CommunityAttestation>,
) -> DataTable<CommunityAttestation> {
    DataTable::new(community_attestation_columns(), rows)
}

fn count<N: TryInto<i64>>(n: N) -> CellValue {
    n.try_into().map_or(CellValue::Null, CellValue::Int)
}
