//! The admin console
//!
//! Ties the [`AdminClient`] to a [`QueryCache`]: reads are mounted as cached
//! queries, mutations go straight to the API and then invalidate the tags
//! whose data they changed.

mod metrics;
mod tables;

pub use metrics::*;
pub use tables::*;

use std::time::Duration;

use crate::api::NewMember;
use crate::error::Error;
use crate::model::Analytics;
use crate::model::Attestation;
use crate::model::Community;
use crate::model::CommunityAttestation;
use crate::model::MemberRole;
use crate::model::Paginated;
use crate::model::ProfileSummary;
use crate::model::UserProfile;
use crate::query::Invalidate;
use crate::query::QueryCache;
use crate::query::QueryHandle;
use crate::query::QueryKey;
use crate::query::QueryOptions;
use crate::query::tags;
use crate::AdminClient;

/// How long analytics stay fresh before a mount refetches them.
pub const ANALYTICS_STALE_TIME: Duration = Duration::from_secs(60);

/// Cached reads and invalidating writes over one admin API.
///
/// Cheap to clone; clones share the client and the cache.
#[derive(Clone, Debug)]
pub struct AdminConsole {
    client: AdminClient,
    cache: QueryCache,
}

impl AdminConsole {
    /// Creates a console with a fresh cache.
    pub fn new(client: AdminClient) -> Self {
        Self::with_cache(client, QueryCache::new())
    }

    /// Creates a console sharing an existing cache.
    pub fn with_cache(client: AdminClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Dashboard analytics; `None` when the backend has none yet.
    pub fn analytics(&self) -> QueryHandle<Option<Analytics>> {
        let client = self.client.clone();
        self.cache.use_query(
            QueryKey::new(tags::ANALYTICS),
            move || {
                let client = client.clone();
                async move { client.analytics().await }
            },
            QueryOptions::default().with_stale_time(ANALYTICS_STALE_TIME),
        )
    }

    pub fn communities(&self) -> QueryHandle<Vec<Community>> {
        let client = self.client.clone();
        self.cache.use_query(
            QueryKey::new(tags::COMMUNITIES),
            move || {
                let client = client.clone();
                async move { client.list_communities().await }
            },
            QueryOptions::default(),
        )
    }

    pub fn attestations(&self) -> QueryHandle<Vec<Attestation>> {
        let client = self.client.clone();
        self.cache.use_query(
            QueryKey::new(tags::ATTESTATIONS),
            move || {
                let client = client.clone();
                async move { client.list_attestations().await }
            },
            QueryOptions::default(),
        )
    }

    /// Attestations of one community, cached under the attestations tag.
    pub fn community_attestations(&self, community_id: i64) -> QueryHandle<Vec<CommunityAttestation>> {
        let client = self.client.clone();
        self.cache.use_query(
            QueryKey::new(tags::ATTESTATIONS).param("id", community_id),
            move || {
                let client = client.clone();
                async move { client.community_attestations(community_id).await }
            },
            QueryOptions::default(),
        )
    }

    pub fn users(&self) -> QueryHandle<Paginated<Vec<UserProfile>>> {
        let client = self.client.clone();
        self.cache.use_query(
            QueryKey::new(tags::USERS),
            move || {
                let client = client.clone();
                async move { client.search_users().await }
            },
            QueryOptions::default(),
        )
    }

    /// Profiles matching a name, as the member picker searches them.
    pub fn search_profiles(&self, name: Option<&str>) -> QueryHandle<Vec<ProfileSummary>> {
        let client = self.client.clone();
        let name = name.map(str::to_string);
        let mut key = QueryKey::new(tags::USERS).param("search", "profiles");
        if let Some(name) = &name {
            key = key.param("name", name);
        }
        self.cache.use_query(
            key,
            move || {
                let client = client.clone();
                let name = name.clone();
                async move { client.search_user_profiles(name.as_deref()).await }
            },
            QueryOptions::default(),
        )
    }

    /// Whether the session is accepted.
    pub fn auth(&self) -> QueryHandle<bool> {
        let client = self.client.clone();
        self.cache.use_query(
            QueryKey::new(tags::AUTH),
            move || {
                let client = client.clone();
                async move { client.check_auth().await }
            },
            QueryOptions::default(),
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn invalidate_all<'a>(&self, targets: impl IntoIterator<Item = &'a str>) {
        for tag in targets {
            self.cache.invalidate(Invalidate::from(tag));
        }
    }

    /// Flips a user's admin flag, then refreshes users.
    pub async fn toggle_user_role(&self, user_id: i64) -> Result<(), Error> {
        self.client.toggle_user_role(user_id).await?;
        self.invalidate_all([tags::USERS]);
        Ok(())
    }

    /// Adds a user to a community, then refreshes communities.
    pub async fn add_member(
        &self,
        community_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<serde_json::Value, Error> {
        let member = NewMember {
            community_id,
            user_id,
            role,
        };
        let created = self.client.add_member(&member).await?;
        self.invalidate_all([tags::COMMUNITIES]);
        Ok(created)
    }

    /// Removes a member from a community, then refreshes communities.
    pub async fn remove_member(&self, community_id: i64, member_id: i64) -> Result<(), Error> {
        self.client.remove_member(community_id, member_id).await?;
        self.invalidate_all([tags::COMMUNITIES]);
        Ok(())
    }

    pub async fn add_entry_attestation(&self, community_id: i64, attestation_id: i64) -> Result<(), Error> {
        self.client
            .add_entry_attestation(community_id, attestation_id)
            .await?;
        self.invalidate_all([tags::ATTESTATIONS, tags::COMMUNITIES]);
        Ok(())
    }

    pub async fn remove_entry_attestation(&self, community_id: i64, attestation_id: i64) -> Result<(), Error> {
        self.client
            .remove_entry_attestation(community_id, attestation_id)
            .await?;
        self.invalidate_all([tags::ATTESTATIONS, tags::COMMUNITIES]);
        Ok(())
    }

    pub async fn toggle_entry_attestation_requirement(&self, community_id: i64, entry_id: i64) -> Result<(), Error> {
        self.client
            .toggle_entry_attestation_requirement(community_id, entry_id)
            .await?;
        self.invalidate_all([tags::ATTESTATIONS, tags::COMMUNITIES]);
        Ok(())
    }
}
