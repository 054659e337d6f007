//! User directory.

use reqwest::Method;

use super::FailSoft;
use crate::client::Body;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::ApiResponse;
use crate::model::Paginated;
use crate::model::ProfileSearch;
use crate::model::ProfileSummary;
use crate::model::UserProfile;
use crate::AdminClient;

impl AdminClient {
    /// Fetches the first page of the user directory.
    pub async fn search_users(&self) -> Result<Paginated<Vec<UserProfile>>, Error> {
        let url = self.endpoint("/v1/admin/users/search")?;
        let envelope: ApiResponse<Paginated<Vec<UserProfile>>> = self.get_json(url).await?;
        let page = envelope.into_data_or_default();
        log::debug!("fetched {} of {} users", page.data.len(), page.count);
        Ok(page)
    }

    /// Searches profiles by name.
    ///
    /// An empty or missing name lists without a filter. Non-success statuses
    /// and soft failures yield an empty list.
    pub async fn search_user_profiles(&self, name: Option<&str>) -> Result<Vec<ProfileSummary>, Error> {
        let mut url = self.endpoint("/v1/admin/users/search")?;
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            url.query_pairs_mut().append_pair("name", name);
        }

        match self.get_json::<ProfileSearch>(url).await {
            Ok(search) => Ok(search.profiles),
            Err(Error::Api(ApiError::Http { status, .. })) => {
                log::warn!("profile search returned HTTP {}", status);
                Ok(Vec::new())
            }
            Err(err) => Err::<Vec<ProfileSummary>, Error>(err).or_empty("/v1/admin/users/search"),
        }
    }

    /// Grants or revokes the admin role of a user.
    pub async fn toggle_user_role(&self, user_id: i64) -> Result<(), Error> {
        let url = self.endpoint(&format!("/v1/admin/users/{}/toggleRole", user_id))?;
        self.send_unit(Method::PATCH, url, Body::None).await
    }
}
