//! Community listing.

use crate::error::Error;
use crate::model::ApiResponse;
use crate::model::Community;
use crate::AdminClient;

impl AdminClient {
    /// Lists every community with members and entry attestations.
    ///
    /// An envelope without `data` yields an empty list; other failures propagate.
    pub async fn list_communities(&self) -> Result<Vec<Community>, Error> {
        let url = self.endpoint("/v1/admin/communities")?;
        let envelope: ApiResponse<Vec<Community>> = self.get_json(url).await?;
        let communities = envelope.into_data_or_default();
        log::debug!("fetched {} communities", communities.len());
        Ok(communities)
    }
}
