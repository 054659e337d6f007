//! Usage analytics.

use crate::error::Error;
use crate::model::Analytics;
use crate::AdminClient;

impl AdminClient {
    /// Fetches the pre-aggregated usage analytics.
    ///
    /// Returns `None` when the API answers with a `null` body. Parse and
    /// transport failures propagate so the dashboard can show its error state.
    pub async fn analytics(&self) -> Result<Option<Analytics>, Error> {
        let url = self.endpoint("/v1/admin/analytics")?;
        self.get_json(url).await
    }
}
