//! Community membership mutations.

use reqwest::Method;
use serde::Serialize;

use crate::client::decode_json;
use crate::client::Body;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::MemberRole;
use crate::AdminClient;

/// Body of the add-member request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub community_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberRef {
    community_id: i64,
    member_id: i64,
}

impl AdminClient {
    /// Adds a user to a community and returns the API's JSON answer.
    pub async fn add_member(&self, member: &NewMember) -> Result<serde_json::Value, Error> {
        let url = self.endpoint(&format!("/v1/admin/communities/{}/members", member.community_id))?;
        let body = serde_json::to_value(member)
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        let response = self
            .send(Method::POST, url, Body::Json(body), Default::default())
            .await?;
        decode_json(response).await
    }

    /// Removes a membership from a community.
    pub async fn remove_member(&self, community_id: i64, member_id: i64) -> Result<(), Error> {
        let url = self.endpoint(&format!(
            "/v1/admin/communities/{}/members/{}",
            community_id, member_id
        ))?;
        let body = serde_json::to_value(MemberRef {
            community_id,
            member_id,
        })
        .map_err(|e| ApiError::Encode(e.to_string()))?;
        self.send_unit(Method::DELETE, url, Body::Json(body)).await
    }
}
