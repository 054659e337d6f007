//! User directory records.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// A user in the admin directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A profile returned by the name search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub organisations: Vec<String>,
}

/// `{profiles: [...]}` body of the name search.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProfileSearch {
    #[serde(default)]
    pub profiles: Vec<ProfileSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_wire_format() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id":4,"name":"Ada","email":"ada@example.com","orcid":null,"isAdmin":true,"createdAt":"2024-10-08T14:00:00.000Z"}"#,
        )
        .unwrap();
        assert!(user.is_admin);
        assert_eq!(user.orcid, None);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_null_name_and_email_read_as_empty() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id":2,"name":null,"email":null,"isAdmin":false}"#).unwrap();
        assert_eq!(user.name, "");
        assert_eq!(user.email, "");

        let profile: ProfileSummary =
            serde_json::from_str(r#"{"id":2,"name":null,"organisations":null}"#).unwrap();
        assert!(profile.organisations.is_empty());
    }
}
