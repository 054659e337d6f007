//! Platform usage analytics.

use serde::Deserialize;
use serde::Serialize;

/// Pre-aggregated usage counters for the dashboard.
///
/// Every counter defaults to zero when the API omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
    pub new_users_today: i64,
    pub new_users_in_last_7_days: i64,
    pub new_users_in_last_30_days: i64,
    pub new_orcid_users_today: i64,
    pub new_orcid_users_in_last_7_days: i64,
    pub new_orcid_users_in_last_30_days: i64,

    pub active_users_today: i64,
    pub active_users_in_last_7_days: i64,
    pub active_users_in_last_30_days: i64,
    pub active_orcid_users_today: i64,
    pub active_orcid_users_in_last_7_days: i64,
    pub active_orcid_users_in_last_30_days: i64,

    pub all_users: i64,
    pub all_orcid_users: i64,

    pub new_nodes_today: i64,
    pub new_nodes_in_last_7_days: i64,
    pub new_nodes_in_last_30_days: i64,

    pub node_views_today: i64,
    pub node_views_in_last_7_days: i64,
    pub node_views_in_last_30_days: i64,

    pub bytes_today: u64,
    pub bytes_in_last_7_days: u64,
    pub bytes_in_last_30_days: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let analytics: Analytics = serde_json::from_str(
            r#"{"newUsersToday":5,"newUsersInLast7Days":12,"bytesInLast30Days":2048,"allOrcidUsers":3}"#,
        )
        .unwrap();
        assert_eq!(analytics.new_users_today, 5);
        assert_eq!(analytics.new_users_in_last_7_days, 12);
        assert_eq!(analytics.bytes_in_last_30_days, 2048);
        assert_eq!(analytics.all_orcid_users, 3);
        assert_eq!(analytics.node_views_today, 0);
    }
}
