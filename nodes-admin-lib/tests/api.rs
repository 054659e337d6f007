//! Client behaviour against a local stand-in for the admin API.

mod common;

use std::time::Duration;

use common::MockServer;
use common::Reply;
use common::TOKEN;
use nodes_admin_lib::api::NewMember;
use nodes_admin_lib::error::ApiError;
use nodes_admin_lib::error::AuthError;
use nodes_admin_lib::error::Error;
use nodes_admin_lib::model::MemberRole;
use nodes_admin_lib::rate_limit::RetryPolicy;
use serde_json::json;

#[tokio::test]
async fn test_requests_carry_bearer_session() {
    let server = MockServer::start(|_| Reply::json(json!({ "ok": true }))).await;
    let client = server.client();

    assert!(client.check_auth().await.unwrap());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1/auth/check");
    assert_eq!(requests[0].authorization.as_deref(), Some(format!("Bearer {}", TOKEN).as_str()));
}

#[tokio::test]
async fn test_check_auth_missing_flag_and_rejection() {
    let server = MockServer::start(|_| Reply::json(json!({}))).await;
    assert!(!server.client().check_auth().await.unwrap());

    let server = MockServer::start(|_| Reply::raw(401, "")).await;
    assert!(!server.client().check_auth().await.unwrap());
}

#[tokio::test]
async fn test_analytics_null_body_is_none() {
    let server = MockServer::start(|_| Reply::json(serde_json::Value::Null)).await;
    assert_eq!(server.client().analytics().await.unwrap(), None);

    let server = MockServer::start(|_| Reply::json(json!({ "newUsersToday": 4, "allUsers": 10 }))).await;
    let analytics = server.client().analytics().await.unwrap().unwrap();
    assert_eq!(analytics.new_users_today, 4);
    assert_eq!(analytics.all_users, 10);
    assert_eq!(analytics.bytes_today, 0);
}

#[tokio::test]
async fn test_list_communities_missing_data_is_empty() {
    let server = MockServer::start(|_| Reply::json(json!({}))).await;
    assert!(server.client().list_communities().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_communities_decodes_members() {
    let server = MockServer::start(|_| {
        Reply::json(json!({
            "data": [{
                "id": 7,
                "name": "DeSci Labs",
                "slug": "desci-labs",
                "image_url": "https://img.example.org/7.png",
                "hidden": false,
                "CommunityMember": [
                    { "id": 1, "role": "ADMIN", "userId": 11, "user": { "name": "Ada", "userOrganizations": [] } },
                    { "id": 2, "role": "MEMBER", "userId": 12, "user": { "name": "Bob", "userOrganizations": [] } }
                ],
                "CommunityEntryAttestation": [],
                "engagements": { "reactions": 1, "annotations": 2, "verifications": 3 },
                "verifiedEngagements": { "reactions": 0, "annotations": 0, "verifications": 0 }
            }]
        }))
    })
    .await;

    let communities = server.client().list_communities().await.unwrap();
    assert_eq!(communities.len(), 1);
    assert_eq!(communities[0].members.len(), 2);
    assert_eq!(communities[0].admins().count(), 1);
    assert_eq!(communities[0].engagements.total(), 6);
}

#[tokio::test]
async fn test_list_communities_http_error_propagates() {
    let server = MockServer::start(|_| Reply::raw(404, r#"{"message":"no such route"}"#)).await;
    let err = server.client().list_communities().await.unwrap_err();
    match err {
        Error::Api(ApiError::Http { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such route");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fail_soft_lists_on_malformed_json() {
    let server = MockServer::start(|_| Reply::raw(200, "<html>oops</html>")).await;
    let client = server.client();

    assert!(client.list_attestations().await.unwrap().is_empty());
    assert!(client.community_attestations(3).await.unwrap().is_empty());
    assert_eq!(server.hits("/v1/admin/communities/3/attestations"), 1);

    assert!(matches!(
        client.list_communities().await,
        Err(Error::Api(ApiError::Parse { .. }))
    ));
}

#[tokio::test]
async fn test_fail_soft_lists_keep_http_errors() {
    let server = MockServer::start(|_| Reply::raw(500, "boom")).await;
    let err = server.client().list_attestations().await.unwrap_err();
    assert_eq!(err.as_api().and_then(ApiError::status_code), Some(500));
}

#[tokio::test]
async fn test_transport_failure_is_soft() {
    let server = MockServer::start(|_| Reply::json(json!({}))).await;
    let client = server.client();
    drop(server);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(client.list_attestations().await.unwrap().is_empty());
    assert!(client.list_communities().await.unwrap_err().is_soft());
}

#[tokio::test]
async fn test_profile_search_query_and_fallbacks() {
    let server = MockServer::start(|req| match req.query.as_deref() {
        Some("name=ada+l") => Reply::json(json!({
            "profiles": [{ "id": 1, "name": "Ada L", "orcid": "0000-0001", "organisations": ["Lab"] }]
        })),
        _ => Reply::raw(400, "missing name"),
    })
    .await;
    let client = server.client();

    let profiles = client.search_user_profiles(Some("ada l")).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].organisations, ["Lab"]);

    assert!(client.search_user_profiles(None).await.unwrap().is_empty());
    assert_eq!(server.requests()[1].query, None);
}

#[tokio::test]
async fn test_search_users_page() {
    let server = MockServer::start(|_| {
        Reply::json(json!({
            "data": {
                "data": [
                    { "id": 1, "name": "Ada", "email": "ada@example.org", "isAdmin": true, "createdAt": "2024-03-01T10:00:00Z" },
                    { "id": 2, "name": "Bob", "email": "bob@example.org", "isAdmin": false }
                ],
                "count": 2,
                "page": 1,
                "cursor": 2
            }
        }))
    })
    .await;

    let page = server.client().search_users().await.unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.cursor, Some(2));
    assert!(page.data[0].is_admin);
    assert!(page.data[0].created_at.is_some());
    assert_eq!(page.data[1].orcid, None);
}

#[tokio::test]
async fn test_users_page_tolerates_null_text() {
    let server = MockServer::start(|_| {
        Reply::json(json!({
            "data": {
                "data": [
                    { "id": 1, "name": "Ada", "email": "ada@example.org", "isAdmin": true },
                    { "id": 2, "name": null, "email": null, "orcid": null, "isAdmin": false }
                ],
                "count": 2,
                "page": 1
            }
        }))
    })
    .await;

    let page = server.client().search_users().await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[1].name, "");
    assert_eq!(page.data[1].email, "");
}

#[tokio::test]
async fn test_mutation_routes() {
    let server = MockServer::start(|req| match req.method.as_str() {
        "POST" if req.path.ends_with("/members") => Reply::json(json!({ "ok": true })),
        _ => Reply::json(json!({})),
    })
    .await;
    let client = server.client();

    client.toggle_user_role(42).await.unwrap();
    client.add_entry_attestation(1, 2).await.unwrap();
    client.remove_entry_attestation(1, 2).await.unwrap();
    client.toggle_entry_attestation_requirement(1, 9).await.unwrap();
    let created = client
        .add_member(&NewMember {
            community_id: 1,
            user_id: 5,
            role: MemberRole::Admin,
        })
        .await
        .unwrap();
    client.remove_member(1, 8).await.unwrap();

    assert_eq!(created, json!({ "ok": true }));

    let seen: Vec<(String, String)> = server
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected = [
        ("PATCH", "/v1/admin/users/42/toggleRole"),
        ("POST", "/v1/admin/communities/1/addEntryAttestation/2"),
        ("POST", "/v1/admin/communities/1/removeEntryAttestation/2"),
        ("POST", "/v1/admin/communities/1/toggleEntryAttestation/9"),
        ("POST", "/v1/admin/communities/1/members"),
        ("DELETE", "/v1/admin/communities/1/members/8"),
    ];
    assert_eq!(seen.len(), expected.len());
    for ((method, path), (want_method, want_path)) in seen.iter().zip(expected) {
        assert_eq!(method, want_method);
        assert_eq!(path, want_path);
    }

    let requests = server.requests();
    let add: serde_json::Value = serde_json::from_str(&requests[4].body).unwrap();
    assert_eq!(add, json!({ "communityId": 1, "userId": 5, "role": "ADMIN" }));
    let remove: serde_json::Value = serde_json::from_str(&requests[5].body).unwrap();
    assert_eq!(remove, json!({ "communityId": 1, "memberId": 8 }));
}

#[tokio::test]
async fn test_rejected_session_on_mutation() {
    let server = MockServer::start(|_| Reply::raw(403, "")).await;
    let err = server.client().toggle_user_role(1).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::Rejected { status: 403 })));
}

#[tokio::test]
async fn test_reads_retry_server_errors_but_mutations_do_not() {
    let server = MockServer::start(|_| Reply::raw(503, "unavailable")).await;
    let client = server.client_with_retry(
        RetryPolicy::default()
            .attempts(2)
            .backoff(Duration::from_millis(5), Duration::from_millis(20)),
    );

    assert!(client.list_communities().await.is_err());
    assert_eq!(server.hits("/v1/admin/communities"), 3);

    assert!(client.toggle_user_role(1).await.is_err());
    assert_eq!(server.hits("/v1/admin/users/1/toggleRole"), 1);
}

#[tokio::test]
async fn test_download_report_forwards_cookie() {
    let server = MockServer::start(|_| Reply::raw(200, "day,users\n2024-01-01,3\n")).await;
    let csv = server
        .client()
        .download_report(Some("session=abc"))
        .await
        .unwrap();
    assert_eq!(&csv[..], b"day,users\n2024-01-01,3\n");

    let requests = server.requests();
    assert_eq!(requests[0].path, "/v1/admin/analytics/csv");
    assert_eq!(requests[0].cookie.as_deref(), Some("session=abc"));
}

#[tokio::test]
async fn test_save_report_writes_file() {
    let server = MockServer::start(|_| Reply::raw(200, "a,b\n1,2\n")).await;
    let path = std::env::temp_dir().join(format!("nodes-admin-report-{}.csv", std::process::id()));

    let written = server.client().save_report(&path).await.unwrap();
    assert_eq!(written, 8);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
    let _ = std::fs::remove_file(&path);
}
