//! Read-only checks against a real admin API.
//!
//! Ignored by default. Create a `.env` file in the nodes-admin-lib directory with:
//!
//! ```env
//! NODES_API_URL=https://nodes-api.example.org
//! NODES_ADMIN_TOKEN=your-session-token
//! ```
//!
//! Then run: `cargo test -p nodes-admin-lib -- --ignored`

use std::env;

use nodes_admin_lib::auth::StaticSession;
use nodes_admin_lib::AdminClient;

fn live_client() -> Option<AdminClient> {
    let _ = dotenvy::dotenv();

    let url = env::var("NODES_API_URL").ok()?;
    let token = env::var("NODES_ADMIN_TOKEN").ok()?;

    AdminClient::builder()
        .url(url)
        .session_provider(StaticSession::new(token))
        .build()
        .ok()
}

#[tokio::test]
#[ignore = "requires NODES_API_URL and NODES_ADMIN_TOKEN in .env"]
async fn test_session_is_accepted() {
    let client = live_client().expect("Missing required environment variables. See module docs.");
    assert!(client.check_auth().await.expect("auth check failed"));
}

#[tokio::test]
#[ignore = "requires NODES_API_URL and NODES_ADMIN_TOKEN in .env"]
async fn test_dashboard_reads() {
    let client = live_client().expect("Missing required environment variables. See module docs.");

    let analytics = client.analytics().await.expect("analytics failed");
    println!("analytics: {:?}", analytics);

    let communities = client.list_communities().await.expect("communities failed");
    println!("{} communities", communities.len());

    let users = client.search_users().await.expect("user search failed");
    println!("{} of {} users", users.data.len(), users.count);
}
