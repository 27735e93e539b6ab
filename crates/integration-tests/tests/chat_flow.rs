//! End-to-end chat scenarios.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations + seed applied
//! - The web server running (cargo run -p shopsync-web)
//!
//! Run with: cargo test -p shopsync-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use shopsync_integration_tests::{base_url, client};

async fn bootstrap(client: &Client, display_name: &str) -> i64 {
    let resp = client
        .post(format!("{}/api/users", base_url()))
        .json(&json!({ "display_name": display_name }))
        .send()
        .await
        .expect("Failed to create identity");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{}/api/rooms", base_url()))
        .json(&json!({ "name": "Chat Test Room" }))
        .send()
        .await
        .expect("Failed to create room");
    assert_eq!(resp.status(), StatusCode::OK);
    let room: Value = resp.json().await.expect("Failed to parse room");
    room["id"].as_i64().expect("room id")
}

#[tokio::test]
#[ignore = "Requires running web server and seeded database"]
async fn test_post_text_and_react() {
    let client = client();
    let room_id = bootstrap(&client, "Sarah").await;

    let resp = client
        .post(format!("{}/api/rooms/{room_id}/messages", base_url()))
        .json(&json!({ "content": "Found this amazing jacket, what do you think?" }))
        .send()
        .await
        .expect("Failed to post message");
    assert_eq!(resp.status(), StatusCode::OK);
    let message: Value = resp.json().await.expect("Failed to parse message");
    assert_eq!(message["kind"], "text");
    let message_id = message["id"].as_i64().expect("message id");

    // Reactions are repeatable: two hearts from the same session count twice.
    for _ in 0..2 {
        let resp = client
            .post(format!("{}/api/messages/{message_id}/reactions", base_url()))
            .json(&json!({ "kind": "heart" }))
            .send()
            .await
            .expect("Failed to react");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let messages: Value = client
        .get(format!("{}/api/rooms/{room_id}/messages", base_url()))
        .send()
        .await
        .expect("Failed to list messages")
        .json()
        .await
        .expect("Failed to parse messages");
    let reacted = messages
        .as_array()
        .expect("messages array")
        .iter()
        .find(|m| m["id"].as_i64() == Some(message_id))
        .expect("posted message present");
    assert_eq!(reacted["hearts"], 2);
}

#[tokio::test]
#[ignore = "Requires running web server and seeded database"]
async fn test_product_share_requires_known_product() {
    let client = client();
    let room_id = bootstrap(&client, "Mike").await;

    let resp = client
        .post(format!("{}/api/rooms/{room_id}/messages", base_url()))
        .json(&json!({ "content": "Check this out", "product_id": 999_999 }))
        .send()
        .await
        .expect("Failed to post message");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running web server and seeded database"]
async fn test_non_member_cannot_read_messages() {
    let owner = client();
    let room_id = bootstrap(&owner, "Sarah").await;

    let stranger = client();
    let resp = stranger
        .post(format!("{}/api/users", base_url()))
        .json(&json!({ "display_name": "Stranger" }))
        .send()
        .await
        .expect("Failed to create identity");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = stranger
        .get(format!("{}/api/rooms/{room_id}/messages", base_url()))
        .send()
        .await
        .expect("Failed to call messages endpoint");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
