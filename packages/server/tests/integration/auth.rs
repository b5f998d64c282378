use serde_json::json;

use crate::common::{ALLOWLISTED_ADMIN_EMAIL, TestApp, routes};

/// Admin authorization is satisfied by any of three sources. A dry-run batch
/// call is used as the probe since it performs no writes.

#[tokio::test]
async fn stored_role_column_grants_admin() {
    let app = TestApp::spawn().await;
    let email = "db-admin@yamatabi.test";
    let id = app.create_user(email, "admin").await;
    // Token claim deliberately carries the non-admin role.
    let token = app.token_for(id, email, "member");

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({ "dryRun": true }), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn token_role_claim_grants_admin() {
    let app = TestApp::spawn().await;
    let email = "claim-admin@yamatabi.test";
    // Stored role stays "member"; only the app-metadata claim says admin.
    let id = app.create_user(email, "member").await;
    let token = app.token_for(id, email, "admin");

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({ "dryRun": true }), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn allowlisted_email_grants_admin() {
    let app = TestApp::spawn().await;
    let id = app.create_user(ALLOWLISTED_ADMIN_EMAIL, "member").await;
    let token = app.token_for(id, ALLOWLISTED_ADMIN_EMAIL, "member");

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({ "dryRun": true }), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn plain_members_are_denied() {
    let app = TestApp::spawn().await;
    let token = app.member_token("plain@yamatabi.test").await;

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({ "dryRun": true }), &token)
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({}), "not-a-jwt")
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}
