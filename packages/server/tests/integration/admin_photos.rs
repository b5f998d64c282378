use sea_orm::EntityTrait;
use serde_json::json;

use server::entity::mountain;

use crate::common::{TestApp, routes};

async fn photo_url_of(app: &TestApp, id: i32) -> Option<String> {
    mountain::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .expect("DB query failed")
        .expect("Mountain not found")
        .photo_url
}

/// Three mountains: one discoverable by literal title, one only via the
/// " (山)" disambiguator, one unknown to Wikipedia.
async fn seed_mountains(app: &TestApp, admin: &str) -> (i32, i32, i32) {
    let fuji = app.create_mountain(admin, "富士山", 3776).await;
    let takao = app.create_mountain(admin, "高尾", 599).await;
    let unknown = app.create_mountain(admin, "無名峰", 1234).await;

    app.stub
        .add_photo("富士山", &app.stub.image_url("Fuji.jpg"));
    app.stub
        .add_photo("高尾 (山)", &app.stub.image_url("Takao.jpg"));

    (fuji, takao, unknown)
}

#[tokio::test]
async fn dry_run_discovers_without_persisting() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (fuji, takao, unknown) = seed_mountains(&app, &admin).await;

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({ "dryRun": true }), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["dryRun"], true);
    assert_eq!(res.body["scanned"], 3);
    assert_eq!(res.body["applied"], 0);
    assert_eq!(res.body["skipped"], 1);
    assert_eq!(res.body["failed"], 0);
    assert_eq!(res.body["updates"].as_array().unwrap().len(), 2);

    // A dry run never mutates the record store.
    for id in [fuji, takao, unknown] {
        assert_eq!(photo_url_of(&app, id).await, None);
    }
}

#[tokio::test]
async fn batch_persists_discovered_urls() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (fuji, takao, unknown) = seed_mountains(&app, &admin).await;

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["applied"], 2);
    assert_eq!(res.body["skipped"], 1);

    assert_eq!(
        photo_url_of(&app, fuji).await.as_deref(),
        Some(app.stub.image_url("Fuji.jpg").as_str())
    );
    assert_eq!(
        photo_url_of(&app, takao).await.as_deref(),
        Some(app.stub.image_url("Takao.jpg").as_str())
    );
    assert_eq!(photo_url_of(&app, unknown).await, None);
}

#[tokio::test]
async fn second_run_only_scans_missing_photos_unless_forced() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    seed_mountains(&app, &admin).await;

    let first = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({}), &admin)
        .await;
    assert_eq!(first.body["scanned"], 3);

    // The two updated mountains now have photos and fall out of the scan.
    let second = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({}), &admin)
        .await;
    assert_eq!(second.body["scanned"], 1);
    assert_eq!(second.body["applied"], 0);

    let forced = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({ "force": true }), &admin)
        .await;
    assert_eq!(forced.body["force"], true);
    assert_eq!(forced.body["scanned"], 3);
    assert_eq!(forced.body["applied"], 2);
}

#[tokio::test]
async fn disambiguator_fallback_is_tried_after_the_literal_title() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let takao = app.create_mountain(&admin, "高尾", 599).await;
    app.stub
        .add_photo("高尾 (山)", &app.stub.image_url("Takao.jpg"));

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({}), &admin)
        .await;
    assert_eq!(res.body["applied"], 1);
    // Literal title missed, disambiguated title hit.
    assert_eq!(app.stub.pageimages_hits(), 2);
    assert!(photo_url_of(&app, takao).await.is_some());
}

#[tokio::test]
async fn limit_is_validated() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    for limit in [0, 101] {
        let res = app
            .post_with_token(routes::ADMIN_PHOTOS, &json!({ "limit": limit }), &admin)
            .await;
        assert_eq!(res.status, 400, "limit {limit}: {}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn rejects_non_admin_callers_before_any_work() {
    let app = TestApp::spawn().await;
    let member = app.member_token("hiker@yamatabi.test").await;

    let res = app
        .post_with_token(routes::ADMIN_PHOTOS, &json!({}), &member)
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
    assert_eq!(app.stub.pageimages_hits(), 0);

    let res = app.post_without_token(routes::ADMIN_PHOTOS, &json!({})).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
