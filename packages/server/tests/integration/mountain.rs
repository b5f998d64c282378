use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_requires_admin() {
    let app = TestApp::spawn().await;
    let member = app.member_token("hiker@yamatabi.test").await;

    let res = app
        .post_with_token(
            routes::MOUNTAINS,
            &json!({
                "name": "富士山",
                "prefecture": "静岡県",
                "elevation_m": 3776,
                "description": "x",
            }),
            &member,
        )
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn create_get_and_list_round_trip() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let id = app.create_mountain(&admin, "富士山", 3776).await;
    app.create_mountain(&admin, "高尾山", 599).await;

    let res = app.get_without_token(&routes::mountain(id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"], "富士山");
    assert_eq!(res.body["elevation_m"], 3776);
    assert_eq!(res.body["photo_url"], serde_json::Value::Null);

    let res = app
        .get_without_token(&format!("{}?search=富士", routes::MOUNTAINS))
        .await;
    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "富士山");
    assert_eq!(res.body["pagination"]["total"], 1);

    let res = app
        .get_without_token(&format!(
            "{}?sort_by=elevation_m&sort_order=asc",
            routes::MOUNTAINS
        ))
        .await;
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data[0]["name"], "高尾山");
    assert_eq!(data[1]["name"], "富士山");
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_mountain(&admin, "富士山", 3776).await;

    let res = app
        .post_with_token(
            routes::MOUNTAINS,
            &json!({
                "name": "富士山",
                "prefecture": "山梨県",
                "elevation_m": 3776,
                "description": "x",
            }),
            &admin,
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn patch_updates_and_clears_the_photo() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = app.create_mountain(&admin, "丹沢山", 1567).await;

    let res = app
        .patch_with_token(
            &routes::mountain(id),
            &json!({ "photo_url": "https://upload.wikimedia.org/wikipedia/commons/a/ab/Tanzawa.jpg" }),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(
        res.body["photo_url"],
        "https://upload.wikimedia.org/wikipedia/commons/a/ab/Tanzawa.jpg"
    );

    // Explicit null clears; other fields stay put.
    let res = app
        .patch_with_token(&routes::mountain(id), &json!({ "photo_url": null }), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["photo_url"], serde_json::Value::Null);
    assert_eq!(res.body["name"], "丹沢山");

    // An empty payload is a no-op read.
    let res = app
        .patch_with_token(&routes::mountain(id), &json!({}), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"], "丹沢山");
}

#[tokio::test]
async fn validation_failures_are_reported() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::MOUNTAINS,
            &json!({
                "name": "",
                "prefecture": "静岡県",
                "elevation_m": 3776,
                "description": "x",
            }),
            &admin,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn reviews_round_trip_with_one_per_user() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = app.create_mountain(&admin, "高尾山", 599).await;
    let member = app.member_token("hiker@yamatabi.test").await;

    let res = app
        .post_with_token(
            &routes::mountain_reviews(id),
            &json!({ "rating": 4, "body": "Crowded but lovely." }),
            &member,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let res = app
        .post_with_token(
            &routes::mountain_reviews(id),
            &json!({ "rating": 5, "body": "Changed my mind." }),
            &member,
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");

    let res = app.get_without_token(&routes::mountain_reviews(id)).await;
    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["rating"], 4);

    let res = app
        .post_with_token(
            &routes::mountain_reviews(id),
            &json!({ "rating": 9, "body": "x" }),
            &app.member_token("second@yamatabi.test").await,
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn climbs_round_trip() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let fuji = app.create_mountain(&admin, "富士山", 3776).await;
    let takao = app.create_mountain(&admin, "高尾山", 599).await;
    let member = app.member_token("hiker@yamatabi.test").await;

    for (mountain_id, date) in [(fuji, "2026-05-03"), (takao, "2026-06-14")] {
        let res = app
            .post_with_token(
                &routes::mountain_climbs(mountain_id),
                &json!({ "climbed_on": date, "notes": "Clear skies" }),
                &member,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app.get_without_token(&routes::mountain_climbs(fuji)).await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);

    let res = app.get_with_token(routes::MY_CLIMBS, &member).await;
    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    // Most recent ascent first.
    assert_eq!(data[0]["mountain_id"], takao);

    let res = app.get_without_token(routes::MY_CLIMBS).await;
    assert_eq!(res.status, 401);

    let res = app
        .post_with_token(
            &routes::mountain_climbs(fuji),
            &json!({ "climbed_on": "2999-01-01" }),
            &member,
        )
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .post_with_token(
            &routes::mountain_climbs(999999),
            &json!({ "climbed_on": "2026-05-03" }),
            &member,
        )
        .await;
    assert_eq!(res.status, 404);
}
