use serde_json::json;

use server::utils::b64;

use crate::common::{FAKE_JPEG, StubFile, TestApp, routes};

fn stub_file(app: &TestApp, name: &str) -> StubFile {
    StubFile {
        url: app.stub.image_url(name),
        author: Some("<a href=\"#\">Alice</a>".into()),
        license: Some("CC BY-SA 4.0".into()),
        license_url: Some("https://creativecommons.org/licenses/by-sa/4.0".into()),
    }
}

#[tokio::test]
async fn proxies_a_raw_external_image() {
    let app = TestApp::spawn().await;

    let u = b64::encode_url(&app.stub.image_url("Fuji.jpg"));
    let res = app.get_raw(&routes::image(&u)).await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "image/jpeg"
    );
    assert_eq!(
        res.headers()["cache-control"].to_str().unwrap(),
        "public, max-age=31536000, immutable"
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), FAKE_JPEG);
}

#[tokio::test]
async fn resolves_a_file_page_link_through_commons_before_fetching() {
    let app = TestApp::spawn().await;
    app.stub.add_file("Fuji.jpg", stub_file(&app, "Fuji.jpg"));

    let u = b64::encode_url("https://commons.wikimedia.org/wiki/File:Fuji.jpg");
    let res = app.get_raw(&routes::image(&u)).await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.bytes().await.unwrap().as_ref(), FAKE_JPEG);
    assert_eq!(app.stub.imageinfo_hits(), 1);
    assert_eq!(app.stub.image_hits(), 1);
}

#[tokio::test]
async fn viewer_fragment_link_resolves_to_the_same_bytes() {
    let app = TestApp::spawn().await;
    app.stub.add_file("Fuji.jpg", stub_file(&app, "Fuji.jpg"));

    let u = b64::encode_url("https://ja.wikipedia.org/wiki/富士山#/media/ファイル:Fuji.jpg");
    let res = app.get_raw(&routes::image(&u)).await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.bytes().await.unwrap().as_ref(), FAKE_JPEG);
}

#[tokio::test]
async fn unknown_commons_file_is_not_found() {
    let app = TestApp::spawn().await;

    let u = b64::encode_url("https://commons.wikimedia.org/wiki/File:Nope.jpg");
    let res = app.get_without_token(&routes::image(&u)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn oversized_upstream_is_aborted_with_413() {
    let app = TestApp::spawn().await;

    let u = b64::encode_url(&format!("{}/huge", app.stub.base()));
    let res = app.get_without_token(&routes::image(&u)).await;
    assert_eq!(res.status, 413);
    assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn upstream_5xx_is_retried_then_surfaced_as_502() {
    let app = TestApp::spawn().await;

    let u = b64::encode_url(&format!("{}/flaky", app.stub.base()));
    let res = app.get_without_token(&routes::image(&u)).await;
    assert_eq!(res.status, 502);
    assert_eq!(res.body["code"], "UPSTREAM_FAILED");
    // max_attempts is 2 in the test config.
    assert_eq!(app.stub.flaky_hits(), 2);
}

#[tokio::test]
async fn upstream_404_maps_to_not_found() {
    let app = TestApp::spawn().await;

    let u = b64::encode_url(&format!("{}/missing", app.stub.base()));
    let res = app.get_without_token(&routes::image(&u)).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn undecodable_parameter_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::image("%21%21%21")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");

    let u = b64::encode_url("ftp://example.org/x.jpg");
    let res = app.get_without_token(&routes::image(&u)).await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn metadata_is_returned_for_a_wikimedia_file() {
    let app = TestApp::spawn().await;
    app.stub.add_file("Fuji.jpg", stub_file(&app, "Fuji.jpg"));

    let u = b64::encode_url("https://commons.wikimedia.org/wiki/Special:FilePath/Fuji.jpg");
    let res = app.get_without_token(&routes::image_meta(&u)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["fileName"], "Fuji.jpg");
    assert_eq!(
        res.body["filePageUrl"],
        "https://commons.wikimedia.org/wiki/File:Fuji.jpg"
    );
    assert_eq!(res.body["author"], "<a href=\"#\">Alice</a>");
    assert_eq!(res.body["license"], "CC BY-SA 4.0");
    assert_eq!(
        res.body["licenseUrl"],
        "https://creativecommons.org/licenses/by-sa/4.0"
    );
}

#[tokio::test]
async fn metadata_for_non_wikimedia_urls_is_absent_without_a_commons_call() {
    let app = TestApp::spawn().await;

    let u = b64::encode_url(&app.stub.image_url("somewhere-else.jpg"));
    let res = app.get_without_token(&routes::image_meta(&u)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(app.stub.imageinfo_hits(), 0);
}

#[tokio::test]
async fn proxy_endpoints_are_rate_limited_per_client() {
    let app = TestApp::spawn_with(|config| {
        config.rate_limit.requests_per_window = 2;
    })
    .await;
    app.stub.add_file("Fuji.jpg", stub_file(&app, "Fuji.jpg"));
    let u = b64::encode_url("https://commons.wikimedia.org/wiki/Special:FilePath/Fuji.jpg");

    for _ in 0..2 {
        let res = app.get_without_token(&routes::image_meta(&u)).await;
        assert_eq!(res.status, 200);
    }

    let res = app.get_raw(&routes::image_meta(&u)).await;
    assert_eq!(res.status().as_u16(), 429);
    assert!(res.headers().contains_key("retry-after"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn mutating_endpoints_share_the_rate_limit() {
    let app = TestApp::spawn_with(|config| {
        config.rate_limit.requests_per_window = 1;
    })
    .await;
    let admin = app.admin_token().await;
    let mountain_id = app.create_mountain(&admin, "丹沢山", 1567).await;
    let member = app.member_token("hiker@yamatabi.test").await;

    let first = app
        .post_with_token(
            &routes::mountain_reviews(mountain_id),
            &json!({ "rating": 5, "body": "Quiet ridgeline." }),
            &member,
        )
        .await;
    assert_eq!(first.status, 201, "{}", first.text);

    let second = app
        .post_with_token(
            &routes::mountain_reviews(mountain_id),
            &json!({ "rating": 4, "body": "Again." }),
            &member,
        )
        .await;
    assert_eq!(second.status, 429);
}
