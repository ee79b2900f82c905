use crate::fixtures::{test_app::TestApp, upstream};
use mockito::Matcher;
use serde_json::{Value, json};

#[tokio::test]
async fn drive_loading_leaves_out_a_failing_binding() {
    let mut app = TestApp::spawn().await;
    let user = app.seed_user("grace").await;
    let b1 = app.seed_binding(&user, "B1", "tok-1", true).await;
    app.seed_binding(&user, "B2", "tok-2", true).await;
    let b3 = app.seed_binding(&user, "B3", "tok-3", true).await;

    let _d1 = upstream::single_empty_drive(&mut app.upstream, "tok-1", "D1", "One").await;
    let _d2 = upstream::rejected_token(&mut app.upstream, "tok-2", 401).await;
    let _d3 = upstream::single_empty_drive(&mut app.upstream, "tok-3", "D3", "Three").await;

    let resp = app
        .auth_post("/api/dooray/driveLoading", &user.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body = resp.text().await.unwrap();
    assert!(!body.contains("tok-"), "token leaked: {}", body);

    let json: Value = serde_json::from_str(&body).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["apiTitle"], "B1");
    assert_eq!(entries[0]["apiIdx"], b1.to_hex());
    assert_eq!(entries[0]["apiURL"], app.upstream.url());
    assert_eq!(entries[0]["drives"][0]["uniqueKey"], "drive-D1");
    assert_eq!(entries[1]["apiTitle"], "B3");
    assert_eq!(entries[1]["apiIdx"], b3.to_hex());
    assert_eq!(entries[1]["drives"][0]["root"]["name"], "Three");
}

#[tokio::test]
async fn drive_loading_without_connected_bindings_is_unauthorized() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("heidi").await;
    app.seed_binding(&user, "idle", "tok", false).await;

    let resp = app
        .auth_post("/api/dooray/driveLoading", &user.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn member_name_uses_first_connected_binding() {
    let mut app = TestApp::spawn().await;
    let user = app.seed_user("ivan").await;
    app.seed_binding(&user, "first", "tok-first", true).await;
    app.seed_binding(&user, "second", "tok-second", true).await;

    let _member = app
        .upstream
        .mock("GET", "/common/v1/members/M1")
        .match_header("authorization", "dooray-api tok-first")
        .with_body(upstream::ok(json!({ "id": "M1", "name": "Kim" })))
        .create_async()
        .await;

    let resp = app
        .auth_post("/api/dooray/userId?userId=M1", &user.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "Kim");
}

#[tokio::test]
async fn member_name_is_dash_without_binding_or_result() {
    let mut app = TestApp::spawn().await;
    let user = app.seed_user("judy").await;

    let resp = app
        .auth_post("/api/dooray/userId?userId=M1", &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.text().await.unwrap(), "-");

    app.seed_binding(&user, "work", "tok", true).await;
    let _member = app
        .upstream
        .mock("GET", "/common/v1/members/M2")
        .match_query(Matcher::Any)
        .with_body(upstream::ok(Value::Null))
        .create_async()
        .await;

    let resp = app
        .auth_post("/api/dooray/userId?userId=M2", &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.text().await.unwrap(), "-");
}
