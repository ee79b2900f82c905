use crate::fixtures::{test_app::TestApp, upstream};
use serde_json::Value;

#[tokio::test]
async fn api_loading_lists_connected_bindings_without_tokens() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("alice").await;
    let work = app.seed_binding(&user, "work", "secret-work", true).await;
    app.seed_binding(&user, "idle", "secret-idle", false).await;

    let resp = app
        .auth_post("/api/dooray/apiLoading", &user.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body = resp.text().await.unwrap();
    assert!(!body.contains("secret-"), "token leaked: {}", body);

    let json: Value = serde_json::from_str(&body).unwrap();
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["apiIdx"], work.to_hex());
    assert_eq!(list[0]["apiTitle"], "work");
    assert_eq!(list[0]["isConnected"], true);
}

#[tokio::test]
async fn drive_connect_returns_drives_and_marks_binding_connected() {
    let mut app = TestApp::spawn().await;
    let user = app.seed_user("bob").await;
    let binding = app.seed_binding(&user, "work", "tok-ok", false).await;
    let _mocks = upstream::single_empty_drive(&mut app.upstream, "tok-ok", "D1", "Team").await;

    let resp = app
        .auth_get(
            &format!("/api/dooray/driveConnect?apiIdx={}", binding.to_hex()),
            &user.access_token,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json[0]["uniqueKey"], "drive-D1");
    assert_eq!(json[0]["root"]["name"], "Team");
    assert_eq!(json[0]["root"]["files"][0]["uniqueKey"], "drive-D1-file-F1");
    assert!(app.binding_connected(binding).await);
}

#[tokio::test]
async fn drive_connect_with_rejected_token_is_unauthorized() {
    let mut app = TestApp::spawn().await;
    let user = app.seed_user("carol").await;
    let binding = app.seed_binding(&user, "stale", "tok-bad", false).await;
    let _mock = upstream::rejected_token(&mut app.upstream, "tok-bad", 401).await;

    let resp = app
        .auth_get(
            &format!("/api/dooray/driveConnect?apiIdx={}", binding.to_hex()),
            &user.access_token,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
    assert!(!app.binding_connected(binding).await);
}

#[tokio::test]
async fn drive_connect_upstream_outage_is_bad_gateway() {
    let mut app = TestApp::spawn().await;
    let user = app.seed_user("dave").await;
    let binding = app.seed_binding(&user, "work", "tok-down", false).await;
    let _mock = upstream::rejected_token(&mut app.upstream, "tok-down", 503).await;

    let resp = app
        .auth_get(
            &format!("/api/dooray/driveConnect?apiIdx={}", binding.to_hex()),
            &user.access_token,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 502);
}

#[tokio::test]
async fn drive_disconnect_clears_the_flag() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("erin").await;
    let binding = app.seed_binding(&user, "work", "tok", true).await;

    let resp = app
        .auth_get(
            &format!("/api/dooray/driveDisconnect?apiIdx={}", binding.to_hex()),
            &user.access_token,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json, Value::Bool(true));
    assert!(!app.binding_connected(binding).await);
}

#[tokio::test]
async fn another_users_binding_is_forbidden() {
    let mut app = TestApp::spawn().await;
    let owner = app.seed_user("owner").await;
    let intruder = app.seed_user("intruder").await;
    let binding = app.seed_binding(&owner, "work", "tok-owner", true).await;
    let guards = upstream::no_calls(&mut app.upstream).await;

    for path in [
        format!("/api/dooray/driveConnect?apiIdx={}", binding.to_hex()),
        format!("/api/dooray/driveDisconnect?apiIdx={}", binding.to_hex()),
        format!("/api/dooray/downloadFile?fileId=F1&apiIdx={}", binding.to_hex()),
    ] {
        let resp = app
            .auth_get(&path, &intruder.access_token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 403, "GET {}", path);
    }

    assert!(app.binding_connected(binding).await);
    for guard in guards {
        guard.assert_async().await;
    }
}

#[tokio::test]
async fn unknown_and_malformed_binding_ids() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("frank").await;

    let resp = app
        .auth_get(
            "/api/dooray/driveConnect?apiIdx=000000000000000000000000",
            &user.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_get("/api/dooray/driveConnect?apiIdx=42", &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}
