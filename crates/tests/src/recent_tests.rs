use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn show(app: &TestApp, token: &str) -> Vec<String> {
    let resp = app
        .auth_post("/recentFile/show", token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    json.as_array()
        .unwrap()
        .iter()
        .map(|e| e["recentFile"].as_str().unwrap().to_string())
        .collect()
}

async fn save(app: &TestApp, token: &str, file_id: &str) {
    let resp = app
        .auth_post(&format!("/recentFile/save?fileId={}", file_id), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn eleventh_save_evicts_the_oldest() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("quinn").await;

    for i in 1..=11 {
        save(&app, &user.access_token, &format!("f{}", i)).await;
    }

    let expected: Vec<String> = (2..=11).rev().map(|i| format!("f{}", i)).collect();
    assert_eq!(show(&app, &user.access_token).await, expected);
}

#[tokio::test]
async fn saving_an_existing_file_moves_it_to_front() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("rita").await;

    for f in ["f1", "f2", "f3"] {
        save(&app, &user.access_token, f).await;
    }
    save(&app, &user.access_token, "f1").await;

    assert_eq!(show(&app, &user.access_token).await, ["f1", "f3", "f2"]);
}

#[tokio::test]
async fn entries_carry_owner_and_timestamp() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("sam").await;
    let other = app.seed_user("tom").await;

    save(&app, &user.access_token, "f1").await;

    let resp = app
        .auth_post("/recentFile/show", &user.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json[0]["userIdx"], user.id.to_hex());
    assert!(!json[0]["recentIdx"].as_str().unwrap().is_empty());
    assert!(!json[0]["createdAt"].as_str().unwrap().is_empty());

    assert!(show(&app, &other.access_token).await.is_empty());
}
