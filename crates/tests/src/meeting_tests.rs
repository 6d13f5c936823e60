use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn health_check() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn created_meetings_get_a_code_and_join_url() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/meeting"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    let meeting_id = json["meeting_id"].as_str().unwrap();
    let parts: Vec<&str> = meeting_id.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(json["join_url"], format!("/join/{meeting_id}"));

    // The record exists right away.
    let resp = app
        .client
        .get(app.url(&format!("/api/meeting/{meeting_id}/participant")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["participants"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_meetings_are_404() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/meeting/nope/participant"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "not_found");
}
