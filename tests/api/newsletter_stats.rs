use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

fn list_body() -> serde_json::Value {
    serde_json::json!({
        "id": "dev-audience",
        "campaign_count": 4,
        "stats": {
            "member_count": 120,
            "total_contacts": 150,
            "unsubscribe_count": 3,
            "cleaned_count": 1,
            "avg_sub_rate": 0.12,
            "avg_unsub_rate": 0.01
        }
    })
}

#[tokio::test]
async fn stats_require_an_authenticated_caller() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(None).await;

    assert_eq!(401, response.status().as_u16());

    let result: serde_json::Value = response.json().await.unwrap();

    assert_eq!(result["error"], "unauthenticated");
}

#[tokio::test]
async fn stats_are_denied_when_the_user_document_is_missing() {
    let test_app = TestApp::spawn_app().await;

    test_app.mount_missing_user().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(Some("uid-without-doc")).await;

    assert_eq!(403, response.status().as_u16());

    let result: serde_json::Value = response.json().await.unwrap();

    assert_eq!(result["error"], "permission-denied");
}

#[tokio::test]
async fn stats_are_denied_for_a_non_admin_role() {
    let test_app = TestApp::spawn_app().await;

    test_app.mount_user_role("uid-1", "editor").await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(Some("uid-1")).await;

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn stats_are_returned_for_an_admin_caller() {
    let test_app = TestApp::spawn_app().await;

    test_app.mount_user_role("admin-1", "admin").await;

    Mock::given(method("GET"))
        .and(path(test_app.list_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body()))
        .expect(1)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(Some("admin-1")).await;

    assert_eq!(200, response.status().as_u16());

    let result: serde_json::Value = response.json().await.unwrap();

    assert_eq!(result["success"], true);
    assert_eq!(result["member_count"], 120);
    assert_eq!(result["campaign_count"], 4);
    assert_eq!(result["avg_sub_rate"], 0.12);
    assert_eq!(result["message"], "Stats fetched successfully.");
}

#[tokio::test]
async fn stats_omit_fields_the_provider_did_not_send() {
    let test_app = TestApp::spawn_app().await;

    test_app.mount_user_role("admin-1", "admin").await;

    // avg_sub_rate omitted on purpose; it must stay absent, not become 0
    Mock::given(method("GET"))
        .and(path(test_app.list_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "dev-audience",
            "stats": {
                "member_count": 120
            }
        })))
        .expect(1)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(Some("admin-1")).await;

    assert_eq!(200, response.status().as_u16());

    let result: serde_json::Value = response.json().await.unwrap();

    assert_eq!(result["member_count"], 120);
    assert!(result.get("avg_sub_rate").is_none());
    assert!(result.get("campaign_count").is_none());
}

#[tokio::test]
async fn stats_fail_with_internal_when_the_provider_errors() {
    let test_app = TestApp::spawn_app().await;

    test_app.mount_user_role("admin-1", "admin").await;

    Mock::given(method("GET"))
        .and(path(test_app.list_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "title": "Internal Server Error",
            "status": 500,
            "detail": "Something went wrong on the provider side."
        })))
        .expect(1)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(Some("admin-1")).await;

    assert_eq!(500, response.status().as_u16());

    let result: serde_json::Value = response.json().await.unwrap();

    assert_eq!(result["error"], "internal");
    assert_eq!(
        result["message"],
        "Something went wrong on the provider side."
    );
}

#[tokio::test]
async fn stats_fail_with_internal_without_calling_the_provider_when_config_is_missing() {
    let test_app = TestApp::spawn_app_without_mailchimp_config().await;

    test_app.mount_user_role("admin-1", "admin").await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.mailchimp_server)
        .await;

    let response = test_app.get_newsletter_stats(Some("admin-1")).await;

    assert_eq!(500, response.status().as_u16());

    let result: serde_json::Value = response.json().await.unwrap();

    assert_eq!(result["error"], "internal");
}
