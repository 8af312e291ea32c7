use reqwest::Response;
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ravenscroft_newsletter::config::{get_configuration, Settings};
use ravenscroft_newsletter::startup::Application;

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub mailchimp_server: MockServer,
    pub store_server: MockServer,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        Self::spawn(false).await
    }

    /// Spawns the app with the Mailchimp settings wiped, simulating a
    /// deployment where the credentials were never configured.
    pub async fn spawn_app_without_mailchimp_config() -> TestApp {
        Self::spawn(true).await
    }

    async fn spawn(clear_mailchimp: bool) -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let mailchimp_server = MockServer::start().await;
        let store_server = MockServer::start().await;

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_mailchimp_base_url(mailchimp_server.uri());
        config.set_document_store_base_url(store_server.uri());

        if clear_mailchimp {
            config.clear_mailchimp();
        }

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            config: config.clone(),
            mailchimp_server,
            store_server,
        }
    }

    pub fn audience_id(&self) -> String {
        self.config
            .get_mailchimp()
            .get_audience_id()
            .unwrap_or_else(|| String::from("dev-audience"))
    }

    pub fn members_path(&self) -> String {
        format!("/lists/{}/members", self.audience_id())
    }

    pub fn list_path(&self) -> String {
        format!("/lists/{}", self.audience_id())
    }

    pub async fn post_subscription(&self, body: HashMap<&str, &str>) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/subscriptions", self.address);

        client
            .post(&url)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_newsletter_stats(&self, bearer: Option<&str>) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/newsletter/stats", self.address);
        let mut request = client.get(&url);

        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request.send().await.expect("Failed to execute request.")
    }

    /// Registers a `users/{uid}` document with the given role on the mocked
    /// document store.
    pub async fn mount_user_role(&self, uid: &str, role: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/users/{}", uid)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "role": role })),
            )
            .mount(&self.store_server)
            .await;
    }

    /// Makes every user lookup answer 404, the shape of a missing document.
    pub async fn mount_missing_user(&self) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&self.store_server)
            .await;
    }
}
