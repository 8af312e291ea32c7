use reqwest::multipart::Form;
use reqwest::Client;
use std::time;

use crate::config::FormRelaySettings;
use crate::routes::SubscriptionResult;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

/// Client-side submission strategy: try the subscription endpoint first and,
/// only when that call fails outright, post the same fields once to the
/// generic form-relay service. No retries on either path, so a resubmission
/// after a false failure signal can produce a duplicate relay email.
pub struct SubscriptionSubmitter {
    http_client: Client,
    subscribe_url: String,
    relay: FormRelaySettings,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The subscription endpoint answered, including the already-subscribed
    /// negative result.
    Primary(SubscriptionResult),
    /// The endpoint was unreachable but the form relay accepted the fields.
    FallbackDelivered,
}

#[derive(thiserror::Error, Debug)]
#[error("Both subscription methods failed. Primary: {primary}. Fallback: {fallback}.")]
pub struct BothFailed {
    pub primary: String,
    pub fallback: String,
}

impl SubscriptionSubmitter {
    pub fn new(
        subscribe_url: String,
        relay: FormRelaySettings,
        timeout: Option<time::Duration>,
    ) -> SubscriptionSubmitter {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        SubscriptionSubmitter {
            http_client,
            subscribe_url,
            relay,
        }
    }

    #[tracing::instrument(name = "Submitting a newsletter signup", skip(self))]
    pub async fn submit(
        &self,
        email: &str,
        first_name: &str,
    ) -> Result<SubmitOutcome, BothFailed> {
        let primary_failure = match self.attempt_primary(email, first_name).await {
            Ok(result) => return Ok(SubmitOutcome::Primary(result)),
            Err(failure) => failure,
        };

        tracing::warn!(
            "Primary subscription call failed ({}). Falling back to the form relay.",
            primary_failure
        );

        match self.attempt_fallback(email, first_name).await {
            Ok(()) => Ok(SubmitOutcome::FallbackDelivered),
            Err(fallback_failure) => Err(BothFailed {
                primary: primary_failure,
                fallback: fallback_failure,
            }),
        }
    }

    async fn attempt_primary(
        &self,
        email: &str,
        first_name: &str,
    ) -> Result<SubscriptionResult, String> {
        let response = self
            .http_client
            .post(&self.subscribe_url)
            .json(&serde_json::json!({ "email": email, "firstName": first_name }))
            .send()
            .await
            .map_err(|error| error.to_string())?
            // any non-2xx answer counts as a primary failure
            .error_for_status()
            .map_err(|error| error.to_string())?;

        response
            .json::<SubscriptionResult>()
            .await
            .map_err(|error| error.to_string())
    }

    async fn attempt_fallback(&self, email: &str, first_name: &str) -> Result<(), String> {
        let form = Form::new()
            .text("email", String::from(email))
            .text("firstName", String::from(first_name))
            .text("_subject", self.relay.get_subject())
            .text("_captcha", "false");

        self.http_client
            .post(self.relay.get_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|error| error.to_string())?
            .error_for_status()
            .map(|_| ())
            .map_err(|error| error.to_string())
    }
}
