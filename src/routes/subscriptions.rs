use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};

use crate::domain::new_subscriber::{NewSubscriber, NewSubscriberBody};
use crate::mailchimp_client::{MailchimpClient, MailchimpError, SubscribeOutcome};

/// Body returned to the caller for every non-error outcome, including the
/// already-subscribed case, which is a normal negative result rather than a
/// fault.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SubscriptionResult {
    pub success: bool,
    pub message: String,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Mailchimp configuration error. Please contact support.")]
    ConfigurationError,
    #[error("{0}")]
    ApiError(String),
    #[error("Subscription failed. Please try again.")]
    NetworkError(#[source] reqwest::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl SubscribeError {
    fn code(&self) -> &'static str {
        match self {
            SubscribeError::ValidationError(_) => "invalid-argument",
            SubscribeError::ConfigurationError
            | SubscribeError::ApiError(_)
            | SubscribeError::NetworkError(_) => "internal",
        }
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::ConfigurationError
            | SubscribeError::ApiError(_)
            | SubscribeError::NetworkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}

impl From<MailchimpError> for SubscribeError {
    fn from(error: MailchimpError) -> Self {
        match error {
            MailchimpError::Configuration => SubscribeError::ConfigurationError,
            MailchimpError::Api(detail) => SubscribeError::ApiError(detail),
            MailchimpError::Network(source) => SubscribeError::NetworkError(source),
        }
    }
}

#[tracing::instrument(
    name = "Subscribing a reader to the newsletter",
    skip(body, mailchimp_client),
    fields(subscriber_email = %body.email)
)]
pub async fn handle_subscribe(
    body: web::Json<NewSubscriberBody>,
    mailchimp_client: web::Data<MailchimpClient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber: NewSubscriber = (&body.0)
        .try_into()
        .map_err(SubscribeError::ValidationError)?;

    // Fail before touching the provider when credentials are incomplete
    if !mailchimp_client.is_configured() {
        return Err(SubscribeError::ConfigurationError);
    }

    let outcome = mailchimp_client
        .add_subscriber(&new_subscriber.email, &new_subscriber.first_name)
        .await?;

    let result = match outcome {
        SubscribeOutcome::Subscribed(_) => SubscriptionResult {
            success: true,
            message: String::from(
                "Subscription successful! Please check your email to confirm your subscription.",
            ),
        },
        SubscribeOutcome::AlreadySubscribed => SubscriptionResult {
            success: false,
            message: String::from("This email is already subscribed."),
        },
    };

    Ok(HttpResponse::Ok().json(result))
}
