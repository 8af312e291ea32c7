use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};

use crate::auth::{caller_uid, verify_admin, AuthError};
use crate::document_store::DocumentStoreClient;
use crate::mailchimp_client::{ListStatistics, MailchimpClient, MailchimpError};

/// Reshaped statistics snapshot for the admin panel. Fields the provider
/// omitted are skipped entirely so the panel can tell "not available" apart
/// from zero.
#[derive(Debug, serde::Serialize)]
pub struct NewsletterStats {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_contacts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribe_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_sub_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_unsub_rate: Option<f64>,
    pub message: String,
}

impl From<ListStatistics> for NewsletterStats {
    fn from(stats: ListStatistics) -> Self {
        NewsletterStats {
            success: true,
            member_count: stats.member_count,
            total_contacts: stats.total_contacts,
            unsubscribe_count: stats.unsubscribe_count,
            cleaned_count: stats.cleaned_count,
            campaign_count: stats.campaign_count,
            avg_sub_rate: stats.avg_sub_rate,
            avg_unsub_rate: stats.avg_unsub_rate,
            message: String::from("Stats fetched successfully."),
        }
    }
}

#[derive(thiserror::Error)]
pub enum StatsError {
    #[error(transparent)]
    AuthError(#[from] AuthError),
    #[error("Mailchimp configuration error.")]
    ConfigurationError,
    #[error("{0}")]
    ApiError(String),
    #[error("Failed to retrieve statistics.")]
    NetworkError(#[source] reqwest::Error),
}

impl std::fmt::Debug for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl StatsError {
    fn code(&self) -> &'static str {
        match self {
            StatsError::AuthError(AuthError::Unauthenticated) => "unauthenticated",
            StatsError::AuthError(AuthError::PermissionDenied) => "permission-denied",
            StatsError::AuthError(AuthError::Unexpected(_))
            | StatsError::ConfigurationError
            | StatsError::ApiError(_)
            | StatsError::NetworkError(_) => "internal",
        }
    }
}

impl ResponseError for StatsError {
    fn status_code(&self) -> StatusCode {
        match self {
            StatsError::AuthError(AuthError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            StatsError::AuthError(AuthError::PermissionDenied) => StatusCode::FORBIDDEN,
            StatsError::AuthError(AuthError::Unexpected(_))
            | StatsError::ConfigurationError
            | StatsError::ApiError(_)
            | StatsError::NetworkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<MailchimpError> for StatsError {
    fn from(error: MailchimpError) -> Self {
        match error {
            MailchimpError::Configuration => StatsError::ConfigurationError,
            MailchimpError::Api(detail) => StatsError::ApiError(detail),
            MailchimpError::Network(source) => StatsError::NetworkError(source),
        }
    }
}

#[tracing::instrument(
    name = "Fetching newsletter statistics for the admin panel",
    skip(request, mailchimp_client, document_store)
)]
pub async fn handle_newsletter_stats(
    request: HttpRequest,
    mailchimp_client: web::Data<MailchimpClient>,
    document_store: web::Data<DocumentStoreClient>,
) -> Result<HttpResponse, StatsError> {
    // The admin check runs first and its failures propagate verbatim
    let uid = caller_uid(&request)?;
    verify_admin(&uid, &document_store).await?;

    if !mailchimp_client.is_configured() {
        return Err(StatsError::ConfigurationError);
    }

    let stats = mailchimp_client.get_list_statistics().await?;

    Ok(HttpResponse::Ok().json(NewsletterStats::from(stats)))
}
