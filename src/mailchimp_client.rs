use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::config::MailchimpSettings;
use crate::domain::first_name::FirstName;
use crate::domain::subscriber_email::SubscriberEmail;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
// The provider flags a duplicate signup with this error title. Matching the
// title string is brittle against API changes; if Mailchimp ever documents a
// stable error code for this case, switch the check in `is_member_exists`.
const MEMBER_EXISTS_TITLE: &str = "Member Exists";

pub struct MailchimpClient {
    http_client: Client,
    // None when api key, server prefix or audience id is missing. Every call
    // then fails fast with a configuration error instead of sending a
    // malformed request.
    config: Option<MailchimpConfig>,
}

struct MailchimpConfig {
    base_url: String,
    api_key: Secret<String>,
    audience_id: String,
}

#[derive(thiserror::Error, Debug)]
pub enum MailchimpError {
    #[error("Mailchimp configuration is incomplete.")]
    Configuration,
    #[error("{0}")]
    Api(String),
    #[error("Failed to reach the Mailchimp API.")]
    Network(#[source] reqwest::Error),
}

#[derive(Debug)]
pub enum SubscribeOutcome {
    Subscribed(MemberAck),
    // A duplicate signup is expected business state, not a fault.
    AlreadySubscribed,
}

/// Provider acknowledgement for a newly added member.
#[derive(Debug, serde::Deserialize)]
pub struct MemberAck {
    pub id: Option<String>,
    pub email_address: Option<String>,
    pub status: Option<String>,
}

/// Audience statistics snapshot. The provider omits fields it has no data
/// for, so every field is optional; absent is not the same as zero.
#[derive(Debug)]
pub struct ListStatistics {
    pub member_count: Option<u64>,
    pub total_contacts: Option<u64>,
    pub unsubscribe_count: Option<u64>,
    pub cleaned_count: Option<u64>,
    pub campaign_count: Option<u64>,
    pub avg_sub_rate: Option<f64>,
    pub avg_unsub_rate: Option<f64>,
}

#[derive(serde::Serialize)]
struct AddMemberBody {
    email_address: String,
    status: String,
    merge_fields: MergeFields,
}

#[derive(serde::Serialize)]
struct MergeFields {
    #[serde(rename = "FNAME")]
    first_name: String,
}

// Mailchimp error bodies follow RFC 7807: { type, title, status, detail, instance }
#[derive(serde::Deserialize, Default)]
struct ApiProblem {
    title: Option<String>,
    detail: Option<String>,
}

#[derive(serde::Deserialize)]
struct ListResponse {
    #[serde(default)]
    stats: ListStatsBody,
    // campaign_count lives at the top level of the list object, not in stats
    campaign_count: Option<u64>,
}

#[derive(serde::Deserialize, Default)]
struct ListStatsBody {
    member_count: Option<u64>,
    total_contacts: Option<u64>,
    unsubscribe_count: Option<u64>,
    cleaned_count: Option<u64>,
    avg_sub_rate: Option<f64>,
    avg_unsub_rate: Option<f64>,
}

impl MailchimpClient {
    pub fn new(settings: MailchimpSettings, timeout: Option<time::Duration>) -> MailchimpClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        let config = match (
            settings.get_api_url(),
            settings.get_api_key(),
            settings.get_audience_id(),
        ) {
            (Some(base_url), Some(api_key), Some(audience_id)) => Some(MailchimpConfig {
                base_url,
                api_key,
                audience_id,
            }),
            _ => None,
        };

        if config.is_none() {
            tracing::warn!(
                "Mailchimp API key, server prefix or audience id is not set. \
                 Newsletter calls will fail until all three are configured."
            );
        }

        MailchimpClient {
            http_client,
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&MailchimpConfig, MailchimpError> {
        self.config.as_ref().ok_or(MailchimpError::Configuration)
    }

    #[tracing::instrument(
        name = "Adding a member to the Mailchimp audience",
        skip(self, email, first_name),
        fields(subscriber_email = %email.as_ref())
    )]
    pub async fn add_subscriber(
        &self,
        email: &SubscriberEmail,
        first_name: &FirstName,
    ) -> Result<SubscribeOutcome, MailchimpError> {
        let config = self.config()?;
        let url = format!("{}/lists/{}/members", config.base_url, config.audience_id);
        let body = AddMemberBody {
            email_address: String::from(email.as_ref()),
            // 'pending' triggers the provider's double opt-in confirmation email
            status: String::from("pending"),
            merge_fields: MergeFields {
                // FNAME is always present, even when empty
                first_name: String::from(first_name.as_ref()),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth("anystring", Some(config.api_key.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(MailchimpError::Network)?;

        if response.status().is_success() {
            let ack = response
                .json::<MemberAck>()
                .await
                .map_err(MailchimpError::Network)?;

            return Ok(SubscribeOutcome::Subscribed(ack));
        }

        let problem = read_problem(response).await;

        if is_member_exists(&problem) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        Err(translate_problem(
            problem,
            "Subscription failed due to an API error.",
        ))
    }

    #[tracing::instrument(name = "Fetching Mailchimp audience statistics", skip(self))]
    pub async fn get_list_statistics(&self) -> Result<ListStatistics, MailchimpError> {
        let config = self.config()?;
        let url = format!("{}/lists/{}", config.base_url, config.audience_id);

        let response = self
            .http_client
            .get(&url)
            .basic_auth("anystring", Some(config.api_key.expose_secret()))
            .send()
            .await
            .map_err(MailchimpError::Network)?;

        if !response.status().is_success() {
            let problem = read_problem(response).await;

            return Err(translate_problem(
                problem,
                "Failed to retrieve statistics due to an API error.",
            ));
        }

        let list = response
            .json::<ListResponse>()
            .await
            .map_err(MailchimpError::Network)?;

        Ok(ListStatistics {
            member_count: list.stats.member_count,
            total_contacts: list.stats.total_contacts,
            unsubscribe_count: list.stats.unsubscribe_count,
            cleaned_count: list.stats.cleaned_count,
            campaign_count: list.campaign_count,
            avg_sub_rate: list.stats.avg_sub_rate,
            avg_unsub_rate: list.stats.avg_unsub_rate,
        })
    }
}

// Provider error bodies are interpreted here and nowhere else; handlers only
// ever see MailchimpError and SubscribeOutcome.
async fn read_problem(response: reqwest::Response) -> ApiProblem {
    response.json::<ApiProblem>().await.unwrap_or_default()
}

fn is_member_exists(problem: &ApiProblem) -> bool {
    problem.title.as_deref() == Some(MEMBER_EXISTS_TITLE)
}

fn translate_problem(problem: ApiProblem, fallback_detail: &str) -> MailchimpError {
    MailchimpError::Api(
        problem
            .detail
            .unwrap_or_else(|| String::from(fallback_detail)),
    )
}
