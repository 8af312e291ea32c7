use config::{Config, ConfigError, File};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    // Mailchimp settings may be incomplete on a fresh deployment. The gateway
    // refuses to operate until all three values are present.
    #[serde(default)]
    pub mailchimp: MailchimpSettings,
    pub document_store: DocumentStoreSettings,
    pub form_relay: FormRelaySettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone, Default)]
pub struct MailchimpSettings {
    pub api_key: Option<Secret<String>>,
    pub server_prefix: Option<String>,
    pub audience_id: Option<String>,
    // Overrides the URL derived from server_prefix. Tests point this at a
    // mock server.
    pub base_url: Option<String>,
}

#[derive(serde::Deserialize, Clone)]
pub struct DocumentStoreSettings {
    pub base_url: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct FormRelaySettings {
    pub endpoint: String,
    pub subject: String,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_mailchimp(&self) -> MailchimpSettings {
        self.mailchimp.clone()
    }

    pub fn get_document_store_base_url(&self) -> String {
        self.document_store.get_base_url()
    }

    pub fn get_form_relay(&self) -> FormRelaySettings {
        self.form_relay.clone()
    }

    pub fn set_mailchimp_base_url(&mut self, new_base_url: String) {
        self.mailchimp.base_url = Some(new_base_url)
    }

    pub fn set_document_store_base_url(&mut self, new_base_url: String) {
        self.document_store.base_url = new_base_url
    }

    pub fn clear_mailchimp(&mut self) {
        self.mailchimp = MailchimpSettings::default()
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }
}

impl MailchimpSettings {
    /// API root, either the configured override or the URL the server prefix
    /// maps to. `None` when neither is available.
    pub fn get_api_url(&self) -> Option<String> {
        self.base_url.clone().or_else(|| {
            self.server_prefix
                .as_ref()
                .map(|prefix| format!("https://{}.api.mailchimp.com/3.0", prefix))
        })
    }

    pub fn get_api_key(&self) -> Option<Secret<String>> {
        self.api_key.clone()
    }

    pub fn get_audience_id(&self) -> Option<String> {
        self.audience_id.clone()
    }
}

impl DocumentStoreSettings {
    pub fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

impl FormRelaySettings {
    pub fn get_endpoint(&self) -> String {
        self.endpoint.clone()
    }

    pub fn get_subject(&self) -> String {
        self.subject.clone()
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().expect("Failed to determine the current directory");
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_MAILCHIMP__API_KEY would set Settings.mailchimp.api_key
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
