use std::time::Duration;

use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::chat::GeminiClient;
use crate::domain::ContactAddress;
use crate::email_client::EmailClient;

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required configuration value: {0}")]
    MissingValue(&'static str),
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub rate_limit: RateLimitSettings,
    pub contact: ContactSettings,
    pub chat: ChatSettings,
}

impl Settings {
    /// Checks every value the server cannot start without.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.email_client.sender()?;
        self.email_client.recipient()?;

        if self.email_client.auth_token.is_none() {
            return Err(ConfigurationError::MissingValue("email_client.auth_token"));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "rate_limit.max_requests",
                reason: "must be greater than zero".into(),
            });
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "rate_limit.window_ms",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(())
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_body_bytes: usize,
    #[serde(skip)]
    pub environment: Environment,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub sender_name: String,
    pub recipient_email: String,
    pub auth_token: Option<SecretString>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

impl EmailClientSettings {
    pub fn client(self) -> Result<EmailClient, ConfigurationError> {
        let sender = self.sender()?;
        let timeout = self.timeout();
        let auth_token = self
            .auth_token
            .ok_or(ConfigurationError::MissingValue("email_client.auth_token"))?;
        EmailClient::new(self.base_url, sender, self.sender_name, auth_token, timeout).map_err(
            |e| ConfigurationError::InvalidValue {
                key: "email_client.base_url",
                reason: e.to_string(),
            },
        )
    }

    pub fn sender(&self) -> Result<ContactAddress, ConfigurationError> {
        ContactAddress::parse(self.sender_email.clone()).map_err(|reason| {
            ConfigurationError::InvalidValue {
                key: "email_client.sender_email",
                reason,
            }
        })
    }

    pub fn recipient(&self) -> Result<ContactAddress, ConfigurationError> {
        ContactAddress::parse(self.recipient_email.clone()).map_err(|reason| {
            ConfigurationError::InvalidValue {
                key: "email_client.recipient_email",
                reason,
            }
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct RateLimitSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_requests: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub sweep_threshold: usize,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ContactSettings {
    pub strip_script_blocks: bool,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ChatSettings {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub enable_tools: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
    pub system_instruction: String,
}

impl ChatSettings {
    /// `None` when no API key is configured; the chat proxy then answers with
    /// a "not configured" reply instead of failing.
    pub fn client(&self) -> Result<Option<GeminiClient>, ConfigurationError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(None);
        };
        GeminiClient::new(
            self.base_url.clone(),
            self.model.clone(),
            api_key,
            Duration::from_millis(self.timeout_ms),
        )
        .map(Some)
        .map_err(|e| ConfigurationError::InvalidValue {
            key: "chat.base_url",
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }

    /// Whether internal error details may be sent back to clients.
    pub fn exposes_error_details(&self) -> bool {
        matches!(self, Environment::Local)
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" | "development" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(ConfigurationError::InvalidValue {
                key: "APP_ENV",
                reason: format!(
                    "{other} is not supported environment. Try to use `local` or `production`"
                ),
            }),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let base_path = std::env::current_dir().map_err(|e| ConfigurationError::InvalidValue {
        key: "current_dir",
        reason: e.to_string(),
    })?;
    let conf_dir = base_path.join("configuration");
    let env: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;

    let settings = config::Config::builder()
        .add_source(config::File::from(conf_dir.join("base")).required(true))
        .add_source(config::File::from(conf_dir.join(env.as_str())).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_")
                .list_separator(",")
                .with_list_parse_key("application.allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    settings.application.environment = env;
    Ok(settings)
}
