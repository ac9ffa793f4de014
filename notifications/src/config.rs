use secrecy::Secret;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub host: Url,
    pub auth_token: Secret<String>,
    pub from: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Email,
    /// Dry run: notifications are only logged.
    Log,
}
