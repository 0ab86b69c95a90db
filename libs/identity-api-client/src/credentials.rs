use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Scheme prefix of the application authorization header.
const CLIENT_SCHEME: &str = "Client ";

/// Application name/password pair the identity server issued to this client.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppCredentials {
    #[serde(deserialize_with = "deserialize_text")]
    app_name: String,
    #[serde(deserialize_with = "deserialize_secret")]
    app_password: SecretString,
}

impl AppCredentials {
    #[must_use]
    pub fn new(app_name: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_password: SecretString::from(app_password.into()),
        }
    }

    /// Get the application name
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// `Client base64(app_name:app_password)`.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.app_name, self.app_password.expose_secret());
        format!("{CLIENT_SCHEME}{}", STANDARD.encode(raw))
    }
}

impl Clone for AppCredentials {
    fn clone(&self) -> Self {
        Self::new(self.app_name.clone(), self.app_password.expose_secret())
    }
}

impl Default for AppCredentials {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

/// Scalar accepted where text is expected. Environment providers turn
/// number-like and boolean-like values into typed scalars.
#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    Str(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl From<Text> for String {
    fn from(text: Text) -> Self {
        match text {
            Text::Str(s) => s,
            Text::Unsigned(n) => n.to_string(),
            Text::Signed(n) => n.to_string(),
            Text::Float(n) => n.to_string(),
            Text::Bool(b) => b.to_string(),
        }
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Text::deserialize(deserializer).map(String::from)
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_text(deserializer).map(SecretString::from)
}
