use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Environment variable read by [`AuthConfig::from_env`].
pub const SECRET_ENV_VAR: &str = "JWT_SECRET";

/// Configures how bearer tokens are validated before any authorization directive is checked.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// The shared secret tokens are signed with. Without it every protected access fails.
    pub secret: Option<SecretString>,
    /// Accepted signing algorithms, HS256 only by default.
    pub algorithms: Vec<SigningAlgorithm>,
    /// Expected `iss` claim, not validated if absent.
    pub issuer: Option<String>,
    /// Accepted `aud` claims, not validated if empty.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub audience: Vec<String>,
    /// Clock skew tolerated when validating `exp` and `nbf`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub leeway: Duration,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    HS256,
    HS384,
    HS512,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithms: vec![SigningAlgorithm::HS256],
            issuer: None,
            audience: Vec::new(),
            leeway: Duration::from_secs(60),
        }
    }
}

impl AuthConfig {
    /// Default configuration with the secret taken from `JWT_SECRET`. Meant to be called once at
    /// startup, the variable is never read again afterwards.
    pub fn from_env() -> Self {
        let secret = std::env::var(SECRET_ENV_VAR)
            .ok()
            .filter(|secret| !secret.is_empty())
            .map(SecretString::new);

        Self {
            secret,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::new(secret.into()));
        self
    }

    /// An empty secret is treated as no secret at all.
    pub fn has_secret(&self) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|secret| !secret.expose_secret().is_empty())
    }
}

fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> serde::de::Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("string or array of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, visitor: S) -> Result<Self::Value, S::Error>
        where
            S: serde::de::SeqAccess<'de>,
        {
            Deserialize::deserialize(serde::de::value::SeqAccessDeserializer::new(visitor))
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
