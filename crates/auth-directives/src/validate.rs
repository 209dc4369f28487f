use std::sync::Arc;

use auth_config::{AuthConfig, SigningAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use schema_graph::RequestContext;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::{extract_bearer_token, AuthError, Claims};

/// Checks the signature and the standard claims of a token, returning its payload.
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    async fn verify(&self, token: &str, secret: &SecretString) -> Result<Value, VerificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("{0}")]
    Other(String),
}

/// HMAC signed JWTs.
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if !config.algorithms.is_empty() {
            validation.algorithms = config.algorithms.iter().copied().map(to_jwt_algorithm).collect();
        }
        // `exp` is validated when present, no claim is mandatory.
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;
        validation.leeway = config.leeway.as_secs();
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&config.audience);
        }
        JwtVerifier { validation }
    }
}

fn to_jwt_algorithm(algorithm: SigningAlgorithm) -> Algorithm {
    match algorithm {
        SigningAlgorithm::HS256 => Algorithm::HS256,
        SigningAlgorithm::HS384 => Algorithm::HS384,
        SigningAlgorithm::HS512 => Algorithm::HS512,
    }
}

#[async_trait::async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str, secret: &SecretString) -> Result<Value, VerificationError> {
        let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
        let data = jsonwebtoken::decode::<Value>(token, &key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Turns the credential of a request into verified [`Claims`].
///
/// Shared by all built-in handlers. The configuration is read once at construction, a missing
/// secret is only reported when a request actually needs to be authenticated.
pub struct CredentialValidator {
    secret: Option<SecretString>,
    verifier: Arc<dyn TokenVerifier>,
}

impl CredentialValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_verifier(config, JwtVerifier::new(config))
    }

    pub fn with_verifier(config: &AuthConfig, verifier: impl TokenVerifier) -> Self {
        Self::with_shared_verifier(config, Arc::new(verifier))
    }

    pub(crate) fn with_shared_verifier(config: &AuthConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        CredentialValidator {
            secret: config.secret.clone().filter(|secret| !secret.expose_secret().is_empty()),
            verifier,
        }
    }

    /// Verifies a raw token.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let Some(secret) = &self.secret else {
            tracing::error!("No signing secret configured, cannot validate authorization tokens");
            return Err(AuthError::MissingSecret);
        };

        match self.verifier.verify(token, secret).await {
            Ok(payload) => Ok(Claims::from_payload(payload)),
            Err(err) => {
                tracing::debug!("Invalid authorization token: {err}");
                Err(AuthError::InvalidCredential)
            }
        }
    }

    /// Extracts and verifies the request credential, the resulting claims become the current
    /// user of the request.
    pub async fn authenticate(&self, ctx: &RequestContext) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(ctx)?;
        let claims = self.validate(token).await?;
        Ok(claims.store(ctx))
    }
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("has_secret", &self.secret.is_some())
            .finish_non_exhaustive()
    }
}
