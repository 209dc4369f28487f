use std::borrow::Cow;

use schema_graph::{DirectiveLocation, ErrorCode, GraphqlError};

use crate::DirectiveKind;

/// Why a request was refused by an authorization directive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthError {
    #[error("Authorization header missing")]
    MissingCredential,
    #[error("Invalid authorization token")]
    InvalidCredential,
    #[error("Missing signing secret")]
    MissingSecret,
    #[error("Insufficient roles. Missing one of these: {}", .missing.join(", "))]
    InsufficientRole { missing: Vec<String> },
    #[error("Insufficient permissions. Missing one of these: {}", .missing.join(", "))]
    InsufficientPermission { missing: Vec<String> },
    /// Refusal from a custom handler, the message is returned as is.
    #[error("{0}")]
    Denied(Cow<'static, str>),
}

impl AuthError {
    pub fn denied(message: impl Into<Cow<'static, str>>) -> Self {
        AuthError::Denied(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::MissingCredential | AuthError::InvalidCredential => ErrorCode::Unauthenticated,
            AuthError::MissingSecret => ErrorCode::InternalServerError,
            AuthError::InsufficientRole { .. } | AuthError::InsufficientPermission { .. } | AuthError::Denied(_) => {
                ErrorCode::Unauthorized
            }
        }
    }

    /// Machine readable variant name, exposed as the `reason` extension.
    pub fn reason(&self) -> &'static str {
        self.into()
    }
}

impl From<AuthError> for GraphqlError {
    fn from(err: AuthError) -> Self {
        let reason = err.reason();
        let code = err.code();
        let error = match err {
            AuthError::InsufficientRole { ref missing } | AuthError::InsufficientPermission { ref missing } => {
                GraphqlError::new(err.to_string(), code).with_extension("missing", missing.clone())
            }
            AuthError::Denied(message) => GraphqlError::new(message, code),
            _ => GraphqlError::new(err.to_string(), code),
        };
        error.with_extension("reason", reason)
    }
}

/// Invalid directive usage found while wrapping a graph. Nothing is installed when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Unknown directive @{name} on {coordinate}")]
    UnknownDirective { name: String, coordinate: String },
    #[error("Directive @{directive} cannot be used on {location}, found on {coordinate}")]
    InvalidLocation {
        directive: DirectiveKind,
        location: DirectiveLocation,
        coordinate: String,
    },
    #[error("Invalid arguments for @{directive} on {coordinate}: {reason}")]
    MalformedArguments {
        directive: DirectiveKind,
        coordinate: String,
        reason: String,
    },
}

/// Failure of a single field resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Resolver(#[from] GraphqlError),
}

impl FieldError {
    pub fn as_auth(&self) -> Option<&AuthError> {
        match self {
            FieldError::Auth(err) => Some(err),
            FieldError::Resolver(_) => None,
        }
    }
}

impl From<FieldError> for GraphqlError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Auth(err) => err.into(),
            FieldError::Resolver(err) => err,
        }
    }
}
