//! Declarative authorization for a GraphQL operation graph.
//!
//! Fields and input fields are annotated with `@isAuthenticated`, `@hasRole(roles: [...])` or
//! `@hasPermission(permissions: [...])`. [`AuthDirectives::wrap`] walks the graph once and
//! installs the matching checks in front of the resolvers:
//!
//! - a directive on a field definition is checked on every resolution of that field,
//! - a directive on an input field is checked on the query and mutation fields accepting its
//!   input object, but only when the invocation sets that input field to something other than
//!   its default value.
//!
//! Credentials are bearer tokens, HMAC signed JWTs by default, carrying `roles` and
//! `permissions` claims. The built-in handlers of each directive can be replaced.

mod claims;
mod error;
mod extract;
mod gate;
mod graph;
mod handlers;
mod registry;
mod validate;
mod wrap;

use std::{collections::HashMap, sync::Arc};

use auth_config::AuthConfig;
use schema_graph::{OperationGraph, RequestContext};

pub use claims::Claims;
pub use error::{AuthError, BuildError, FieldError};
pub use extract::extract_bearer_token;
pub use graph::{Response, RootField, WrappedGraph};
pub use handlers::{DirectiveHandler, HasPermission, HasRole, IsAuthenticated};
pub use registry::{declare_auth_directives, AuthDirective, DirectiveKind, DirectiveRegistry, AUTH_DIRECTIVES_SDL};
pub use validate::{CredentialValidator, JwtVerifier, TokenVerifier, VerificationError};

pub(crate) use graph::FieldResolver;

/// Installs authorization checks on operation graphs.
pub struct AuthDirectives {
    registry: DirectiveRegistry,
    validator: Arc<CredentialValidator>,
}

impl AuthDirectives {
    /// Built-in handlers validating JWTs with the given configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: &AuthConfig) -> AuthDirectivesBuilder<'_> {
        AuthDirectivesBuilder {
            config,
            verifier: None,
            overrides: HashMap::new(),
        }
    }

    /// Wraps every annotated field of the graph.
    ///
    /// Fails on the first invalid directive usage, in which case nothing is installed.
    pub fn wrap(&self, graph: impl Into<Arc<OperationGraph>>) -> Result<WrappedGraph, BuildError> {
        let graph = graph.into();
        let wrapped = wrap::wrap(&self.registry, graph)?;
        tracing::info!("Authorization directives installed: {wrapped:?}");
        Ok(wrapped)
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    /// Authenticates a request outside of any directive, storing its claims as current user.
    pub async fn authenticate(&self, ctx: &RequestContext) -> Result<Claims, AuthError> {
        self.validator.authenticate(ctx).await
    }
}

pub struct AuthDirectivesBuilder<'a> {
    config: &'a AuthConfig,
    verifier: Option<Arc<dyn TokenVerifier>>,
    overrides: HashMap<DirectiveKind, Arc<dyn DirectiveHandler>>,
}

impl<'a> AuthDirectivesBuilder<'a> {
    /// Verifies tokens with something else than the default [`JwtVerifier`].
    #[must_use]
    pub fn verifier(mut self, verifier: impl TokenVerifier) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Replaces the built-in handler of a directive.
    #[must_use]
    pub fn handler(mut self, kind: DirectiveKind, handler: impl DirectiveHandler) -> Self {
        self.overrides.insert(kind, Arc::new(handler));
        self
    }

    /// Same as [`AuthDirectivesBuilder::handler`] for a synchronous function.
    #[must_use]
    pub fn handler_fn<F>(self, kind: DirectiveKind, handler: F) -> Self
    where
        F: Fn(&RequestContext, &[String]) -> Result<(), AuthError> + Send + Sync + 'static,
    {
        self.handler(kind, handler)
    }

    pub fn build(self) -> AuthDirectives {
        let validator = Arc::new(match self.verifier {
            Some(verifier) => CredentialValidator::with_shared_verifier(self.config, verifier),
            None => CredentialValidator::new(self.config),
        });
        AuthDirectives {
            registry: DirectiveRegistry::new(validator.clone(), self.overrides),
            validator,
        }
    }
}
