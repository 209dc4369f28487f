use std::sync::Arc;

use schema_graph::RequestContext;

use crate::{AuthError, CredentialValidator};

/// Decides whether a request satisfies one authorization directive.
///
/// `requirements` are the directive arguments: the roles of `@hasRole`, the permissions of
/// `@hasPermission`, nothing for `@isAuthenticated`. Plain functions with the same signature are
/// handlers too.
#[async_trait::async_trait]
pub trait DirectiveHandler: Send + Sync + 'static {
    async fn check(&self, ctx: &RequestContext, requirements: &[String]) -> Result<(), AuthError>;
}

#[async_trait::async_trait]
impl<F> DirectiveHandler for F
where
    F: Fn(&RequestContext, &[String]) -> Result<(), AuthError> + Send + Sync + 'static,
{
    async fn check(&self, ctx: &RequestContext, requirements: &[String]) -> Result<(), AuthError> {
        self(ctx, requirements)
    }
}

pub struct IsAuthenticated {
    validator: Arc<CredentialValidator>,
}

impl IsAuthenticated {
    pub fn new(validator: Arc<CredentialValidator>) -> Self {
        IsAuthenticated { validator }
    }
}

#[async_trait::async_trait]
impl DirectiveHandler for IsAuthenticated {
    async fn check(&self, ctx: &RequestContext, _requirements: &[String]) -> Result<(), AuthError> {
        self.validator.authenticate(ctx).await.map(|_| ())
    }
}

/// Passes if the token grants at least one of the required roles.
pub struct HasRole {
    validator: Arc<CredentialValidator>,
}

impl HasRole {
    pub fn new(validator: Arc<CredentialValidator>) -> Self {
        HasRole { validator }
    }
}

#[async_trait::async_trait]
impl DirectiveHandler for HasRole {
    async fn check(&self, ctx: &RequestContext, roles: &[String]) -> Result<(), AuthError> {
        let claims = self.validator.authenticate(ctx).await?;
        if claims.has_any_role(roles) {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole {
                missing: roles.to_vec(),
            })
        }
    }
}

/// Passes if the token grants at least one of the required permissions.
pub struct HasPermission {
    validator: Arc<CredentialValidator>,
}

impl HasPermission {
    pub fn new(validator: Arc<CredentialValidator>) -> Self {
        HasPermission { validator }
    }
}

#[async_trait::async_trait]
impl DirectiveHandler for HasPermission {
    async fn check(&self, ctx: &RequestContext, permissions: &[String]) -> Result<(), AuthError> {
        let claims = self.validator.authenticate(ctx).await?;
        if claims.has_any_permission(permissions) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermission {
                missing: permissions.to_vec(),
            })
        }
    }
}
