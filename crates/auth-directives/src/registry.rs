use std::{str::FromStr, sync::Arc};

use schema_graph::{DirectiveLocation, DirectiveRecord, GraphBuilder, OperationGraph};
use serde_json::Value;

use crate::{BuildError, CredentialValidator, DirectiveHandler, HasPermission, HasRole, IsAuthenticated};

/// Definitions of the authorization directives, to be added to the schema SDL.
pub const AUTH_DIRECTIVES_SDL: &str = r#"directive @isAuthenticated on FIELD_DEFINITION | INPUT_FIELD_DEFINITION
directive @hasRole(roles: [String!]!) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION
directive @hasPermission(permissions: [String!]!) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION
"#;

const LOCATIONS: [DirectiveLocation; 2] = [DirectiveLocation::FieldDefinition, DirectiveLocation::InputFieldDefinition];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum DirectiveKind {
    #[strum(serialize = "isAuthenticated")]
    IsAuthenticated,
    #[strum(serialize = "hasRole")]
    HasRole,
    #[strum(serialize = "hasPermission")]
    HasPermission,
}

impl DirectiveKind {
    /// Name of the list argument holding the requirements, if any.
    pub fn argument_name(self) -> Option<&'static str> {
        match self {
            DirectiveKind::IsAuthenticated => None,
            DirectiveKind::HasRole => Some("roles"),
            DirectiveKind::HasPermission => Some("permissions"),
        }
    }

    pub fn locations(self) -> &'static [DirectiveLocation] {
        &LOCATIONS
    }
}

/// A recognized authorization directive and its normalized arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDirective {
    pub kind: DirectiveKind,
    pub requirements: Vec<String>,
}

impl AuthDirective {
    pub fn new(kind: DirectiveKind, requirements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        AuthDirective {
            kind,
            requirements: requirements.into_iter().map(Into::into).collect(),
        }
    }
}

/// Maps every directive kind to its handler.
pub struct DirectiveRegistry {
    is_authenticated: Arc<dyn DirectiveHandler>,
    has_role: Arc<dyn DirectiveHandler>,
    has_permission: Arc<dyn DirectiveHandler>,
}

impl DirectiveRegistry {
    /// Built-in handlers, replaced by the overrides of the same kind.
    pub fn new(
        validator: Arc<CredentialValidator>,
        overrides: impl IntoIterator<Item = (DirectiveKind, Arc<dyn DirectiveHandler>)>,
    ) -> Self {
        let mut registry = DirectiveRegistry {
            is_authenticated: Arc::new(IsAuthenticated::new(validator.clone())),
            has_role: Arc::new(HasRole::new(validator.clone())),
            has_permission: Arc::new(HasPermission::new(validator)),
        };
        for (kind, handler) in overrides {
            *registry.handler_mut(kind) = handler;
        }
        registry
    }

    pub fn handler(&self, kind: DirectiveKind) -> &Arc<dyn DirectiveHandler> {
        match kind {
            DirectiveKind::IsAuthenticated => &self.is_authenticated,
            DirectiveKind::HasRole => &self.has_role,
            DirectiveKind::HasPermission => &self.has_permission,
        }
    }

    fn handler_mut(&mut self, kind: DirectiveKind) -> &mut Arc<dyn DirectiveHandler> {
        match kind {
            DirectiveKind::IsAuthenticated => &mut self.is_authenticated,
            DirectiveKind::HasRole => &mut self.has_role,
            DirectiveKind::HasPermission => &mut self.has_permission,
        }
    }

    /// Recognizes an authorization directive written at `location`.
    ///
    /// Returns `None` for directives that aren't authorization directives but are declared on
    /// the graph, those belong to someone else.
    pub fn parse(
        &self,
        graph: &OperationGraph,
        directive: &DirectiveRecord,
        location: DirectiveLocation,
        coordinate: &str,
    ) -> Result<Option<AuthDirective>, BuildError> {
        let Ok(kind) = DirectiveKind::from_str(&directive.name) else {
            if graph.declares_directive(&directive.name) {
                return Ok(None);
            }
            return Err(BuildError::UnknownDirective {
                name: directive.name.clone(),
                coordinate: coordinate.to_string(),
            });
        };

        if !kind.locations().contains(&location) {
            return Err(BuildError::InvalidLocation {
                directive: kind,
                location,
                coordinate: coordinate.to_string(),
            });
        }

        let malformed = |reason: String| BuildError::MalformedArguments {
            directive: kind,
            coordinate: coordinate.to_string(),
            reason,
        };

        if let Some(unknown) = directive
            .arguments
            .keys()
            .find(|name| Some(name.as_str()) != kind.argument_name())
        {
            return Err(malformed(format!("unknown argument '{unknown}'")));
        }

        let Some(argument_name) = kind.argument_name() else {
            return Ok(Some(AuthDirective::new(kind, Vec::<String>::new())));
        };

        let requirements = match directive.arguments.get(argument_name) {
            None => return Err(malformed(format!("missing argument '{argument_name}'"))),
            // A single value is accepted where a list is expected.
            Some(Value::String(value)) => vec![value.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| value.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| malformed(format!("'{argument_name}' must be a list of strings")))?,
            Some(_) => return Err(malformed(format!("'{argument_name}' must be a list of strings"))),
        };

        Ok(Some(AuthDirective::new(kind, requirements)))
    }
}

/// Declares the authorization directives on a graph being built.
pub fn declare_auth_directives(builder: GraphBuilder) -> GraphBuilder {
    <DirectiveKind as strum::IntoEnumIterator>::iter()
        .fold(builder, |builder, kind| builder.directive_definition(kind.as_ref(), LOCATIONS))
}
