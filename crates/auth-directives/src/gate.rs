use std::sync::Arc;

use schema_graph::{resolver::default_resolve, ResolverInput, ResolverRecord};
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::{AuthDirective, AuthError, DirectiveHandler, FieldError};

/// How many levels of nested input objects are inspected below an argument value.
const NESTED_INPUT_DEPTH: usize = 1;

/// When a check applies to an invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Guard {
    Always,
    /// Only if the protected input field was given a value different from its default.
    InputFieldSet {
        name: String,
        default_value: Option<Value>,
    },
}

impl Guard {
    pub(crate) fn applies(&self, arguments: &Map<String, Value>) -> bool {
        match self {
            Guard::Always => true,
            Guard::InputFieldSet { name, default_value } => {
                let is_set = |value: &Value| Some(value) != default_value.as_ref();
                arguments.get(name).is_some_and(is_set)
                    || arguments
                        .values()
                        .any(|value| carries_input_field(value, name, &is_set, NESTED_INPUT_DEPTH))
            }
        }
    }
}

// Lists are transparent, each element is inspected at the same depth.
fn carries_input_field(value: &Value, name: &str, is_set: &dyn Fn(&Value) -> bool, depth: usize) -> bool {
    match value {
        Value::Object(fields) => {
            fields.get(name).is_some_and(is_set)
                || (depth > 0
                    && fields
                        .values()
                        .any(|value| carries_input_field(value, name, is_set, depth - 1)))
        }
        Value::Array(items) => items
            .iter()
            .any(|item| carries_input_field(item, name, is_set, depth)),
        _ => false,
    }
}

pub(crate) struct Check {
    pub(crate) directive: AuthDirective,
    pub(crate) guard: Guard,
    pub(crate) handler: Arc<dyn DirectiveHandler>,
}

/// The checks installed on a field, run in order before its original resolver.
pub(crate) struct Gate {
    pub(crate) checks: Vec<Check>,
    pub(crate) resolver: Option<ResolverRecord>,
}

impl Gate {
    pub(crate) async fn resolve(&self, input: ResolverInput<'_>) -> Result<Value, FieldError> {
        self.authorize(input)
            .instrument(tracing::info_span!("authorize", field = %input.field.coordinate()))
            .await?;
        resolve_original(self.resolver.as_ref(), input).await
    }

    async fn authorize(&self, input: ResolverInput<'_>) -> Result<(), AuthError> {
        for check in &self.checks {
            if !check.guard.applies(input.arguments) {
                tracing::trace!("Skipping @{}, protected input field not set", check.directive.kind);
                continue;
            }
            if let Err(err) = check.handler.check(input.context, &check.directive.requirements).await {
                tracing::debug!("Access denied by @{}: {err}", check.directive.kind);
                return Err(err);
            }
        }
        Ok(())
    }
}

pub(crate) async fn resolve_original(
    resolver: Option<&ResolverRecord>,
    input: ResolverInput<'_>,
) -> Result<Value, FieldError> {
    match resolver {
        Some(resolver) => resolver.resolve(input).await.map_err(FieldError::Resolver),
        None => Ok(default_resolve(input)),
    }
}
