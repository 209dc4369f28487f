use std::collections::BTreeSet;

use schema_graph::RequestContext;
use serde_json::{Map, Value};

const ROLES_CLAIM: &str = "roles";
const PERMISSIONS_CLAIM: &str = "permissions";
const SUBJECT_CLAIM: &str = "sub";

/// Claims of a verified token.
///
/// Once a request is authenticated they're stored in its [`RequestContext`] and can be read
/// back by resolvers with [`Claims::current`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    pub subject: Option<String>,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    /// The whole decoded payload.
    pub payload: Map<String, Value>,
}

impl Claims {
    pub fn from_payload(payload: Value) -> Self {
        let Value::Object(payload) = payload else {
            return Claims::default();
        };

        Claims {
            subject: payload.get(SUBJECT_CLAIM).and_then(Value::as_str).map(str::to_string),
            roles: string_set(payload.get(ROLES_CLAIM)),
            permissions: string_set(payload.get(PERMISSIONS_CLAIM)),
            payload,
        }
    }

    /// Claims of the user authenticated for this request, if any.
    pub fn current(ctx: &RequestContext) -> Option<Claims> {
        ctx.extension::<Claims>()
    }

    pub(crate) fn store(self, ctx: &RequestContext) -> Claims {
        ctx.insert_extension(self.clone());
        self
    }

    /// An empty requirement list is always satisfied.
    pub fn has_any_role(&self, required: &[String]) -> bool {
        required.is_empty() || required.iter().any(|role| self.roles.contains(role))
    }

    pub fn has_any_permission(&self, required: &[String]) -> bool {
        required.is_empty() || required.iter().any(|permission| self.permissions.contains(permission))
    }
}

// A single string is a one element set, any other shape grants nothing.
fn string_set(value: Option<&Value>) -> BTreeSet<String> {
    match value {
        Some(Value::String(value)) => BTreeSet::from([value.clone()]),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}
