use serde_json::Value;

use crate::{FieldDefinitionWalker, GraphqlError, GraphqlResult, RequestContext};

/// Everything a resolver receives for one field invocation.
#[derive(Clone, Copy)]
pub struct ResolverInput<'a> {
    pub field: FieldDefinitionWalker<'a>,
    /// The value resolved for the parent object, `null` for root fields.
    pub parent: &'a Value,
    pub arguments: &'a serde_json::Map<String, Value>,
    pub context: &'a RequestContext,
}

#[async_trait::async_trait]
pub trait Resolver: Send + Sync + 'static {
    async fn resolve(&self, input: ResolverInput<'_>) -> GraphqlResult<Value>;
}

#[async_trait::async_trait]
impl<F> Resolver for F
where
    F: Fn(ResolverInput<'_>) -> GraphqlResult<Value> + Send + Sync + 'static,
{
    async fn resolve(&self, input: ResolverInput<'_>) -> GraphqlResult<Value> {
        self(input)
    }
}

/// A resolver always returning the same value.
pub fn constant(value: impl Into<Value>) -> impl Resolver {
    let value = value.into();
    move |_: ResolverInput<'_>| Ok::<_, GraphqlError>(value.clone())
}

/// What a field without resolver returns: the property of its parent with the field name.
pub fn default_resolve(input: ResolverInput<'_>) -> Value {
    input
        .parent
        .get(input.field.name())
        .cloned()
        .unwrap_or(Value::Null)
}
