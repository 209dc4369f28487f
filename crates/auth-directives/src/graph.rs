use std::sync::Arc;

use futures_util::future::join_all;
use schema_graph::{
    Definition, ErrorCode, FieldDefinitionId, GraphqlError, ObjectId, OperationGraph, OperationType, RequestContext,
    ResolverInput, ResolverRecord,
};
use serde_json::{Map, Value};

use crate::{
    gate::{resolve_original, Check, Gate},
    AuthDirective, FieldError,
};

pub(crate) enum FieldResolver {
    Original(Option<ResolverRecord>),
    Gated(Gate),
}

/// An operation graph with its authorization checks installed.
///
/// The graph itself is left untouched, fields are resolved through the resolver table built when
/// wrapping. Wrapping the same graph again starts over from its original resolvers.
pub struct WrappedGraph {
    graph: Arc<OperationGraph>,
    resolvers: Vec<FieldResolver>,
}

impl WrappedGraph {
    pub(crate) fn new(graph: Arc<OperationGraph>, resolvers: Vec<FieldResolver>) -> Self {
        WrappedGraph { graph, resolvers }
    }

    pub fn graph(&self) -> &Arc<OperationGraph> {
        &self.graph
    }

    pub fn field_id(&self, type_name: &str, field_name: &str) -> Option<FieldDefinitionId> {
        match self.graph.definition_by_name(type_name)? {
            Definition::Object(object_id) => self.graph.object_field_by_name(object_id, field_name),
            _ => None,
        }
    }

    pub fn is_gated(&self, field_id: FieldDefinitionId) -> bool {
        matches!(self.field_resolver(field_id), Some(FieldResolver::Gated(_)))
    }

    /// Directives checked before resolving a field, in execution order.
    pub fn directives(&self, field_id: FieldDefinitionId) -> impl Iterator<Item = &AuthDirective> + '_ {
        self.checks(field_id).map(|check| &check.directive)
    }

    pub(crate) fn checks(&self, field_id: FieldDefinitionId) -> impl Iterator<Item = &Check> + '_ {
        let checks = match self.field_resolver(field_id) {
            Some(FieldResolver::Gated(gate)) => gate.checks.as_slice(),
            Some(FieldResolver::Original(_)) | None => &[],
        };
        checks.iter()
    }

    /// `None` for an id that doesn't belong to the wrapped graph.
    fn field_resolver(&self, field_id: FieldDefinitionId) -> Option<&FieldResolver> {
        self.resolvers.get(usize::from(field_id))
    }

    /// Resolves one field, running its authorization checks first. The original resolver is
    /// never called if a check fails.
    pub async fn resolve_field(
        &self,
        field_id: FieldDefinitionId,
        parent: &Value,
        arguments: &Map<String, Value>,
        ctx: &RequestContext,
    ) -> Result<Value, FieldError> {
        let Some(resolver) = self.field_resolver(field_id) else {
            return Err(GraphqlError::new("Unknown field definition", ErrorCode::BadRequest).into());
        };
        let input = ResolverInput {
            field: self.graph.walk(field_id),
            parent,
            arguments,
            context: ctx,
        };
        match resolver {
            FieldResolver::Original(resolver) => resolve_original(resolver.as_ref(), input).await,
            FieldResolver::Gated(gate) => gate.resolve(input).await,
        }
    }

    /// Same as [`WrappedGraph::resolve_field`] with the field looked up by name.
    pub async fn resolve(
        &self,
        type_name: &str,
        field_name: &str,
        parent: &Value,
        arguments: &Map<String, Value>,
        ctx: &RequestContext,
    ) -> Result<Value, FieldError> {
        let Some(field_id) = self.field_id(type_name, field_name) else {
            return Err(unknown_field(type_name, field_name).into());
        };
        self.resolve_field(field_id, parent, arguments, ctx).await
    }

    /// Executes the root fields of an operation.
    ///
    /// Query fields are resolved concurrently, mutation fields one after the other in the
    /// requested order. A failing field is `null` in the data and doesn't affect its siblings.
    pub async fn execute(&self, operation_type: OperationType, fields: &[RootField], ctx: &RequestContext) -> Response {
        let root = match operation_type {
            OperationType::Subscription => None,
            operation_type => self.graph.root_operation_types.get(operation_type),
        };
        let Some(root) = root else {
            return Response::error(GraphqlError::new(
                format!("The {operation_type} operation is not supported"),
                ErrorCode::BadRequest,
            ));
        };

        let results = if operation_type == OperationType::Query {
            join_all(fields.iter().map(|field| self.resolve_root_field(root, field, ctx))).await
        } else {
            let mut results = Vec::with_capacity(fields.len());
            for field in fields {
                results.push(self.resolve_root_field(root, field, ctx).await);
            }
            results
        };

        let mut data = Map::with_capacity(fields.len());
        let mut errors = Vec::new();
        for (field, result) in fields.iter().zip(results) {
            let value = result.unwrap_or_else(|err| {
                errors.push(GraphqlError::from(err).with_path(field.response_key.as_str()));
                Value::Null
            });
            data.insert(field.response_key.clone(), value);
        }

        Response {
            data: Some(data),
            errors,
        }
    }

    async fn resolve_root_field(
        &self,
        root: ObjectId,
        field: &RootField,
        ctx: &RequestContext,
    ) -> Result<Value, FieldError> {
        let Some(field_id) = self.graph.object_field_by_name(root, &field.name) else {
            return Err(unknown_field(&self.graph[root].name, &field.name).into());
        };
        self.resolve_field(field_id, &Value::Null, &field.arguments, ctx).await
    }
}

fn unknown_field(type_name: &str, field_name: &str) -> GraphqlError {
    GraphqlError::new(
        format!("Field '{field_name}' does not exist on type '{type_name}'"),
        ErrorCode::BadRequest,
    )
}

impl std::fmt::Debug for WrappedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedGraph")
            .field("graph", &self.graph)
            .field(
                "gated_fields",
                &self
                    .resolvers
                    .iter()
                    .filter(|resolver| matches!(resolver, FieldResolver::Gated(_)))
                    .count(),
            )
            .finish()
    }
}

/// A root field selected by an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RootField {
    /// Key of the field in the response data, the alias if there is one.
    pub response_key: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl RootField {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        RootField {
            response_key: name.clone(),
            name,
            arguments: Map::new(),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.response_key = alias.into();
        self
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Default, serde::Serialize)]
pub struct Response {
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl Response {
    pub fn error(error: GraphqlError) -> Self {
        Response {
            data: None,
            errors: vec![error],
        }
    }
}
