//! The operation graph an authorization layer is installed on.
//!
//! A graph is an arena of records addressed by typed ids. It is built once by
//! [`GraphBuilder`] from definitions written in GraphQL notation and is immutable
//! afterwards: anything that needs different resolvers builds its own resolver table
//! keyed by [`FieldDefinitionId`] instead of mutating the graph.

mod builder;
mod context;
mod error;
mod ids;
pub mod resolver;
mod ty;
mod walkers;

use std::{collections::HashMap, sync::Arc};

pub use builder::*;
pub use context::*;
pub use error::*;
pub use ids::*;
pub use resolver::{Resolver, ResolverInput};
pub use ty::*;
pub use walkers::*;

pub struct OperationGraph {
    pub root_operation_types: RootOperationTypes,
    definitions_by_name: HashMap<String, Definition>,

    objects: Vec<ObjectRecord>,
    field_definitions: Vec<FieldDefinitionRecord>,
    input_objects: Vec<InputObjectRecord>,
    input_value_definitions: Vec<InputValueDefinitionRecord>,
    scalars: Vec<ScalarRecord>,
    enums: Vec<EnumRecord>,
    directive_definitions: Vec<DirectiveDefinitionRecord>,
    resolvers: Vec<ResolverRecord>,
}

impl OperationGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn walk<I>(&self, item: I) -> GraphWalker<'_, I> {
        GraphWalker::new(item, self)
    }

    pub fn walker(&self) -> GraphWalker<'_, ()> {
        GraphWalker::new((), self)
    }

    pub fn definition_by_name(&self, name: &str) -> Option<Definition> {
        self.definitions_by_name.get(name).copied()
    }

    pub fn object_field_by_name(&self, object_id: ObjectId, name: &str) -> Option<FieldDefinitionId> {
        self[object_id]
            .field_ids
            .iter()
            .copied()
            .find(|id| self[*id].name == name)
    }

    pub fn field_definition_ids(&self) -> impl ExactSizeIterator<Item = FieldDefinitionId> {
        (0..self.field_definitions.len()).map(FieldDefinitionId::from)
    }

    pub fn input_value_definition_ids(&self) -> impl ExactSizeIterator<Item = InputValueDefinitionId> {
        (0..self.input_value_definitions.len()).map(InputValueDefinitionId::from)
    }

    pub fn field_definitions_count(&self) -> usize {
        self.field_definitions.len()
    }

    /// Whether a directive with this name was declared on the graph.
    pub fn declares_directive(&self, name: &str) -> bool {
        self.directive_definitions.iter().any(|definition| definition.name == name)
    }
}

impl std::fmt::Debug for OperationGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationGraph")
            .field("objects", &self.objects.len())
            .field("input_objects", &self.input_objects.len())
            .field("field_definitions", &self.field_definitions.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug)]
pub struct RootOperationTypes {
    pub query: ObjectId,
    pub mutation: Option<ObjectId>,
    pub subscription: Option<ObjectId>,
}

impl RootOperationTypes {
    pub fn get(&self, operation_type: OperationType) -> Option<ObjectId> {
        match operation_type {
            OperationType::Query => Some(self.query),
            OperationType::Mutation => self.mutation,
            OperationType::Subscription => self.subscription,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Definition {
    Scalar(ScalarId),
    Enum(EnumId),
    Object(ObjectId),
    InputObject(InputObjectId),
}

impl Definition {
    pub fn is_input(&self) -> bool {
        matches!(self, Definition::Scalar(_) | Definition::Enum(_) | Definition::InputObject(_))
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Definition::Scalar(_) | Definition::Enum(_) | Definition::Object(_))
    }

    pub fn as_input_object(&self) -> Option<InputObjectId> {
        match self {
            Definition::InputObject(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ObjectRecord {
    pub name: String,
    pub field_ids: Vec<FieldDefinitionId>,
}

#[derive(Debug)]
pub struct FieldDefinitionRecord {
    pub name: String,
    pub parent_id: ObjectId,
    pub ty: Type,
    pub argument_ids: Vec<InputValueDefinitionId>,
    pub directives: Vec<DirectiveRecord>,
    /// Fields without resolver return the property of the same name on their parent value.
    pub resolver_id: Option<ResolverId>,
}

#[derive(Debug)]
pub struct InputObjectRecord {
    pub name: String,
    pub input_field_ids: Vec<InputValueDefinitionId>,
}

#[derive(Debug)]
pub struct InputValueDefinitionRecord {
    pub name: String,
    pub parent: InputValueParent,
    pub ty: Type,
    /// `None` means no default was declared, which is different from a `null` default.
    pub default_value: Option<serde_json::Value>,
    pub directives: Vec<DirectiveRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputValueParent {
    FieldArgument(FieldDefinitionId),
    InputObject(InputObjectId),
}

#[derive(Debug)]
pub struct ScalarRecord {
    pub name: String,
}

#[derive(Debug)]
pub struct EnumRecord {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug)]
pub struct DirectiveDefinitionRecord {
    pub name: String,
    pub locations: Vec<DirectiveLocation>,
}

pub type ResolverRecord = Arc<dyn Resolver>;

/// A directive applied on a definition, as written in the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveRecord {
    pub name: String,
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl DirectiveRecord {
    pub fn new(name: impl Into<String>) -> Self {
        DirectiveRecord {
            name: name.into(),
            arguments: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

/// Type system directive locations, named the way they appear in SDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    FieldDefinition,
    ArgumentDefinition,
    InputFieldDefinition,
}
