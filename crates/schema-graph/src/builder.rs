use std::{collections::HashMap, sync::Arc};

use serde_json::Value;

use crate::{
    ty::is_valid_name, Definition, DirectiveDefinitionRecord, DirectiveLocation, DirectiveRecord, EnumId, EnumRecord,
    FieldDefinitionId, FieldDefinitionRecord, GraphqlResult, InputObjectId, InputObjectRecord, InputValueDefinitionId,
    InputValueDefinitionRecord, InputValueParent, ObjectId, ObjectRecord, OperationGraph, Resolver, ResolverId,
    ResolverInput, RootOperationTypes, ScalarId, ScalarRecord, Type, TypeRef,
};

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphBuildError {
    #[error("'{name}' is not a valid GraphQL name")]
    InvalidName { name: String },
    #[error("'{name}' is defined more than once")]
    DuplicateDefinition { name: String },
    #[error("'{coordinate}' is defined more than once")]
    DuplicateField { coordinate: String },
    #[error("'{ty}' used by {coordinate} is not a valid type reference")]
    InvalidTypeReference { coordinate: String, ty: String },
    #[error("Unknown type '{name}' used by {coordinate}")]
    UnknownType { coordinate: String, name: String },
    #[error("{coordinate} must have an output type, but '{name}' is an input object")]
    NotAnOutputType { coordinate: String, name: String },
    #[error("{coordinate} must have an input type, but '{name}' is an object")]
    NotAnInputType { coordinate: String, name: String },
    #[error("Missing the 'Query' root type")]
    MissingQueryType,
    #[error("Root type '{name}' must be an object")]
    RootTypeNotAnObject { name: String },
}

/// Collects definitions by name, references between them are only resolved in [`GraphBuilder::build`]
/// so they can be declared in any order.
#[derive(Default)]
pub struct GraphBuilder {
    scalars: Vec<String>,
    enums: Vec<EnumRecord>,
    objects: Vec<ObjectBuilder>,
    input_objects: Vec<InputObjectBuilder>,
    directive_definitions: Vec<DirectiveDefinitionRecord>,
}

pub struct ObjectBuilder {
    name: String,
    fields: Vec<FieldBuilder>,
}

pub struct FieldBuilder {
    name: String,
    ty: String,
    arguments: Vec<InputValueBuilder>,
    directives: Vec<DirectiveRecord>,
    resolver: Option<Arc<dyn Resolver>>,
}

pub struct InputObjectBuilder {
    name: String,
    fields: Vec<InputValueBuilder>,
}

pub struct InputValueBuilder {
    name: String,
    ty: String,
    default_value: Option<Value>,
    directives: Vec<DirectiveRecord>,
}

impl GraphBuilder {
    #[must_use]
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.scalars.push(name.into());
        self
    }

    #[must_use]
    pub fn enum_type(mut self, name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.enums.push(EnumRecord {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn object(mut self, name: impl Into<String>, define: impl FnOnce(&mut ObjectBuilder)) -> Self {
        let mut object = ObjectBuilder {
            name: name.into(),
            fields: Vec::new(),
        };
        define(&mut object);
        self.objects.push(object);
        self
    }

    #[must_use]
    pub fn input_object(mut self, name: impl Into<String>, define: impl FnOnce(&mut InputObjectBuilder)) -> Self {
        let mut input_object = InputObjectBuilder {
            name: name.into(),
            fields: Vec::new(),
        };
        define(&mut input_object);
        self.input_objects.push(input_object);
        self
    }

    #[must_use]
    pub fn directive_definition(
        mut self,
        name: impl Into<String>,
        locations: impl IntoIterator<Item = DirectiveLocation>,
    ) -> Self {
        self.directive_definitions.push(DirectiveDefinitionRecord {
            name: name.into(),
            locations: locations.into_iter().collect(),
        });
        self
    }

    pub fn build(self) -> Result<OperationGraph, GraphBuildError> {
        let GraphBuilder {
            scalars,
            enums,
            objects,
            input_objects,
            directive_definitions,
        } = self;

        let mut definitions_by_name = HashMap::new();
        let mut register = |name: &str, definition: Definition| {
            if !is_valid_name(name) {
                return Err(GraphBuildError::InvalidName { name: name.to_string() });
            }
            if definitions_by_name.insert(name.to_string(), definition).is_some() {
                return Err(GraphBuildError::DuplicateDefinition { name: name.to_string() });
            }
            Ok(())
        };

        let scalars = BUILTIN_SCALARS
            .into_iter()
            .map(str::to_string)
            .chain(scalars)
            .map(|name| ScalarRecord { name })
            .collect::<Vec<_>>();
        for (i, scalar) in scalars.iter().enumerate() {
            register(&scalar.name, Definition::Scalar(ScalarId::from(i)))?;
        }
        for (i, enum_record) in enums.iter().enumerate() {
            register(&enum_record.name, Definition::Enum(EnumId::from(i)))?;
        }
        for (i, object) in objects.iter().enumerate() {
            register(&object.name, Definition::Object(ObjectId::from(i)))?;
        }
        for (i, input_object) in input_objects.iter().enumerate() {
            register(&input_object.name, Definition::InputObject(InputObjectId::from(i)))?;
        }

        let mut directive_names = Vec::with_capacity(directive_definitions.len());
        for definition in &directive_definitions {
            if !is_valid_name(&definition.name) {
                return Err(GraphBuildError::InvalidName {
                    name: definition.name.clone(),
                });
            }
            if directive_names.contains(&definition.name.as_str()) {
                return Err(GraphBuildError::DuplicateDefinition {
                    name: format!("@{}", definition.name),
                });
            }
            directive_names.push(definition.name.as_str());
        }

        let resolve = |coordinate: &dyn Fn() -> String, ty: &str| -> Result<Type, GraphBuildError> {
            let type_ref = TypeRef::parse(ty).ok_or_else(|| GraphBuildError::InvalidTypeReference {
                coordinate: coordinate(),
                ty: ty.to_string(),
            })?;
            let inner = definitions_by_name
                .get(type_ref.name)
                .copied()
                .ok_or_else(|| GraphBuildError::UnknownType {
                    coordinate: coordinate(),
                    name: type_ref.name.to_string(),
                })?;
            Ok(Type {
                inner,
                wrapping: type_ref.wrapping,
            })
        };

        let mut graph_objects = Vec::with_capacity(objects.len());
        let mut field_definitions = Vec::new();
        let mut input_value_definitions = Vec::new();
        let mut resolvers = Vec::new();

        for (i, object) in objects.into_iter().enumerate() {
            let parent_id = ObjectId::from(i);
            let mut field_ids = Vec::with_capacity(object.fields.len());

            for field in object.fields {
                let coordinate = || format!("{}.{}", object.name, field.name);
                if !is_valid_name(&field.name) {
                    return Err(GraphBuildError::InvalidName { name: coordinate() });
                }
                let field_id = FieldDefinitionId::from(field_definitions.len());
                if field_ids
                    .iter()
                    .any(|id: &FieldDefinitionId| field_definitions_name(&field_definitions, *id) == field.name)
                {
                    return Err(GraphBuildError::DuplicateField {
                        coordinate: coordinate(),
                    });
                }

                let ty = resolve(&coordinate, &field.ty)?;
                if !ty.inner.is_output() {
                    return Err(GraphBuildError::NotAnOutputType {
                        coordinate: coordinate(),
                        name: TypeRef::parse(&field.ty).map(|ty| ty.name).unwrap_or_default().to_string(),
                    });
                }

                let mut argument_ids = Vec::with_capacity(field.arguments.len());
                for argument in field.arguments {
                    let argument_name = argument.name.clone();
                    let argument_coordinate = || format!("{}({}:)", coordinate(), argument_name);
                    let id = push_input_value(
                        &mut input_value_definitions,
                        &resolve,
                        &argument_coordinate,
                        argument,
                        InputValueParent::FieldArgument(field_id),
                    )?;
                    if argument_ids
                        .iter()
                        .any(|other: &InputValueDefinitionId| input_value_definitions[usize::from(*other)].name == argument_name)
                    {
                        return Err(GraphBuildError::DuplicateField {
                            coordinate: argument_coordinate(),
                        });
                    }
                    argument_ids.push(id);
                }

                let resolver_id = field.resolver.map(|resolver| {
                    resolvers.push(resolver);
                    ResolverId::from(resolvers.len() - 1)
                });

                field_definitions.push(FieldDefinitionRecord {
                    name: field.name,
                    parent_id,
                    ty,
                    argument_ids,
                    directives: field.directives,
                    resolver_id,
                });
                field_ids.push(field_id);
            }

            graph_objects.push(ObjectRecord {
                name: object.name,
                field_ids,
            });
        }

        let mut graph_input_objects = Vec::with_capacity(input_objects.len());
        for (i, input_object) in input_objects.into_iter().enumerate() {
            let parent = InputValueParent::InputObject(InputObjectId::from(i));
            let mut input_field_ids: Vec<InputValueDefinitionId> = Vec::with_capacity(input_object.fields.len());
            for field in input_object.fields {
                let name = field.name.clone();
                let coordinate = || format!("{}.{}", input_object.name, name);
                if input_field_ids
                    .iter()
                    .any(|id| input_value_definitions[usize::from(*id)].name == name)
                {
                    return Err(GraphBuildError::DuplicateField {
                        coordinate: coordinate(),
                    });
                }
                let id = push_input_value(&mut input_value_definitions, &resolve, &coordinate, field, parent)?;
                input_field_ids.push(id);
            }
            graph_input_objects.push(InputObjectRecord {
                name: input_object.name,
                input_field_ids,
            });
        }

        let root = |name: &str| -> Result<Option<ObjectId>, GraphBuildError> {
            match definitions_by_name.get(name) {
                None => Ok(None),
                Some(Definition::Object(id)) => Ok(Some(*id)),
                Some(_) => Err(GraphBuildError::RootTypeNotAnObject { name: name.to_string() }),
            }
        };
        let root_operation_types = RootOperationTypes {
            query: root("Query")?.ok_or(GraphBuildError::MissingQueryType)?,
            mutation: root("Mutation")?,
            subscription: root("Subscription")?,
        };

        Ok(OperationGraph {
            root_operation_types,
            definitions_by_name,
            objects: graph_objects,
            field_definitions,
            input_objects: graph_input_objects,
            input_value_definitions,
            scalars,
            enums,
            directive_definitions,
            resolvers,
        })
    }
}

fn field_definitions_name(field_definitions: &[FieldDefinitionRecord], id: FieldDefinitionId) -> &str {
    &field_definitions[usize::from(id)].name
}

fn push_input_value(
    input_value_definitions: &mut Vec<InputValueDefinitionRecord>,
    resolve: &dyn Fn(&dyn Fn() -> String, &str) -> Result<Type, GraphBuildError>,
    coordinate: &dyn Fn() -> String,
    input_value: InputValueBuilder,
    parent: InputValueParent,
) -> Result<InputValueDefinitionId, GraphBuildError> {
    if !is_valid_name(&input_value.name) {
        return Err(GraphBuildError::InvalidName { name: coordinate() });
    }
    let ty = resolve(coordinate, &input_value.ty)?;
    if !ty.inner.is_input() {
        return Err(GraphBuildError::NotAnInputType {
            coordinate: coordinate(),
            name: TypeRef::parse(&input_value.ty).map(|ty| ty.name).unwrap_or_default().to_string(),
        });
    }
    input_value_definitions.push(InputValueDefinitionRecord {
        name: input_value.name,
        parent,
        ty,
        default_value: input_value.default_value,
        directives: input_value.directives,
    });
    Ok(InputValueDefinitionId::from(input_value_definitions.len() - 1))
}

impl ObjectBuilder {
    pub fn field(&mut self, name: impl Into<String>, ty: impl Into<String>) -> &mut FieldBuilder {
        self.fields.push(FieldBuilder {
            name: name.into(),
            ty: ty.into(),
            arguments: Vec::new(),
            directives: Vec::new(),
            resolver: None,
        });
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }
}

impl FieldBuilder {
    pub fn argument(&mut self, name: impl Into<String>, ty: impl Into<String>) -> &mut Self {
        self.argument_with(name, ty, |_| {})
    }

    pub fn argument_with(
        &mut self,
        name: impl Into<String>,
        ty: impl Into<String>,
        define: impl FnOnce(&mut InputValueBuilder),
    ) -> &mut Self {
        let mut argument = InputValueBuilder::new(name.into(), ty.into());
        define(&mut argument);
        self.arguments.push(argument);
        self
    }

    pub fn directive(&mut self, directive: DirectiveRecord) -> &mut Self {
        self.directives.push(directive);
        self
    }

    pub fn resolver(&mut self, resolver: impl Resolver) -> &mut Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn resolve_with<F>(&mut self, resolve: F) -> &mut Self
    where
        F: Fn(ResolverInput<'_>) -> GraphqlResult<Value> + Send + Sync + 'static,
    {
        self.resolver(resolve)
    }
}

impl InputObjectBuilder {
    pub fn field(&mut self, name: impl Into<String>, ty: impl Into<String>) -> &mut InputValueBuilder {
        self.fields.push(InputValueBuilder::new(name.into(), ty.into()));
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }
}

impl InputValueBuilder {
    fn new(name: String, ty: String) -> Self {
        InputValueBuilder {
            name,
            ty,
            default_value: None,
            directives: Vec::new(),
        }
    }

    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn directive(&mut self, directive: DirectiveRecord) -> &mut Self {
        self.directives.push(directive);
        self
    }
}
