use std::sync::Arc;

use schema_graph::{
    DirectiveLocation, FieldDefinitionId, FieldDefinitionWalker, InputObjectId, InputValueDefinitionId,
    InputValueParent, OperationGraph,
};

use crate::{
    gate::{Check, Gate, Guard},
    AuthDirective, BuildError, DirectiveRegistry, FieldResolver, WrappedGraph,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnotatedNode {
    Field(FieldDefinitionId),
    InputField(InputValueDefinitionId),
}

struct Annotation {
    node: AnnotatedNode,
    directives: Vec<AuthDirective>,
}

pub(crate) fn wrap(registry: &DirectiveRegistry, graph: Arc<OperationGraph>) -> Result<WrappedGraph, BuildError> {
    let annotations = collect_annotations(registry, &graph)?;

    let mut chains: Vec<Vec<Check>> = (0..graph.field_definitions_count()).map(|_| Vec::new()).collect();
    let mut add_checks = |field_id: FieldDefinitionId, directives: &[AuthDirective], guard: Guard| {
        for directive in directives {
            chains[usize::from(field_id)].push(Check {
                directive: directive.clone(),
                guard: guard.clone(),
                handler: registry.handler(directive.kind).clone(),
            });
        }
    };

    // Field checks come first so they always run before input field checks.
    for annotation in &annotations {
        if let AnnotatedNode::Field(field_id) = annotation.node {
            add_checks(field_id, &annotation.directives, Guard::Always);
        }
    }

    let operations = operation_fields(&graph);
    for annotation in &annotations {
        let AnnotatedNode::InputField(input_field_id) = annotation.node else {
            continue;
        };
        let input_field = graph.walk(input_field_id);
        let Some(owner) = input_field.parent_input_object() else {
            continue;
        };
        for operation in operations.iter().filter(|operation| accepts(**operation, owner.id())) {
            add_checks(
                operation.id(),
                &annotation.directives,
                Guard::InputFieldSet {
                    name: input_field.name().to_string(),
                    default_value: input_field.default_value().cloned(),
                },
            );
        }
    }

    let resolvers = graph
        .walker()
        .field_definitions()
        .zip(chains)
        .map(|(field, checks)| {
            let resolver = field.resolver().cloned();
            if checks.is_empty() {
                return FieldResolver::Original(resolver);
            }
            tracing::debug!("Installed {} authorization checks on {}", checks.len(), field.coordinate());
            FieldResolver::Gated(Gate { checks, resolver })
        })
        .collect();

    Ok(WrappedGraph::new(graph, resolvers))
}

fn collect_annotations(registry: &DirectiveRegistry, graph: &OperationGraph) -> Result<Vec<Annotation>, BuildError> {
    let walker = graph.walker();
    let mut annotations = Vec::new();

    for field in walker.field_definitions() {
        let coordinate = field.coordinate();
        let directives = field
            .directives()
            .iter()
            .filter_map(|directive| {
                registry
                    .parse(graph, directive, DirectiveLocation::FieldDefinition, &coordinate)
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !directives.is_empty() {
            annotations.push(Annotation {
                node: AnnotatedNode::Field(field.id()),
                directives,
            });
        }
    }

    for input_value in walker.input_value_definitions() {
        let location = match input_value.parent() {
            InputValueParent::InputObject(_) => DirectiveLocation::InputFieldDefinition,
            InputValueParent::FieldArgument(_) => DirectiveLocation::ArgumentDefinition,
        };
        let coordinate = input_value.coordinate();
        let directives = input_value
            .directives()
            .iter()
            .filter_map(|directive| registry.parse(graph, directive, location, &coordinate).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        if !directives.is_empty() {
            annotations.push(Annotation {
                node: AnnotatedNode::InputField(input_value.id()),
                directives,
            });
        }
    }

    Ok(annotations)
}

fn operation_fields(graph: &OperationGraph) -> Vec<FieldDefinitionWalker<'_>> {
    let walker = graph.walker();
    std::iter::once(walker.query())
        .chain(walker.mutation())
        .flat_map(|object| object.fields())
        .collect()
}

/// Whether an operation has an argument of the owner input type, or of an input type with a
/// direct field of the owner type.
fn accepts(operation: FieldDefinitionWalker<'_>, owner: InputObjectId) -> bool {
    operation.arguments().any(|argument| {
        argument.ty().inner().as_input_object().is_some_and(|input| {
            input.id() == owner
                || input
                    .input_fields()
                    .any(|field| field.as_ref().ty.inner.as_input_object() == Some(owner))
        })
    })
}
