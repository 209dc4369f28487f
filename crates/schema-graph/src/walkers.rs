use crate::{
    Definition, DirectiveRecord, FieldDefinitionId, InputObjectId, InputValueDefinitionId, InputValueParent, ObjectId,
    OperationGraph, OperationType, ResolverRecord, Type,
};

#[derive(Clone, Copy)]
pub struct GraphWalker<'a, I = ()> {
    pub(crate) item: I,
    pub(crate) graph: &'a OperationGraph,
}

pub type ObjectWalker<'a> = GraphWalker<'a, ObjectId>;
pub type FieldDefinitionWalker<'a> = GraphWalker<'a, FieldDefinitionId>;
pub type InputObjectWalker<'a> = GraphWalker<'a, InputObjectId>;
pub type InputValueDefinitionWalker<'a> = GraphWalker<'a, InputValueDefinitionId>;
pub type TypeWalker<'a> = GraphWalker<'a, Type>;
pub type DefinitionWalker<'a> = GraphWalker<'a, Definition>;

impl<'a, I> GraphWalker<'a, I> {
    pub fn new(item: I, graph: &'a OperationGraph) -> Self {
        Self { item, graph }
    }

    pub fn walk<Other>(&self, item: Other) -> GraphWalker<'a, Other> {
        GraphWalker {
            item,
            graph: self.graph,
        }
    }

    pub fn graph(&self) -> &'a OperationGraph {
        self.graph
    }
}

impl<'a, Id: Copy> GraphWalker<'a, Id>
where
    OperationGraph: std::ops::Index<Id>,
{
    // Same as the `as_ref()` of AsRef, but with the graph lifetime.
    #[allow(clippy::should_implement_trait)]
    pub fn as_ref(&self) -> &'a <OperationGraph as std::ops::Index<Id>>::Output {
        &self.graph[self.item]
    }

    pub fn id(&self) -> Id {
        self.item
    }
}

impl<'a> GraphWalker<'a, ()> {
    pub fn query(&self) -> ObjectWalker<'a> {
        self.walk(self.graph.root_operation_types.query)
    }

    pub fn mutation(&self) -> Option<ObjectWalker<'a>> {
        self.graph.root_operation_types.mutation.map(|id| self.walk(id))
    }

    pub fn subscription(&self) -> Option<ObjectWalker<'a>> {
        self.graph.root_operation_types.subscription.map(|id| self.walk(id))
    }

    pub fn field_definitions(&self) -> impl ExactSizeIterator<Item = FieldDefinitionWalker<'a>> + 'a {
        let walker = *self;
        self.graph.field_definition_ids().map(move |id| walker.walk(id))
    }

    pub fn input_value_definitions(&self) -> impl ExactSizeIterator<Item = InputValueDefinitionWalker<'a>> + 'a {
        let walker = *self;
        self.graph.input_value_definition_ids().map(move |id| walker.walk(id))
    }
}

impl<'a> ObjectWalker<'a> {
    pub fn name(&self) -> &'a str {
        &self.as_ref().name
    }

    pub fn fields(self) -> impl ExactSizeIterator<Item = FieldDefinitionWalker<'a>> + 'a {
        self.as_ref().field_ids.iter().map(move |id| self.walk(*id))
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldDefinitionWalker<'a>> {
        self.graph.object_field_by_name(self.item, name).map(|id| self.walk(id))
    }

    pub fn operation_type(&self) -> Option<OperationType> {
        let roots = &self.graph.root_operation_types;
        if roots.query == self.item {
            Some(OperationType::Query)
        } else if roots.mutation == Some(self.item) {
            Some(OperationType::Mutation)
        } else if roots.subscription == Some(self.item) {
            Some(OperationType::Subscription)
        } else {
            None
        }
    }
}

impl<'a> FieldDefinitionWalker<'a> {
    pub fn name(&self) -> &'a str {
        &self.as_ref().name
    }

    pub fn parent(&self) -> ObjectWalker<'a> {
        self.walk(self.as_ref().parent_id)
    }

    pub fn ty(&self) -> TypeWalker<'a> {
        self.walk(self.as_ref().ty)
    }

    pub fn arguments(self) -> impl ExactSizeIterator<Item = InputValueDefinitionWalker<'a>> + 'a {
        self.as_ref().argument_ids.iter().map(move |id| self.walk(*id))
    }

    pub fn directives(&self) -> &'a [DirectiveRecord] {
        &self.as_ref().directives
    }

    pub fn resolver(&self) -> Option<&'a ResolverRecord> {
        self.as_ref().resolver_id.map(|id| &self.graph[id])
    }

    /// Root fields are the operations a client can call directly.
    pub fn operation_type(&self) -> Option<OperationType> {
        self.parent().operation_type()
    }

    /// `Type.field`
    pub fn coordinate(&self) -> String {
        format!("{}.{}", self.parent().name(), self.name())
    }
}

impl<'a> InputObjectWalker<'a> {
    pub fn name(&self) -> &'a str {
        &self.as_ref().name
    }

    pub fn input_fields(self) -> impl ExactSizeIterator<Item = InputValueDefinitionWalker<'a>> + 'a {
        self.as_ref().input_field_ids.iter().map(move |id| self.walk(*id))
    }
}

impl<'a> InputValueDefinitionWalker<'a> {
    pub fn name(&self) -> &'a str {
        &self.as_ref().name
    }

    pub fn ty(&self) -> TypeWalker<'a> {
        self.walk(self.as_ref().ty)
    }

    pub fn default_value(&self) -> Option<&'a serde_json::Value> {
        self.as_ref().default_value.as_ref()
    }

    pub fn directives(&self) -> &'a [DirectiveRecord] {
        &self.as_ref().directives
    }

    pub fn parent(&self) -> InputValueParent {
        self.as_ref().parent
    }

    /// The input object owning this value, `None` for field arguments.
    pub fn parent_input_object(&self) -> Option<InputObjectWalker<'a>> {
        match self.as_ref().parent {
            InputValueParent::InputObject(id) => Some(self.walk(id)),
            InputValueParent::FieldArgument(_) => None,
        }
    }

    /// `Input.field` for input fields, `Type.field(argument:)` for arguments.
    pub fn coordinate(&self) -> String {
        match self.as_ref().parent {
            InputValueParent::InputObject(id) => format!("{}.{}", self.walk(id).name(), self.name()),
            InputValueParent::FieldArgument(id) => format!("{}({}:)", self.walk(id).coordinate(), self.name()),
        }
    }
}

impl<'a> TypeWalker<'a> {
    pub fn name(&self) -> &'a str {
        self.inner().name()
    }

    pub fn inner(&self) -> DefinitionWalker<'a> {
        self.walk(self.item.inner)
    }

    pub fn is_required(&self) -> bool {
        self.item.wrapping.is_required()
    }
}

impl<'a> DefinitionWalker<'a> {
    pub fn name(&self) -> &'a str {
        match self.item {
            Definition::Scalar(id) => &self.graph[id].name,
            Definition::Enum(id) => &self.graph[id].name,
            Definition::Object(id) => &self.graph[id].name,
            Definition::InputObject(id) => &self.graph[id].name,
        }
    }

    pub fn as_input_object(&self) -> Option<InputObjectWalker<'a>> {
        self.item.as_input_object().map(|id| self.walk(id))
    }
}

impl std::fmt::Display for TypeWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.item.wrapping.type_display(self.name()))
    }
}

impl std::fmt::Debug for FieldDefinitionWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("coordinate", &self.coordinate())
            .field("ty", &self.ty().to_string())
            .field(
                "arguments",
                &self
                    .arguments()
                    .map(|arg| (arg.name(), arg.ty().to_string()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl std::fmt::Debug for InputValueDefinitionWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputValueDefinition")
            .field("coordinate", &self.coordinate())
            .field("ty", &self.ty().to_string())
            .field("default_value", &self.default_value())
            .finish()
    }
}
