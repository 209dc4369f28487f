/// Isolating ids from the rest to prevent misuse of the NonZeroU32.
/// They can only be created by From<usize>
use crate::{
    DirectiveDefinitionRecord, EnumRecord, FieldDefinitionRecord, InputObjectRecord, InputValueDefinitionRecord,
    ObjectRecord, OperationGraph, ResolverRecord, ScalarRecord,
};

/// Keeping the upper bits free, nobody needs more than that for a single schema.
const MAX_ID: usize = (1 << 29) - 1;

macro_rules! id_newtypes {
    ($($ty:ident.$field:ident[$name:ident] => $out:ident unless $msg:literal,)*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
            pub struct $name(std::num::NonZeroU32);

            impl std::ops::Index<$name> for $ty {
                type Output = $out;

                fn index(&self, index: $name) -> &$out {
                    &self.$field[usize::from(index)]
                }
            }

            impl From<usize> for $name {
                fn from(index: usize) -> Self {
                    assert!(index <= MAX_ID, $msg);
                    Self(std::num::NonZeroU32::new((index + 1) as u32).unwrap())
                }
            }

            impl From<$name> for usize {
                fn from(id: $name) -> Self {
                    (id.0.get() - 1) as usize
                }
            }
        )*
    }
}

id_newtypes! {
    OperationGraph.objects[ObjectId] => ObjectRecord unless "Too many objects",
    OperationGraph.field_definitions[FieldDefinitionId] => FieldDefinitionRecord unless "Too many fields",
    OperationGraph.input_objects[InputObjectId] => InputObjectRecord unless "Too many input objects",
    OperationGraph.input_value_definitions[InputValueDefinitionId] => InputValueDefinitionRecord unless "Too many input values",
    OperationGraph.scalars[ScalarId] => ScalarRecord unless "Too many scalars",
    OperationGraph.enums[EnumId] => EnumRecord unless "Too many enums",
    OperationGraph.directive_definitions[DirectiveDefinitionId] => DirectiveDefinitionRecord unless "Too many directive definitions",
    OperationGraph.resolvers[ResolverId] => ResolverRecord unless "Too many resolvers",
}
