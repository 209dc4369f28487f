use crate::Definition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Type {
    pub inner: Definition,
    pub wrapping: Wrapping,
}

/// List wrappers are stored innermost first, packed into a bitset.
/// `[[String!]]!` has a required inner type, then a nullable list and finally a required list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wrapping {
    inner_is_required: bool,
    list_count: u8,
    required_lists: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListWrapping {
    RequiredList,
    NullableList,
}

const MAX_LIST_WRAPPINGS: u8 = 16;

impl Wrapping {
    pub fn new(inner_is_required: bool) -> Self {
        Wrapping {
            inner_is_required,
            ..Default::default()
        }
    }

    pub fn inner_is_required(&self) -> bool {
        self.inner_is_required
    }

    pub fn is_required(&self) -> bool {
        self.list_wrappings()
            .last()
            .map(|list| list == ListWrapping::RequiredList)
            .unwrap_or(self.inner_is_required)
    }

    pub fn is_list(&self) -> bool {
        self.list_count > 0
    }

    /// Returns `None` when wrapping the type once more would exceed the supported depth.
    #[must_use]
    pub fn wrapped_by(self, list: ListWrapping) -> Option<Self> {
        if self.list_count >= MAX_LIST_WRAPPINGS {
            return None;
        }
        let mut wrapping = self;
        if list == ListWrapping::RequiredList {
            wrapping.required_lists |= 1 << wrapping.list_count;
        }
        wrapping.list_count += 1;
        Some(wrapping)
    }

    /// Innermost first.
    pub fn list_wrappings(&self) -> impl DoubleEndedIterator<Item = ListWrapping> + '_ {
        (0..self.list_count).map(|i| {
            if self.required_lists & (1 << i) != 0 {
                ListWrapping::RequiredList
            } else {
                ListWrapping::NullableList
            }
        })
    }

    /// Renders the wrapping around a type name, `[String!]!` for example.
    pub fn type_display(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2 * self.list_count as usize + 1);
        for _ in 0..self.list_count {
            out.push('[');
        }
        out.push_str(name);
        if self.inner_is_required {
            out.push('!');
        }
        for list in self.list_wrappings() {
            out.push(']');
            if list == ListWrapping::RequiredList {
                out.push('!');
            }
        }
        out
    }
}

/// A type reference as written in GraphQL, before the named type is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef<'a> {
    pub name: &'a str,
    pub wrapping: Wrapping,
}

impl<'a> TypeRef<'a> {
    pub fn parse(input: &'a str) -> Option<Self> {
        let input = input.trim();
        let (input, required) = match input.strip_suffix('!') {
            Some(rest) => (rest.trim_end(), true),
            None => (input, false),
        };

        if let Some(inner) = input.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let TypeRef { name, wrapping } = TypeRef::parse(inner)?;
            let list = if required {
                ListWrapping::RequiredList
            } else {
                ListWrapping::NullableList
            };
            return Some(TypeRef {
                name,
                wrapping: wrapping.wrapped_by(list)?,
            });
        }

        is_valid_name(input).then(|| TypeRef {
            name: input,
            wrapping: Wrapping::new(required),
        })
    }
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
