use serde::Serialize;

/// A tag or ingredient in its `{id, name}` wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub id: i32,
    pub name: String,
}
