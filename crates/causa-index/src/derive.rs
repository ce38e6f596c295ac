use causa_types::IndexAssignment;
use serde::Serialize;
use serde_json::Value;

use crate::error::{IndexError, IndexResult};
use crate::field::{IndexField, Indexed};

/// The shape of an indexed field as seen in the serialized value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldShape {
    Text,
    TextSequence,
    /// Anything else; the payload names the shape for error messages.
    Other(&'static str),
}

impl FieldShape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => FieldShape::Text,
            Value::Array(items) if items.iter().all(Value::is_string) => FieldShape::TextSequence,
            Value::Array(_) => FieldShape::Other("a sequence with non-text elements"),
            Value::Null => FieldShape::Other("null"),
            Value::Bool(_) => FieldShape::Other("a boolean"),
            Value::Number(_) => FieldShape::Other("a number"),
            Value::Object(_) => FieldShape::Other("a nested record"),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FieldShape::Text => "text",
            FieldShape::TextSequence => "a sequence of text",
            FieldShape::Other(name) => name,
        }
    }
}

/// Derive the full index assignment list for `value`.
///
/// Explicit assignments come first, in order, followed by one assignment
/// per indexed field (or per element of an indexed sequence) in table order.
/// On error nothing is returned.
pub fn derive_indexes<T>(explicit: &[IndexAssignment], value: &T) -> IndexResult<Vec<IndexAssignment>>
where
    T: Serialize + Indexed + ?Sized,
{
    if T::INDEX_FIELDS.is_empty() {
        return Ok(explicit.to_vec());
    }
    let tree = serde_json::to_value(value).map_err(|e| IndexError::Serialization(e.to_string()))?;
    derive_from_tree(explicit, &tree, T::INDEX_FIELDS)
}

/// Derive assignments from an already serialized value tree.
pub fn derive_from_tree(
    explicit: &[IndexAssignment],
    tree: &Value,
    fields: &[IndexField],
) -> IndexResult<Vec<IndexAssignment>> {
    let mut out = explicit.to_vec();
    let Value::Object(record) = tree else {
        return Ok(out);
    };

    for f in fields {
        let value = record
            .get(f.field)
            .ok_or_else(|| IndexError::MissingField(f.field.to_string()))?;
        match (FieldShape::of(value), value) {
            (FieldShape::Text, Value::String(s)) => out.push(IndexAssignment::new(f.index, s.as_str())),
            (FieldShape::TextSequence, Value::Array(items)) => out.extend(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| IndexAssignment::new(f.index, s)),
            ),
            (shape, _) => {
                return Err(IndexError::UnsupportedShape {
                    field: f.field.to_string(),
                    shape: shape.describe(),
                });
            }
        }
    }
    Ok(out)
}
