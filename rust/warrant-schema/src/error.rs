//! Schema validation errors.

use thiserror::Error;

/// Why an input failed to read.
///
/// Composite schemas nest the failures of their parts, so the rendered
/// message points at the offending field or element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The input has the wrong type.
    #[error("Expected value of type {expected} instead got {actual}")]
    Type {
        /// The type the schema accepts.
        expected: String,
        /// What was found.
        actual: String,
    },

    /// The input differs from a required literal.
    #[error("Expected literal {expected} instead got {actual}")]
    Literal {
        /// The literal the schema accepts.
        expected: String,
        /// What was found.
        actual: String,
    },

    /// A struct field failed to read.
    #[error("Object contains invalid field \"{at}\":\n{}", indent(.cause))]
    Field {
        /// Field name.
        at: String,
        /// Why the field was rejected.
        cause: Box<SchemaError>,
    },

    /// An array or tuple element failed to read.
    #[error("Array contains invalid element at {at}:\n{}", indent(.cause))]
    Element {
        /// Element index.
        at: usize,
        /// Why the element was rejected.
        cause: Box<SchemaError>,
    },

    /// None of the union members accepted the input.
    #[error("Value of type {actual} does not match any member of the union\n{}", indent_all(.causes))]
    Union {
        /// What was found.
        actual: String,
        /// One failure per member, in member order.
        causes: Vec<SchemaError>,
    },

    /// At least one intersection member rejected the input.
    #[error("Value does not conform to the intersection\n{}", indent_all(.causes))]
    Intersection {
        /// Failures of the rejecting members.
        causes: Vec<SchemaError>,
    },

    /// Free-form failure, used by refinements and custom readers.
    #[error("{0}")]
    Message(String),
}

impl SchemaError {
    /// A free-form failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wrap this failure as the cause of a field failure.
    #[must_use]
    pub fn at_field(self, at: impl Into<String>) -> Self {
        Self::Field {
            at: at.into(),
            cause: Box::new(self),
        }
    }

    /// Wrap this failure as the cause of an element failure.
    #[must_use]
    pub fn at_element(self, at: usize) -> Self {
        Self::Element {
            at,
            cause: Box::new(self),
        }
    }
}

fn indent(error: &SchemaError) -> String {
    error
        .to_string()
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_all(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|error| {
            let mut lines = error.to_string().lines().map(str::to_string).collect::<Vec<_>>();
            if let Some(first) = lines.first_mut() {
                *first = format!("- {first}");
            }
            lines
                .iter()
                .map(|line| format!("  {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_nested_failures_indented() {
        let error = SchemaError::Type {
            expected: "integer".into(),
            actual: "string".into(),
        }
        .at_field("size")
        .at_field("nb");
        assert_eq!(
            error.to_string(),
            "Object contains invalid field \"nb\":\n  Object contains invalid field \"size\":\n    Expected value of type integer instead got string"
        );
    }

    #[test]
    fn it_lists_union_members() {
        let error = SchemaError::Union {
            actual: "boolean".into(),
            causes: vec![
                SchemaError::message("not a string"),
                SchemaError::message("not an integer"),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Value of type boolean does not match any member of the union\n  - not a string\n  - not an integer"
        );
    }
}
