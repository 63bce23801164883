//! The closed set of structural combinators.

use crate::{error::SchemaError, reader::Reader};
use ipld_core::ipld::Ipld;
use std::{collections::BTreeMap, fmt};

/// A map of named values, the shape caveats come in.
pub type Fields = BTreeMap<String, Ipld>;

/// A structural schema over [`Ipld`] values.
///
/// Reading returns the validated value. [`Schema::Struct`] keeps only its
/// declared fields and omits absent optional ones, so undeclared input
/// keys never reach the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Accepts anything.
    Unknown,
    /// Accepts `null`.
    Null,
    /// Accepts booleans.
    Boolean,
    /// Accepts integers.
    Integer,
    /// Accepts floats and integers.
    Float,
    /// Accepts strings.
    String,
    /// Accepts byte strings.
    Bytes,
    /// Accepts CID links.
    Link,
    /// Accepts exactly this value.
    Literal(Ipld),
    /// Accepts lists whose every element reads with the inner schema.
    Array(Box<Schema>),
    /// Accepts fixed-length lists, element by element.
    Tuple(Vec<Schema>),
    /// Accepts maps whose every value reads with the inner schema.
    Dictionary(Box<Schema>),
    /// Accepts maps carrying the declared fields.
    Struct(BTreeMap<String, Schema>),
    /// Accepts what any member accepts; the first accepting member wins.
    Union(Vec<Schema>),
    /// Accepts what every member accepts; the last member's reading wins.
    Intersection(Vec<Schema>),
    /// Like the inner schema, but a struct field may be absent.
    Optional(Box<Schema>),
    /// The inner schema, narrowed by a refinement.
    Refined(Box<Schema>, Refinement),
}

/// Narrows an already-typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    /// Numbers strictly greater than the bound.
    GreaterThan(f64),
    /// Numbers strictly less than the bound.
    LessThan(f64),
    /// Strings starting with the prefix.
    StartsWith(String),
    /// Strings ending with the suffix.
    EndsWith(String),
}

impl Schema {
    /// [`Schema::Unknown`].
    #[must_use]
    pub const fn unknown() -> Self {
        Self::Unknown
    }

    /// [`Schema::Boolean`].
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean
    }

    /// [`Schema::Integer`].
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer
    }

    /// [`Schema::Float`].
    #[must_use]
    pub const fn float() -> Self {
        Self::Float
    }

    /// [`Schema::String`].
    #[must_use]
    pub const fn string() -> Self {
        Self::String
    }

    /// [`Schema::Bytes`].
    #[must_use]
    pub const fn bytes() -> Self {
        Self::Bytes
    }

    /// [`Schema::Link`].
    #[must_use]
    pub const fn link() -> Self {
        Self::Link
    }

    /// [`Schema::Literal`].
    pub fn literal(value: impl Into<Ipld>) -> Self {
        Self::Literal(value.into())
    }

    /// [`Schema::Array`].
    #[must_use]
    pub fn array(item: Schema) -> Self {
        Self::Array(Box::new(item))
    }

    /// [`Schema::Tuple`].
    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    /// [`Schema::Dictionary`].
    #[must_use]
    pub fn dictionary(value: Schema) -> Self {
        Self::Dictionary(Box::new(value))
    }

    /// [`Schema::Struct`] from `(name, schema)` pairs.
    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Self::Struct(
            fields
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        )
    }

    /// A struct with no declared fields: accepts any map, keeps nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Struct(BTreeMap::new())
    }

    /// Accept what either `self` or `other` accepts.
    #[must_use]
    pub fn or(self, other: Schema) -> Self {
        match self {
            Self::Union(mut members) => {
                members.push(other);
                Self::Union(members)
            }
            schema => Self::Union(vec![schema, other]),
        }
    }

    /// Accept only what both `self` and `other` accept.
    #[must_use]
    pub fn and(self, other: Schema) -> Self {
        match self {
            Self::Intersection(mut members) => {
                members.push(other);
                Self::Intersection(members)
            }
            schema => Self::Intersection(vec![schema, other]),
        }
    }

    /// Allow a struct field read with this schema to be absent.
    #[must_use]
    pub fn optional(self) -> Self {
        match self {
            Self::Optional(_) => self,
            schema => Self::Optional(Box::new(schema)),
        }
    }

    /// Narrow with a refinement.
    #[must_use]
    pub fn refine(self, refinement: Refinement) -> Self {
        Self::Refined(Box::new(self), refinement)
    }

    /// Numbers strictly greater than `bound`.
    #[must_use]
    pub fn greater_than(self, bound: f64) -> Self {
        self.refine(Refinement::GreaterThan(bound))
    }

    /// Numbers strictly less than `bound`.
    #[must_use]
    pub fn less_than(self, bound: f64) -> Self {
        self.refine(Refinement::LessThan(bound))
    }

    /// Strings starting with `prefix`.
    #[must_use]
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.refine(Refinement::StartsWith(prefix.into()))
    }

    /// Strings ending with `suffix`.
    #[must_use]
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.refine(Refinement::EndsWith(suffix.into()))
    }

    /// Whether a struct field read with this schema may be absent.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) | Self::Unknown => true,
            Self::Refined(inner, _) => inner.is_optional(),
            Self::Union(members) => members.iter().any(Schema::is_optional),
            _ => false,
        }
    }

    /// Read a map of fields, as found in a capability's caveats.
    ///
    /// # Errors
    ///
    /// Returns the first field failure, wrapped as [`SchemaError::Field`].
    pub fn read_fields(&self, input: &Fields) -> Result<Fields, SchemaError> {
        match self {
            Self::Struct(fields) => read_struct(fields, input),
            schema => match schema.read_value(&Ipld::Map(input.clone()))? {
                Ipld::Map(fields) => Ok(fields),
                other => Err(type_error(schema, &other)),
            },
        }
    }

    fn read_value(&self, input: &Ipld) -> Result<Ipld, SchemaError> {
        match (self, input) {
            (Self::Unknown, _)
            | (Self::Null, Ipld::Null)
            | (Self::Boolean, Ipld::Bool(_))
            | (Self::Integer, Ipld::Integer(_))
            | (Self::Float, Ipld::Float(_))
            | (Self::String, Ipld::String(_))
            | (Self::Bytes, Ipld::Bytes(_))
            | (Self::Link, Ipld::Link(_)) => Ok(input.clone()),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float, Ipld::Integer(value)) => Ok(Ipld::Float(*value as f64)),
            (Self::Link, other) => Err(SchemaError::message(format!(
                "Expected link to be a CID instead of {}",
                type_name(other)
            ))),
            (Self::Literal(expected), actual) => {
                if expected == actual {
                    Ok(actual.clone())
                } else {
                    Err(SchemaError::Literal {
                        expected: render(expected),
                        actual: render(actual),
                    })
                }
            }
            (Self::Array(item), Ipld::List(items)) => items
                .iter()
                .enumerate()
                .map(|(at, element)| item.read_value(element).map_err(|e| e.at_element(at)))
                .collect::<Result<Vec<_>, _>>()
                .map(Ipld::List),
            (Self::Tuple(members), Ipld::List(items)) if members.len() == items.len() => members
                .iter()
                .zip(items)
                .enumerate()
                .map(|(at, (member, element))| {
                    member.read_value(element).map_err(|e| e.at_element(at))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Ipld::List),
            (Self::Tuple(members), Ipld::List(items)) => Err(SchemaError::message(format!(
                "Expected array with {} elements instead got {}",
                members.len(),
                items.len()
            ))),
            (Self::Dictionary(value), Ipld::Map(entries)) => entries
                .iter()
                .map(|(key, entry)| {
                    value
                        .read_value(entry)
                        .map(|entry| (key.clone(), entry))
                        .map_err(|e| e.at_field(key.clone()))
                })
                .collect::<Result<Fields, _>>()
                .map(Ipld::Map),
            (Self::Struct(fields), Ipld::Map(entries)) => read_struct(fields, entries).map(Ipld::Map),
            (Self::Union(members), actual) => {
                let mut causes = Vec::with_capacity(members.len());
                for member in members {
                    match member.read_value(actual) {
                        Ok(value) => return Ok(value),
                        Err(cause) => causes.push(cause),
                    }
                }
                Err(SchemaError::Union {
                    actual: type_name(actual).to_string(),
                    causes,
                })
            }
            (Self::Intersection(members), actual) => {
                let mut output = actual.clone();
                let mut causes = Vec::new();
                for member in members {
                    match member.read_value(actual) {
                        Ok(value) => output = value,
                        Err(cause) => causes.push(cause),
                    }
                }
                if causes.is_empty() {
                    Ok(output)
                } else {
                    Err(SchemaError::Intersection { causes })
                }
            }
            (Self::Optional(inner), actual) => inner.read_value(actual),
            (Self::Refined(inner, refinement), actual) => {
                let value = inner.read_value(actual)?;
                refinement.check(&value)?;
                Ok(value)
            }
            (schema, actual) => Err(type_error(schema, actual)),
        }
    }
}

impl Reader<Ipld, Ipld> for Schema {
    fn read(&self, input: &Ipld) -> Result<Ipld, SchemaError> {
        self.read_value(input)
    }
}

impl Reader<Fields, Fields> for Schema {
    fn read(&self, input: &Fields) -> Result<Fields, SchemaError> {
        self.read_fields(input)
    }
}

fn read_struct(
    fields: &BTreeMap<String, Schema>,
    input: &Fields,
) -> Result<Fields, SchemaError> {
    let mut output = Fields::new();
    for (name, schema) in fields {
        match input.get(name) {
            Some(value) => {
                let value = schema.read_value(value).map_err(|e| e.at_field(name))?;
                output.insert(name.clone(), value);
            }
            None if schema.is_optional() => {}
            None => {
                return Err(SchemaError::Type {
                    expected: schema.to_string(),
                    actual: "undefined".to_string(),
                }
                .at_field(name));
            }
        }
    }
    Ok(output)
}

impl Refinement {
    fn check(&self, value: &Ipld) -> Result<(), SchemaError> {
        match (self, value) {
            (Self::GreaterThan(bound), value) => match number(value) {
                Some(n) if n > *bound => Ok(()),
                Some(n) => Err(SchemaError::message(format!("{n} is not greater than {bound}"))),
                None => Err(SchemaError::message(format!(
                    "Expected a number instead got {}",
                    type_name(value)
                ))),
            },
            (Self::LessThan(bound), value) => match number(value) {
                Some(n) if n < *bound => Ok(()),
                Some(n) => Err(SchemaError::message(format!("{n} is not less than {bound}"))),
                None => Err(SchemaError::message(format!(
                    "Expected a number instead got {}",
                    type_name(value)
                ))),
            },
            (Self::StartsWith(prefix), Ipld::String(s)) if s.starts_with(prefix.as_str()) => Ok(()),
            (Self::StartsWith(prefix), value) => Err(SchemaError::message(format!(
                "Expected a string with \"{prefix}\" prefix instead got {}",
                render(value)
            ))),
            (Self::EndsWith(suffix), Ipld::String(s)) if s.ends_with(suffix.as_str()) => Ok(()),
            (Self::EndsWith(suffix), value) => Err(SchemaError::message(format!(
                "Expected a string ending with \"{suffix}\" instead got {}",
                render(value)
            ))),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn number(value: &Ipld) -> Option<f64> {
    match value {
        Ipld::Integer(n) => Some(*n as f64),
        Ipld::Float(n) => Some(*n),
        _ => None,
    }
}

fn type_error(schema: &Schema, actual: &Ipld) -> SchemaError {
    SchemaError::Type {
        expected: schema.to_string(),
        actual: type_name(actual).to_string(),
    }
}

fn type_name(value: &Ipld) -> &'static str {
    match value {
        Ipld::Null => "null",
        Ipld::Bool(_) => "boolean",
        Ipld::Integer(_) => "integer",
        Ipld::Float(_) => "float",
        Ipld::String(_) => "string",
        Ipld::Bytes(_) => "bytes",
        Ipld::List(_) => "array",
        Ipld::Map(_) => "object",
        Ipld::Link(_) => "link",
    }
}

fn render(value: &Ipld) -> String {
    match value {
        Ipld::String(s) => format!("{s:?}"),
        Ipld::Integer(n) => n.to_string(),
        Ipld::Float(n) => n.to_string(),
        Ipld::Bool(b) => b.to_string(),
        Ipld::Link(cid) => cid.to_string(),
        other => type_name(other).to_string(),
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Null => f.write_str("null"),
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::Link => f.write_str("link"),
            Self::Literal(value) => f.write_str(&render(value)),
            Self::Array(item) => write!(f, "array<{item}>"),
            Self::Tuple(members) => {
                f.write_str("[")?;
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
            Self::Dictionary(value) => write!(f, "dictionary<{value}>"),
            Self::Struct(fields) => {
                f.write_str("{")?;
                for (index, (name, schema)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    match schema {
                        Self::Optional(inner) => write!(f, "{name}?: {inner}")?,
                        schema => write!(f, "{name}: {schema}")?,
                    }
                }
                f.write_str("}")
            }
            Self::Union(members) => join(f, members, " | "),
            Self::Intersection(members) => join(f, members, " & "),
            Self::Optional(inner) => write!(f, "{inner}?"),
            Self::Refined(inner, _) => write!(f, "{inner}"),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, members: &[Schema], separator: &str) -> fmt::Result {
    for (index, member) in members.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{member}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(entries: &[(&str, Ipld)]) -> Fields {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn it_reads_primitives() {
        assert_eq!(Schema::integer().read(&Ipld::Integer(3)), Ok(Ipld::Integer(3)));
        assert_eq!(Schema::float().read(&Ipld::Integer(3)), Ok(Ipld::Float(3.0)));
        assert_eq!(
            Schema::string().read(&Ipld::Integer(3)),
            Err(SchemaError::Type {
                expected: "string".into(),
                actual: "integer".into()
            })
        );
    }

    #[test]
    fn it_explains_bad_links() {
        let error = Schema::link().read(&Ipld::String("bafy".into())).unwrap_err();
        assert_eq!(error.to_string(), "Expected link to be a CID instead of string");
    }

    #[test]
    fn it_keeps_only_declared_struct_fields() {
        let schema = Schema::structure([
            ("size", Schema::integer()),
            ("tag", Schema::string().optional()),
        ]);
        let input = fields(&[("size", Ipld::Integer(5)), ("extra", Ipld::Bool(true))]);
        assert_eq!(
            schema.read_fields(&input),
            Ok(fields(&[("size", Ipld::Integer(5))]))
        );
    }

    #[test]
    fn it_requires_non_optional_struct_fields() {
        let schema = Schema::structure([("size", Schema::integer())]);
        let error = schema.read_fields(&Fields::new()).unwrap_err();
        assert_eq!(
            error,
            SchemaError::Type {
                expected: "integer".into(),
                actual: "undefined".into()
            }
            .at_field("size")
        );
    }

    #[test]
    fn it_points_at_bad_fields_and_elements() {
        let schema = Schema::structure([("paths", Schema::array(Schema::string()))]);
        let input = fields(&[(
            "paths",
            Ipld::List(vec![Ipld::String("/a".into()), Ipld::Integer(1)]),
        )]);
        let error = schema.read_fields(&input).unwrap_err();
        assert_eq!(
            error,
            SchemaError::Type {
                expected: "string".into(),
                actual: "integer".into()
            }
            .at_element(1)
            .at_field("paths")
        );
    }

    #[test]
    fn it_tries_union_members_in_order() {
        let schema = Schema::literal("*").or(Schema::integer());
        assert_eq!(schema.read(&Ipld::String("*".into())), Ok(Ipld::String("*".into())));
        assert_eq!(schema.read(&Ipld::Integer(7)), Ok(Ipld::Integer(7)));
        let error = schema.read(&Ipld::Bool(true)).unwrap_err();
        assert!(matches!(error, SchemaError::Union { ref causes, .. } if causes.len() == 2));
        assert_eq!(schema.to_string(), "\"*\" | integer");
    }

    #[test]
    fn it_requires_every_intersection_member() {
        let schema = Schema::string()
            .starts_with("did:")
            .and(Schema::string().ends_with(".storage"));
        assert!(schema.read(&Ipld::String("did:web:web3.storage".into())).is_ok());
        let error = schema.read(&Ipld::String("did:key:zAlice".into())).unwrap_err();
        assert!(matches!(error, SchemaError::Intersection { ref causes } if causes.len() == 1));
    }

    #[test]
    fn it_refines_numbers() {
        let schema = Schema::integer().greater_than(0.0).less_than(1024.0);
        assert!(schema.read(&Ipld::Integer(512)).is_ok());
        assert_eq!(
            schema.read(&Ipld::Integer(0)),
            Err(SchemaError::message("0 is not greater than 0"))
        );
        assert!(schema.read(&Ipld::Integer(2048)).is_err());
    }

    #[test]
    fn it_checks_tuple_arity() {
        let schema = Schema::tuple([Schema::string(), Schema::integer()]);
        assert!(schema
            .read(&Ipld::List(vec![Ipld::String("a".into()), Ipld::Integer(1)]))
            .is_ok());
        assert!(schema.read(&Ipld::List(vec![Ipld::String("a".into())])).is_err());
    }

    #[test]
    fn it_reads_dictionaries() {
        let schema = Schema::dictionary(Schema::boolean());
        let input = Ipld::Map(fields(&[("a", Ipld::Bool(true)), ("b", Ipld::Null)]));
        assert_eq!(
            schema.read(&input),
            Err(SchemaError::Type {
                expected: "boolean".into(),
                actual: "null".into()
            }
            .at_field("b"))
        );
    }

    #[test]
    fn it_renders_struct_shapes() {
        let schema = Schema::structure([
            ("size", Schema::integer().optional()),
            ("link", Schema::link()),
        ]);
        assert_eq!(schema.to_string(), "{link: link, size?: integer}");
    }
}
