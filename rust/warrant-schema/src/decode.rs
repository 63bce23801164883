use crate::{
    error::SchemaError,
    reader::Reader,
    schema::{Fields, Schema},
};
use ipld_core::ipld::Ipld;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Validates fields with a [`Schema`], then deserializes them into `T`.
///
/// ```
/// use serde::Deserialize;
/// use warrant_schema::{Reader, Schema, decode};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Upload {
///     size: u64,
/// }
///
/// let reader = decode::<Upload>(Schema::structure([("size", Schema::integer())]));
/// let mut nb = std::collections::BTreeMap::new();
/// nb.insert("size".to_string(), 10.into());
/// assert_eq!(reader.read(&nb).unwrap(), Upload { size: 10 });
/// ```
pub struct Decode<T> {
    schema: Schema,
    target: PhantomData<fn() -> T>,
}

/// Build a [`Decode`] reader.
#[must_use]
pub fn decode<T: DeserializeOwned>(schema: Schema) -> Decode<T> {
    Decode {
        schema,
        target: PhantomData,
    }
}

impl<T> Decode<T> {
    /// The schema fields are validated with.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl<T> Clone for Decode<T> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            target: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Decode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decode")
            .field("schema", &self.schema)
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> Reader<T, Fields> for Decode<T> {
    fn read(&self, input: &Fields) -> Result<T, SchemaError> {
        let fields = self.schema.read_fields(input)?;
        ipld_core::serde::from_ipld(Ipld::Map(fields))
            .map_err(|e| SchemaError::message(format!("Failed to decode caveats: {e}")))
    }
}
