use crate::error::SchemaError;
use ipld_core::ipld::Ipld;
use warrant_common::{ConditionalSend, ConditionalSync};

/// Reads an `I` into a `T`, or explains why it can not.
///
/// Closures of the right shape are readers too, which is the easiest way
/// to plug an ad-hoc check into a capability descriptor.
///
/// ```
/// use warrant_schema::{Reader, SchemaError};
///
/// let even = |input: &i64| {
///     if input % 2 == 0 {
///         Ok(*input)
///     } else {
///         Err(SchemaError::message(format!("{input} is odd")))
///     }
/// };
/// assert!(even.read(&4).is_ok());
/// ```
pub trait Reader<T, I: ?Sized = Ipld>: ConditionalSend + ConditionalSync {
    /// Read `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] describing the first violation found.
    fn read(&self, input: &I) -> Result<T, SchemaError>;
}

impl<T, I, F> Reader<T, I> for F
where
    I: ?Sized,
    F: Fn(&I) -> Result<T, SchemaError> + ConditionalSend + ConditionalSync,
{
    fn read(&self, input: &I) -> Result<T, SchemaError> {
        self(input)
    }
}
