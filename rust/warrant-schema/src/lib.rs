//! Structural validation for capability fields.
//!
//! Everything here is consumed through one contract, [`Reader`]: read an
//! input, return either a typed value or a [`SchemaError`] explaining
//! where the input went wrong. Caveats are validated with the closed
//! [`Schema`] combinator set; resources are read with [`did()`] or
//! [`uri()`]; [`Decode`] turns validated caveats into a serde type.
//!
//! ```
//! use warrant_schema::{Reader, Schema};
//! use ipld_core::ipld::Ipld;
//!
//! let size = Schema::integer().greater_than(0.0);
//! assert!(size.read(&Ipld::Integer(5)).is_ok());
//! assert!(size.read(&Ipld::Integer(-5)).is_err());
//! ```

#![warn(missing_docs)]

mod decode;
mod error;
mod reader;
mod resource;
mod schema;

pub use decode::{Decode, decode};
pub use error::SchemaError;
pub use reader::Reader;
pub use resource::{DidReader, UriReader, did, string, uri};
pub use schema::{Fields, Refinement, Schema};
