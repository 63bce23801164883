#![warn(missing_docs)]

//! Small helpers shared by the warrant crates: cross-target `Send`/`Sync`
//! bounds, a shared memo cell, boxed futures and a clock.

mod sync;
pub use sync::*;

mod r#async;
pub use r#async::*;

pub mod time;
