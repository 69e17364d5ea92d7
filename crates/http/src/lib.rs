//! HTTP-backed source and destination directories.
//!
//! Every request carries the endpoint credential in the `Authorization` header and only a
//! `200 OK` counts as success. Response bodies go through the core validator before anything is
//! handed back to the sync engine.

mod destination;
mod endpoint;
mod source;

pub use destination::HttpDestinationDirectory;
pub use endpoint::HttpSetupError;
pub use source::HttpSourceDirectory;
