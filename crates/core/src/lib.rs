pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod sync;

pub use directory::{DestinationDirectory, InMemoryDestination, InMemorySource, SourceDirectory};
pub use domain::customer::{Customer, CustomerPayload, IdPolicy, RecordId};
pub use domain::validation::{validate, validate_sequence, Rejection};
pub use errors::{PlanError, SyncCall, SyncError};
pub use sync::{
    upsert, BatchPlan, BatchWindow, SyncEngine, SyncFailure, SyncReport, UpsertOutcome,
};
