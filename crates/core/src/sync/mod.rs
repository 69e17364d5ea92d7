pub mod engine;
pub mod plan;
pub mod report;
pub mod upsert;

pub use engine::SyncEngine;
pub use plan::{BatchPlan, BatchWindow, BatchWindows};
pub use report::{SyncFailure, SyncReport};
pub use upsert::{upsert, UpsertOutcome};
