use async_trait::async_trait;

use crate::domain::customer::{Customer, CustomerPayload, RecordId};
use crate::errors::SyncError;

pub mod memory;

pub use memory::{InMemoryDestination, InMemorySource, WriteRecord};

/// Read side of a sync: the directory customers are copied from.
#[async_trait]
pub trait SourceDirectory: Send + Sync {
    /// One page of customers, validated without requiring an `id`.
    async fn fetch_page(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, SyncError>;
}

/// Write side of a sync: the client-management store being brought up to date.
#[async_trait]
pub trait DestinationDirectory: Send + Sync {
    /// Records whose `name` matches exactly, each validated with a required `id`.
    async fn find_existing(&self, name: &str) -> Result<Vec<Customer>, SyncError>;

    async fn create(&self, payload: &CustomerPayload<'_>) -> Result<(), SyncError>;

    async fn update(&self, id: &RecordId, payload: &CustomerPayload<'_>) -> Result<(), SyncError>;
}
