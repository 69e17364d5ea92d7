use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{DestinationDirectory, SourceDirectory};
use crate::domain::customer::{Customer, CustomerPayload, IdPolicy, RecordId};
use crate::domain::validation::validate_sequence;
use crate::errors::{SyncCall, SyncError};

/// Source directory backed by raw JSON records, paged the way the HTTP source pages.
#[derive(Default)]
pub struct InMemorySource {
    records: Vec<Value>,
    failing_offsets: Vec<(u64, u16)>,
    requests: Mutex<Vec<(u64, u64)>>,
}

impl InMemorySource {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records, ..Self::default() }
    }

    /// Answer reads starting at `offset` with `status` instead of data.
    pub fn failing_at(mut self, offset: u64, status: u16) -> Self {
        self.failing_offsets.push((offset, status));
        self
    }

    /// `(limit, offset)` of every read, in order.
    pub async fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SourceDirectory for InMemorySource {
    async fn fetch_page(&self, limit: u64, offset: u64) -> Result<Vec<Customer>, SyncError> {
        self.requests.lock().await.push((limit, offset));

        if let Some((_, status)) = self.failing_offsets.iter().find(|(at, _)| *at == offset) {
            return Err(SyncError::Transport { call: SyncCall::ListSource, status: *status });
        }

        let page: Vec<Value> = self
            .records
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        validate_sequence(&Value::Array(page), IdPolicy::Optional)
            .map_err(|reason| SyncError::Validation { call: SyncCall::ListSource, reason })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WriteRecord {
    pub call: SyncCall,
    pub id: Option<RecordId>,
    pub body: Value,
}

#[derive(Default)]
struct DestinationState {
    clients: Vec<Value>,
    next_id: u64,
    lookups: Vec<String>,
    writes: Vec<WriteRecord>,
}

struct FailureRule {
    call: SyncCall,
    name: Option<String>,
    status: u16,
}

/// Destination directory that assigns numeric ids and keeps every stored client as JSON.
#[derive(Default)]
pub struct InMemoryDestination {
    state: Mutex<DestinationState>,
    failures: Vec<FailureRule>,
}

impl InMemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing clients; each should already carry an `id`.
    pub fn seeded(clients: Vec<Value>) -> Self {
        let next_id = clients
            .iter()
            .filter_map(|client| client.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0);
        Self {
            state: Mutex::new(DestinationState { clients, next_id, ..DestinationState::default() }),
            failures: Vec::new(),
        }
    }

    /// Answer every `call` with `status`.
    pub fn failing(mut self, call: SyncCall, status: u16) -> Self {
        self.failures.push(FailureRule { call, name: None, status });
        self
    }

    /// Answer `call` with `status` only when it concerns the customer called `name`.
    pub fn failing_for(mut self, call: SyncCall, name: &str, status: u16) -> Self {
        self.failures.push(FailureRule { call, name: Some(name.to_string()), status });
        self
    }

    pub async fn clients(&self) -> Vec<Value> {
        self.state.lock().await.clients.clone()
    }

    pub async fn lookups(&self) -> Vec<String> {
        self.state.lock().await.lookups.clone()
    }

    pub async fn writes(&self) -> Vec<WriteRecord> {
        self.state.lock().await.writes.clone()
    }

    fn check_failure(&self, call: SyncCall, name: &str) -> Result<(), SyncError> {
        let rule = self.failures.iter().find(|rule| {
            rule.call == call && rule.name.as_deref().map_or(true, |target| target == name)
        });
        match rule {
            Some(rule) => Err(SyncError::Transport { call, status: rule.status }),
            None => Ok(()),
        }
    }
}

fn payload_body(call: SyncCall, payload: &CustomerPayload<'_>) -> Result<Value, SyncError> {
    serde_json::to_value(payload)
        .map_err(|error| SyncError::Connection { call, message: error.to_string() })
}

#[async_trait]
impl DestinationDirectory for InMemoryDestination {
    async fn find_existing(&self, name: &str) -> Result<Vec<Customer>, SyncError> {
        let mut state = self.state.lock().await;
        state.lookups.push(name.to_string());
        self.check_failure(SyncCall::FindDestination, name)?;

        let matches: Vec<Value> = state
            .clients
            .iter()
            .filter(|client| client.get("name").and_then(Value::as_str) == Some(name))
            .cloned()
            .collect();

        validate_sequence(&Value::Array(matches), IdPolicy::Required)
            .map_err(|reason| SyncError::Validation { call: SyncCall::FindDestination, reason })
    }

    async fn create(&self, payload: &CustomerPayload<'_>) -> Result<(), SyncError> {
        let call = SyncCall::CreateDestination;
        self.check_failure(call, payload.name)?;
        let body = payload_body(call, payload)?;

        let mut state = self.state.lock().await;
        state.next_id += 1;
        let mut stored = body.as_object().cloned().unwrap_or_else(Map::new);
        stored.insert("id".to_string(), Value::from(state.next_id));
        state.clients.push(Value::Object(stored));
        state.writes.push(WriteRecord { call, id: None, body });
        Ok(())
    }

    async fn update(&self, id: &RecordId, payload: &CustomerPayload<'_>) -> Result<(), SyncError> {
        let call = SyncCall::UpdateDestination;
        self.check_failure(call, payload.name)?;
        let body = payload_body(call, payload)?;

        let mut state = self.state.lock().await;
        let Some(existing) =
            state.clients.iter_mut().find(|client| client.get("id") == Some(&id.0))
        else {
            return Err(SyncError::Transport { call, status: 404 });
        };

        let mut stored = body.as_object().cloned().unwrap_or_else(Map::new);
        stored.insert("id".to_string(), id.0.clone());
        *existing = Value::Object(stored);
        state.writes.push(WriteRecord { call, id: Some(id.clone()), body });
        Ok(())
    }
}
