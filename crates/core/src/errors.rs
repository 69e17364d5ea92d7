use std::fmt;

use thiserror::Error;

use crate::domain::validation::Rejection;

/// The four remote calls a sync run can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncCall {
    ListSource,
    FindDestination,
    CreateDestination,
    UpdateDestination,
}

impl SyncCall {
    pub fn method(&self) -> &'static str {
        match self {
            Self::ListSource | Self::FindDestination => "GET",
            Self::CreateDestination => "POST",
            Self::UpdateDestination => "PUT",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::ListSource => "/api/v2/customer",
            Self::FindDestination | Self::CreateDestination => "/api/v3/client",
            Self::UpdateDestination => "/api/v3/client/{id}",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListSource => "list_source",
            Self::FindDestination => "find_destination",
            Self::CreateDestination => "create_destination",
            Self::UpdateDestination => "update_destination",
        }
    }
}

impl fmt::Display for SyncCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{call} returned invalid customer data: {reason}")]
    Validation { call: SyncCall, reason: Rejection },
    #[error("{call} request failed with status {status}")]
    Transport { call: SyncCall, status: u16 },
    #[error("{call} request could not be completed: {message}")]
    Connection { call: SyncCall, message: String },
}

impl SyncError {
    pub fn call(&self) -> SyncCall {
        match self {
            Self::Validation { call, .. }
            | Self::Transport { call, .. }
            | Self::Connection { call, .. } => *call,
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Transport { .. } => "transport",
            Self::Connection { .. } => "connection",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("window starting at offset {start_offset} with {total} records exceeds the addressable range")]
    WindowOverflow { start_offset: u64, total: u64 },
}

#[cfg(test)]
mod tests {
    use crate::domain::validation::Rejection;
    use crate::errors::{SyncCall, SyncError};

    #[test]
    fn transport_error_names_verb_path_and_status() {
        let error = SyncError::Transport { call: SyncCall::UpdateDestination, status: 404 };

        assert_eq!(error.to_string(), "PUT /api/v3/client/{id} request failed with status 404");
        assert_eq!(error.call(), SyncCall::UpdateDestination);
        assert_eq!(error.error_class(), "transport");
    }

    #[test]
    fn validation_error_carries_the_rejection_reason() {
        let error =
            SyncError::Validation { call: SyncCall::ListSource, reason: Rejection::NotASequence };

        assert_eq!(
            error.to_string(),
            "GET /api/v2/customer returned invalid customer data: response body is not a JSON array"
        );
        assert_eq!(error.error_class(), "validation");
    }

    #[test]
    fn create_and_lookup_share_a_path_but_not_a_verb() {
        assert_eq!(SyncCall::CreateDestination.to_string(), "POST /api/v3/client");
        assert_eq!(SyncCall::FindDestination.to_string(), "GET /api/v3/client");
    }
}
