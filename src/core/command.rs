use async_trait::async_trait;
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    Conflict {
        message: String,
        reason_code: Option<String>,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Ineligible {
        message: String,
        reason_code: Option<String>,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Other {
        message: String,
        reason_code: Option<String>,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            LibraryError::Conflict { message } => {
                CommandError::Conflict { message, reason_code: Some("version-conflict".to_string()) }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::Ineligible { message, reason } => {
                CommandError::Ineligible { message, reason_code: Some(reason.code().to_string()) }
            }
            LibraryError::CopyUnavailable { message, .. } => {
                CommandError::Conflict { message, reason_code: Some("copy-unavailable".to_string()) }
            }
            LibraryError::AlreadyReturned { message } => {
                CommandError::Conflict { message, reason_code: Some("already-returned".to_string()) }
            }
            LibraryError::InvalidState { message } => {
                CommandError::Validation { message, reason_code: Some("invalid-state".to_string()) }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::CommandError;
    use crate::core::library::{CopyState, IneligibleReason, LibraryError};

    #[tokio::test]
    async fn test_should_map_ineligible_reason_code() {
        let err = CommandError::from(LibraryError::ineligible("m1", IneligibleReason::Sanctioned));
        match err {
            CommandError::Ineligible { reason_code, .. } => assert_eq!(Some("sanctioned".to_string()), reason_code),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_map_lending_conflicts() {
        assert!(matches!(CommandError::from(LibraryError::copy_unavailable("C-1", CopyState::Lost)), CommandError::Conflict{ .. }));
        assert!(matches!(CommandError::from(LibraryError::already_returned("l1")), CommandError::Conflict{ .. }));
        assert!(matches!(CommandError::from(LibraryError::invalid_state("Torn")), CommandError::Validation{ .. }));
        assert!(matches!(CommandError::from(LibraryError::not_found("x")), CommandError::NotFound{ .. }));
        assert!(matches!(CommandError::from(LibraryError::unavailable("x", None, true)), CommandError::Runtime{ retryable: true, .. }));
    }
}
