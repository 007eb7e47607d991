use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // This is a retry-able error, which indicates that the persistence collaborator could not
    // serve the request right now (throttling, timeouts, dispatch failures). The caller can
    // retry the whole use case with or without a backoff.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    // optimistic version check or conditional write failed
    Conflict {
        message: String,
    },
    NotFound {
        message: String,
    },
    Ineligible {
        message: String,
        reason: IneligibleReason,
    },
    CopyUnavailable {
        message: String,
        state: CopyState,
    },
    AlreadyReturned {
        message: String,
    },
    InvalidState {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn conflict(message: &str) -> LibraryError {
        LibraryError::Conflict { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn ineligible(member_id: &str, reason: IneligibleReason) -> LibraryError {
        LibraryError::Ineligible {
            message: format!("member {} is not eligible for a loan: {}", member_id, reason),
            reason,
        }
    }

    pub fn copy_unavailable(code: &str, state: CopyState) -> LibraryError {
        LibraryError::CopyUnavailable {
            message: format!("copy {} is not available, current state {}", code, state),
            state,
        }
    }

    pub fn already_returned(loan_id: &str) -> LibraryError {
        LibraryError::AlreadyReturned { message: format!("loan {} was already returned", loan_id) }
    }

    pub fn invalid_state(value: &str) -> LibraryError {
        LibraryError::InvalidState { message: format!("invalid copy state {:?}", value) }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    // wraps a persistence failure with the operation that was running when it happened
    pub fn with_context(self, context: &str) -> LibraryError {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                LibraryError::Database { message: format!("{}: {}", context, message), reason_code, retryable }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                LibraryError::CurrentlyUnavailable { message: format!("{}: {}", context, message), reason_code, retryable }
            }
            LibraryError::Conflict { message } => {
                LibraryError::Conflict { message: format!("{}: {}", context, message) }
            }
            LibraryError::Serialization { message } => {
                LibraryError::Serialization { message: format!("{}: {}", context, message) }
            }
            LibraryError::Runtime { message, reason_code } => {
                LibraryError::Runtime { message: format!("{}: {}", context, message), reason_code }
            }
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LibraryError::NotFound { .. })
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Conflict { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::Ineligible { .. } => { false }
            LibraryError::CopyUnavailable { .. } => { false }
            LibraryError::AlreadyReturned { .. } => { false }
            LibraryError::InvalidState { .. } => { false }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Conflict { message } => {
                write!(f, "{}", message)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Ineligible { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::CopyUnavailable { message, .. } => {
                write!(f, "{}", message)
            }
            LibraryError::AlreadyReturned { message } => {
                write!(f, "{}", message)
            }
            LibraryError::InvalidState { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for Repository .
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}

// CopyState is the availability of a physical copy. Only these four literals are legal.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum CopyState {
    Available,
    Loaned,
    Damaged,
    Lost,
}

impl CopyState {
    // parses a recorded return condition, blank or missing input means the copy came back fine
    pub fn from_condition(condition: Option<&str>) -> LibraryResult<CopyState> {
        match condition.map(str::trim) {
            None | Some("") => Ok(CopyState::Available),
            Some(value) => CopyState::try_from(value),
        }
    }
}

impl TryFrom<&str> for CopyState {
    type Error = LibraryError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "Available" => Ok(CopyState::Available),
            "Loaned" => Ok(CopyState::Loaned),
            "Damaged" => Ok(CopyState::Damaged),
            "Lost" => Ok(CopyState::Lost),
            other => Err(LibraryError::invalid_state(other)),
        }
    }
}

impl Display for CopyState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CopyState::Available => write!(f, "Available"),
            CopyState::Loaned => write!(f, "Loaned"),
            CopyState::Damaged => write!(f, "Damaged"),
            CopyState::Lost => write!(f, "Lost"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum IneligibleReason {
    NotActive,
    Sanctioned,
    HasOverdue,
    AtLoanLimit,
}

impl IneligibleReason {
    pub fn code(&self) -> &'static str {
        match self {
            IneligibleReason::NotActive => "not-active",
            IneligibleReason::Sanctioned => "sanctioned",
            IneligibleReason::HasOverdue => "has-overdue",
            IneligibleReason::AtLoanLimit => "at-cap",
        }
    }
}

impl Display for IneligibleReason {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            IneligibleReason::NotActive => write!(f, "not active"),
            IneligibleReason::Sanctioned => write!(f, "sanctioned"),
            IneligibleReason::HasOverdue => write!(f, "has overdue items"),
            IneligibleReason::AtLoanLimit => write!(f, "at loan limit"),
        }
    }
}

// LoanStatus is derived from the returned flag and the dates, it is never stored.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Overdue => write!(f, "Overdue"),
            LoanStatus::Returned => write!(f, "Returned"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum NotificationKind {
    DueSoon,
    Overdue,
}

impl NotificationKind {
    pub fn message(&self, due_soon_days: i64) -> String {
        match self {
            NotificationKind::DueSoon => format!("Reminder: your loan is due in {} days.", due_soon_days),
            NotificationKind::Overdue => "Notice: your loan is overdue. Please return the copy.".to_string(),
        }
    }
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "DueSoon" => NotificationKind::DueSoon,
            _ => NotificationKind::Overdue,
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NotificationKind::DueSoon => write!(f, "DueSoon"),
            NotificationKind::Overdue => write!(f, "Overdue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::{CopyState, IneligibleReason, LibraryError, NotificationKind};

    #[tokio::test]
    async fn test_should_create_database_error() {
        assert!(matches!(LibraryError::database("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_not_found_error() {
        assert!(matches!(LibraryError::not_found("test"), LibraryError::NotFound{ message: _ }));
        assert!(LibraryError::not_found("test").is_not_found());
    }

    #[tokio::test]
    async fn test_should_create_ineligible_error() {
        let err = LibraryError::ineligible("m1", IneligibleReason::AtLoanLimit);
        assert!(matches!(err, LibraryError::Ineligible{ reason: IneligibleReason::AtLoanLimit, .. }));
        assert!(err.to_string().contains("at loan limit"));
    }

    #[tokio::test]
    async fn test_should_create_copy_unavailable_error() {
        let err = LibraryError::copy_unavailable("C-1", CopyState::Loaned);
        assert!(matches!(err, LibraryError::CopyUnavailable{ state: CopyState::Loaned, .. }));
    }

    #[tokio::test]
    async fn test_should_create_unavailable_error() {
        assert!(matches!(LibraryError::unavailable("test", None, false), LibraryError::CurrentlyUnavailable{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_database_or_unavailable_error() {
        assert!(matches!(LibraryError::database_or_unavailable("test", None, true), LibraryError::CurrentlyUnavailable{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("404".to_string()), false), LibraryError::NotFound{ message: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("500".to_string()), false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_wrap_persistence_error_with_context() {
        let err = LibraryError::database("boom", None, false).with_context("persist loan l1");
        assert!(err.to_string().starts_with("persist loan l1: boom"));
        let err = LibraryError::already_returned("l1").with_context("ignored");
        assert!(matches!(err, LibraryError::AlreadyReturned{ .. }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert_eq!(false, LibraryError::database("test", None, false).retryable());
        assert_eq!(false, LibraryError::conflict("test").retryable());
        assert_eq!(false, LibraryError::not_found("test").retryable());
        assert_eq!(false, LibraryError::unavailable("test", None, false).retryable());
        assert_eq!(true, LibraryError::unavailable("test", None, true).retryable());
        assert_eq!(false, LibraryError::already_returned("test").retryable());
        assert_eq!(false, LibraryError::invalid_state("test").retryable());
        assert_eq!(false, LibraryError::validation("test", None).retryable());
        assert_eq!(false, LibraryError::serialization("test").retryable());
        assert_eq!(false, LibraryError::runtime("test", None).retryable());
    }

    #[tokio::test]
    async fn test_should_format_copy_state() {
        let states = vec![
            CopyState::Available,
            CopyState::Loaned,
            CopyState::Damaged,
            CopyState::Lost,
        ];
        for state in states {
            let str = state.to_string();
            let parsed = CopyState::try_from(str.as_str()).expect("should parse state");
            assert_eq!(state, parsed);
        }
    }

    #[tokio::test]
    async fn test_should_reject_unknown_copy_state() {
        assert!(matches!(CopyState::try_from("Borrowed"), Err(LibraryError::InvalidState{ .. })));
        assert!(matches!(CopyState::try_from("available"), Err(LibraryError::InvalidState{ .. })));
    }

    #[tokio::test]
    async fn test_should_default_blank_condition_to_available() {
        assert_eq!(CopyState::Available, CopyState::from_condition(None).expect("none"));
        assert_eq!(CopyState::Available, CopyState::from_condition(Some("")).expect("empty"));
        assert_eq!(CopyState::Available, CopyState::from_condition(Some("   ")).expect("blank"));
        assert_eq!(CopyState::Damaged, CopyState::from_condition(Some("Damaged")).expect("damaged"));
        assert!(CopyState::from_condition(Some("Torn")).is_err());
    }

    #[tokio::test]
    async fn test_should_format_notification_kind() {
        for kind in vec![NotificationKind::DueSoon, NotificationKind::Overdue] {
            assert_eq!(kind, NotificationKind::from(kind.to_string()));
        }
        assert!(NotificationKind::DueSoon.message(2).contains("2 days"));
    }

    #[tokio::test]
    async fn test_should_format_ineligible_reason() {
        assert_eq!("not active", IneligibleReason::NotActive.to_string());
        assert_eq!("sanctioned", IneligibleReason::Sanctioned.to_string());
        assert_eq!("has overdue items", IneligibleReason::HasOverdue.to_string());
        assert_eq!("at loan limit", IneligibleReason::AtLoanLimit.to_string());
        assert_eq!("at-cap", IneligibleReason::AtLoanLimit.code());
    }
}
