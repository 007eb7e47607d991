use chrono::{Days, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::{Configuration, Identifiable, MAX_LOAN_DAYS};
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::date::serializer;
use crate::utils::mem::MemRecord;

pub(crate) const FALLBACK_POLICY_ID: &str = "fallback";

// PolicyEntity abstracts the lending rules of a member category.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PolicyEntity {
    pub policy_id: String,
    pub version: i64,
    pub category: String,
    pub loan_days: i64,
    pub max_concurrent_loans: i64,
    pub fine_per_day: Decimal,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PolicyEntity {
    pub fn new(category: &str, loan_days: i64, max_concurrent_loans: i64, fine_per_day: Decimal) -> Self {
        Self {
            policy_id: Uuid::new_v4().to_string(),
            version: 0,
            category: category.to_string(),
            loan_days,
            max_concurrent_loans,
            fine_per_day,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn validate(&self) -> LibraryResult<()> {
        self.snapshot().validate()
    }

    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            policy_id: self.policy_id.to_string(),
            category: self.category.to_string(),
            loan_days: self.loan_days,
            max_concurrent_loans: self.max_concurrent_loans,
            fine_per_day: self.fine_per_day,
        }
    }

    pub fn due_date(&self, loan_date: NaiveDate) -> LibraryResult<NaiveDate> {
        self.snapshot().due_date(loan_date)
    }

    pub fn is_within_concurrency_cap(&self, active_loans: i64) -> bool {
        self.snapshot().is_within_concurrency_cap(active_loans)
    }
}

impl Identifiable for PolicyEntity {
    fn id(&self) -> String {
        self.policy_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemRecord for PolicyEntity {
    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

// PolicySnapshot is the copy of the policy values a loan keeps from the day it was created,
// later edits of the policy never reach existing loans.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PolicySnapshot {
    pub policy_id: String,
    pub category: String,
    pub loan_days: i64,
    pub max_concurrent_loans: i64,
    pub fine_per_day: Decimal,
}

impl PolicySnapshot {
    // the documented degraded-mode policy for categories without a configured policy
    pub fn fallback(config: &Configuration, category: &str) -> Self {
        Self {
            policy_id: FALLBACK_POLICY_ID.to_string(),
            category: category.to_string(),
            loan_days: config.default_loan_days,
            max_concurrent_loans: config.default_max_loans,
            fine_per_day: config.default_fine_per_day,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.policy_id == FALLBACK_POLICY_ID
    }

    pub fn validate(&self) -> LibraryResult<()> {
        if self.loan_days < 1 || self.loan_days > MAX_LOAN_DAYS {
            return Err(LibraryError::validation(
                format!("loan days must be between 1 and {} but was {}", MAX_LOAN_DAYS, self.loan_days).as_str(),
                Some("invalid-loan-days".to_string())));
        }
        if self.max_concurrent_loans < 1 {
            return Err(LibraryError::validation(
                format!("max concurrent loans must be at least 1 but was {}", self.max_concurrent_loans).as_str(),
                Some("invalid-max-loans".to_string())));
        }
        if self.fine_per_day.is_sign_negative() {
            return Err(LibraryError::validation(
                format!("fine per day must not be negative but was {}", self.fine_per_day).as_str(),
                Some("invalid-fine".to_string())));
        }
        Ok(())
    }

    pub fn due_date(&self, loan_date: NaiveDate) -> LibraryResult<NaiveDate> {
        u64::try_from(self.loan_days).ok()
            .and_then(|days| loan_date.checked_add_days(Days::new(days)))
            .ok_or_else(|| LibraryError::validation(
                format!("loan of {} days from {} has no valid due date", self.loan_days, loan_date).as_str(),
                Some("invalid-loan-days".to_string())))
    }

    // strict: a member holding exactly the cap may not take another loan
    pub fn is_within_concurrency_cap(&self, active_loans: i64) -> bool {
        active_loans < self.max_concurrent_loans
    }

    pub fn fine_for(&self, due_date: NaiveDate, returned_on: NaiveDate) -> LibraryResult<Decimal> {
        let days_late = (returned_on - due_date).num_days().max(0);
        Decimal::from(days_late).checked_mul(self.fine_per_day).ok_or_else(|| LibraryError::validation(
            format!("fine of {} per day over {} days is out of range", self.fine_per_day, days_late).as_str(),
            Some("invalid-fine".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use crate::core::domain::{Configuration, MAX_LOAN_DAYS};
    use crate::core::library::LibraryError;
    use crate::policies::domain::model::{PolicyEntity, PolicySnapshot};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_should_compute_due_date() {
        let policy = PolicyEntity::new("Standard", 14, 3, dec!(50));
        assert_eq!(day(2024, 1, 15), policy.due_date(day(2024, 1, 1)).expect("should compute due date"));
        for loan_days in 1..40 {
            let policy = PolicyEntity::new("Standard", loan_days, 3, dec!(50));
            let loan_date = day(2024, 2, 20);
            let due = policy.due_date(loan_date).expect("should compute due date");
            assert!(due >= loan_date);
            assert_eq!(loan_days, (due - loan_date).num_days());
        }
    }

    #[tokio::test]
    async fn test_should_check_concurrency_cap_strictly() {
        let policy = PolicyEntity::new("Standard", 14, 3, dec!(50));
        assert!(policy.is_within_concurrency_cap(2));
        assert!(!policy.is_within_concurrency_cap(3));
        assert!(!policy.is_within_concurrency_cap(4));
    }

    #[tokio::test]
    async fn test_should_compute_fine() {
        let snapshot = PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot();
        let due = day(2024, 1, 15);
        assert_eq!(dec!(250), snapshot.fine_for(due, day(2024, 1, 20)).expect("should compute fine"));
        assert_eq!(dec!(0), snapshot.fine_for(due, day(2024, 1, 10)).expect("should compute fine"));
        assert_eq!(dec!(0), snapshot.fine_for(due, due).expect("should compute fine"));
        assert_eq!(dec!(50), snapshot.fine_for(due, day(2024, 1, 16)).expect("should compute fine"));
    }

    #[tokio::test]
    async fn test_should_reject_out_of_range_arithmetic() {
        let mut snapshot = PolicyEntity::new("Huge", 14, 3, Decimal::MAX).snapshot();
        let res = snapshot.fine_for(day(2024, 1, 15), day(2024, 1, 20));
        assert!(matches!(res, Err(LibraryError::Validation{ .. })));
        snapshot.loan_days = 1_000_000_000_000;
        assert!(matches!(snapshot.due_date(day(2024, 1, 1)), Err(LibraryError::Validation{ .. })));
        snapshot.loan_days = -5;
        assert!(matches!(snapshot.due_date(day(2024, 1, 1)), Err(LibraryError::Validation{ .. })));
    }

    #[tokio::test]
    async fn test_should_validate_policy() {
        assert!(PolicyEntity::new("Standard", 14, 3, dec!(0)).validate().is_ok());
        assert!(matches!(PolicyEntity::new("Standard", 0, 3, dec!(50)).validate(), Err(LibraryError::Validation{ .. })));
        assert!(PolicyEntity::new("Standard", MAX_LOAN_DAYS, 3, dec!(50)).validate().is_ok());
        assert!(matches!(PolicyEntity::new("Huge", 1_000_000_000_000, 3, dec!(1)).validate(), Err(LibraryError::Validation{ .. })));
        assert!(matches!(PolicyEntity::new("Standard", 14, 0, dec!(50)).validate(), Err(LibraryError::Validation{ .. })));
        assert!(matches!(PolicyEntity::new("Standard", 14, 3, dec!(-1)).validate(), Err(LibraryError::Validation{ .. })));
    }

    #[tokio::test]
    async fn test_should_build_fallback() {
        let snapshot = PolicySnapshot::fallback(&Configuration::new("test"), "Visitor");
        assert!(snapshot.is_fallback());
        assert_eq!(15, snapshot.loan_days);
        assert_eq!(3, snapshot.max_concurrent_loans);
        assert_eq!(dec!(50), snapshot.fine_per_day);
        assert_eq!("Visitor", snapshot.category.as_str());
    }
}
