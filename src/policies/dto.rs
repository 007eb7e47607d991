use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// PolicyDto is the lending policy as seen by callers of the policy service.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PolicyDto {
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

impl PolicyDto {
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
}

impl Identifiable for PolicyDto {
    fn id(&self) -> String {
        self.policy_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
