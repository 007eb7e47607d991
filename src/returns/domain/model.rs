use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::{CopyState, LibraryResult};
use crate::loans::domain::model::LoanEntity;
use crate::utils::date::serializer;
use crate::utils::mem::MemRecord;

// ReturnEntity settles exactly one loan. The fine is fixed when the return is registered,
// afterwards only the recorded condition and the notes may be corrected.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct ReturnEntity {
    pub return_id: String,
    pub version: i64,
    pub loan_id: String,
    pub member_id: String,
    pub copy_id: String,
    pub returned_on: NaiveDate,
    pub condition: CopyState,
    pub notes: String,
    pub fine: Decimal,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl ReturnEntity {
    pub fn new(loan: &LoanEntity, returned_on: NaiveDate, condition: CopyState, notes: &str) -> LibraryResult<Self> {
        Ok(Self {
            return_id: Uuid::new_v4().to_string(),
            version: 0,
            loan_id: loan.loan_id.to_string(),
            member_id: loan.member_id.to_string(),
            copy_id: loan.copy_id.to_string(),
            returned_on,
            condition,
            notes: notes.trim().to_string(),
            fine: loan.policy.fine_for(loan.due_date, returned_on)?,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        })
    }

    // notes are kept unless new ones are given
    pub fn correct(&mut self, condition: CopyState, notes: Option<&str>) {
        self.condition = condition;
        if let Some(notes) = notes {
            self.notes = notes.trim().to_string();
        }
        self.updated_at = Utc::now().naive_utc();
    }

    pub fn is_fined(&self) -> bool {
        self.fine > Decimal::ZERO
    }
}

impl Identifiable for ReturnEntity {
    fn id(&self) -> String {
        self.return_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemRecord for ReturnEntity {
    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
