use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::copies::domain::model::CopyEntity;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryResult, LoanStatus};
use crate::members::Member;
use crate::policies::domain::model::PolicySnapshot;
use crate::utils::date::{opt_serializer, serializer};
use crate::utils::mem::MemRecord;

// LoanEntity binds a member to a copy for a bounded period. Only the returned flag is
// stored; Active and Overdue are derived from the due date whenever the status is read.
// Identity is the loan id, two loans of the same copy to the same member are distinct.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct LoanEntity {
    pub loan_id: String,
    pub version: i64,
    pub branch_id: String,
    pub member_id: String,
    pub copy_id: String,
    pub copy_code: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
    #[serde(default, with = "opt_serializer")]
    pub returned_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub policy: PolicySnapshot,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl LoanEntity {
    pub fn new(branch_id: &str, member: &dyn Member, copy: &CopyEntity,
               policy: PolicySnapshot, loan_date: NaiveDate) -> LibraryResult<Self> {
        Ok(Self {
            loan_id: Uuid::new_v4().to_string(),
            version: 0,
            branch_id: branch_id.to_string(),
            member_id: member.id(),
            copy_id: copy.copy_id.to_string(),
            copy_code: copy.code.to_string(),
            loan_date,
            due_date: policy.due_date(loan_date)?,
            returned: false,
            returned_at: None,
            policy,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        })
    }

    // Returned is absorbing, the dates are only consulted while the loan is open
    pub fn status(&self, today: NaiveDate) -> LoanStatus {
        if self.returned {
            LoanStatus::Returned
        } else if today > self.due_date {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    pub fn is_open(&self) -> bool {
        !self.returned
    }

    pub fn mark_returned(&mut self, at: NaiveDateTime) {
        self.returned = true;
        self.returned_at = Some(at);
        self.updated_at = at;
    }

    pub fn reopen(&mut self) {
        self.returned = false;
        self.returned_at = None;
    }

    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

impl Identifiable for LoanEntity {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemRecord for LoanEntity {
    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
