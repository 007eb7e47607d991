use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::LoanStatus;
use crate::loans::domain::model::LoanEntity;
use crate::policies::domain::model::PolicySnapshot;
use crate::utils::date::{opt_serializer, serializer};

// LoanDto is a loan together with its status as of the day it was read.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct LoanDto {
    pub loan_id: String,
    pub version: i64,
    pub branch_id: String,
    pub member_id: String,
    pub copy_id: String,
    pub copy_code: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
    pub status: LoanStatus,
    #[serde(default, with = "opt_serializer")]
    pub returned_at: Option<NaiveDateTime>,
    pub policy: PolicySnapshot,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl LoanDto {
    pub fn from_entity(entity: &LoanEntity, today: NaiveDate) -> Self {
        Self {
            loan_id: entity.loan_id.to_string(),
            version: entity.version,
            branch_id: entity.branch_id.to_string(),
            member_id: entity.member_id.to_string(),
            copy_id: entity.copy_id.to_string(),
            copy_code: entity.copy_code.to_string(),
            loan_date: entity.loan_date,
            due_date: entity.due_date,
            returned: entity.returned,
            status: entity.status(today),
            returned_at: entity.returned_at,
            policy: entity.policy.clone(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    // recomputes the derived status, a returned loan stays returned
    pub fn refresh_status(&mut self, today: NaiveDate) {
        self.status = if self.returned {
            LoanStatus::Returned
        } else if today > self.due_date {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        };
    }
}

impl Identifiable for LoanDto {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use crate::copies::domain::model::CopyEntity;
    use crate::core::library::LoanStatus;
    use crate::loans::domain::model::LoanEntity;
    use crate::loans::dto::LoanDto;
    use crate::members::dto::MemberDto;
    use crate::policies::domain::model::PolicyEntity;

    #[tokio::test]
    async fn test_should_refresh_status() {
        let loan_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entity = LoanEntity::new("test", &MemberDto::new("30111222", "Standard"),
                                     &CopyEntity::new("C-1", "book1", "Shelf A"),
                                     PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot(), loan_date)
            .expect("should build loan");
        let mut dto = LoanDto::from_entity(&entity, loan_date);
        assert_eq!(LoanStatus::Active, dto.status);
        dto.refresh_status(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(LoanStatus::Overdue, dto.status);
        dto.returned = true;
        dto.refresh_status(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(LoanStatus::Returned, dto.status);
    }
}
