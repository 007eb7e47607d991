use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::CopyState;
use crate::utils::date::serializer;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct ReturnDto {
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

impl Identifiable for ReturnDto {
    fn id(&self) -> String {
        self.return_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
