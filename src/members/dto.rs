use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::members::domain::model::ACTIVE_STATUS;
use crate::members::Member;
use crate::utils::date::serializer;

// MemberDto abstracts a library member as seen by the lending services.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct MemberDto {
    pub member_id: String,
    pub version: i64,
    pub external_id: String,
    pub full_name: String,
    pub email: String,
    pub category: String,
    pub status: String,
    pub sanctioned: bool,
    pub has_overdue: bool,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl MemberDto {
    pub(crate) fn new(external_id: &str, category: &str) -> Self {
        Self {
            member_id: Uuid::new_v4().to_string(),
            version: 0,
            external_id: external_id.to_string(),
            full_name: "".to_string(),
            email: "".to_string(),
            category: category.to_string(),
            status: ACTIVE_STATUS.to_string(),
            sanctioned: false,
            has_overdue: false,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for MemberDto {
    fn id(&self) -> String {
        self.member_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Member for MemberDto {
    fn external_id(&self) -> &str {
        self.external_id.as_str()
    }

    fn category(&self) -> &str {
        self.category.as_str()
    }

    fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ACTIVE_STATUS)
    }

    fn is_sanctioned(&self) -> bool {
        self.sanctioned
    }

    fn has_overdue(&self) -> bool {
        self.has_overdue
    }
}
