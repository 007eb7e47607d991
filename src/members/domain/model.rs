use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;
use crate::utils::mem::MemRecord;

pub(crate) const ACTIVE_STATUS: &str = "Active";

// MemberEntity is the subset of a library member that the lending rules read. The member
// record is owned by the registration workflow, so status is kept as the stored string.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct MemberEntity {
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

impl MemberEntity {
    pub fn new(external_id: &str, category: &str) -> Self {
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

impl Identifiable for MemberEntity {
    fn id(&self) -> String {
        self.member_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemRecord for MemberEntity {
    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
