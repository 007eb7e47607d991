use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::NotificationKind;
use crate::utils::date::serializer;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct NotificationDto {
    pub notification_id: String,
    pub version: i64,
    pub member_id: String,
    pub copy_id: String,
    pub loan_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub sent: bool,
    pub read: bool,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl Identifiable for NotificationDto {
    fn id(&self) -> String {
        self.notification_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
