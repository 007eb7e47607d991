use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::NotificationKind;
use crate::loans::domain::model::LoanEntity;
use crate::utils::date::serializer;
use crate::utils::mem::MemRecord;

// NotificationEntity is a reminder derived from a loan. The dedup key identifies the
// condition it reports, so rephrasing the message never produces a second notification.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct NotificationEntity {
    pub notification_id: String,
    pub version: i64,
    pub member_id: String,
    pub copy_id: String,
    pub loan_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub dedup_key: String,
    pub sent: bool,
    pub read: bool,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

pub(crate) fn dedup_key(member_id: &str, loan_id: &str, kind: NotificationKind) -> String {
    format!("{}:{}:{}", member_id, loan_id, kind)
}

impl NotificationEntity {
    pub fn new(loan: &LoanEntity, kind: NotificationKind, message: &str) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            version: 0,
            member_id: loan.member_id.to_string(),
            copy_id: loan.copy_id.to_string(),
            loan_id: loan.loan_id.to_string(),
            kind,
            message: message.to_string(),
            dedup_key: dedup_key(loan.member_id.as_str(), loan.loan_id.as_str(), kind),
            sent: false,
            read: false,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn mark_sent(&mut self) {
        self.sent = true;
        self.updated_at = Utc::now().naive_utc();
    }

    // a notification that was read was necessarily delivered
    pub fn mark_read(&mut self) {
        self.sent = true;
        self.read = true;
        self.updated_at = Utc::now().naive_utc();
    }
}

impl Identifiable for NotificationEntity {
    fn id(&self) -> String {
        self.notification_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemRecord for NotificationEntity {
    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use crate::copies::domain::model::CopyEntity;
    use crate::core::library::NotificationKind;
    use crate::loans::domain::model::LoanEntity;
    use crate::members::dto::MemberDto;
    use crate::notifications::domain::model::NotificationEntity;
    use crate::policies::domain::model::PolicyEntity;

    #[tokio::test]
    async fn test_should_key_by_member_loan_and_kind() {
        let loan = LoanEntity::new("test", &MemberDto::new("30111222", "Standard"),
                                   &CopyEntity::new("C-1", "book1", "Shelf A"),
                                   PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot(),
                                   NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).expect("should build loan");
        let due_soon = NotificationEntity::new(&loan, NotificationKind::DueSoon, "soon");
        let reworded = NotificationEntity::new(&loan, NotificationKind::DueSoon, "very soon");
        let overdue = NotificationEntity::new(&loan, NotificationKind::Overdue, "late");
        assert_eq!(due_soon.dedup_key, reworded.dedup_key);
        assert_ne!(due_soon.dedup_key, overdue.dedup_key);
        assert!(due_soon.dedup_key.ends_with(":DueSoon"));
    }

    #[tokio::test]
    async fn test_should_mark_read_as_sent() {
        let loan = LoanEntity::new("test", &MemberDto::new("30111222", "Standard"),
                                   &CopyEntity::new("C-1", "book1", "Shelf A"),
                                   PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot(),
                                   NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).expect("should build loan");
        let mut notification = NotificationEntity::new(&loan, NotificationKind::Overdue, "late");
        assert!(!notification.sent);
        notification.mark_read();
        assert!(notification.sent && notification.read);
    }
}
