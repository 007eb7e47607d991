use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::notifications::domain::model::NotificationEntity;
use crate::notifications::repository::NotificationRepository;
use crate::utils::mem::MemTable;

#[derive(Debug, Clone)]
pub(crate) struct MemNotificationRepository {
    table: Arc<MemTable<NotificationEntity>>,
}

impl MemNotificationRepository {
    pub(crate) fn new(table: Arc<MemTable<NotificationEntity>>) -> Self {
        Self {
            table,
        }
    }
}

#[async_trait]
impl Repository<NotificationEntity> for MemNotificationRepository {
    async fn create(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        self.table.create(entity)
    }

    async fn update(&self, entity: &NotificationEntity) -> LibraryResult<usize> {
        self.table.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<NotificationEntity> {
        self.table.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.table.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<NotificationEntity>> {
        self.table.query(predicate, page, page_size)
    }
}

#[async_trait]
impl NotificationRepository for MemNotificationRepository {
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Vec<NotificationEntity>> {
        self.table.find(|n| n.loan_id == loan_id)
    }

    async fn find_unsent(&self) -> LibraryResult<Vec<NotificationEntity>> {
        let mut unsent = self.table.find(|n| !n.sent)?;
        unsent.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(unsent)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::NotificationKind;
    use crate::core::repository::Repository;
    use crate::notifications::domain::model::NotificationEntity;
    use crate::notifications::repository::NotificationRepository;
    use crate::utils::fixtures::Fixture;

    #[tokio::test]
    async fn test_should_find_by_loan_and_unsent() {
        let fixture = Fixture::on(2024, 1, 13);
        let repo = fixture.notification_repository();
        let loan = fixture.loan_for("m1", "C-1");
        let mut sent = NotificationEntity::new(&loan, NotificationKind::DueSoon, "soon");
        sent.mark_sent();
        repo.create(&sent).await.expect("should create notification");
        repo.create(&NotificationEntity::new(&loan, NotificationKind::Overdue, "late")).await.expect("should create notification");

        assert_eq!(2, repo.find_by_loan(loan.loan_id.as_str()).await.expect("should find").len());
        assert!(repo.find_by_loan("other").await.expect("should find").is_empty());
        let unsent = repo.find_unsent().await.expect("should find unsent");
        assert_eq!(1, unsent.len());
        assert_eq!(NotificationKind::Overdue, unsent[0].kind);
    }
}
