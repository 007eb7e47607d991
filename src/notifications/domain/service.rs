use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use crate::copies::repository::CopyRepository;
use crate::core::domain::{Clock, Configuration};
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryResult, LoanStatus, NotificationKind};
use crate::gateway::events::EventPublisher;
use crate::loans::domain::model::LoanEntity;
use crate::loans::repository::LoanRepository;
use crate::members::domain::MemberService;
use crate::notifications::domain::model::{dedup_key, NotificationEntity};
use crate::notifications::domain::NotificationService;
use crate::notifications::dto::NotificationDto;
use crate::notifications::repository::NotificationRepository;

pub(crate) struct NotificationServiceImpl {
    due_soon_days: i64,
    page_size: usize,
    clock: Box<dyn Clock>,
    loan_repository: Box<dyn LoanRepository>,
    copy_repository: Box<dyn CopyRepository>,
    member_service: Box<dyn MemberService>,
    notification_repository: Box<dyn NotificationRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl NotificationServiceImpl {
    pub(crate) fn new(config: &Configuration, clock: Box<dyn Clock>,
                      loan_repository: Box<dyn LoanRepository>, copy_repository: Box<dyn CopyRepository>,
                      member_service: Box<dyn MemberService>,
                      notification_repository: Box<dyn NotificationRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            due_soon_days: config.due_soon_days,
            page_size: config.page_size,
            clock,
            loan_repository,
            copy_repository,
            member_service,
            notification_repository,
            events_publisher,
        }
    }

    fn candidate_kind(&self, loan: &LoanEntity, today: NaiveDate) -> Option<NotificationKind> {
        match loan.status(today) {
            LoanStatus::Active if loan.days_until_due(today) == self.due_soon_days => Some(NotificationKind::DueSoon),
            LoanStatus::Overdue => Some(NotificationKind::Overdue),
            _ => None,
        }
    }

    // loans whose member or copy no longer resolves are left alone
    async fn is_resolvable(&self, loan: &LoanEntity) -> LibraryResult<bool> {
        if let Err(err) = self.member_service.find_member_by_id(loan.member_id.as_str()).await {
            return if err.is_not_found() { Ok(false) } else { Err(err) };
        }
        if let Err(err) = self.copy_repository.get(loan.copy_id.as_str()).await {
            return if err.is_not_found() { Ok(false) } else { Err(err) };
        }
        Ok(true)
    }

    async fn derive_for(&self, loan: &LoanEntity, today: NaiveDate) -> LibraryResult<Option<NotificationEntity>> {
        let kind = match self.candidate_kind(loan, today) {
            Some(kind) => kind,
            None => return Ok(None),
        };
        if !self.is_resolvable(loan).await? {
            debug!(loan = loan.loan_id.as_str(), "skipped loan without member or copy");
            return Ok(None);
        }
        let key = dedup_key(loan.member_id.as_str(), loan.loan_id.as_str(), kind);
        let existing = self.notification_repository.find_by_loan(loan.loan_id.as_str()).await?;
        if existing.iter().any(|n| n.dedup_key == key) {
            debug!(loan = loan.loan_id.as_str(), kind = %kind, "skipped duplicate notification");
            return Ok(None);
        }
        let notification = NotificationEntity::new(loan, kind, kind.message(self.due_soon_days).as_str());
        self.notification_repository.create(&notification).await?;
        info!(loan = loan.loan_id.as_str(), member = loan.member_id.as_str(), kind = %kind, "derived notification");
        Ok(Some(notification))
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn derive_notifications(&self) -> LibraryResult<Vec<NotificationDto>> {
        let today = self.clock.today();
        let mut created = vec![];
        let mut next_page: Option<String> = None;
        loop {
            let res = self.loan_repository.list_all(next_page.as_deref(), self.page_size).await
                .map_err(|err| err.with_context("listing loans for notification sweep"))?;
            for loan in &res.records {
                if let Some(notification) = self.derive_for(loan, today).await
                    .map_err(|err| err.with_context(format!("deriving notification for loan {}", loan.loan_id).as_str()))? {
                    created.push(NotificationDto::from(&notification));
                }
            }
            next_page = res.next_page;
            if next_page.is_none() {
                break;
            }
        }
        info!(derived = created.len(), %today, "finished notification sweep");
        Ok(created)
    }

    async fn dispatch_pending(&self) -> LibraryResult<Vec<NotificationDto>> {
        let pending = self.notification_repository.find_unsent().await?;
        let mut dispatched = vec![];
        for mut notification in pending {
            let metadata = HashMap::from([
                ("member_id".to_string(), notification.member_id.to_string()),
                ("loan_id".to_string(), notification.loan_id.to_string()),
                ("kind".to_string(), notification.kind.to_string()),
            ]);
            let event = DomainEvent::notification_sent(
                notification.notification_id.as_str(), &metadata, &NotificationDto::from(&notification))?;
            if let Err(err) = self.events_publisher.publish(&event).await {
                warn!(notification = notification.notification_id.as_str(), "failed to deliver notification: {}", err);
                continue;
            }
            notification.mark_sent();
            self.notification_repository.update(&notification).await
                .map_err(|err| err.with_context(format!("marking notification {} sent", notification.notification_id).as_str()))?;
            notification.version += 1;
            dispatched.push(NotificationDto::from(&notification));
        }
        info!(dispatched = dispatched.len(), "dispatched notifications");
        Ok(dispatched)
    }

    async fn mark_read(&self, notification_id: &str) -> LibraryResult<NotificationDto> {
        let mut notification = self.notification_repository.get(notification_id).await?;
        notification.mark_read();
        self.notification_repository.update(&notification).await?;
        notification.version += 1;
        Ok(NotificationDto::from(&notification))
    }
}

impl From<&NotificationEntity> for NotificationDto {
    fn from(other: &NotificationEntity) -> Self {
        Self {
            notification_id: other.notification_id.to_string(),
            version: other.version,
            member_id: other.member_id.to_string(),
            copy_id: other.copy_id.to_string(),
            loan_id: other.loan_id.to_string(),
            kind: other.kind,
            message: other.message.to_string(),
            sent: other.sent,
            read: other.read,
            created_at: other.created_at,
        }
    }
}
