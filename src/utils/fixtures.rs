use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::copies::domain::model::CopyEntity;
use crate::copies::repository::CopyRepository;
use crate::copies::repository::mem_copy_repository::MemCopyRepository;
use crate::core::domain::{Configuration, FixedClock};
use crate::core::library::{CopyState, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::gateway::logs::publisher::LogPublisher;
use crate::loans::domain::model::LoanEntity;
use crate::loans::domain::LoanService;
use crate::loans::domain::service::LoanServiceImpl;
use crate::loans::repository::LoanRepository;
use crate::loans::repository::mem_loan_repository::MemLoanRepository;
use crate::members::domain::model::MemberEntity;
use crate::members::domain::MemberService;
use crate::members::domain::service::MemberServiceImpl;
use crate::members::dto::MemberDto;
use crate::members::repository::mem_member_repository::MemMemberRepository;
use crate::notifications::domain::model::NotificationEntity;
use crate::notifications::domain::NotificationService;
use crate::notifications::domain::service::NotificationServiceImpl;
use crate::notifications::repository::mem_notification_repository::MemNotificationRepository;
use crate::policies::domain::model::PolicyEntity;
use crate::policies::domain::PolicyService;
use crate::policies::domain::service::PolicyServiceImpl;
use crate::policies::repository::mem_policy_repository::MemPolicyRepository;
use crate::returns::domain::model::ReturnEntity;
use crate::returns::domain::ReturnService;
use crate::returns::domain::service::ReturnServiceImpl;
use crate::returns::repository::ReturnRepository;
use crate::returns::repository::mem_return_repository::MemReturnRepository;
use crate::utils::mem::MemTable;

// Fixture wires every service against fresh in-memory tables, a pinned clock and a
// recording publisher. Fixtures derived with `at` share the tables and the publisher.
#[derive(Clone)]
pub(crate) struct Fixture {
    config: Configuration,
    today: NaiveDate,
    copies: Arc<MemTable<CopyEntity>>,
    policies: Arc<MemTable<PolicyEntity>>,
    members: Arc<MemTable<MemberEntity>>,
    loans: Arc<MemTable<LoanEntity>>,
    returns: Arc<MemTable<ReturnEntity>>,
    notifications: Arc<MemTable<NotificationEntity>>,
    publisher: LogPublisher,
}

impl Fixture {
    pub(crate) fn on(y: i32, m: u32, d: u32) -> Self {
        Self {
            config: Configuration::new("test"),
            today: NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date"),
            copies: Arc::new(MemTable::new("copies")),
            policies: Arc::new(MemTable::new("policies")),
            members: Arc::new(MemTable::new("members")),
            loans: Arc::new(MemTable::new("loans")),
            returns: Arc::new(MemTable::new("returns")),
            notifications: Arc::new(MemTable::new("notifications")),
            publisher: LogPublisher::new(),
        }
    }

    pub(crate) fn at(&self, y: i32, m: u32, d: u32) -> Self {
        let mut next = self.clone();
        next.today = NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date");
        next
    }

    pub(crate) fn configured(&self, config: Configuration) -> Self {
        let mut next = self.clone();
        next.config = config;
        next
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    fn clock(&self) -> Box<FixedClock> {
        Box::new(FixedClock::on(self.today))
    }

    pub(crate) fn published(&self) -> Vec<(String, String)> {
        self.publisher.published()
    }

    pub(crate) fn copy_repository(&self) -> MemCopyRepository {
        MemCopyRepository::new(self.copies.clone())
    }

    pub(crate) fn policy_repository(&self) -> MemPolicyRepository {
        MemPolicyRepository::new(self.policies.clone())
    }

    pub(crate) fn member_repository(&self) -> MemMemberRepository {
        MemMemberRepository::new(self.members.clone())
    }

    pub(crate) fn loan_repository(&self) -> MemLoanRepository {
        MemLoanRepository::new(self.loans.clone())
    }

    pub(crate) fn return_repository(&self) -> MemReturnRepository {
        MemReturnRepository::new(self.returns.clone())
    }

    pub(crate) fn notification_repository(&self) -> MemNotificationRepository {
        MemNotificationRepository::new(self.notifications.clone())
    }

    pub(crate) async fn add_policy(&self, category: &str, loan_days: i64, max_loans: i64, fine_per_day: Decimal) -> PolicyEntity {
        let policy = PolicyEntity::new(category, loan_days, max_loans, fine_per_day);
        self.policy_repository().create(&policy).await.expect("should add policy");
        policy
    }

    pub(crate) async fn add_member(&self, external_id: &str, category: &str) -> MemberEntity {
        let member = MemberEntity::new(external_id, category);
        self.member_repository().create(&member).await.expect("should add member");
        member
    }

    pub(crate) async fn add_copy(&self, code: &str) -> CopyEntity {
        let copy = CopyEntity::new(code, "book1", "Shelf A");
        self.copy_repository().create(&copy).await.expect("should add copy");
        copy
    }

    // an unsaved 14 day Standard loan taken today
    pub(crate) fn loan_for(&self, member_id: &str, code: &str) -> LoanEntity {
        let mut member = MemberDto::new(member_id, "Standard");
        member.member_id = member_id.to_string();
        let copy = CopyEntity::new(code, "book1", "Shelf A");
        let policy = PolicyEntity::new("Standard", 14, 3, dec!(50)).snapshot();
        LoanEntity::new(self.config.branch_id.as_str(), &member, &copy, policy, self.today)
            .expect("should build loan")
    }

    pub(crate) fn policy_service(&self) -> Box<dyn PolicyService> {
        Box::new(PolicyServiceImpl::new(&self.config, Box::new(self.policy_repository())))
    }

    pub(crate) fn member_service(&self) -> Box<dyn MemberService> {
        Box::new(MemberServiceImpl::new(&self.config, Box::new(self.member_repository()),
                                        Box::new(self.loan_repository())))
    }

    fn build_loan_service(&self, loan_repository: Box<dyn LoanRepository>,
                          copy_repository: Box<dyn CopyRepository>) -> Box<dyn LoanService> {
        Box::new(LoanServiceImpl::new(&self.config, self.clock(), loan_repository,
                                      copy_repository, self.member_service(),
                                      self.policy_service(), Box::new(self.publisher.clone())))
    }

    pub(crate) fn loan_service(&self) -> Box<dyn LoanService> {
        self.build_loan_service(Box::new(self.loan_repository()), Box::new(self.copy_repository()))
    }

    pub(crate) fn loan_service_with_failing_loans(&self) -> Box<dyn LoanService> {
        self.build_loan_service(Box::new(FailingLoanRepository { inner: self.loan_repository() }),
                                Box::new(self.copy_repository()))
    }

    // another branch reserves every copy first, `readable` decides whether the copy can be read back
    pub(crate) fn loan_service_with_contended_copies(&self, readable: bool) -> Box<dyn LoanService> {
        self.build_loan_service(Box::new(self.loan_repository()),
                                Box::new(ContendedCopyRepository { inner: self.copy_repository(), readable }))
    }

    fn build_return_service(&self, copy_repository: Box<dyn CopyRepository>,
                            return_repository: Box<dyn ReturnRepository>) -> Box<dyn ReturnService> {
        Box::new(ReturnServiceImpl::new(&self.config, self.clock(), Box::new(self.loan_repository()),
                                        copy_repository, return_repository, Box::new(self.publisher.clone())))
    }

    pub(crate) fn return_service(&self) -> Box<dyn ReturnService> {
        self.build_return_service(Box::new(self.copy_repository()), Box::new(self.return_repository()))
    }

    pub(crate) fn return_service_with_failing_copies(&self) -> Box<dyn ReturnService> {
        self.build_return_service(Box::new(FailingCopyRepository { inner: self.copy_repository() }),
                                  Box::new(self.return_repository()))
    }

    pub(crate) fn return_service_with_failing_returns(&self) -> Box<dyn ReturnService> {
        self.build_return_service(Box::new(self.copy_repository()),
                                  Box::new(FailingReturnRepository { inner: self.return_repository() }))
    }

    pub(crate) fn notification_service(&self) -> Box<dyn NotificationService> {
        Box::new(NotificationServiceImpl::new(&self.config, self.clock(), Box::new(self.loan_repository()),
                                              Box::new(self.copy_repository()), self.member_service(),
                                              Box::new(self.notification_repository()),
                                              Box::new(self.publisher.clone())))
    }
}

fn write_failure(table: &str) -> LibraryError {
    LibraryError::database(format!("{} table rejected the write", table).as_str(), None, false)
}

// loan table whose inserts always fail
struct FailingLoanRepository {
    inner: MemLoanRepository,
}

#[async_trait]
impl Repository<LoanEntity> for FailingLoanRepository {
    async fn create(&self, _entity: &LoanEntity) -> LibraryResult<usize> {
        Err(write_failure("loans"))
    }

    async fn update(&self, entity: &LoanEntity) -> LibraryResult<usize> {
        self.inner.update(entity).await
    }

    async fn get(&self, id: &str) -> LibraryResult<LoanEntity> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.inner.delete(id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanEntity>> {
        self.inner.query(predicate, page, page_size).await
    }
}

#[async_trait]
impl LoanRepository for FailingLoanRepository {
    async fn find_by_member(&self, member_id: &str) -> LibraryResult<Vec<LoanEntity>> {
        self.inner.find_by_member(member_id).await
    }
}

// copy table whose versioned updates always fail
struct FailingCopyRepository {
    inner: MemCopyRepository,
}

#[async_trait]
impl Repository<CopyEntity> for FailingCopyRepository {
    async fn create(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        self.inner.create(entity).await
    }

    async fn update(&self, _entity: &CopyEntity) -> LibraryResult<usize> {
        Err(write_failure("copies"))
    }

    async fn get(&self, id: &str) -> LibraryResult<CopyEntity> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.inner.delete(id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CopyEntity>> {
        self.inner.query(predicate, page, page_size).await
    }
}

#[async_trait]
impl CopyRepository for FailingCopyRepository {
    async fn find_by_code(&self, code: &str) -> LibraryResult<CopyEntity> {
        self.inner.find_by_code(code).await
    }

    async fn compare_and_set_state(&self, _copy_id: &str, _expected: CopyState,
                                   _new_state: CopyState) -> LibraryResult<bool> {
        Err(write_failure("copies"))
    }
}

// copy table that loses every reservation to a concurrent writer
struct ContendedCopyRepository {
    inner: MemCopyRepository,
    readable: bool,
}

#[async_trait]
impl Repository<CopyEntity> for ContendedCopyRepository {
    async fn create(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        self.inner.create(entity).await
    }

    async fn update(&self, entity: &CopyEntity) -> LibraryResult<usize> {
        self.inner.update(entity).await
    }

    async fn get(&self, id: &str) -> LibraryResult<CopyEntity> {
        if self.readable {
            self.inner.get(id).await
        } else {
            Err(LibraryError::database("copies table read timed out", None, true))
        }
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.inner.delete(id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CopyEntity>> {
        self.inner.query(predicate, page, page_size).await
    }
}

#[async_trait]
impl CopyRepository for ContendedCopyRepository {
    async fn find_by_code(&self, code: &str) -> LibraryResult<CopyEntity> {
        self.inner.find_by_code(code).await
    }

    async fn compare_and_set_state(&self, copy_id: &str, expected: CopyState,
                                   new_state: CopyState) -> LibraryResult<bool> {
        self.inner.compare_and_set_state(copy_id, expected, new_state).await?;
        Ok(false)
    }
}

// return table whose inserts always fail
struct FailingReturnRepository {
    inner: MemReturnRepository,
}

#[async_trait]
impl Repository<ReturnEntity> for FailingReturnRepository {
    async fn create(&self, _entity: &ReturnEntity) -> LibraryResult<usize> {
        Err(write_failure("returns"))
    }

    async fn update(&self, entity: &ReturnEntity) -> LibraryResult<usize> {
        self.inner.update(entity).await
    }

    async fn get(&self, id: &str) -> LibraryResult<ReturnEntity> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.inner.delete(id).await
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<ReturnEntity>> {
        self.inner.query(predicate, page, page_size).await
    }
}

#[async_trait]
impl ReturnRepository for FailingReturnRepository {
    async fn find_by_loan(&self, loan_id: &str) -> LibraryResult<Option<ReturnEntity>> {
        self.inner.find_by_loan(loan_id).await
    }
}
