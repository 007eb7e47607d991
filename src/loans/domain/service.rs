use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{error, info, warn};
use crate::copies::repository::CopyRepository;
use crate::core::domain::{Clock, Configuration};
use crate::core::events::DomainEvent;
use crate::core::library::{CopyState, LibraryError, LibraryResult, PaginatedResult};
use crate::gateway::events::EventPublisher;
use crate::loans::domain::LoanService;
use crate::loans::domain::model::LoanEntity;
use crate::loans::dto::LoanDto;
use crate::loans::repository::LoanRepository;
use crate::members::domain::eligibility::check_eligibility;
use crate::members::domain::MemberService;
use crate::policies::domain::PolicyService;

pub(crate) struct LoanServiceImpl {
    branch_id: String,
    clock: Box<dyn Clock>,
    loan_repository: Box<dyn LoanRepository>,
    copy_repository: Box<dyn CopyRepository>,
    member_service: Box<dyn MemberService>,
    policy_service: Box<dyn PolicyService>,
    events_publisher: Box<dyn EventPublisher>,
}

impl LoanServiceImpl {
    pub(crate) fn new(config: &Configuration, clock: Box<dyn Clock>,
                      loan_repository: Box<dyn LoanRepository>, copy_repository: Box<dyn CopyRepository>,
                      member_service: Box<dyn MemberService>, policy_service: Box<dyn PolicyService>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            clock,
            loan_repository,
            copy_repository,
            member_service,
            policy_service,
            events_publisher,
        }
    }

    // flips the copy back after the loan could not be stored
    async fn release_copy(&self, loan: &LoanEntity) {
        match self.copy_repository.compare_and_set_state(
            loan.copy_id.as_str(), CopyState::Loaned, CopyState::Available).await {
            Ok(true) => {
                warn!(copy = loan.copy_code.as_str(), loan = loan.loan_id.as_str(), "released copy after failed loan");
            }
            Ok(false) => {
                error!(copy = loan.copy_code.as_str(), loan = loan.loan_id.as_str(), "copy changed state before it could be released");
            }
            Err(err) => {
                error!(copy = loan.copy_code.as_str(), loan = loan.loan_id.as_str(), "failed to release copy: {}", err);
            }
        }
    }

    async fn publish_created(&self, loan: &LoanDto) {
        let metadata = HashMap::from([
            ("member_id".to_string(), loan.member_id.to_string()),
            ("copy_code".to_string(), loan.copy_code.to_string()),
        ]);
        let published = match DomainEvent::loan_created(loan.loan_id.as_str(), &metadata, loan) {
            Ok(event) => self.events_publisher.publish(&event).await,
            Err(err) => Err(LibraryError::from(err)),
        };
        if let Err(err) = published {
            warn!(loan = loan.loan_id.as_str(), "failed to publish loan_created: {}", err);
        }
    }
}

#[async_trait]
impl LoanService for LoanServiceImpl {
    async fn create_loan(&self, member_external_id: &str, copy_code: &str) -> LibraryResult<LoanDto> {
        let member = self.member_service.find_member_by_external_id(member_external_id).await?;
        let copy = self.copy_repository.find_by_code(copy_code).await?;
        let policy = self.policy_service.resolve_policy(member.category.as_str()).await?;
        let active_loans = self.member_service.count_active_loans(member.member_id.as_str()).await?;
        check_eligibility(&member, active_loans, &policy)?;

        if !copy.is_available() {
            return Err(LibraryError::copy_unavailable(copy_code, copy.state()));
        }
        let open = self.loan_repository.find_active_by_member(member.member_id.as_str()).await
            .map_err(|err| err.with_context("checking open loans"))?;
        if open.iter().any(|l| l.copy_code == copy_code) {
            return Err(LibraryError::validation(
                format!("member {} already holds an open loan of copy {}", member_external_id, copy_code).as_str(),
                Some("duplicate-loan".to_string())));
        }

        let today = self.clock.today();
        let loan = LoanEntity::new(self.branch_id.as_str(), &member, &copy, policy, today)?;
        if !self.copy_repository.compare_and_set_state(
            copy.copy_id.as_str(), CopyState::Available, CopyState::Loaned).await
            .map_err(|err| err.with_context(format!("reserving copy {}", copy_code).as_str()))? {
            let current = self.copy_repository.get(copy.copy_id.as_str()).await
                .map_err(|err| err.with_context(format!("reading copy {} after losing its reservation", copy_code).as_str()))?;
            return Err(LibraryError::copy_unavailable(copy_code, current.state()));
        }

        if let Err(err) = self.loan_repository.create(&loan).await {
            self.release_copy(&loan).await;
            return Err(err.with_context(format!("persisting loan of copy {}", copy_code).as_str()));
        }

        info!(loan = loan.loan_id.as_str(), member = member_external_id, copy = copy_code,
            due_date = %loan.due_date, "created loan");
        let dto = LoanDto::from_entity(&loan, today);
        self.publish_created(&dto).await;
        Ok(dto)
    }

    async fn find_loan(&self, loan_id: &str) -> LibraryResult<LoanDto> {
        let loan = self.loan_repository.get(loan_id).await?;
        Ok(LoanDto::from_entity(&loan, self.clock.today()))
    }

    async fn member_loans(&self, member_external_id: &str) -> LibraryResult<Vec<LoanDto>> {
        let member = self.member_service.find_member_by_external_id(member_external_id).await?;
        let today = self.clock.today();
        let loans = self.loan_repository.find_by_member(member.member_id.as_str()).await?;
        Ok(loans.iter().map(|l| LoanDto::from_entity(l, today)).collect())
    }

    async fn query_overdue(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>> {
        let today = self.clock.today();
        let predicate = HashMap::from([
            ("returned".to_string(), "false".to_string()),
            ("due_date:<".to_string(), today.to_string()),
        ]);
        let res = self.loan_repository.query(&predicate, page, page_size).await?;
        let records = res.records.iter().map(|l| LoanDto::from_entity(l, today)).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}
