use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{error, info, warn};
use crate::copies::repository::CopyRepository;
use crate::core::domain::{Clock, Configuration};
use crate::core::events::DomainEvent;
use crate::core::library::{CopyState, LibraryError, LibraryResult, LoanStatus};
use crate::gateway::events::EventPublisher;
use crate::loans::domain::model::LoanEntity;
use crate::loans::repository::LoanRepository;
use crate::returns::domain::model::ReturnEntity;
use crate::returns::domain::ReturnService;
use crate::returns::dto::ReturnDto;
use crate::returns::repository::ReturnRepository;

pub(crate) struct ReturnServiceImpl {
    clock: Box<dyn Clock>,
    loan_repository: Box<dyn LoanRepository>,
    copy_repository: Box<dyn CopyRepository>,
    return_repository: Box<dyn ReturnRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

// a copy can come back in any state except on loan
fn parse_condition(condition: Option<&str>) -> LibraryResult<CopyState> {
    match CopyState::from_condition(condition)? {
        CopyState::Loaned => Err(LibraryError::validation(
            "a returned copy cannot be recorded as Loaned", Some("invalid-condition".to_string()))),
        other => Ok(other),
    }
}

impl ReturnServiceImpl {
    pub(crate) fn new(_config: &Configuration, clock: Box<dyn Clock>,
                      loan_repository: Box<dyn LoanRepository>, copy_repository: Box<dyn CopyRepository>,
                      return_repository: Box<dyn ReturnRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            clock,
            loan_repository,
            copy_repository,
            return_repository,
            events_publisher,
        }
    }

    // flips the loan flag, a concurrent settlement of the same loan surfaces as AlreadyReturned
    async fn close_loan(&self, loan: &mut LoanEntity) -> LibraryResult<()> {
        loan.mark_returned(self.clock.now());
        match self.loan_repository.update(loan).await {
            Ok(_) => {
                loan.version += 1;
                Ok(())
            }
            Err(LibraryError::Conflict { message }) => {
                let current = self.loan_repository.get(loan.loan_id.as_str()).await?;
                if current.returned {
                    Err(LibraryError::already_returned(loan.loan_id.as_str()))
                } else {
                    Err(LibraryError::conflict(message.as_str()).with_context("closing loan"))
                }
            }
            Err(err) => Err(err.with_context(format!("closing loan {}", loan.loan_id).as_str())),
        }
    }

    async fn reopen_loan(&self, loan: &mut LoanEntity) {
        loan.reopen();
        match self.loan_repository.update(loan).await {
            Ok(_) => {
                loan.version += 1;
                warn!(loan = loan.loan_id.as_str(), "reopened loan after failed return");
            }
            Err(err) => {
                error!(loan = loan.loan_id.as_str(), "failed to reopen loan: {}", err);
            }
        }
    }

    async fn discard_return(&self, ret: &ReturnEntity) {
        match self.return_repository.delete(ret.return_id.as_str()).await {
            Ok(_) => {
                warn!(loan = ret.loan_id.as_str(), return_id = ret.return_id.as_str(), "discarded return after failed copy update");
            }
            Err(err) => {
                error!(loan = ret.loan_id.as_str(), return_id = ret.return_id.as_str(), "failed to discard return: {}", err);
            }
        }
    }

    async fn push_condition(&self, copy_id: &str, condition: CopyState) -> LibraryResult<()> {
        let mut copy = self.copy_repository.get(copy_id).await?;
        copy.transition_to(condition);
        self.copy_repository.update(&copy).await?;
        info!(copy = copy.code.as_str(), state = %condition, "updated copy state");
        Ok(())
    }

    // the copy may only follow a corrected condition while this return is its latest settlement
    async fn ensure_latest_return(&self, ret: &ReturnEntity) -> LibraryResult<()> {
        let loans = self.loan_repository.find_by_copy(ret.copy_id.as_str()).await
            .map_err(|err| err.with_context(format!("listing loans of copy {}", ret.copy_id).as_str()))?;
        if loans.iter().any(|l| l.loan_id != ret.loan_id && l.created_at >= ret.created_at) {
            return Err(LibraryError::conflict(
                format!("copy {} was lent again after return {}", ret.copy_id, ret.return_id).as_str()));
        }
        Ok(())
    }

    async fn restore_condition(&self, copy_id: &str, current: CopyState, recorded: CopyState) {
        match self.copy_repository.compare_and_set_state(copy_id, current, recorded).await {
            Ok(true) => {
                warn!(copy = copy_id, state = %recorded, "restored copy state after failed correction");
            }
            Ok(false) => {
                error!(copy = copy_id, "copy changed state before it could be restored");
            }
            Err(err) => {
                error!(copy = copy_id, "failed to restore copy state: {}", err);
            }
        }
    }

    async fn publish(&self, event: serde_json::Result<DomainEvent>, key: &str) {
        let published = match event {
            Ok(event) => self.events_publisher.publish(&event).await,
            Err(err) => Err(LibraryError::from(err)),
        };
        if let Err(err) = published {
            warn!(key, "failed to publish return event: {}", err);
        }
    }
}

#[async_trait]
impl ReturnService for ReturnServiceImpl {
    async fn register_return(&self, loan_id: &str, condition: Option<&str>, notes: Option<&str>) -> LibraryResult<ReturnDto> {
        let mut loan = self.loan_repository.get(loan_id).await?;
        let today = self.clock.today();
        if loan.status(today) == LoanStatus::Returned {
            return Err(LibraryError::already_returned(loan_id));
        }
        let condition = parse_condition(condition)?;
        let ret = ReturnEntity::new(&loan, today, condition, notes.unwrap_or_default())?;

        self.close_loan(&mut loan).await?;

        if let Err(err) = self.return_repository.create(&ret).await {
            self.reopen_loan(&mut loan).await;
            return Err(err.with_context(format!("persisting return of loan {}", loan_id).as_str()));
        }

        if let Err(err) = self.push_condition(loan.copy_id.as_str(), condition).await {
            self.discard_return(&ret).await;
            self.reopen_loan(&mut loan).await;
            return Err(err.with_context(format!("releasing copy {}", loan.copy_code).as_str()));
        }

        info!(loan = loan_id, copy = loan.copy_code.as_str(), condition = %condition,
            fine = %ret.fine, "registered return");
        let dto = ReturnDto::from(&ret);
        let metadata = HashMap::from([
            ("member_id".to_string(), loan.member_id.to_string()),
            ("copy_code".to_string(), loan.copy_code.to_string()),
            ("fine".to_string(), ret.fine.to_string()),
        ]);
        self.publish(DomainEvent::loan_returned(loan_id, &metadata, &dto), loan_id).await;
        Ok(dto)
    }

    async fn correct_return(&self, return_id: &str, condition: Option<&str>, notes: Option<&str>) -> LibraryResult<ReturnDto> {
        let mut ret = self.return_repository.get(return_id).await?;
        let recorded = ret.condition;
        // a correction without a condition keeps the recorded one
        let condition = match condition.map(str::trim) {
            None | Some("") => recorded,
            Some(_) => parse_condition(condition)?,
        };
        if condition != recorded {
            self.ensure_latest_return(&ret).await?;
            let swapped = self.copy_repository.compare_and_set_state(ret.copy_id.as_str(), recorded, condition).await
                .map_err(|err| err.with_context(format!("pushing corrected condition of return {}", return_id).as_str()))?;
            if !swapped {
                return Err(LibraryError::conflict(
                    format!("copy {} is no longer {} as recorded by return {}", ret.copy_id, recorded, return_id).as_str()));
            }
        }

        ret.correct(condition, notes);
        if let Err(err) = self.return_repository.update(&ret).await {
            if condition != recorded {
                self.restore_condition(ret.copy_id.as_str(), condition, recorded).await;
            }
            return Err(err.with_context(format!("correcting return {}", return_id).as_str()));
        }
        ret.version += 1;

        info!(return_id, condition = %condition, "corrected return");
        let dto = ReturnDto::from(&ret);
        let metadata = HashMap::from([("loan_id".to_string(), ret.loan_id.to_string())]);
        self.publish(DomainEvent::return_corrected(return_id, &metadata, &dto), return_id).await;
        Ok(dto)
    }

    async fn find_return_for_loan(&self, loan_id: &str) -> LibraryResult<ReturnDto> {
        self.return_repository.find_by_loan(loan_id).await?
            .map(|r| ReturnDto::from(&r))
            .ok_or_else(|| LibraryError::not_found(format!("no return registered for loan {}", loan_id).as_str()))
    }
}

impl From<&ReturnEntity> for ReturnDto {
    fn from(other: &ReturnEntity) -> Self {
        Self {
            return_id: other.return_id.to_string(),
            version: other.version,
            loan_id: other.loan_id.to_string(),
            member_id: other.member_id.to_string(),
            copy_id: other.copy_id.to_string(),
            returned_on: other.returned_on,
            condition: other.condition,
            notes: other.notes.to_string(),
            fine: other.fine,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
