use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

pub(crate) struct MemberLoansCommand {
    loan_service: Box<dyn LoanService>,
}

impl MemberLoansCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberLoansCommandRequest {
    member_id: String,
}

impl MemberLoansCommandRequest {
    pub fn new(member_id: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MemberLoansCommandResponse {
    pub loans: Vec<LoanDto>,
}

impl MemberLoansCommandResponse {
    pub fn new(loans: Vec<LoanDto>) -> Self {
        Self {
            loans,
        }
    }
}

#[async_trait]
impl Command<MemberLoansCommandRequest, MemberLoansCommandResponse> for MemberLoansCommand {
    async fn execute(&self, req: MemberLoansCommandRequest) -> Result<MemberLoansCommandResponse, CommandError> {
        self.loan_service.member_loans(req.member_id.as_str())
            .await.map_err(CommandError::from).map(MemberLoansCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::copies::domain::model::CopyEntity;
    use crate::copies::factory::create_copy_repository;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::loans::command::member_loans_cmd::{MemberLoansCommand, MemberLoansCommandRequest};
    use crate::loans::domain::LoanService;
    use crate::loans::factory::create_loan_service;
    use crate::members::domain::model::MemberEntity;
    use crate::members::factory::create_member_repository;

    #[tokio::test]
    async fn test_should_list_member_loans() {
        let config = Configuration::new("test");
        create_member_repository(RepositoryStore::InMemory).await
            .create(&MemberEntity::new("cmd-history-1", "Standard")).await.expect("should add member");
        for code in ["CMD-HISTORY-1", "CMD-HISTORY-2"] {
            create_copy_repository(RepositoryStore::InMemory).await
                .create(&CopyEntity::new(code, "book1", "Shelf A")).await.expect("should add copy");
            create_loan_service(&config, RepositoryStore::InMemory).await
                .create_loan("cmd-history-1", code).await.expect("should create loan");
        }
        let svc = create_loan_service(&config, RepositoryStore::InMemory).await;
        let res = MemberLoansCommand::new(svc).execute(MemberLoansCommandRequest::new("cmd-history-1"))
            .await.expect("should list loans");
        assert_eq!(2, res.loans.len());
    }
}
