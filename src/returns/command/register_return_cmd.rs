use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::returns::domain::ReturnService;
use crate::returns::dto::ReturnDto;

pub(crate) struct RegisterReturnCommand {
    return_service: Box<dyn ReturnService>,
}

impl RegisterReturnCommand {
    pub(crate) fn new(return_service: Box<dyn ReturnService>) -> Self {
        Self {
            return_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterReturnCommandRequest {
    loan_id: String,
    condition: Option<String>,
    notes: Option<String>,
}

impl RegisterReturnCommandRequest {
    pub fn new(loan_id: &str, condition: Option<&str>, notes: Option<&str>) -> Self {
        Self {
            loan_id: loan_id.to_string(),
            condition: condition.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterReturnCommandResponse {
    pub settlement: ReturnDto,
}

impl RegisterReturnCommandResponse {
    pub fn new(settlement: ReturnDto) -> Self {
        Self {
            settlement,
        }
    }
}

#[async_trait]
impl Command<RegisterReturnCommandRequest, RegisterReturnCommandResponse> for RegisterReturnCommand {
    async fn execute(&self, req: RegisterReturnCommandRequest) -> Result<RegisterReturnCommandResponse, CommandError> {
        self.return_service.register_return(req.loan_id.as_str(), req.condition.as_deref(), req.notes.as_deref())
            .await.map_err(CommandError::from).map(RegisterReturnCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::copies::domain::model::CopyEntity;
    use crate::copies::factory::create_copy_repository;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::CopyState;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::loans::domain::LoanService;
    use crate::loans::factory::create_loan_service;
    use crate::members::domain::model::MemberEntity;
    use crate::members::factory::create_member_repository;
    use crate::returns::command::register_return_cmd::{RegisterReturnCommand, RegisterReturnCommandRequest};
    use crate::returns::factory::create_return_service;

    #[tokio::test]
    async fn test_should_run_register_return() {
        let config = Configuration::new("test");
        create_member_repository(RepositoryStore::InMemory).await
            .create(&MemberEntity::new("cmd-return-1", "Standard")).await.expect("should add member");
        create_copy_repository(RepositoryStore::InMemory).await
            .create(&CopyEntity::new("CMD-RETURN-1", "book1", "Shelf A")).await.expect("should add copy");
        let loan = create_loan_service(&config, RepositoryStore::InMemory).await
            .create_loan("cmd-return-1", "CMD-RETURN-1").await.expect("should create loan");

        let cmd = RegisterReturnCommand::new(create_return_service(&config, RepositoryStore::InMemory).await);
        let res = cmd.execute(RegisterReturnCommandRequest::new(loan.loan_id.as_str(), Some("Damaged"), None))
            .await.expect("should register return");
        assert_eq!(CopyState::Damaged, res.settlement.condition);

        let res = cmd.execute(RegisterReturnCommandRequest::new(loan.loan_id.as_str(), None, None)).await;
        match res {
            Err(CommandError::Conflict { reason_code, .. }) => assert_eq!(Some("already-returned".to_string()), reason_code),
            Err(other) => panic!("unexpected {:?}", other),
            Ok(_) => panic!("second return of the same loan should fail"),
        }
    }
}
