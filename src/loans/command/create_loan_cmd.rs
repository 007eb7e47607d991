use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

pub(crate) struct CreateLoanCommand {
    loan_service: Box<dyn LoanService>,
}

impl CreateLoanCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateLoanCommandRequest {
    member_id: String,
    copy_code: String,
}

impl CreateLoanCommandRequest {
    pub fn new(member_id: &str, copy_code: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
            copy_code: copy_code.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateLoanCommandResponse {
    pub loan: LoanDto,
}

impl CreateLoanCommandResponse {
    pub fn new(loan: LoanDto) -> Self {
        Self {
            loan,
        }
    }
}

#[async_trait]
impl Command<CreateLoanCommandRequest, CreateLoanCommandResponse> for CreateLoanCommand {
    async fn execute(&self, req: CreateLoanCommandRequest) -> Result<CreateLoanCommandResponse, CommandError> {
        self.loan_service.create_loan(req.member_id.as_str(), req.copy_code.as_str())
            .await.map_err(CommandError::from).map(CreateLoanCommandResponse::new)
    }
}
