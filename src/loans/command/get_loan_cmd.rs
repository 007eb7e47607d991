use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

pub(crate) struct GetLoanCommand {
    loan_service: Box<dyn LoanService>,
}

impl GetLoanCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetLoanCommandRequest {
    loan_id: String,
}

impl GetLoanCommandRequest {
    pub fn new(loan_id: &str) -> Self {
        Self {
            loan_id: loan_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetLoanCommandResponse {
    pub loan: LoanDto,
}

impl GetLoanCommandResponse {
    pub fn new(loan: LoanDto) -> Self {
        Self {
            loan,
        }
    }
}

#[async_trait]
impl Command<GetLoanCommandRequest, GetLoanCommandResponse> for GetLoanCommand {
    async fn execute(&self, req: GetLoanCommandRequest) -> Result<GetLoanCommandResponse, CommandError> {
        self.loan_service.find_loan(req.loan_id.as_str())
            .await.map_err(CommandError::from).map(GetLoanCommandResponse::new)
    }
}
