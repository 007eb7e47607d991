use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::returns::domain::ReturnService;
use crate::returns::dto::ReturnDto;

pub(crate) struct CorrectReturnCommand {
    return_service: Box<dyn ReturnService>,
}

impl CorrectReturnCommand {
    pub(crate) fn new(return_service: Box<dyn ReturnService>) -> Self {
        Self {
            return_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrectReturnCommandRequest {
    return_id: String,
    condition: Option<String>,
    notes: Option<String>,
}

impl CorrectReturnCommandRequest {
    pub fn new(return_id: &str, condition: Option<&str>, notes: Option<&str>) -> Self {
        Self {
            return_id: return_id.to_string(),
            condition: condition.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CorrectReturnCommandResponse {
    pub settlement: ReturnDto,
}

impl CorrectReturnCommandResponse {
    pub fn new(settlement: ReturnDto) -> Self {
        Self {
            settlement,
        }
    }
}

#[async_trait]
impl Command<CorrectReturnCommandRequest, CorrectReturnCommandResponse> for CorrectReturnCommand {
    async fn execute(&self, req: CorrectReturnCommandRequest) -> Result<CorrectReturnCommandResponse, CommandError> {
        self.return_service.correct_return(req.return_id.as_str(), req.condition.as_deref(), req.notes.as_deref())
            .await.map_err(CommandError::from).map(CorrectReturnCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::returns::command::correct_return_cmd::{CorrectReturnCommand, CorrectReturnCommandRequest};
    use crate::returns::factory::create_return_service;

    #[tokio::test]
    async fn test_should_not_correct_unknown_return() {
        let svc = create_return_service(&Configuration::new("test"), RepositoryStore::InMemory).await;
        let req = CorrectReturnCommandRequest::new("no-such-return", Some("Lost"), None);
        let res = CorrectReturnCommand::new(svc).execute(req).await;
        assert!(matches!(res, Err(CommandError::NotFound{ .. })));
    }
}
