use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value};
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::loans::command::create_loan_cmd::{CreateLoanCommand, CreateLoanCommandRequest, CreateLoanCommandResponse};
use crate::loans::command::get_loan_cmd::{GetLoanCommand, GetLoanCommandRequest, GetLoanCommandResponse};
use crate::loans::command::member_loans_cmd::{MemberLoansCommand, MemberLoansCommandRequest, MemberLoansCommandResponse};
use crate::loans::domain::LoanService;
use crate::loans::factory;

async fn build_service(state: AppState) -> Box<dyn LoanService> {
    factory::create_loan_service(&state.config, state.store).await
}

pub(crate) async fn create_loan(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CreateLoanCommandResponse>, ServerError> {
    let req: CreateLoanCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(state).await;
    let res = CreateLoanCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn find_loan_by_id(
    State(state): State<AppState>,
    Path(loan_id): Path<String>) -> Result<Json<GetLoanCommandResponse>, ServerError> {
    let req = GetLoanCommandRequest::new(loan_id.as_str());
    let svc = build_service(state).await;
    let res = GetLoanCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn member_loans(
    State(state): State<AppState>,
    Path(member_id): Path<String>) -> Result<Json<MemberLoansCommandResponse>, ServerError> {
    let req = MemberLoansCommandRequest::new(member_id.as_str());
    let svc = build_service(state).await;
    let res = MemberLoansCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}
