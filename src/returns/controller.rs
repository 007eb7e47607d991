use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value};
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::returns::command::correct_return_cmd::{CorrectReturnCommand, CorrectReturnCommandRequest, CorrectReturnCommandResponse};
use crate::returns::command::register_return_cmd::{RegisterReturnCommand, RegisterReturnCommandRequest, RegisterReturnCommandResponse};
use crate::returns::domain::ReturnService;
use crate::returns::factory;

async fn build_service(state: AppState) -> Box<dyn ReturnService> {
    factory::create_return_service(&state.config, state.store).await
}

pub(crate) async fn register_return(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<RegisterReturnCommandResponse>, ServerError> {
    let req: RegisterReturnCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(state).await;
    let res = RegisterReturnCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

// the path id wins over any return id in the body
pub(crate) async fn correct_return(
    State(state): State<AppState>,
    Path(return_id): Path<String>,
    json: Json<Value>) -> Result<Json<CorrectReturnCommandResponse>, ServerError> {
    let mut body = json.0;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("return_id".to_string(), Value::String(return_id.to_string()));
    }
    let req: CorrectReturnCommandRequest = serde_json::from_value(body).map_err(json_to_server_error)?;
    let svc = build_service(state).await;
    let res = CorrectReturnCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}
