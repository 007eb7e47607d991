use axum::{
    extract::{Path, State},
    response::Json,
};
use crate::core::command::Command;
use crate::core::controller::{AppState, ServerError};
use crate::notifications::command::derive_notifications_cmd::{DeriveNotificationsCommand, DeriveNotificationsCommandRequest, DeriveNotificationsCommandResponse};
use crate::notifications::command::dispatch_notifications_cmd::{DispatchNotificationsCommand, DispatchNotificationsCommandRequest, DispatchNotificationsCommandResponse};
use crate::notifications::command::mark_read_cmd::{MarkReadCommand, MarkReadCommandRequest, MarkReadCommandResponse};
use crate::notifications::domain::NotificationService;
use crate::notifications::factory;

async fn build_service(state: AppState) -> Box<dyn NotificationService> {
    factory::create_notification_service(&state.config, state.store).await
}

pub(crate) async fn derive_notifications(
    State(state): State<AppState>) -> Result<Json<DeriveNotificationsCommandResponse>, ServerError> {
    let svc = build_service(state).await;
    let res = DeriveNotificationsCommand::new(svc).execute(DeriveNotificationsCommandRequest::default()).await?;
    Ok(Json(res))
}

pub(crate) async fn dispatch_notifications(
    State(state): State<AppState>) -> Result<Json<DispatchNotificationsCommandResponse>, ServerError> {
    let svc = build_service(state).await;
    let res = DispatchNotificationsCommand::new(svc).execute(DispatchNotificationsCommandRequest::default()).await?;
    Ok(Json(res))
}

pub(crate) async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>) -> Result<Json<MarkReadCommandResponse>, ServerError> {
    let req = MarkReadCommandRequest::new(notification_id.as_str());
    let svc = build_service(state).await;
    let res = MarkReadCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}
