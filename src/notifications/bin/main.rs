include!("../../lib.rs");
use axum::{
    routing::{post, put},
    Router,
};
use lambda_http::{run, Error};
use crate::utils::ddb::setup_tracing;
use crate::core::controller::AppState;
use crate::core::repository::RepositoryStore;
use crate::notifications::controller::{derive_notifications, dispatch_notifications, mark_read};

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let state = if DEV_MODE {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        AppState::new("dev", RepositoryStore::from_env().unwrap_or(RepositoryStore::LocalDynamoDB))
    } else {
        AppState::new("prod", RepositoryStore::from_env().unwrap_or(RepositoryStore::DynamoDB))
    };

    let app = Router::new()
        .route("/notifications/sweep", post(derive_notifications))
        .route("/notifications/dispatch", post(dispatch_notifications))
        .route("/notifications/:id/read", put(mark_read))
        .with_state(state);

    run(app).await
}
