use lambda_http::{run, service_fn, Error};
use std::sync::Arc;
use taskboard_shared::config::AppConfig;
use taskboard_shared::AppState;
use tracing_subscriber::EnvFilter;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch stamps every line already.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let config = AppConfig::from_env()?;
    let aws = aws_config::load_from_env().await;
    let dynamo = aws_sdk_dynamodb::Client::new(&aws);
    let state = Arc::new(AppState::with_dynamo(config, dynamo));

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
