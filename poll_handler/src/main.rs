
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use homework_lib::config::{check_tokens, Config};
use homework_lib::relay::Relay;
use homework_lib::service::CommonService;


#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = Config::from_env();
    if !check_tokens(&config) {
        return ExitCode::FAILURE;
    }

    let service = match CommonService::new(&config) {
        Ok(service) => service,
        Err(error) => {
            error!("Error building services: {:?}", error);
            return ExitCode::FAILURE;
        },
    };

    info!(chat_id = %service.telegram.chat_id(), "Starting homework status bot");
    let mut relay = Relay::new(service.practicum, service.telegram, &config);
    relay.run().await;

    ExitCode::SUCCESS
}
