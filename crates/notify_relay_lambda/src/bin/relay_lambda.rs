use lambda_runtime::{service_fn, Error, LambdaEvent};
use notify_relay_lambda::adapters::acknowledger::CfnResponseAcknowledger;
use notify_relay_lambda::adapters::forwarder::HttpForwarder;
use notify_relay_lambda::config::RelayConfig;
use notify_relay_lambda::handlers::relay::handle_relay_event;
use notify_relay_lambda::runtime::contract::RelayReport;
use serde_json::Value;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

async fn handle_request(event: LambdaEvent<Value>) -> Result<RelayReport, Error> {
    let config = RelayConfig::from_env()?;
    let client = config.build_http_client()?;

    let forwarder = HttpForwarder::new(client.clone());
    let acknowledger =
        CfnResponseAcknowledger::new(client, event.context.env_config.log_stream.clone());

    let span = tracing::info_span!("relay_invocation", request_id = %event.context.request_id);
    let report = handle_relay_event(&event.payload, &forwarder, &acknowledger)
        .instrument(span)
        .await?;
    Ok(report)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // CloudWatch stamps each line itself.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handle_request)).await
}
