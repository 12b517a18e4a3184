use std::time::Duration;

use anyhow::Context as _;
use futures_order_client::{ClientConfig, Credentials, ExchangeClient, TwapExecutor};
use serde_json::Value;
use url::Url;

use crate::cli::{Cli, Command};

/// Runs the command and renders its result as pretty JSON for stdout.
///
/// Any error maps to a non-zero exit. Failed TWAP slices are part of the
/// rendered result and are not errors.
pub async fn execute(cli: Cli) -> anyhow::Result<String> {
    let output = run(cli).await?;
    serde_json::to_string_pretty(&output).context("failed to render output")
}

async fn run(cli: Cli) -> anyhow::Result<Value> {
    let credentials = Credentials::new(
        cli.api_key.unwrap_or_default(),
        cli.api_secret.unwrap_or_default(),
    )
    .context("credentials are required: pass --api-key/--api-secret or set API_KEY/API_SECRET")?;

    let base_url = Url::parse(&cli.base_url)
        .with_context(|| format!("invalid base url `{}`", cli.base_url))?;
    let mut config =
        ClientConfig::new(base_url, credentials).with_timeout(Duration::from_secs(cli.timeout));
    if let Some(window) = cli.recv_window {
        config = config.with_recv_window(window);
    }
    let client = ExchangeClient::new(config)?;

    match cli.command {
        Command::Place(args) if args.is_twap() => {
            let plan = args.to_twap_plan()?;
            let result = TwapExecutor::new(&client).run(&plan).await?;

            tracing::info!(
                placed = result.placed_count(),
                slices = result.len(),
                "TWAP complete"
            );
            Ok(serde_json::to_value(&result)?)
        }
        Command::Place(args) => {
            let response = client.place_raw_order(&args.to_raw_order()).await?;
            tracing::info!(order_id = ?response.order_id(), "order placed");
            Ok(response.body)
        }
        Command::Query(args) => {
            let response = client.query_order(&args.symbol, &args.to_lookup()).await?;
            Ok(response.body)
        }
        Command::Cancel(args) => {
            let response = client.cancel_order(&args.symbol, &args.to_lookup()).await?;
            tracing::info!(order_id = ?response.order_id(), "order cancelled");
            Ok(response.body)
        }
    }
}
