use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use futures_order_client::order::{OrderLookup, RawOrderRequest, Side};
use futures_order_client::twap::TwapPlan;
use futures_order_client::{DEFAULT_BASE_URL, PositionSide};
use rust_decimal::Decimal;

/// Place and track orders on a futures exchange.
#[derive(Debug, Parser)]
#[command(name = "futures-order", version, about)]
pub struct Cli {
    /// API key; falls back to `API_KEY`.
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// API secret; falls back to `API_SECRET`.
    #[arg(long, env = "API_SECRET", hide_env_values = true, global = true)]
    pub api_secret: Option<String>,

    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// `recvWindow` in milliseconds for signed requests.
    #[arg(long, global = true)]
    pub recv_window: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 15, global = true)]
    pub timeout: u64,

    /// Append-only diagnostic log with every request and response.
    #[arg(long, env = "LOG_FILE", default_value = "futures-order.log", global = true)]
    pub log_file: PathBuf,

    /// Console verbosity: -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Place a MARKET, LIMIT or TWAP order.
    Place(PlaceArgs),
    /// Query an order by exchange or client id.
    Query(LookupArgs),
    /// Cancel an order by exchange or client id.
    Cancel(LookupArgs),
}

#[derive(Debug, Args)]
pub struct PlaceArgs {
    pub symbol: String,
    /// BUY or SELL (case-insensitive).
    pub side: String,
    /// MARKET, LIMIT or TWAP (case-insensitive).
    pub order_type: String,
    pub quantity: Decimal,

    /// Required for LIMIT orders.
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long, default_value = "GTC")]
    pub time_in_force: String,

    /// LONG or SHORT, for hedge-mode accounts.
    #[arg(long)]
    pub position_side: Option<String>,

    #[arg(long)]
    pub reduce_only: bool,

    #[arg(long)]
    pub client_order_id: Option<String>,

    /// Number of TWAP slices.
    #[arg(long, default_value_t = 5)]
    pub slices: u32,

    /// Seconds between TWAP slices.
    #[arg(long, default_value_t = 10)]
    pub interval: u64,

    /// Stop placing TWAP slices after this many consecutive failures.
    #[arg(long)]
    pub max_consecutive_failures: Option<u32>,
}

impl PlaceArgs {
    pub fn is_twap(&self) -> bool {
        self.order_type.trim().eq_ignore_ascii_case("TWAP")
    }

    pub fn to_raw_order(&self) -> RawOrderRequest {
        RawOrderRequest {
            symbol: self.symbol.clone(),
            side: self.side.clone(),
            order_type: self.order_type.clone(),
            quantity: self.quantity,
            price: self.price,
            time_in_force: Some(self.time_in_force.clone()),
            position_side: self.position_side.clone(),
            reduce_only: self.reduce_only,
            client_order_id: self.client_order_id.clone(),
        }
    }

    pub fn to_twap_plan(&self) -> futures_order_client::Result<TwapPlan> {
        let side = Side::parse(&self.side)?;
        let position_side = self
            .position_side
            .as_deref()
            .map(PositionSide::parse)
            .transpose()?;
        let failure_policy = self
            .max_consecutive_failures
            .map(futures_order_client::twap::FailurePolicy::SkipAfterConsecutive)
            .unwrap_or_default();

        Ok(TwapPlan::builder()
            .symbol(self.symbol.clone())
            .side(side)
            .total_quantity(self.quantity)
            .slice_count(self.slices)
            .interval_seconds(self.interval)
            .maybe_position_side(position_side)
            .failure_policy(failure_policy)
            .build())
    }
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    pub symbol: String,

    #[arg(long)]
    pub order_id: Option<u64>,

    #[arg(long)]
    pub client_order_id: Option<String>,
}

impl LookupArgs {
    pub fn to_lookup(&self) -> OrderLookup {
        OrderLookup::new(self.order_id, self.client_order_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;
    use futures_order_client::twap::FailurePolicy;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("futures-order").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn limit_order_arguments() {
        let cli = parse(&[
            "--api-key", "k", "--api-secret", "s", "place", "btcusdt", "buy", "limit", "0.01",
            "--price", "65000.5",
        ]);

        let Command::Place(args) = cli.command else {
            panic!("expected place");
        };
        assert!(!args.is_twap(), "limit is not twap");

        let order = args.to_raw_order().parse().expect("valid order");
        assert_eq!(order.quantity, dec!(0.01));
        assert_eq!(order.price, Some(dec!(65000.5)));
        assert_eq!(order.side, Side::Buy);
    }

    #[test]
    fn twap_arguments_build_a_plan() {
        let cli = parse(&[
            "place", "ETHUSDT", "sell", "twap", "3", "--slices", "6", "--interval", "30",
            "--max-consecutive-failures", "2",
        ]);

        let Command::Place(args) = cli.command else {
            panic!("expected place");
        };
        assert!(args.is_twap(), "twap");

        let plan = args.to_twap_plan().expect("valid plan");
        assert_eq!(plan.slice_count, 6);
        assert_eq!(plan.interval_seconds, 30);
        assert_eq!(plan.side, Side::Sell);
        assert_eq!(plan.failure_policy, FailurePolicy::SkipAfterConsecutive(2));
        assert_eq!(plan.slice_quantity().expect("valid"), dec!(0.5));
    }

    #[test]
    fn lookup_arguments() {
        let cli = parse(&["query", "BTCUSDT", "--order-id", "7", "--client-order-id", "c"]);

        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.to_lookup(), OrderLookup::new(Some(7), Some("c".to_owned())));
    }

    #[test]
    fn quantity_must_be_decimal() {
        let result = Cli::try_parse_from(["futures-order", "place", "BTCUSDT", "BUY", "MARKET", "abc"]);
        assert!(result.is_err(), "non-decimal quantity");
    }
}
