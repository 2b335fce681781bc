use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shop-e2e")]
#[command(about = "Browser-driven shopping flow checks: search, add to cart, verify budget")]
#[command(version)]
pub struct Args {
    /// Suite configuration file (YAML or JSON)
    #[arg(short, long, default_value = "config/test_config.yaml")]
    pub config: PathBuf,

    /// Scenario data file; one search-only scenario per record
    #[arg(short, long, default_value = "test_data/search_data.json")]
    pub data: PathBuf,

    /// Query of the smoke scenario
    #[arg(short, long, default_value = "shoes")]
    pub query: String,

    /// Maximum price per item of the smoke scenario
    #[arg(long, default_value_t = 220.0)]
    pub max_price: f64,

    /// Number of items the smoke scenario adds to the cart
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,

    /// Run only the data file scenarios
    #[arg(long)]
    pub skip_smoke: bool,
}
