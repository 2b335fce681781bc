use clap::Parser;
use shop_e2e::{Result, RunReport, SearchCriteria, Suite, SuiteConfig, runner};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    match run(&args).await {
        Ok(report) => {
            for line in runner::summary(&report) {
                println!("{}", line);
            }
            println!("{} passed, {} failed", report.passed(), report.failed());
            if !report.all_passed() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            ::log::error!("Suite could not run: {}", e);
            std::process::exit(2);
        }
    }
}

async fn run(args: &Args) -> Result<RunReport> {
    let config = if args.config.exists() {
        ::log::info!("Loading configuration from {}", args.config.display());
        SuiteConfig::from_file(&args.config)?
    } else {
        ::log::warn!(
            "{} not found, using the default configuration",
            args.config.display()
        );
        SuiteConfig::default()
    };
    let config = config.with_env_overrides();

    println!("Note: the suite requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using {}",
        config.webdriver_url
    );

    let mut suite = Suite::new(config);
    if !args.skip_smoke {
        let criteria = SearchCriteria::new(args.query.clone(), args.max_price, args.limit)?;
        suite = suite.with_smoke(criteria);
    }
    if args.data.exists() {
        suite = suite.with_data_file(&args.data)?;
    } else {
        ::log::warn!("{} not found, no data-driven scenarios", args.data.display());
    }

    suite.run().await
}
