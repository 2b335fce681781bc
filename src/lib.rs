pub mod config;
pub mod driver;
pub mod error;
pub mod pages;
pub mod parsers;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod selector;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ScenarioFile, ScenarioRecord, SuiteConfig};
pub use error::{Error, Result};
pub use report::{RunReport, ScenarioOutcome, Status};
pub use scenario::{Scenario, ScenarioKind, SearchCriteria, ShoppingFlow};
pub use selector::{Selector, SelectorStrategy};

use driver::Session;
use driver::webdriver::WebDriverSession;
use std::path::Path;
use std::sync::Arc;

/// Main builder for a suite run
pub struct Suite {
    config: SuiteConfig,
    scenarios: Vec<Scenario>,
}

impl Suite {
    /// Create a suite with no scenarios yet
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            scenarios: Vec::new(),
        }
    }

    /// Add the full-flow smoke scenario
    pub fn with_smoke(mut self, criteria: SearchCriteria) -> Self {
        let name = format!("search_add_to_cart_and_verify_budget[{}]", criteria.query());
        self.scenarios.push(Scenario::full_flow(name, criteria));
        self
    }

    /// Add one search-only scenario per record of a scenario data file
    pub fn with_data_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let file = ScenarioFile::from_file(path)?;
        for (index, record) in file.test_scenarios.iter().enumerate() {
            self.scenarios.push(Scenario::from_record(index, record)?);
        }
        Ok(self)
    }

    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        self.scenarios.extend(scenarios);
        self
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Connect to the browser, run every scenario and write the report
    ///
    /// The session is closed once, after the last scenario, whatever the
    /// scenarios did.
    pub async fn run(self) -> Result<RunReport> {
        self.config.validate()?;
        ::log::info!(
            "Starting {} scenarios against {} ({:?}, headless: {})",
            self.scenarios.len(),
            self.config.site.base_url,
            self.config.browser.kind,
            self.config.browser.headless
        );

        let session = WebDriverSession::connect(&self.config).await?;
        let result = self.run_on(&session).await;

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        result
    }

    /// Run against an already open session, leaving it open
    pub async fn run_on<S: Session>(&self, session: &S) -> Result<RunReport> {
        let config = Arc::new(self.config.clone());
        let run = runner::run_scenarios(session, Arc::clone(&config), &self.scenarios).await;

        let path = run.write_to(&config.reports_dir)?;
        ::log::info!("Report written to {}", path.display());
        Ok(run)
    }
}
